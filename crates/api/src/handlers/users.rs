//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use repwise_core::error::CoreError;
use repwise_core::pagination::Page;
use repwise_core::types::DbId;
use repwise_core::validation::validate_input;
use repwise_db::models::user::{CreateUser, ExistsResponse, RegisterUser, UpdateProfile, User};
use repwise_db::repositories::{SoftDeleteEntity, SoftDeleteRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::{AuthUser, BearerClaims};
use crate::middleware::rate_limit::{ClientIp, RatePolicy};
use crate::middleware::rbac::{DeleteUsers, ReadUsers, RequireAdmin};
use crate::query::{PageParams, Paged};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/users
///
/// Explicit registration with a chosen username. Identity fields come from
/// the token. Limited per client IP.
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    BearerClaims(claims): BearerClaims,
    AppJson(input): AppJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    state
        .rate_limiter
        .check(RatePolicy::AccountCreation, &ip, state.clock.now())?;
    validate_input(&input)?;

    let email = claims.email.clone().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Token does not carry an email claim".into(),
        ))
    })?;

    if UserRepo::find_by_subject(&state.pool, &claims.sub).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "A profile already exists for this account".into(),
        )));
    }
    if UserRepo::username_exists(&state.pool, &input.username).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }

    let create = CreateUser {
        subject: claims.sub.clone(),
        email,
        username: input.username,
        display_name: input.display_name,
        role: claims.role(),
        email_verified: claims.email_verified,
    };
    let user = UserRepo::create(&state.pool, &create, Some(&claims.sub)).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(DataResponse::new(user))))
}

/// GET /api/v1/users/me
pub async fn me(user: AuthUser) -> AppResult<Json<DataResponse<User>>> {
    Ok(Json(DataResponse::new(user.user)))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<UpdateProfile>,
) -> AppResult<Json<DataResponse<User>>> {
    validate_input(&input)?;

    let renamed = !input.username.eq_ignore_ascii_case(&user.user.username);
    if renamed && UserRepo::username_exists(&state.pool, &input.username).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }

    let id = user.user_id();
    let updated = match UserRepo::update_profile(&state.pool, id, &input, user.actor()).await? {
        Some(u) => u,
        None => {
            let miss = SoftDeleteRepo::<User>::write_miss(&state.pool, id, input.version).await?;
            return Err(miss.into());
        }
    };

    tracing::info!(user_id = id, "Profile updated");
    Ok(Json(DataResponse::new(updated)))
}

/// GET /api/v1/users/exists/username/{username}
///
/// Public. Every response, including 429, is delayed by a random jitter so
/// timing does not reveal anything beyond the answer.
pub async fn username_exists(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<DataResponse<ExistsResponse>>> {
    let result = existence_check(&state, &ip, UserRepo::username_exists(&state.pool, &username)).await;
    tokio::time::sleep(state.rate_limiter.jitter()).await;
    result
}

/// GET /api/v1/users/exists/email/{email}
pub async fn email_exists(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AppPath(email): AppPath<String>,
) -> AppResult<Json<DataResponse<ExistsResponse>>> {
    let result = existence_check(&state, &ip, UserRepo::email_exists(&state.pool, &email)).await;
    tokio::time::sleep(state.rate_limiter.jitter()).await;
    result
}

async fn existence_check(
    state: &AppState,
    ip: &str,
    lookup: impl std::future::Future<Output = Result<bool, sqlx::Error>>,
) -> AppResult<Json<DataResponse<ExistsResponse>>> {
    state
        .rate_limiter
        .check(RatePolicy::ExistenceCheck, ip, state.clock.now())?;
    let exists = lookup.await?;
    Ok(Json(DataResponse::new(ExistsResponse { exists })))
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin<ReadUsers>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<DataResponse<Page<User>>>> {
    let sort = params.sort(User::SORTABLE)?;
    let page =
        SoftDeleteRepo::<User>::list_page(&state.pool, params.page_request(), sort.as_ref()).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/users/{id}
///
/// Admins see deleted users too, so they can be restored.
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: RequireAdmin<ReadUsers>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = SoftDeleteRepo::<User>::find_by_id_including_deleted(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse::new(user)))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin, _): RequireAdmin<DeleteUsers>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id() {
        return Err(AppError::Core(CoreError::Validation(
            "Administrators cannot delete their own account".into(),
        )));
    }
    let now = state.clock.now();
    if SoftDeleteRepo::<User>::soft_delete(&state.pool, id, now, admin.actor()).await? {
        tracing::info!(user_id = id, admin_id = admin.user_id(), "User soft-deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

/// POST /api/v1/users/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(admin, _): RequireAdmin<DeleteUsers>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    if !SoftDeleteRepo::<User>::restore(&state.pool, id, admin.actor()).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let user = SoftDeleteRepo::<User>::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    tracing::info!(user_id = id, admin_id = admin.user_id(), "User restored");
    Ok(Json(DataResponse::new(user)))
}
