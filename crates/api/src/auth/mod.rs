//! Bearer-token verification.
//!
//! Tokens are issued by an external identity provider; this service only
//! verifies them against a statically configured key.

pub mod jwt;
