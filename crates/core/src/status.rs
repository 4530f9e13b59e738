//! Lookup enums mapping to SMALLINT lookup tables.
//!
//! Each variant's discriminant matches the seed data order (1-based) in the
//! corresponding lookup table, and its label is the wire name used in JSON.

/// Lookup ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// A SMALLINT read from the database did not match any known variant.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} id {id}")]
pub struct UnknownStatusId {
    pub kind: &'static str,
    pub id: StatusId,
}

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant in seed order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database lookup ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the wire label (e.g. `"IN_PROGRESS"`).
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl TryFrom<StatusId> for $name {
            type Error = UnknownStatusId;

            fn try_from(value: StatusId) -> Result<Self, Self::Error> {
                $( if value == $val { return Ok($name::$variant); } )+
                Err(UnknownStatusId { kind: stringify!($name), id: value })
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            /// Parse a wire label, ignoring ASCII case.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $( if s.eq_ignore_ascii_case($label) { return Ok($name::$variant); } )+
                let labels: Vec<&str> = $name::ALL.iter().map(|v| v.label()).collect();
                Err(format!("Invalid value '{s}'. Must be one of: {}", labels.join(", ")))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

define_status_enum! {
    /// Workout session lifecycle status.
    WorkoutStatus {
        Planned = 1 => "PLANNED",
        InProgress = 2 => "IN_PROGRESS",
        Paused = 3 => "PAUSED",
        Completed = 4 => "COMPLETED",
        Cancelled = 5 => "CANCELLED",
    }
}

define_status_enum! {
    /// Kind of exercise, which fixes the kind of set that may be logged for it.
    ExerciseType {
        Strength = 1 => "STRENGTH",
        Cardio = 2 => "CARDIO",
        Flexibility = 3 => "FLEXIBILITY",
    }
}

define_status_enum! {
    /// Account role.
    UserRole {
        User = 1 => "USER",
        Admin = 2 => "ADMIN",
    }
}
