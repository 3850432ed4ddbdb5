//! Strongly typed identifiers for canteen entities.
//!
//! Every identifier wraps a UUID and serialises as its hyphenated string
//! form. Keeping one newtype per entity stops a shift id from being passed
//! where a meal type id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string is not a valid UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} id must be a valid UUID, got {value:?}")]
pub struct IdentifierParseError {
    entity: &'static str,
    value: String,
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident => $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierParseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim())
                    .map(Self)
                    .map_err(|_| IdentifierParseError {
                        entity: $entity,
                        value: value.to_owned(),
                    })
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a [`MealType`](crate::domain::MealType).
    MealTypeId => "meal type"
);
uuid_identifier!(
    /// Identifier of a [`Shift`](crate::domain::Shift).
    ShiftId => "shift"
);
uuid_identifier!(
    /// Identifier of a [`Company`](crate::domain::Company).
    CompanyId => "company"
);
uuid_identifier!(
    /// Identifier of a [`User`](crate::domain::User).
    UserId => "user"
);
