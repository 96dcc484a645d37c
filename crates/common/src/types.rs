use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors produced when parsing an identifier from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is not a canonical hyphenated UUID.
    #[error("malformed {kind} identifier: {value:?}")]
    Malformed { kind: &'static str, value: String },
}

/// Length of the canonical hyphenated UUID form.
const CANONICAL_LEN: usize = 36;

fn parse_canonical(kind: &'static str, value: &str) -> Result<Uuid, IdError> {
    let malformed = || IdError::Malformed {
        kind,
        value: value.to_string(),
    };

    // Uuid::parse_str also accepts simple, braced and urn forms; only the
    // hyphenated form maps one-to-one onto a stored identifier.
    if value.len() != CANONICAL_LEN {
        return Err(malformed());
    }
    Uuid::try_parse(value).map_err(|_| malformed())
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses the canonical hyphenated string form.
            pub fn parse(value: &str) -> Result<Self, IdError> {
                parse_canonical($kind, value).map(Self)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifier of a user document.
    ///
    /// The only accepted string form is the hyphenated UUID, so every valid
    /// string maps to exactly one stored user.
    UserId,
    "user"
);

uuid_id!(
    /// Identifier of a catalog product.
    ProductId,
    "product"
);

uuid_id!(
    /// Identifier of an order inside a user's order history.
    OrderId,
    "order"
);
