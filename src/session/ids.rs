//! Identifier types for sessions and chat entries.
//!
//! Ids are opaque strings generated from UUIDs, with recency carried by separate
//! explicit timestamp fields. Records written by older clients used numeric
//! millisecond timestamps as ids, so deserialisation accepts either a JSON number
//! or a string and all comparisons go through the normalised string form.
//!
//! ## Cargo features used by this module
//! - `uuid_v7`: enables time-ordered `UUIDv7` generation via `uuid/v7`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Generate a fresh UUID, time-ordered when `uuid_v7` is enabled.
#[inline]
#[must_use]
fn uuid_time_ordered() -> Uuid {
    #[cfg(feature = "uuid_v7")]
    {
        Uuid::now_v7()
    }
    #[cfg(not(feature = "uuid_v7"))]
    {
        Uuid::new_v4()
    }
}

/// Error returned when parsing an empty identifier.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("identifier must not be empty")]
pub struct IdParseError;

/// Wire shapes accepted for an identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_normalised(self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }
}

/// Declare a string identifier newtype with a consistent API.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(String);

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            /// Create a new unique identifier.
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(uuid_time_ordered().to_string())
            }

            /// Parse a raw value (route parameter, legacy numeric id, ...).
            ///
            /// # Errors
            /// Returns an error if the value is blank.
            pub fn parse(raw: &str) -> Result<Self, IdParseError> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(IdParseError);
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the normalised string form.
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Compare against a raw value using the normalised string form.
            #[must_use]
            pub fn matches(&self, raw: &str) -> bool {
                self.0 == raw.trim()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = RawId::deserialize(deserializer)?.into_normalised();
                if raw.is_empty() {
                    return Err(serde::de::Error::custom(IdParseError));
                }
                Ok(Self(raw))
            }
        }
    };
}

define_string_id!(
    /// Identifies one palette conversation.
    SessionId
);

define_string_id!(
    /// Identifies one chat entry within a transcript.
    EntryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_ne!(EntryId::new(), EntryId::new());
    }

    #[test]
    fn test_numeric_and_string_ids_compare_equal() {
        let from_number: SessionId = serde_json::from_str("1700000000000").unwrap();
        let from_text: SessionId = serde_json::from_str("\"1700000000000\"").unwrap();
        assert_eq!(from_number, from_text);
        assert!(from_number.matches(" 1700000000000 "));
        assert_eq!(SessionId::from(1_700_000_000_000), from_text);
    }

    #[test]
    fn test_blank_ids_rejected() {
        assert!(SessionId::parse("   ").is_err());
        assert!(serde_json::from_str::<EntryId>("\"\"").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = SessionId::parse("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.to_string(), "abc");
        assert_eq!("abc".parse::<SessionId>().unwrap(), id);
    }
}
