//! Strongly-typed identifiers for registry records
//!
//! Records are persisted as plain JSON, so every id is a transparent string
//! newtype. Generated ids are UUID v4.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of an agent (AI persona) that owns works
    AgentId
);
string_id!(
    /// Identifier of a work (creation)
    WorkId
);
string_id!(
    /// Identifier of a human or agent curator
    CuratorId
);
string_id!(
    /// Identifier of a curated collection
    CollectionId
);
string_id!(
    /// Identifier of a collaborative curation session with voting
    CollaborationId
);
string_id!(
    /// Identifier of a single-curator review session
    SessionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = WorkId::generate();
        let b = WorkId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = CuratorId::new("curator-a");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"curator-a\"");
        let back: CuratorId = serde_json::from_str("\"curator-a\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(id.to_string(), "curator-a");
    }
}
