//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier handed out by the prepare step and redeemed by the
/// stream step.
///
/// Backed by a random (v4) UUID, i.e. 122 bits of entropy rendered as a
/// hyphenated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamSessionId(Uuid);

impl StreamSessionId {
    /// Creates a new random StreamSessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a StreamSessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StreamSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StreamSessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = StreamSessionId::new();
        let b = StreamSessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_and_parse_agree() {
        let id = StreamSessionId::new();
        let parsed: StreamSessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("not-a-session".parse::<StreamSessionId>().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let uuid = Uuid::nil();
        let json = serde_json::to_string(&StreamSessionId::from_uuid(uuid)).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
