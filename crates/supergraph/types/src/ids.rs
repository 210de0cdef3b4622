use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a vertex, port or group.
///
/// Supplied by the editor front-end and unique within its kind. Re-submitting
/// an entity with a known uid updates it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(pub String);

impl Uid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Uid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a container (Root or Fragment).
///
/// Rendered and parsed as the 32-character simple hex form of a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerId(Uuid);

impl ContainerId {
    /// Generate a new random container ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Error returned when a string is not a valid container ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid container id `{0}`")]
pub struct ParseContainerIdError(pub String);

impl FromStr for ContainerId {
    type Err = ParseContainerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s.trim())
            .map(Self)
            .map_err(|_| ParseContainerIdError(s.to_string()))
    }
}

impl TryFrom<String> for ContainerId {
    type Error = ParseContainerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContainerId> for String {
    fn from(value: ContainerId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_id_displays_as_simple_hex() {
        let id = ContainerId::generate();
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 32);
        assert!(!rendered.contains('-'));
        assert_eq!(rendered.parse::<ContainerId>().unwrap(), id);
    }

    #[test]
    fn container_id_accepts_hyphenated_form() {
        let uuid = Uuid::new_v4();
        let parsed: ContainerId = uuid.hyphenated().to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn container_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<ContainerId>().unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn container_id_serde_uses_hex() {
        let id = ContainerId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: ContainerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn uid_is_transparent() {
        let uid = Uid::from("n1");
        assert_eq!(serde_json::to_string(&uid).unwrap(), "\"n1\"");
        assert_eq!(uid.as_str(), "n1");
    }
}
