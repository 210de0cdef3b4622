use crate::ids::ContainerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the Root/Fragment hierarchy a container sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Top-level container; owns fragments and mirrors their content.
    Root,
    /// Sub-graph held by exactly one root.
    Fragment,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "root" => Ok(Self::Root),
            "fragment" => Ok(Self::Fragment),
            other => Err(format!("unknown container kind: {other}")),
        }
    }
}

/// Persisted description of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub name: String,
    pub kind: ContainerKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContainerRecord {
    pub fn new(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self::with_id(ContainerId::generate(), name, kind)
    }

    pub fn with_id(id: ContainerId, name: impl Into<String>, kind: ContainerKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == ContainerKind::Root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Root".parse::<ContainerKind>().unwrap(), ContainerKind::Root);
        assert_eq!("fragment".parse::<ContainerKind>().unwrap(), ContainerKind::Fragment);
        assert!("graph".parse::<ContainerKind>().is_err());
    }

    #[test]
    fn new_record_has_matching_timestamps() {
        let record = ContainerRecord::new("main", ContainerKind::Root);
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.is_root());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "root");
        assert_eq!(json["id"], record.id.to_string());
    }
}
