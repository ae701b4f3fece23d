use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RegistryError;

/// Identity of a registry participant as established by the transport layer.
///
/// Identities are compared exactly after trimming surrounding whitespace. An
/// empty identity is never valid.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl AsRef<str>) -> Result<Self, RegistryError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidInput(
                "identity must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_trimmed() {
        let identity = Identity::new("  alice ").unwrap();
        assert_eq!(identity.as_str(), "alice");
        assert_eq!(identity, "alice".parse().unwrap());
    }

    #[test]
    fn test_blank_identity_is_rejected() {
        assert!(Identity::new("").is_err());
        assert!(Identity::new("   ").is_err());
    }

    #[test]
    fn test_identity_is_case_sensitive() {
        assert_ne!(Identity::new("Alice").unwrap(), Identity::new("alice").unwrap());
    }

    #[test]
    fn test_identity_serde_rejects_blank() {
        let ok: Identity = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(ok.to_string(), "bob");
        assert!(serde_json::from_str::<Identity>("\"  \"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"bob\"");
    }
}
