use anyhow::{Context, Result};
use storage::models::Identity;
use storage::services::VoteVisibility;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Postgres backend when set, in-memory registry otherwise.
    pub database_url: Option<String>,
    /// Comma-separated `identity:token` pairs.
    pub api_keys: String,
    pub registry_owner: Option<Identity>,
    pub vote_visibility: VoteVisibility,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: match non_empty("PORT") {
                Some(port) => port.trim().parse().context("PORT must be a number")?,
                None => 8080,
            },
            database_url: non_empty("DATABASE_URL"),
            api_keys: lookup("API_KEYS").unwrap_or_default(),
            registry_owner: non_empty("REGISTRY_OWNER")
                .map(|owner| owner.parse::<Identity>())
                .transpose()
                .context("REGISTRY_OWNER is not a valid identity")?,
            vote_visibility: non_empty("VOTE_VISIBILITY")
                .map(|v| v.parse::<VoteVisibility>())
                .transpose()
                .context("Cannot parse VOTE_VISIBILITY")?
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(config.database_url.is_none());
        assert!(config.registry_owner.is_none());
        assert_eq!(config.vote_visibility, VoteVisibility::Restricted);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("DATABASE_URL", "postgres://localhost/registry"),
            ("API_KEYS", "alice:a1"),
            ("REGISTRY_OWNER", "root"),
            ("VOTE_VISIBILITY", "public"),
        ])
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/registry")
        );
        assert_eq!(config.api_keys, "alice:a1");
        assert_eq!(config.registry_owner.unwrap().as_str(), "root");
        assert_eq!(config.vote_visibility, VoteVisibility::Public);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("VOTE_VISIBILITY", "sometimes")]).is_err());
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        assert!(config(&[("DATABASE_URL", "  ")]).unwrap().database_url.is_none());
    }
}
