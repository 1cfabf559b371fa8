use crate::authz::AuthzMode;
use crate::errors::AppError;

const DEFAULT_AUDIT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzConfig {
    pub mode: AuthzMode,
    pub database_url: Option<String>,
    pub audit_channel_capacity: usize,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            mode: AuthzMode::default(),
            database_url: None,
            audit_channel_capacity: DEFAULT_AUDIT_CHANNEL_CAPACITY,
        }
    }
}

impl AuthzConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process environment.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mode = AuthzMode::parse(&var("AUTHZ_MODE").unwrap_or_default());
        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let audit_channel_capacity = match var("AUDIT_CHANNEL_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(AppError::configuration(
                        "AUDIT_CHANNEL_CAPACITY must be a positive integer",
                    ))
                }
            },
            None => DEFAULT_AUDIT_CHANNEL_CAPACITY,
        };

        Ok(Self {
            mode,
            database_url,
            audit_channel_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_strict_without_database() {
        let config = AuthzConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, AuthzConfig::default());
        assert_eq!(config.mode, AuthzMode::Strict);
    }

    #[test]
    fn reads_mode_url_and_capacity() {
        let config = AuthzConfig::from_vars(vars(&[
            ("AUTHZ_MODE", "advisory"),
            ("DATABASE_URL", "sqlite://authz.db"),
            ("AUDIT_CHANNEL_CAPACITY", "64"),
        ]))
        .unwrap();
        assert_eq!(config.mode, AuthzMode::Advisory);
        assert_eq!(config.database_url.as_deref(), Some("sqlite://authz.db"));
        assert_eq!(config.audit_channel_capacity, 64);
    }

    #[test]
    fn rejects_invalid_capacity() {
        for raw in ["0", "-3", "lots"] {
            let err = AuthzConfig::from_vars(vars(&[("AUDIT_CHANNEL_CAPACITY", raw)])).unwrap_err();
            assert!(matches!(err, AppError::Configuration(_)), "{raw}");
        }
    }
}
