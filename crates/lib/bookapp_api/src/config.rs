//! API server configuration.

use tracing::warn;

/// Development-only signing key used when `SIGNING_KEY` is unset.
const DEV_SIGNING_KEY: &str = "bookapp-dev-signing-key-change-in-production";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:3333").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// HS256 key for session tokens.
    pub signing_key: String,
    /// Audience written into issued tokens.
    pub token_audience: Vec<String>,
    /// Policy CSV replacing the embedded rule set.
    pub policy_file_path: Option<String>,
    pub db_max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3333".into(),
            pg_connection_url: "postgres://localhost:5432/bookapp".into(),
            signing_key: DEV_SIGNING_KEY.into(),
            token_audience: vec!["bookapp".into()],
            policy_file_path: None,
            db_max_connections: 10,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable             | Default                              |
    /// |----------------------|--------------------------------------|
    /// | `BIND_ADDR`          | `0.0.0.0:3333`                       |
    /// | `DATABASE_URL`       | `postgres://localhost:5432/bookapp`  |
    /// | `SIGNING_KEY`        | development key (logged as a warning)|
    /// | `TOKEN_AUDIENCE`     | `bookapp` (comma separated)          |
    /// | `POLICY_FILE_PATH`   | embedded policy                      |
    /// | `DB_MAX_CONNECTIONS` | `10`                                 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let signing_key = var("SIGNING_KEY").unwrap_or_else(|| {
            warn!("SIGNING_KEY is not set; using the development signing key");
            defaults.signing_key.clone()
        });

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid DB_MAX_CONNECTIONS, using default");
                defaults.db_max_connections
            }),
            None => defaults.db_max_connections,
        };

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            pg_connection_url: var("DATABASE_URL").unwrap_or(defaults.pg_connection_url),
            signing_key,
            token_audience: var("TOKEN_AUDIENCE")
                .map(|raw| parse_audience(&raw))
                .unwrap_or(defaults.token_audience),
            policy_file_path: var("POLICY_FILE_PATH"),
            db_max_connections,
        }
    }
}

/// Split a comma separated audience list, dropping blanks.
pub fn parse_audience(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_addr, "0.0.0.0:3333");
        assert_eq!(config.token_audience, vec!["bookapp".to_string()]);
        assert_eq!(config.policy_file_path, None);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.signing_key, DEV_SIGNING_KEY);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("SIGNING_KEY", "s3cret"),
            ("TOKEN_AUDIENCE", "bookapp, admin-panel ,"),
            ("POLICY_FILE_PATH", "/etc/bookapp/policy.csv"),
            ("DB_MAX_CONNECTIONS", "25"),
        ]));
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.signing_key, "s3cret");
        assert_eq!(
            config.token_audience,
            vec!["bookapp".to_string(), "admin-panel".to_string()]
        );
        assert_eq!(
            config.policy_file_path.as_deref(),
            Some("/etc/bookapp/policy.csv")
        );
        assert_eq!(config.db_max_connections, 25);
    }

    #[test]
    fn unparsable_pool_size_falls_back() {
        let config = ApiConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "lots")]));
        assert_eq!(config.db_max_connections, 10);
    }
}
