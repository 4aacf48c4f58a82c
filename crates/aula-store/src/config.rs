//! Connection configuration for the Aula document store.

/// Configuration for a remote SurrealDB connection.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Endpoint URL (e.g. "wss://xxx.aws-use1.surrealdb.cloud").
    pub endpoint: String,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Namespace (default: "aula").
    pub namespace: String,
    /// Database name (default: "main").
    pub database: String,
    /// Whether to authenticate as a root user instead of a database user.
    pub is_root: bool,
}

impl StoreConfig {
    /// Create a configuration for a database user.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: "aula".to_string(),
            database: "main".to_string(),
            is_root: false,
        }
    }

    /// Set a custom namespace.
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set a custom database.
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Authenticate as a root user.
    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables.
    ///
    /// Reads:
    /// - AULA_DB_ENDPOINT (required)
    /// - AULA_DB_USERNAME (required)
    /// - AULA_DB_PASSWORD (required)
    /// - AULA_DB_NAMESPACE (optional, default: "aula")
    /// - AULA_DB_DATABASE (optional, default: "main")
    /// - AULA_DB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("AULA_DB_ENDPOINT").map_err(|_| "AULA_DB_ENDPOINT not set")?;
        let username =
            std::env::var("AULA_DB_USERNAME").map_err(|_| "AULA_DB_USERNAME not set")?;
        let password =
            std::env::var("AULA_DB_PASSWORD").map_err(|_| "AULA_DB_PASSWORD not set")?;
        let namespace = std::env::var("AULA_DB_NAMESPACE").unwrap_or_else(|_| "aula".to_string());
        let database = std::env::var("AULA_DB_DATABASE").unwrap_or_else(|_| "main".to_string());
        let is_root = std::env::var("AULA_DB_ROOT")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = StoreConfig::new("wss://db.example", "svc", "secret")
            .with_namespace("staging")
            .with_database("aula_test")
            .with_root(true);
        assert_eq!(config.namespace, "staging");
        assert_eq!(config.database, "aula_test");
        assert!(config.is_root);
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("wss://db.example", "svc", "secret");
        assert_eq!(config.namespace, "aula");
        assert_eq!(config.database, "main");
        assert!(!config.is_root);
    }
}
