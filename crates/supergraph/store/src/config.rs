use crate::memory::InMemoryGraphStore;
use crate::traits::GraphStore;
use crate::StorageResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Which backend holds the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self::Memory
    }

    pub fn postgres(url: impl Into<String>) -> Self {
        Self::Postgres {
            url: url.into(),
            max_connections: default_pool_size(),
            connect_timeout_secs: default_connection_timeout(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres { .. } => "postgres",
        }
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

/// Open the configured backend.
pub async fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn GraphStore>> {
    info!(backend = config.label(), "opening graph store");
    match config {
        StorageConfig::Memory => Ok(Arc::new(InMemoryGraphStore::new())),
        #[cfg(feature = "postgres")]
        StorageConfig::Postgres {
            url,
            max_connections,
            connect_timeout_secs,
        } => {
            let store = crate::postgres::PostgresGraphStore::connect_with_options(
                url,
                *max_connections,
                *connect_timeout_secs,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageConfig::Postgres { .. } => Err(crate::StorageError::InvalidInput(
            "postgres storage requested but supergraph-store was built without the `postgres` feature"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn postgres_defaults_fill_pool_settings() {
        let config: StorageConfig = serde_json::from_value(json!({
            "type": "postgres",
            "url": "postgres://localhost/supergraph"
        }))
        .unwrap();
        assert_eq!(config, StorageConfig::postgres("postgres://localhost/supergraph"));
        assert_eq!(config.label(), "postgres");
    }

    #[test]
    fn memory_is_default() {
        assert_eq!(StorageConfig::default(), StorageConfig::memory());
    }

    #[tokio::test]
    async fn memory_store_opens() {
        let store = open_store(&StorageConfig::Memory).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.stats().await.unwrap().vertices, 0);
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn postgres_without_feature_is_rejected() {
        let result = open_store(&StorageConfig::postgres("postgres://localhost/x")).await;
        assert!(matches!(result, Err(crate::StorageError::InvalidInput(_))));
    }
}
