//! Engine configuration.

use serde::{Deserialize, Serialize};
use supergraph_store::StorageConfig;
use supergraph_types::ContainerId;
use uuid::Uuid;

/// Well-known id of the root created by `ensure_default_root`.
pub const DEFAULT_ROOT_ID: ContainerId =
    ContainerId::from_uuid(Uuid::from_u128(0x5f1e_7c2a_9b3d_4e61_8a0f_c4d2_b7e9_1a36));

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Container naming and bootstrap
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Container naming and bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Id of the default root
    #[serde(default = "default_root_id")]
    pub default_root_uid: ContainerId,

    /// Name given to the default root when it is created
    #[serde(default = "default_root_name")]
    pub default_root_name: String,

    /// Longest accepted container name, in characters
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            default_root_uid: default_root_id(),
            default_root_name: default_root_name(),
            max_name_length: default_max_name_length(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_root_id() -> ContainerId {
    DEFAULT_ROOT_ID
}

fn default_root_name() -> String {
    "Default root".to_string()
}

fn default_max_name_length() -> usize {
    255
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `SUPERGRAPH_`-prefixed environment variables (`__` between sections,
    /// e.g. `SUPERGRAPH_STORAGE__TYPE=postgres`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SUPERGRAPH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
