//! Configuration - 配置管理

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, CacheConfig, DatabaseConfig, LogConfig, ServerConfig, StorageConfig, TtsConfig,
};
