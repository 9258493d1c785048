pub mod config_manager;
pub mod json_config;

pub use config_manager::ConfigManager;
pub use json_config::{LanguageConfig, LanguagesConfig};
