use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::formats::Format;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DecoderConfig {
    /// Document format to decode; `auto` sniffs each document
    #[serde(default)]
    pub format: Format,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Settings for the HTTP transport
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("beer-recipe-io/{}", env!("CARGO_PKG_VERSION"))
}

impl DecoderConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with BEER_RECIPE__ prefix
    /// 2. beer-recipe-io.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: BEER_RECIPE__HTTP__TIMEOUT
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`DecoderConfig::load`] for the source priority.
pub fn load_config() -> Result<DecoderConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("beer-recipe-io").required(false))
        // Use double underscore for nested: BEER_RECIPE__HTTP__USER_AGENT
        .add_source(
            Environment::with_prefix("BEER_RECIPE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
