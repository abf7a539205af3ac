//! Configuration for the relay server and the terminal client.
//!
//! Values are read once at startup through a lookup function, so tests can pass a
//! map instead of touching the process environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Provider credential variable.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Listening port.
pub const PORT_ENV: &str = "BRANDFLOW_PORT";
/// Directory with landing-page assets.
pub const STATIC_DIR_ENV: &str = "BRANDFLOW_STATIC_DIR";
/// Provider base URL.
pub const PROVIDER_URL_ENV: &str = "BRANDFLOW_PROVIDER_URL";
/// Model identifier.
pub const MODEL_ENV: &str = "BRANDFLOW_MODEL";
/// Sampling temperature.
pub const TEMPERATURE_ENV: &str = "BRANDFLOW_TEMPERATURE";
/// Generated token ceiling.
pub const MAX_OUTPUT_TOKENS_ENV: &str = "BRANDFLOW_MAX_OUTPUT_TOKENS";
/// Provider call timeout in seconds.
pub const TIMEOUT_ENV: &str = "BRANDFLOW_TIMEOUT_SECS";
/// Relay base URL used by the terminal client.
pub const RELAY_URL_ENV: &str = "BRANDFLOW_RELAY_URL";
/// Terminal client request timeout in seconds; keep it above the relay's.
pub const CLIENT_TIMEOUT_ENV: &str = "BRANDFLOW_CLIENT_TIMEOUT_SECS";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default provider base URL.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.openai.com/v1";
/// Default relay URL for the terminal client.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value of the wrong shape.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A URL does not parse.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A value parses but is outside its allowed range.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

/// Convenience result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Provider credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build from a raw value; blank values count as absent.
    #[must_use]
    pub fn from_raw(raw: Option<String>) -> Option<Self> {
        raw.map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(Self)
    }

    /// Borrow the secret for an outbound request.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Top-level server configuration.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Completion provider settings.
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed or out of range.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through `lookup`; unset variables keep their defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed or out of range.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, PORT_ENV)? {
            config.server.port = port;
        }
        if let Some(dir) = lookup(STATIC_DIR_ENV) {
            config.server.static_dir = PathBuf::from(dir);
        }

        let provider = &mut config.provider;
        provider.api_key = ApiKey::from_raw(lookup(API_KEY_ENV));
        if let Some(url) = lookup(PROVIDER_URL_ENV) {
            provider.base_url = url;
        }
        if let Some(model) = lookup(MODEL_ENV) {
            provider.model = model;
        }
        if let Some(temperature) = parse_var(&lookup, TEMPERATURE_ENV)? {
            provider.temperature = temperature;
        }
        if let Some(tokens) = parse_var(&lookup, MAX_OUTPUT_TOKENS_ENV)? {
            provider.max_output_tokens = tokens;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, TIMEOUT_ENV)? {
            provider.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        self.provider.validate()
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// TCP port, bound on all interfaces.
    pub port: u16,
    /// Directory served as the router fallback.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Completion provider settings.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Credential; `None` makes every relay call fail with a configuration error.
    pub api_key: Option<ApiKey>,
    /// OpenAI-compatible base URL.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ceiling on generated tokens.
    pub max_output_tokens: u32,
    /// Upper bound on a whole provider call.
    pub request_timeout: Duration,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.4,
            max_output_tokens: 1400,
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    /// Set the credential.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(key));
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate provider parameters.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        Url::parse(&self.base_url)?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::OutOfRange("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::OutOfRange(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::OutOfRange(
                "max_output_tokens must be > 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::OutOfRange(
                "request_timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Terminal client settings.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Relay base URL.
    pub relay_url: String,
    /// Upper bound on one relay call.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through `lookup`.
    ///
    /// # Errors
    /// Returns an error if a variable is malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(RELAY_URL_ENV) {
            Url::parse(&url)?;
            config.relay_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, CLIENT_TIMEOUT_ENV)? {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}
