//! Layered run settings.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`fanout.toml` when present, or an explicit path)
//! 3. `FANOUT_*` environment variables, nested keys separated by `__`
//!    (`FANOUT_PARAMETERS__TOP_P=0.5`)
//! 4. command-line overrides

use derive_getters::Getters;
use fanout_core::{EndpointMode, GenerationConfig};
use fanout_error::{ConfigError, ConfigErrorKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default server address.
pub const DEFAULT_ADDRESS: &str = "http://localhost:3000";

/// Settings file read when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "fanout.toml";

const ENV_PREFIX: &str = "FANOUT";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct Settings {
    /// Server address
    address: String,
    /// Transport name; validated by the client factory
    transport: String,
    /// Per-request timeout in seconds
    timeout_secs: u64,
    /// Model family for generation defaults
    model: String,
    /// Adapter sent with every request
    #[serde(default)]
    adapter_name: Option<String>,
    /// Maximum requests in flight
    #[serde(default)]
    concurrency: Option<usize>,
    /// Endpoint targeted by `run`
    mode: EndpointMode,
    /// Generation parameter overrides
    #[serde(default)]
    parameters: BTreeMap<String, Value>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    /// Settings file; must exist when given
    pub config_file: Option<PathBuf>,
    /// Server address
    pub address: Option<String>,
    /// Transport name
    pub transport: Option<String>,
    /// Timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Model family
    pub model: Option<String>,
    /// Adapter name
    pub adapter_name: Option<String>,
    /// Concurrency cap
    pub concurrency: Option<usize>,
    /// Endpoint mode
    pub mode: Option<EndpointMode>,
    /// `key=value` parameter overrides, applied last
    pub parameters: Vec<(String, Value)>,
}

impl Settings {
    /// Load settings from every layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::Load`] when an explicit settings file is
    /// missing, a file or variable cannot be parsed, or a value has the wrong
    /// type. A zero timeout is [`ConfigErrorKind::InvalidParameter`].
    #[instrument(skip_all, fields(config_file = ?overrides.config_file))]
    pub fn load(overrides: &SettingsOverrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_file {
            Some(path) => config::File::from(path.as_path()).required(true),
            None => config::File::from(Path::new(DEFAULT_SETTINGS_FILE)).required(false),
        };

        let builder = config::Config::builder()
            .set_default("address", DEFAULT_ADDRESS)
            .and_then(|b| b.set_default("transport", "http"))
            .and_then(|b| b.set_default("timeout_secs", 30_i64))
            .and_then(|b| b.set_default("model", "llama"))
            .and_then(|b| b.set_default("mode", EndpointMode::default().to_string()))
            .map_err(load_error)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("address", overrides.address.clone())
            .and_then(|b| b.set_override_option("transport", overrides.transport.clone()))
            .and_then(|b| {
                b.set_override_option("timeout_secs", overrides.timeout_secs.map(|s| s as i64))
            })
            .and_then(|b| b.set_override_option("model", overrides.model.clone()))
            .and_then(|b| b.set_override_option("adapter_name", overrides.adapter_name.clone()))
            .and_then(|b| {
                b.set_override_option("concurrency", overrides.concurrency.map(|c| c as i64))
            })
            .and_then(|b| {
                b.set_override_option("mode", overrides.mode.map(|m| m.to_string()))
            })
            .map_err(load_error)?;

        let mut settings: Settings = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(load_error)?;

        if settings.timeout_secs == 0 {
            return Err(ConfigError::new(ConfigErrorKind::InvalidParameter {
                name: "timeout_secs".to_string(),
                reason: "must be at least one second".to_string(),
            }));
        }

        settings
            .parameters
            .extend(overrides.parameters.iter().cloned());
        debug!(
            address = %settings.address,
            transport = %settings.transport,
            model = %settings.model,
            parameters = settings.parameters.len(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Generation config for the model family with every parameter override
    /// applied.
    ///
    /// # Errors
    ///
    /// Fails on an unknown model family or an invalid parameter.
    pub fn generation_config(&self) -> Result<GenerationConfig, ConfigError> {
        GenerationConfig::for_model(&self.model)?.with_overrides(self.parameters.clone())
    }
}

/// Parse a `key=value` parameter override.
///
/// The value is read as JSON when possible (`4096`, `0.21`, `true`,
/// `["</s>"]`) and kept as a plain string otherwise.
///
/// # Errors
///
/// Fails when there is no `=` or the key is empty.
pub fn parse_parameter(input: &str) -> Result<(String, Value), ConfigError> {
    let (key, raw) = input.split_once('=').ok_or_else(|| {
        ConfigError::new(ConfigErrorKind::InvalidParameter {
            name: input.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        })
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::new(ConfigErrorKind::InvalidParameter {
            name: input.to_string(),
            reason: "parameter name is empty".to_string(),
        }));
    }

    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[track_caller]
fn load_error(err: config::ConfigError) -> ConfigError {
    ConfigError::new(ConfigErrorKind::Load(err.to_string()))
}
