//! `jl5.toml` configuration and tracing setup for tools embedding the jl5 crates.

use std::path::Path;
use std::sync::Once;

use jl5_types::TypeStoreOptions;
use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all jl5 crates: a bare level (`info`, `debug`, ...) or a full
    /// `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// The configured level (`info` when blank), followed by `rust_log` so its directives
    /// take precedence.
    fn directives(&self, rust_log: Option<&str>) -> String {
        let level = match self.level.trim() {
            "" => "info",
            level => level,
        };
        match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
            Some(env) => format!("{level},{env}"),
            None => level.to_owned(),
        }
    }

    /// The effective filter, with `RUST_LOG` directives appended when the variable is set.
    /// Directives that fail to parse fall back to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let rust_log = std::env::var("RUST_LOG").ok();
        EnvFilter::try_new(self.directives(rust_log.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

/// Top-level `jl5.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Jl5Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Options handed to `TypeStore::with_options`.
    #[serde(default)]
    pub types: TypeStoreOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        let message = err.message().trim();
        match err.span() {
            Some(span) => ConfigError::Toml(format!("{message} (at byte {})", span.start)),
            None => ConfigError::Toml(message.to_owned()),
        }
    }
}

impl Jl5Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Jl5Config = toml::from_str(text)?;
        if config.types.max_subtype_depth == 0 {
            tracing::warn!("types.max_subtype_depth = 0 makes every non-trivial subtype check fail");
        }
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading jl5 config");
        Self::from_toml_str(&text)
    }
}

/// JSON schema for `jl5.toml`, for editor tooling.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(Jl5Config)
}

/// Install the global tracing subscriber. Only the first call has an effect; a
/// subscriber installed by someone else is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .boxed()
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rust_log_directives_follow_the_configured_level() {
        let config = LoggingConfig {
            level: " debug ".to_string(),
            json: false,
        };
        assert_eq!(config.directives(None), "debug");
        assert_eq!(config.directives(Some("  ")), "debug");
        assert_eq!(
            config.directives(Some("jl5_types=trace")),
            "debug,jl5_types=trace"
        );

        let blank = LoggingConfig {
            level: String::new(),
            json: false,
        };
        assert_eq!(blank.directives(None), "info");
    }

    #[test]
    fn unparsable_level_falls_back_to_info() {
        let config = LoggingConfig {
            level: "jl5_types=loud".to_string(),
            json: false,
        };
        assert!(EnvFilter::try_new(config.directives(None)).is_err());
        // Must not panic.
        let _ = config.env_filter();
    }
}
