use std::collections::BTreeMap;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::ConfigError;

/// Parent of every target Keystone logs under (`keystone.loader`, `keystone.resolve`, ...).
const KEYSTONE_TARGET: &str = "keystone";

/// Level for everything outside [`KEYSTONE_TARGET`] when `level` is a bare level.
const FOREIGN_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Verbosity of Keystone's own targets.
    ///
    /// A bare level (`info`, `debug`, ...) applies to `keystone.*` while other crates stay at
    /// `warn`. Anything else is taken as a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Per-target levels layered on top of `level`, e.g. `"keystone.resolve" = "trace"`.
    #[serde(default)]
    pub targets: BTreeMap<String, String>,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Canonical spelling of a bare level, if `input` is one.
fn bare_level(input: &str) -> Option<&'static str> {
    match input.trim().to_ascii_lowercase().as_str() {
        "off" => Some("off"),
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// The filter directives this config stands for.
    ///
    /// Fails with [`ConfigError::Invalid`] when a target override is not a bare level or the
    /// result does not parse as an `EnvFilter`.
    pub fn directives(&self) -> Result<String, ConfigError> {
        let level = self.level.trim();
        let mut directives = match bare_level(level) {
            Some(level) => format!("{FOREIGN_LEVEL},{KEYSTONE_TARGET}={level}"),
            None if level.is_empty() => format!("{FOREIGN_LEVEL},{KEYSTONE_TARGET}=info"),
            None => level.to_owned(),
        };

        for (target, level) in &self.targets {
            let level = bare_level(level).ok_or_else(|| {
                ConfigError::Invalid(format!("logging.targets.{target}: unknown level `{level}`"))
            })?;
            directives.push_str(&format!(",{target}={level}"));
        }

        EnvFilter::try_new(&directives)
            .map_err(|err| ConfigError::Invalid(format!("logging.level: {err}")))?;
        Ok(directives)
    }

    /// Build the effective filter; `RUST_LOG` (when set and well formed) wins over the config.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self
            .directives()
            .unwrap_or_else(|_| Self::default().directives().unwrap_or_default());

        let from_env = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .and_then(|value| EnvFilter::try_new(format!("{configured},{value}")).ok());

        from_env.unwrap_or_else(|| EnvFilter::new(configured))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            targets: BTreeMap::new(),
            json: false,
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs a global `tracing` subscriber writing to stderr.
///
/// Only the first call does anything. Returns `false` when no subscriber was installed by this
/// call (an earlier call did, or the host already set one).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        // `cargo test` only captures output written through the test writer.
        let writer = if cfg!(debug_assertions) {
            BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(config.env_filter())
            .with_writer(writer);
        let result = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed = result.is_ok();
    });
    installed
}
