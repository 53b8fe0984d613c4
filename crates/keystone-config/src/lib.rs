//! Configuration for Keystone (`keystone.toml`).
//!
//! Every key is optional; a missing file section falls back to the defaults documented on each
//! field. Unknown keys are rejected so typos surface as load errors instead of silently ignored
//! settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, LoggingConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_owned())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeystoneConfig {
    /// Class-model defaults.
    #[serde(default)]
    pub model: ModelSettings,

    /// Logging settings for Keystone crates.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Knobs that shape how the class model fills in defaults and resolves bare names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSettings {
    /// Root of the class hierarchy. Every object type is assignable to it.
    #[serde(default = "ModelSettings::default_root_class")]
    pub root_class: String,

    /// Packages probed, in order, when a bare name falls through package and import lookup.
    #[serde(default = "ModelSettings::default_default_packages")]
    pub default_packages: Vec<String>,

    /// Prefix of the names given to members created without one (`unnamed_0`, `unnamed_1`, ...).
    #[serde(default = "ModelSettings::default_member_prefix")]
    pub default_member_prefix: String,

    /// Type assigned to newly created fields.
    #[serde(default = "ModelSettings::default_field_type")]
    pub default_field_type: String,

    /// Return type assigned to newly created methods.
    #[serde(default = "ModelSettings::default_return_type")]
    pub default_return_type: String,
}

impl ModelSettings {
    fn default_root_class() -> String {
        "java.lang.Object".to_owned()
    }

    fn default_default_packages() -> Vec<String> {
        vec!["java.lang".to_owned()]
    }

    fn default_member_prefix() -> String {
        "unnamed_".to_owned()
    }

    fn default_field_type() -> String {
        "java.lang.Object".to_owned()
    }

    fn default_return_type() -> String {
        "void".to_owned()
    }

    /// Check that every configured name is syntactically usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, err: keystone_core::ModelError| {
            ConfigError::Invalid(format!("model.{key}: {err}"))
        };

        keystone_core::validate_class_name(&self.root_class)
            .map_err(|err| invalid("root_class", err))?;
        keystone_core::validate_class_name(&self.default_field_type)
            .map_err(|err| invalid("default_field_type", err))?;
        keystone_core::validate_class_name(&self.default_return_type)
            .map_err(|err| invalid("default_return_type", err))?;
        for package in &self.default_packages {
            keystone_core::validate_class_name(package)
                .map_err(|err| invalid("default_packages", err))?;
        }
        // The prefix only has to produce identifiers once an ordinal is appended.
        keystone_core::validate_identifier(&format!("{}0", self.default_member_prefix))
            .map_err(|err| invalid("default_member_prefix", err))?;
        Ok(())
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            root_class: Self::default_root_class(),
            default_packages: Self::default_default_packages(),
            default_member_prefix: Self::default_member_prefix(),
            default_field_type: Self::default_field_type(),
            default_return_type: Self::default_return_type(),
        }
    }
}

impl KeystoneConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Parse and validate a config from a TOML string.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: KeystoneConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.logging.directives()?;
        if self.model.default_packages.is_empty() {
            tracing::warn!(
                target: "keystone.config",
                "no default packages configured; bare names only resolve verbatim"
            );
        }
        Ok(())
    }
}
