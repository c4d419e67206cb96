//! Logic for loading configuration in to an object model
use displaydoc::Display;
use schemars::gen::SchemaSettings;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::spec::OperationKind;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
}

/// Options used when building resolver trees.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Build mutation trees as serial-only: list elements are resolved one at a time,
    /// in order, and streaming lists are rejected.
    /// enabled by default
    #[serde(default = "default_serial_mutations")]
    pub serial_mutations: bool,

    /// Accept receive-only streams as list sources.
    /// enabled by default
    #[serde(default = "default_streaming_lists")]
    pub streaming_lists: bool,
}

fn default_serial_mutations() -> bool {
    true
}

fn default_streaming_lists() -> bool {
    true
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            serial_mutations: default_serial_mutations(),
            streaming_lists: default_streaming_lists(),
        }
    }
}

impl Configuration {
    /// Parse configuration from YAML.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigurationError> {
        // an empty document deserializes to `()` rather than to a struct
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(ConfigurationError::DeserializeConfigError)
    }

    /// Whether trees built for `kind` must not fan out.
    pub fn is_serial_only(&self, kind: OperationKind) -> bool {
        self.serial_mutations && kind.is_write()
    }
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });
    let gen = settings.into_generator();
    gen.into_root_schema_for::<Configuration>()
}
