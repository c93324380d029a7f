//! # Connector Configuration
//!
//! Operator settings read from the environment. Every variable is optional;
//! unset ones keep the [`CloudSettings`] defaults.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `AZURE_CONNECTION_STRING` | `connection_string` |
//! | `AZURE_PASSTHROUGH_COMMAND_TOPIC` | `passthrough_command_topic` |
//! | `AZURE_PASSTHROUGH_TELEMETRY_TOPIC` | `passthrough_telemetry_topic` |
//! | `AZURE_TENANT_ID` | `tenant_id` |
//! | `AZURE_ID_SCOPE` | `id_scope` |
//! | `AZURE_SAS_TOKEN_VALIDITY` | `sas_token_validity` |
//! | `LOCAL_BROKER_ADDRESS` | `local_address` |
//! | `COMMAND_TOPIC_FORM` | `long` or `short` local command topics |

use std::env;

use cloud_routing::CommandTopicForm;
use connector_telemetry::TelemetryConfig;
use shared_types::{CloudSettings, ConnectionSettings, SettingsError};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid COMMAND_TOPIC_FORM: {0}")]
    TopicForm(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Complete connector configuration.
#[derive(Debug, Clone, Default)]
pub struct ConnectorConfig {
    pub cloud: CloudSettings,
    /// Template for local command topics.
    pub topic_form: CommandTopicForm,
    pub telemetry: TelemetryConfig,
}

impl ConnectorConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Load from an arbitrary key lookup. Telemetry keeps its defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cloud = CloudSettings::default();
        let overrides: [(&str, &mut String); 7] = [
            ("AZURE_CONNECTION_STRING", &mut cloud.connection_string),
            (
                "AZURE_PASSTHROUGH_COMMAND_TOPIC",
                &mut cloud.passthrough_command_topic,
            ),
            (
                "AZURE_PASSTHROUGH_TELEMETRY_TOPIC",
                &mut cloud.passthrough_telemetry_topic,
            ),
            ("AZURE_TENANT_ID", &mut cloud.tenant_id),
            ("AZURE_ID_SCOPE", &mut cloud.id_scope),
            ("AZURE_SAS_TOKEN_VALIDITY", &mut cloud.sas_token_validity),
            ("LOCAL_BROKER_ADDRESS", &mut cloud.local_address),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        let topic_form = match lookup("COMMAND_TOPIC_FORM") {
            Some(value) => value.parse().map_err(ConfigError::TopicForm)?,
            None => CommandTopicForm::default(),
        };

        Ok(Self {
            cloud,
            topic_form,
            telemetry: TelemetryConfig::default(),
        })
    }

    /// Derive the hub connection parameters.
    pub fn connection_settings(&self) -> Result<ConnectionSettings, ConfigError> {
        Ok(ConnectionSettings::prepare(&self.cloud)?)
    }
}
