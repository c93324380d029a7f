//! # Connector Settings
//!
//! `CloudSettings` is what the operator configures. `ConnectionSettings` is
//! derived from it once at startup and carries the device identity used to
//! parameterize every cloud-facing topic.

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

const KEY_HOST_NAME: &str = "HostName";
const KEY_DEVICE_ID: &str = "DeviceId";
const KEY_SHARED_ACCESS_KEY: &str = "SharedAccessKey";

/// Operator-facing connector settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudSettings {
    /// `HostName=...;DeviceId=...;SharedAccessKey=...`
    pub connection_string: String,
    /// Local topic that receives every cloud command no other handler takes.
    pub passthrough_command_topic: String,
    /// Comma-separated local topics forwarded to the cloud as telemetry.
    pub passthrough_telemetry_topic: String,
    pub tenant_id: String,
    /// Device Provisioning Service scope.
    pub id_scope: String,
    /// Validity of generated SAS tokens, e.g. `1h`.
    pub sas_token_validity: String,
    /// Local broker address.
    pub local_address: String,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            passthrough_command_topic: String::new(),
            passthrough_telemetry_topic: String::new(),
            tenant_id: "defaultTenant".to_string(),
            id_scope: String::new(),
            sas_token_validity: "1h".to_string(),
            local_address: "tcp://localhost:1883".to_string(),
        }
    }
}

/// Hub connection parameters derived from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Fully qualified hub host, e.g. `my-hub.azure-devices.net`.
    pub host_name: String,
    /// First DNS label of `host_name`.
    pub hub_name: String,
    /// Device identity. Never empty.
    pub device_id: String,
    pub shared_access_key: Option<String>,
}

impl ConnectionSettings {
    /// Parse `Key=Value;Key=Value` connection strings.
    ///
    /// Values may contain `=` (base64 keys do); only the first one splits.
    pub fn from_connection_string(connection_string: &str) -> Result<Self, SettingsError> {
        let mut host_name = None;
        let mut device_id = None;
        let mut shared_access_key = None;

        for entry in connection_string.split(';').map(str::trim) {
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| SettingsError::MalformedEntry(entry.to_string()))?;
            match key {
                KEY_HOST_NAME => host_name = Some(value.to_string()),
                KEY_DEVICE_ID => device_id = Some(value.to_string()),
                KEY_SHARED_ACCESS_KEY => shared_access_key = Some(value.to_string()),
                _ => {}
            }
        }

        let host_name = host_name.ok_or(SettingsError::MissingProperty(KEY_HOST_NAME))?;
        let device_id = device_id.ok_or(SettingsError::MissingProperty(KEY_DEVICE_ID))?;
        if device_id.is_empty() {
            return Err(SettingsError::EmptyDeviceId);
        }
        let hub_name = host_name
            .split('.')
            .next()
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            host_name,
            hub_name,
            device_id,
            shared_access_key,
        })
    }

    /// Prepare connection settings from the operator settings.
    pub fn prepare(settings: &CloudSettings) -> Result<Self, SettingsError> {
        Self::from_connection_string(&settings.connection_string)
    }
}
