//! Test doubles for command handlers.
//!
//! Enabled for this crate's tests and, through the `test-utils` feature,
//! for the workspace integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use shared_types::{
    CloudSettings, ConnectionSettings, HandlerError, Message, METADATA_HANDLER_NAME,
};

use crate::ports::MessageHandler;

/// Scriptable handler that counts its `init` and `handle` invocations.
///
/// On success `handle` echoes the payload, tagged with the handler name.
pub struct DummyMessageHandler {
    name: String,
    fail_init: bool,
    fail_handle: bool,
    init_calls: Arc<AtomicUsize>,
    handle_calls: Arc<AtomicUsize>,
}

impl DummyMessageHandler {
    fn build(name: &str, fail_init: bool, fail_handle: bool) -> Self {
        Self {
            name: name.to_string(),
            fail_init,
            fail_handle,
            init_calls: Arc::new(AtomicUsize::new(0)),
            handle_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Initializes and handles successfully.
    pub fn succeeding(name: &str) -> Self {
        Self::build(name, false, false)
    }

    /// Fails `init`.
    pub fn failing_init(name: &str) -> Self {
        Self::build(name, true, false)
    }

    /// Initializes, then declines every message.
    pub fn failing_handle(name: &str) -> Self {
        Self::build(name, false, true)
    }

    /// Shared `init` counter. Stays valid after the handler is boxed.
    pub fn init_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.init_calls)
    }

    /// Shared `handle` counter.
    pub fn handle_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.handle_calls)
    }

    pub fn boxed(self) -> Box<dyn MessageHandler> {
        Box::new(self)
    }
}

impl MessageHandler for DummyMessageHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(
        &mut self,
        _settings: &CloudSettings,
        _connection: &ConnectionSettings,
    ) -> Result<(), HandlerError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(HandlerError::Init(format!("{} refused to start", self.name)));
        }
        Ok(())
    }

    fn handle(&self, message: &Message) -> Result<Vec<Message>, HandlerError> {
        self.handle_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_handle {
            return Err(HandlerError::NotApplicable(format!(
                "{} declined message",
                self.name
            )));
        }
        Ok(vec![Message::with_payload(message.payload.clone())
            .with_metadata(METADATA_HANDLER_NAME, self.name.clone())])
    }
}

/// Settings for the `dummy-device` test identity.
pub fn dummy_settings() -> (CloudSettings, ConnectionSettings) {
    let settings = CloudSettings {
        connection_string: DUMMY_CONNECTION_STRING.to_string(),
        ..CloudSettings::default()
    };
    let connection = ConnectionSettings {
        host_name: "dummy-hub.azure-devices.net".to_string(),
        hub_name: "dummy-hub".to_string(),
        device_id: "dummy-device".to_string(),
        shared_access_key: None,
    };
    (settings, connection)
}

/// Connection string for the `dummy-device` identity.
pub const DUMMY_CONNECTION_STRING: &str =
    "HostName=dummy-hub.azure-devices.net;DeviceId=dummy-device;SharedAccessKey=ZHVtbXk=";
