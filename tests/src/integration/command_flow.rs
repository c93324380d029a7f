//! # Command Flow
//!
//! A cloud-to-device message published on the cloud broker must arrive on
//! the local broker, on the topic chosen by the first handler that accepts
//! it.
//!
//! ```text
//! cloud InMemoryBus ──► command_handler ──► local InMemoryBus
//!  devices/dummy-device/messages/devicebound/...
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cloud_routing::testing::{dummy_settings, DummyMessageHandler, DUMMY_CONNECTION_STRING};
    use cloud_routing::{command_bus, CommandTopicForm, COMMAND_HANDLER_NAME};
    use connector_runtime::{Connector, ConnectorConfig};
    use shared_bus::{InMemoryBus, Publisher, Router, Subscriber, Subscription};
    use shared_types::{Message, METADATA_HANDLER_NAME};
    use tokio::time::timeout;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const CLOUD_TOPIC: &str = "devices/dummy-device/messages/devicebound/%24.ct=application%2Fjson";
    const RECV_TIMEOUT: Duration = Duration::from_secs(2);
    const SILENCE: Duration = Duration::from_millis(150);

    fn command_json(correlation_id: &str) -> Vec<u8> {
        serde_json::json!({
            "topic": "org.acme/pump-01/things/live/messages/start",
            "headers": { "correlation-id": correlation_id },
            "path": "/inbox/messages/start",
            "value": { "speed": 3 }
        })
        .to_string()
        .into_bytes()
    }

    fn config(passthrough: &str, form: CommandTopicForm) -> ConnectorConfig {
        let mut config = ConnectorConfig::default();
        config.cloud.connection_string = DUMMY_CONNECTION_STRING.to_string();
        config.cloud.passthrough_command_topic = passthrough.to_string();
        config.topic_form = form;
        config
    }

    struct Harness {
        cloud: Arc<InMemoryBus>,
        local: Arc<InMemoryBus>,
        connector: Connector,
    }

    impl Harness {
        async fn start(config: &ConnectorConfig) -> Self {
            let cloud = Arc::new(InMemoryBus::new());
            let local = Arc::new(InMemoryBus::new());
            let connector = Connector::start(config, local.clone(), cloud.clone())
                .await
                .expect("connector starts");
            Self {
                cloud,
                local,
                connector,
            }
        }

        async fn local_subscription(&self, filter: &str) -> Subscription {
            self.local.subscribe(filter).await.expect("subscribe")
        }

        async fn send_cloud(&self, topic: &str, payload: Vec<u8>) {
            self.cloud
                .publish(topic, vec![Message::with_payload(payload)])
                .await
                .expect("publish");
        }
    }

    async fn expect_message(subscription: &mut Subscription) -> Message {
        timeout(RECV_TIMEOUT, subscription.recv())
            .await
            .expect("message before timeout")
            .expect("bus open")
    }

    async fn expect_silence(subscription: &mut Subscription) {
        assert!(
            timeout(SILENCE, subscription.recv()).await.is_err(),
            "no message expected"
        );
    }

    // =========================================================================
    // ENVELOPE COMMANDS
    // =========================================================================

    #[tokio::test]
    async fn test_envelope_command_reaches_long_topic() {
        let harness = Harness::start(&config("", CommandTopicForm::Long)).await;
        let mut local = harness.local_subscription("command/#").await;

        harness.send_cloud(CLOUD_TOPIC, command_json("cid-42")).await;

        let received = expect_message(&mut local).await;
        assert_eq!(
            received.topic(),
            Some("command//org.acme:pump-01/req/cid-42/start")
        );
        assert_eq!(received.payload, command_json("cid-42"));
        assert_eq!(
            received.metadata_value(METADATA_HANDLER_NAME),
            Some("command_envelope")
        );

        harness.connector.shutdown().await;
    }

    #[tokio::test]
    async fn test_envelope_command_reaches_short_topic() {
        let harness = Harness::start(&config("", CommandTopicForm::Short)).await;
        let mut local = harness.local_subscription("c/+/+/q/#").await;

        harness.send_cloud(CLOUD_TOPIC, command_json("cid-7")).await;

        let received = expect_message(&mut local).await;
        assert_eq!(received.topic(), Some("c//org.acme:pump-01/q/cid-7/start"));

        harness.connector.shutdown().await;
    }

    // =========================================================================
    // PASSTHROUGH FALLBACK
    // =========================================================================

    #[tokio::test]
    async fn test_raw_payload_falls_back_to_passthrough() {
        let harness = Harness::start(&config("cloud/commands", CommandTopicForm::Long)).await;
        assert_eq!(
            harness.connector.chain().handler_names(),
            vec!["command_envelope", "passthrough_command"]
        );
        let mut local = harness.local_subscription("cloud/commands").await;

        harness.send_cloud(CLOUD_TOPIC, b"reboot now".to_vec()).await;

        let received = expect_message(&mut local).await;
        assert_eq!(received.payload, b"reboot now".to_vec());
        assert_eq!(received.metadata_value("cloud_topic"), Some(CLOUD_TOPIC));
        assert_eq!(
            received.metadata_value(METADATA_HANDLER_NAME),
            Some("passthrough_command")
        );

        harness.connector.shutdown().await;
    }

    #[tokio::test]
    async fn test_envelope_wins_over_passthrough() {
        let harness = Harness::start(&config("cloud/commands", CommandTopicForm::Long)).await;
        let mut passthrough = harness.local_subscription("cloud/commands").await;
        let mut commands = harness.local_subscription("command/#").await;

        harness.send_cloud(CLOUD_TOPIC, command_json("cid-1")).await;

        expect_message(&mut commands).await;
        expect_silence(&mut passthrough).await;

        harness.connector.shutdown().await;
    }

    #[tokio::test]
    async fn test_raw_payload_dropped_without_passthrough() {
        let harness = Harness::start(&config("", CommandTopicForm::Long)).await;
        assert_eq!(
            harness.connector.chain().handler_names(),
            vec!["command_envelope"]
        );
        let mut local = harness.local_subscription("#").await;

        harness.send_cloud(CLOUD_TOPIC, b"reboot now".to_vec()).await;

        expect_silence(&mut local).await;
        harness.connector.shutdown().await;
    }

    // =========================================================================
    // SUBSCRIPTION SCOPE AND LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_other_device_is_ignored() {
        let harness = Harness::start(&config("cloud/commands", CommandTopicForm::Long)).await;
        let mut local = harness.local_subscription("#").await;

        harness
            .send_cloud(
                "devices/other-device/messages/devicebound/x",
                command_json("cid-1"),
            )
            .await;

        expect_silence(&mut local).await;
        harness.connector.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_cloud_subscription() {
        let harness = Harness::start(&config("", CommandTopicForm::Long)).await;
        let filter = "devices/dummy-device/messages/devicebound/#";
        assert_eq!(harness.cloud.subscription_count(filter), 1);

        harness.connector.shutdown().await;
        assert_eq!(harness.cloud.subscription_count(filter), 0);
    }

    #[tokio::test]
    async fn test_custom_chain_over_router() {
        let (settings, connection) = dummy_settings();
        let cloud = Arc::new(InMemoryBus::new());
        let local = Arc::new(InMemoryBus::new());

        let declining = DummyMessageHandler::failing_handle("declining");
        let broken = DummyMessageHandler::failing_init("broken");
        let echo = DummyMessageHandler::succeeding("echo");
        let broken_handle = broken.handle_calls();

        let mut router = Router::new();
        let chain = command_bus(
            &mut router,
            local.clone(),
            cloud.clone(),
            &settings,
            &connection,
            vec![declining.boxed(), broken.boxed(), echo.boxed()],
        )
        .expect("registered");
        assert_eq!(chain.handler_names(), vec!["declining", "echo"]);
        assert_eq!(router.handlers()[0].name, COMMAND_HANDLER_NAME);

        let running = router.run().await.expect("router runs");

        // Dummy handlers set no destination topic, so nothing is published
        // locally even though the chain accepts the message.
        let mut local_sub = local.subscribe("#").await.expect("subscribe");
        cloud
            .publish(CLOUD_TOPIC, vec![Message::with_payload("dummy_payload")])
            .await
            .expect("publish");
        expect_silence(&mut local_sub).await;

        assert_eq!(broken_handle.load(std::sync::atomic::Ordering::SeqCst), 0);
        running.close().await;
    }
}
