//! # Message Publisher
//!
//! Defines the publishing side of the bus.

use crate::error::BusError;
use crate::subscriber::{Subscriber, Subscription};
use crate::topic::{validate_publish_topic, TopicFilter};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use shared_types::{Message, METADATA_TOPIC};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing messages to a broker.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish messages to a concrete topic.
    ///
    /// Messages are delivered in slice order.
    async fn publish(&self, topic: &str, messages: Vec<Message>) -> Result<(), BusError>;
}

/// Publisher that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPublisher;

#[async_trait]
impl Publisher for NullPublisher {
    async fn publish(&self, _topic: &str, _messages: Vec<Message>) -> Result<(), BusError> {
        Ok(())
    }
}

/// In-memory broker.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics; each subscription filters the shared stream by its topic
/// filter. Stands in for a network broker in tests and single-process
/// deployments.
pub struct InMemoryBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<Message>,

    /// Active subscription count by filter.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages matching a validated filter.
    #[must_use]
    pub fn subscribe_filter(&self, filter: TopicFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let key = filter.as_str().to_string();

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(key.clone()).or_insert(0) += 1;
        }

        debug!(filter = %key, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), key)
    }

    /// Number of live subscriptions registered with exactly this filter.
    #[must_use]
    pub fn subscription_count(&self, filter: &str) -> usize {
        self.subscriptions
            .read()
            .map(|subs| subs.get(filter).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Get the number of active receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total messages accepted by `publish`.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, topic: &str, messages: Vec<Message>) -> Result<(), BusError> {
        validate_publish_topic(topic)?;

        for mut message in messages {
            message.set_metadata(METADATA_TOPIC, topic);
            self.messages_published.fetch_add(1, Ordering::Relaxed);
            let uuid = message.uuid.clone();

            match self.sender.send(message) {
                Ok(receivers) => {
                    debug!(topic, uuid = %uuid, receivers, "Message published");
                }
                Err(_) => {
                    // No receivers: MQTT drops unsubscribed messages too
                    warn!(topic, uuid = %uuid, "Message dropped (no subscribers)");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Subscriber for InMemoryBus {
    async fn subscribe(&self, topic_filter: &str) -> Result<Subscription, BusError> {
        let filter = TopicFilter::new(topic_filter)?;
        Ok(self.subscribe_filter(filter))
    }
}
