//! # Message Subscriber
//!
//! Defines the subscription side of the bus.

use crate::error::BusError;
use crate::topic::TopicFilter;
use async_trait::async_trait;
use shared_types::Message;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Trait for subscribing to messages from a broker.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Subscribe to messages whose topic matches `topic_filter`.
    async fn subscribe(&self, topic_filter: &str) -> Result<Subscription, BusError>;
}

/// Decrements the bus's subscription count when dropped.
struct SubscriptionGuard {
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    key: String,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        if let Some(count) = subs.get_mut(&self.key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subs.remove(&self.key);
            }
        }
        debug!(filter = %self.key, "Subscription dropped");
    }
}

/// A subscription handle for receiving messages.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    receiver: broadcast::Receiver<Message>,
    filter: TopicFilter,
    guard: SubscriptionGuard,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<Message>,
        filter: TopicFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            guard: SubscriptionGuard { subscriptions, key },
        }
    }

    fn accepts(filter: &TopicFilter, message: &Message) -> bool {
        message.topic().is_some_and(|topic| filter.matches(topic))
    }

    /// Receive the next message that matches the filter.
    ///
    /// Returns `None` once the bus is dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if Self::accepts(&self.filter, &message) {
                return Some(message);
            }
        }
    }

    /// Try to receive the next matching message without blocking.
    ///
    /// - `Ok(Some(message))` - a matching message was available
    /// - `Ok(None)` - nothing available right now
    /// - `Err(BusError::Closed)` - the bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<Message>, BusError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(BusError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if Self::accepts(&self.filter, &message) {
                return Ok(Some(message));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }

    /// Convert into a `Stream` of matching messages.
    #[must_use]
    pub fn into_stream(self) -> MessageStream {
        let Subscription {
            receiver,
            filter,
            guard,
        } = self;
        MessageStream {
            inner: BroadcastStream::new(receiver),
            filter,
            _guard: guard,
        }
    }
}

/// Stream of messages matching a subscription's filter.
pub struct MessageStream {
    inner: BroadcastStream<Message>,
    filter: TopicFilter,
    _guard: SubscriptionGuard,
}

impl MessageStream {
    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }
}

impl Stream for MessageStream {
    type Item = Message;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(message))) => {
                    if Subscription::accepts(&this.filter, &message) {
                        return Poll::Ready(Some(message));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, some messages dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
