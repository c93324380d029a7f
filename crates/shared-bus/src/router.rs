//! # Message Router
//!
//! Binds `subscribe topic + subscriber`, a handler function and
//! `publish topic + publisher` under a route name, then runs every route as
//! its own task.
//!
//! Within a route, messages are handled sequentially in arrival order.
//! Distinct routes run concurrently. Handler errors are logged and the
//! message is dropped; there are no retries at this layer.

use std::collections::HashSet;
use std::sync::Arc;

use shared_types::{HandlerError, Message};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::error::RouterError;
use crate::publisher::Publisher;
use crate::subscriber::Subscriber;

/// Publish topic meaning "use each outgoing message's own `topic` metadata".
pub const TOPIC_EMPTY: &str = "";

/// A route's handling function.
pub type HandlerFunc = Arc<dyn Fn(&Message) -> Result<Vec<Message>, HandlerError> + Send + Sync>;

struct Route {
    name: String,
    subscribe_topic: String,
    subscriber: Arc<dyn Subscriber>,
    publish_topic: String,
    publisher: Arc<dyn Publisher>,
    handler: HandlerFunc,
}

/// Read-only view of a registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub name: String,
    pub subscribe_topic: String,
    pub publish_topic: String,
}

/// Route registry. Routes are added before [`Router::run`] and never after.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    names: HashSet<String>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// Fails only when `name` is already taken.
    pub fn add_handler<F>(
        &mut self,
        name: impl Into<String>,
        subscribe_topic: impl Into<String>,
        subscriber: Arc<dyn Subscriber>,
        publish_topic: impl Into<String>,
        publisher: Arc<dyn Publisher>,
        handler: F,
    ) -> Result<(), RouterError>
    where
        F: Fn(&Message) -> Result<Vec<Message>, HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(RouterError::DuplicateHandler(name));
        }

        let route = Route {
            name,
            subscribe_topic: subscribe_topic.into(),
            subscriber,
            publish_topic: publish_topic.into(),
            publisher,
            handler: Arc::new(handler),
        };
        debug!(
            route = %route.name,
            subscribe_topic = %route.subscribe_topic,
            publish_topic = %route.publish_topic,
            "Route registered"
        );
        self.routes.push(route);
        Ok(())
    }

    /// Registered routes in registration order.
    #[must_use]
    pub fn handlers(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|r| RouteInfo {
                name: r.name.clone(),
                subscribe_topic: r.subscribe_topic.clone(),
                publish_topic: r.publish_topic.clone(),
            })
            .collect()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Invoke a route's handler function directly, without any transport.
    pub fn dispatch(&self, name: &str, message: &Message) -> Result<Vec<Message>, RouterError> {
        let route = self
            .routes
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RouterError::UnknownHandler(name.to_string()))?;
        Ok((route.handler)(message)?)
    }

    /// Subscribe every route and start one task per route.
    ///
    /// All subscriptions are in place when this returns.
    pub async fn run(self) -> Result<RunningRouter, RouterError> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(self.routes.len());

        for route in self.routes {
            let subscription = route
                .subscriber
                .subscribe(&route.subscribe_topic)
                .await
                .map_err(|source| RouterError::Subscribe {
                    route: route.name.clone(),
                    source,
                })?;

            info!(
                route = %route.name,
                subscribe_topic = %route.subscribe_topic,
                "Route started"
            );

            let mut stream = subscription.into_stream();
            let mut shutdown = shutdown_rx.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        next = stream.next() => match next {
                            Some(message) => process(&route, message).await,
                            None => {
                                warn!(route = %route.name, "Subscription ended, stopping route");
                                break;
                            }
                        },
                    }
                }
                debug!(route = %route.name, "Route stopped");
            }));
        }

        Ok(RunningRouter {
            shutdown: shutdown_tx,
            tasks,
        })
    }
}

async fn process(route: &Route, message: Message) {
    let outgoing = match (route.handler)(&message) {
        Ok(outgoing) => outgoing,
        Err(e) => {
            warn!(route = %route.name, uuid = %message.uuid, error = %e, "Handler rejected message");
            return;
        }
    };

    if !route.publish_topic.is_empty() {
        if let Err(e) = route.publisher.publish(&route.publish_topic, outgoing).await {
            error!(route = %route.name, topic = %route.publish_topic, error = %e, "Publish failed");
        }
        return;
    }

    for out in outgoing {
        let Some(topic) = out.topic().map(str::to_string) else {
            warn!(route = %route.name, uuid = %out.uuid, "Outgoing message has no topic, dropped");
            continue;
        };
        if let Err(e) = route.publisher.publish(&topic, vec![out]).await {
            error!(route = %route.name, topic = %topic, error = %e, "Publish failed");
        }
    }
}

/// Handle to a running router.
pub struct RunningRouter {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningRouter {
    /// Number of running route tasks.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.tasks.len()
    }

    /// Stop every route and wait for its task to finish.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Route task panicked");
            }
        }
        info!("Router closed");
    }
}
