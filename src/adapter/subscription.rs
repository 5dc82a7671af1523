//! Subscriptions against an established connection.

use crate::engine::{Completion, MqttEngine, RequestCallback, RequestKind};
use crate::error::MqttError;
use crate::options::{QoS, Subscription};

/// Issue a subscribe for `topic` on `handle`.
///
/// The immediate result only says whether the engine queued the request. A
/// failure reported later through `callback` is not retried here.
pub(crate) fn subscribe<E>(
    engine: &E,
    handle: Option<E::Handle>,
    topic: &str,
    qos: QoS,
    callback: &'static dyn RequestCallback<E::Handle>,
) -> Result<(), MqttError>
where
    E: MqttEngine,
{
    let Some(handle) = handle else {
        warn!("subscribe: no client handle");
        return Err(MqttError::InvalidArgument);
    };
    if topic.is_empty() {
        warn!("subscribe: empty topic");
        return Err(MqttError::InvalidArgument);
    }

    if !engine.is_connected(handle) {
        warn!("subscribe: client is not connected");
        return Err(MqttError::NotConnected);
    }

    match engine.subscribe(
        handle,
        topic,
        qos,
        Completion::new(callback, RequestKind::Subscribe, handle),
    ) {
        Ok(()) => {
            info!("subscribe: {} ({:?}) issued", topic, qos);
            Ok(())
        }
        Err(err) => {
            warn!("subscribe: engine rejected {}: {}", topic, engine.describe(err));
            Err(MqttError::EngineRejected(err))
        }
    }
}

/// A connected session, handed to
/// [`MqttHooks::on_connect_success`](crate::MqttHooks::on_connect_success).
pub struct Session<'a, E: MqttEngine> {
    engine: &'a E,
    handle: E::Handle,
    callback: &'static dyn RequestCallback<E::Handle>,
    default_subscription: Option<Subscription<'a>>,
}

impl<'a, E: MqttEngine> Session<'a, E> {
    pub(crate) fn new(
        engine: &'a E,
        handle: E::Handle,
        callback: &'static dyn RequestCallback<E::Handle>,
        default_subscription: Option<Subscription<'a>>,
    ) -> Self {
        Self {
            engine,
            handle,
            callback,
            default_subscription,
        }
    }

    pub fn handle(&self) -> E::Handle {
        self.handle
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_connected(self.handle)
    }

    pub fn subscribe(&self, topic: &str, qos: QoS) -> Result<(), MqttError> {
        subscribe(self.engine, Some(self.handle), topic, qos, self.callback)
    }

    /// Subscribe to the topic configured in
    /// [`MqttOptions::with_default_subscription`](crate::MqttOptions::with_default_subscription).
    /// Does nothing if none was configured.
    pub fn subscribe_default(&self) -> Result<(), MqttError> {
        match self.default_subscription {
            Some(sub) => self.subscribe(sub.topic, sub.qos),
            None => Ok(()),
        }
    }
}
