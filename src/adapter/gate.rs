//! Serialized publish issuance.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::once_lock::OnceLock;

use crate::engine::{Completion, MqttEngine, RequestCallback, RequestKind};
use crate::error::MqttError;
use crate::options::QoS;

/// Ensures at most one task is inside the engine's publish call at a time.
///
/// The mutex is created on the first publish that passes validation and then
/// lives as long as the gate. It is held only while the engine call runs, not
/// until the completion arrives, so several publishes may be in flight inside
/// the engine at once.
///
/// Acquisition waits without a timeout: a task stuck while holding the gate
/// stalls every publisher.
pub struct PublishGate<M: RawMutex> {
    lock: OnceLock<Mutex<M, ()>>,
}

impl<M: RawMutex> PublishGate<M> {
    pub fn new() -> Self {
        Self {
            lock: OnceLock::new(),
        }
    }

    /// Whether the publish mutex has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.lock.try_get().is_some()
    }

    /// Validate the request and hand it to the engine.
    ///
    /// Returns the engine's immediate result. `Ok` does not mean the message
    /// went out; the outcome is reported to `callback` later.
    #[allow(clippy::too_many_arguments)]
    pub async fn publish<E>(
        &self,
        engine: &E,
        handle: Option<E::Handle>,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
        callback: &'static dyn RequestCallback<E::Handle>,
    ) -> Result<(), MqttError>
    where
        E: MqttEngine,
    {
        let Some(handle) = handle else {
            warn!("publish: no client handle");
            return Err(MqttError::InvalidArgument);
        };
        if topic.is_empty() || payload.is_empty() {
            warn!("publish: empty topic or payload");
            return Err(MqttError::InvalidArgument);
        }

        if !engine.is_connected(handle) {
            warn!("publish: client is not connected");
            return Err(MqttError::NotConnected);
        }

        let lock = self.lock.get_or_init(|| {
            debug!("publish: creating publish mutex");
            Mutex::new(())
        });

        let result = {
            let _guard = lock.lock().await;
            engine.publish(
                handle,
                topic,
                payload,
                qos,
                retain,
                Completion::new(callback, RequestKind::Publish, handle),
            )
        };

        match result {
            Ok(()) => {
                debug!("publish: {} bytes to {} issued", payload.len(), topic);
                Ok(())
            }
            Err(err) => {
                warn!("publish: engine rejected publish: {}", engine.describe(err));
                Err(MqttError::EngineRejected(err))
            }
        }
    }
}

impl<M: RawMutex> Default for PublishGate<M> {
    fn default() -> Self {
        Self::new()
    }
}
