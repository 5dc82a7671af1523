//! Application override points.

use crate::engine::MqttEngine;
use crate::error::HookError;

use super::subscription::Session;

/// Hooks the adapter calls at defined events. Every method has a default, so
/// an application overrides only what it needs.
///
/// All hooks run on the engine's callback context. They must not block.
///
/// # Example
///
/// ```ignore
/// struct Board;
///
/// impl<E: MqttEngine> MqttHooks<E> for Board {
///     fn on_message(&self, topic: &str, payload: &[u8]) {
///         if topic == "board/led" {
///             LED_ON.store(payload == b"ON", Ordering::Relaxed);
///         }
///     }
///
///     fn on_error(&self, _handle: E::Handle, _cause: HookError) {
///         RECONNECT.signal(());
///     }
/// }
/// ```
pub trait MqttHooks<E: MqttEngine> {
    /// A complete (possibly truncated) inbound message. Logs it by default.
    fn on_message(&self, topic: &str, payload: &[u8]) {
        match core::str::from_utf8(payload) {
            Ok(text) => info!("mqtt: {} = {}", topic, text),
            Err(_) => info!("mqtt: {} ({} bytes)", topic, payload.len()),
        }
    }

    /// The broker accepted the connection. Subscribes to the configured
    /// default topic by default.
    fn on_connect_success(&self, session: &Session<'_, E>) {
        if let Err(err) = session.subscribe_default() {
            warn!("mqtt: default subscription failed: {}", err);
        }
    }

    /// An asynchronous failure: refused connection or a failed publish or
    /// subscribe completion. Does nothing by default; the adapter never
    /// retries on its own.
    fn on_error(&self, _handle: E::Handle, _cause: HookError) {}
}

/// Hooks that keep every default behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl<E: MqttEngine> MqttHooks<E> for DefaultHooks {}
