//! Board support entry points shared by the full adapter and the stub used
//! when MQTT is disabled in a firmware build.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::engine::MqttEngine;
use crate::error::MqttError;
use crate::options::QoS;

use super::{MqttAdapter, MqttHooks};

/// What the rest of the firmware sees of the MQTT board support.
///
/// Application code written against this trait runs unchanged whether the
/// image links the full [`MqttAdapter`] or the [`StubBsp`].
#[allow(async_fn_in_trait)]
pub trait MqttBsp {
    /// Bring the MQTT side of the board up.
    async fn init(&'static self);

    /// Publish from any task. See [`MqttAdapter::publish`].
    async fn publish(
        &'static self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), MqttError>;
}

impl<E, H, M, const BUF_SIZE: usize> MqttBsp for MqttAdapter<E, H, M, BUF_SIZE>
where
    E: MqttEngine + 'static,
    H: MqttHooks<E> + 'static,
    M: RawMutex + 'static,
{
    async fn init(&'static self) {
        MqttAdapter::init(self).await
    }

    async fn publish(
        &'static self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), MqttError> {
        MqttAdapter::publish(self, topic, payload, qos, retain).await
    }
}

/// Stand-in for builds without MQTT: logs on init and never connects.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubBsp;

impl MqttBsp for StubBsp {
    async fn init(&'static self) {
        info!("mqtt: init (disabled)");
    }

    async fn publish(
        &'static self,
        topic: &str,
        _payload: &[u8],
        _qos: QoS,
        _retain: bool,
    ) -> Result<(), MqttError> {
        debug!("mqtt: dropping publish to {}, MQTT is disabled", topic);
        Err(MqttError::NotConnected)
    }
}
