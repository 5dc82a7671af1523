//! # Board-Level MQTT Adapter
//!
//! `myrtio-mqtt-bsp` is a `no_std` adapter that sits between firmware and the
//! MQTT client engine shipped with a network stack (for example the lwIP MQTT
//! app). The engine speaks in raw callbacks and delivers inbound payloads one
//! packet at a time; this crate turns that into something an application can
//! use directly.
//!
//! ## Core Features
//!
//! - **Reassembled messages:** inbound publishes arrive as a "begin"
//!   notification plus payload chunks. They are merged into one fixed-capacity
//!   `heapless` buffer and handed to the application whole. Messages longer
//!   than the buffer are delivered truncated.
//! - **Supervised connection:** one engine client handle per process, created
//!   on the first connect attempt, with success and failure hooks.
//! - **Serialized publishing:** any number of tasks may publish concurrently;
//!   an `embassy-sync` mutex makes sure only one of them is inside the
//!   engine's publish call at a time.
//! - **Default subscription:** on connect the adapter subscribes to a
//!   configured topic unless the application overrides the hook.
//! - **No reconnect policy of its own:** failures reach [`MqttHooks::on_error`]
//!   and the application decides what to do.
//!
//! ## Usage
//!
//! ```ignore
//! use myrtio_mqtt_bsp::{ConnectInfo, DefaultHooks, MqttAdapter, MqttOptions, QoS};
//!
//! static ADAPTER: StaticCell<MqttAdapter<LwipEngine, DefaultHooks, CriticalSectionRawMutex>> =
//!     StaticCell::new();
//!
//! let options = MqttOptions::ipv4(Ipv4Address::new(192, 168, 1, 10), ConnectInfo::new("board-01"))
//!     .with_default_subscription("board-01/cmd", QoS::AtMostOnce)
//!     .with_startup_publish("board-01/status", b"Hello mqtt server", QoS::AtLeastOnce);
//!
//! let adapter = ADAPTER.init(MqttAdapter::new(LwipEngine::new(), DefaultHooks, options));
//! adapter.init().await;
//! adapter.publish("board-01/telemetry", b"23.5", QoS::AtMostOnce, false).await?;
//! ```
//!
//! Builds that leave MQTT out can use [`StubBsp`] instead; both implement
//! [`MqttBsp`].
//!
//! ## Logging
//!
//! Enable one of the `log`, `defmt` or `esp32-log` features to get the
//! adapter's diagnostics. Without them logging compiles away.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every other module.
mod fmt;

pub mod adapter;
pub mod engine;
pub mod error;
pub mod options;

// Re-export key types for easier access at the crate root.
pub use adapter::{
    ConnectionState, DefaultHooks, MqttAdapter, MqttBsp, MqttHooks, Session, StubBsp,
};
pub use engine::{ConnectionStatus, MqttEngine};
pub use error::{EngineError, HookError, MqttError};
pub use options::{ConnectInfo, LastWill, MqttOptions, QoS};
