//! # MQTT Engine Abstraction
//!
//! This module defines the `MqttEngine` trait, which abstracts the network
//! stack's MQTT client. The engine owns packet encoding, keep-alive and QoS
//! retransmission; the adapter only drives it and reacts to its callbacks.
//!
//! The engine reports outcomes through callback objects handed to it by the
//! adapter. Those objects are always `'static` references, because the engine
//! keeps them for as long as the connection lives.

use embassy_net::IpAddress;

use crate::error::EngineError;
use crate::options::{ConnectInfo, QoS};

/// Connection statuses the engine hands to [`ConnectionCallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionStatus {
    /// The broker accepted the connection.
    Accepted,
    /// The broker does not support the requested protocol version.
    RefusedProtocolVersion,
    /// The client identifier was rejected.
    RefusedIdentifier,
    /// The broker is unavailable.
    RefusedServer,
    /// Bad user name or password.
    RefusedUsernamePassword,
    /// The client is not authorized to connect.
    RefusedNotAuthorized,
    /// The transport was closed.
    Disconnected,
    /// The broker did not answer in time.
    Timeout,
    /// A status this crate does not know about.
    Other(u16),
}

impl From<u16> for ConnectionStatus {
    fn from(val: u16) -> Self {
        match val {
            0 => Self::Accepted,
            1 => Self::RefusedProtocolVersion,
            2 => Self::RefusedIdentifier,
            3 => Self::RefusedServer,
            4 => Self::RefusedUsernamePassword,
            5 => Self::RefusedNotAuthorized,
            256 => Self::Disconnected,
            257 => Self::Timeout,
            _ => Self::Other(val),
        }
    }
}

impl ConnectionStatus {
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Which engine request a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind {
    Publish,
    Subscribe,
}

/// Receives the outcome of a connection attempt.
pub trait ConnectionCallback<H> {
    fn on_connection_status(&'static self, handle: H, status: ConnectionStatus);
}

/// Receives inbound publishes, one "begin" followed by one or more chunks.
pub trait InboundCallback {
    /// A new publish is arriving on `topic` with `total_len` payload bytes.
    fn on_publish_begin(&'static self, topic: &str, total_len: u32);

    /// A piece of the payload. `last` marks the final chunk of the message.
    fn on_publish_data(&'static self, data: &[u8], last: bool);
}

/// Receives the asynchronous outcome of a publish or subscribe request.
pub trait RequestCallback<H> {
    fn on_request_complete(&'static self, kind: RequestKind, handle: H, result: Result<(), EngineError>);
}

/// The completion context handed to the engine with a publish or subscribe.
///
/// The engine keeps it until the request finishes and then calls
/// [`Completion::complete`]. It carries the client handle so the callback
/// knows which session the result belongs to.
pub struct Completion<H: 'static> {
    callback: &'static dyn RequestCallback<H>,
    kind: RequestKind,
    handle: H,
}

impl<H: Copy + 'static> Completion<H> {
    pub fn new(callback: &'static dyn RequestCallback<H>, kind: RequestKind, handle: H) -> Self {
        Self {
            callback,
            kind,
            handle,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn handle(&self) -> H {
        self.handle
    }

    /// Report the final outcome of the request.
    pub fn complete(self, result: Result<(), EngineError>) {
        self.callback
            .on_request_complete(self.kind, self.handle, result)
    }
}

/// The operations the adapter consumes from the network stack's MQTT client.
///
/// Implementations are expected to invoke every callback on a single,
/// serialized execution context (typically the network stack task).
pub trait MqttEngine {
    /// Identifies one client session inside the engine.
    type Handle: Copy + PartialEq + core::fmt::Debug + 'static;

    /// Allocate a new client. Returns `None` when the engine is out of memory.
    fn client_new(&self) -> Option<Self::Handle>;

    /// Start connecting `handle` to the broker.
    ///
    /// `Ok` only means the attempt was started; the outcome arrives later via
    /// `callback`.
    fn connect(
        &self,
        handle: Self::Handle,
        broker: IpAddress,
        port: u16,
        info: &ConnectInfo<'_>,
        callback: &'static dyn ConnectionCallback<Self::Handle>,
    ) -> Result<(), EngineError>;

    /// Whether the engine currently considers `handle` connected.
    fn is_connected(&self, handle: Self::Handle) -> bool;

    /// Route inbound publishes for `handle` to `callback`.
    fn set_inbound_callback(&self, handle: Self::Handle, callback: &'static dyn InboundCallback);

    /// Queue a publish. The final outcome is reported through `completion`.
    fn publish(
        &self,
        handle: Self::Handle,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
        completion: Completion<Self::Handle>,
    ) -> Result<(), EngineError>;

    /// Queue a subscribe. The final outcome is reported through `completion`.
    fn subscribe(
        &self,
        handle: Self::Handle,
        topic: &str,
        qos: QoS,
        completion: Completion<Self::Handle>,
    ) -> Result<(), EngineError>;

    /// Describe an engine status code. Engines with their own tables override this.
    fn describe(&self, err: EngineError) -> &'static str {
        err.as_str()
    }
}
