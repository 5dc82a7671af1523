//! # Error Types
//!
//! This module defines the error types surfaced by the adapter. Synchronous
//! failures are returned as [`MqttError`]; outcomes the engine reports later
//! through its completion callbacks reach the application as [`HookError`].

use core::fmt;

use crate::engine::ConnectionStatus;

/// The primary error enum returned by the adapter's synchronous entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MqttError {
    /// A required input was absent, empty or out of range. Never retried.
    InvalidArgument,
    /// The operation needs an established connection and the engine reports none.
    NotConnected,
    /// The engine could not allocate a client handle.
    ResourceExhaustion,
    /// The engine refused the request immediately. The enclosed code says why.
    EngineRejected(EngineError),
}

/// Allows the `?` operator on engine results inside adapter code.
impl From<EngineError> for MqttError {
    fn from(err: EngineError) -> Self {
        MqttError::EngineRejected(err)
    }
}

impl fmt::Display for MqttError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MqttError::InvalidArgument => f.write_str("invalid argument"),
            MqttError::NotConnected => f.write_str("not connected"),
            MqttError::ResourceExhaustion => f.write_str("out of resources"),
            MqttError::EngineRejected(code) => write!(f, "engine rejected request: {}", code),
        }
    }
}

/// Status codes reported by the underlying MQTT engine, either as the
/// immediate result of a call or through a completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Out of memory.
    OutOfMemory,
    /// Buffer error.
    Buffer,
    /// Timeout.
    Timeout,
    /// Routing problem.
    Routing,
    /// Operation in progress.
    InProgress,
    /// Illegal value.
    IllegalValue,
    /// Operation would block.
    WouldBlock,
    /// Address in use.
    AddressInUse,
    /// Already connecting.
    Already,
    /// Connection already established.
    IsConnected,
    /// Not connected.
    NotConnected,
    /// Low-level network interface error.
    Interface,
    /// Connection aborted.
    Aborted,
    /// Connection reset.
    Reset,
    /// Connection closed.
    Closed,
    /// Illegal argument.
    IllegalArgument,
    /// A code this crate does not know about.
    Other(i8),
}

impl From<i8> for EngineError {
    fn from(code: i8) -> Self {
        match code {
            -1 => Self::OutOfMemory,
            -2 => Self::Buffer,
            -3 => Self::Timeout,
            -4 => Self::Routing,
            -5 => Self::InProgress,
            -6 => Self::IllegalValue,
            -7 => Self::WouldBlock,
            -8 => Self::AddressInUse,
            -9 => Self::Already,
            -10 => Self::IsConnected,
            -11 => Self::NotConnected,
            -12 => Self::Interface,
            -13 => Self::Aborted,
            -14 => Self::Reset,
            -15 => Self::Closed,
            -16 => Self::IllegalArgument,
            _ => Self::Other(code),
        }
    }
}

impl EngineError {
    /// Converts an engine return code into a `Result`, treating `0` as success.
    pub fn check(code: i8) -> Result<(), EngineError> {
        if code == 0 { Ok(()) } else { Err(code.into()) }
    }

    /// Human readable description of the code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "Out of memory error.",
            Self::Buffer => "Buffer error.",
            Self::Timeout => "Timeout.",
            Self::Routing => "Routing problem.",
            Self::InProgress => "Operation in progress.",
            Self::IllegalValue => "Illegal value.",
            Self::WouldBlock => "Operation would block.",
            Self::AddressInUse => "Address in use.",
            Self::Already => "Already connecting.",
            Self::IsConnected => "Already connected.",
            Self::NotConnected => "Not connected.",
            Self::Interface => "Low-level netif error.",
            Self::Aborted => "Connection aborted.",
            Self::Reset => "Connection reset.",
            Self::Closed => "Connection closed.",
            Self::IllegalArgument => "Illegal argument.",
            Self::Other(_) => "Unknown error.",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures delivered to [`MqttHooks::on_error`](crate::MqttHooks::on_error).
///
/// These are the asynchronous outcomes a caller cannot observe from the
/// immediate return value of `connect()`, `publish()` or `subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HookError {
    /// The connection attempt ended in a status other than accepted.
    ConnectionRefused(ConnectionStatus),
    /// The engine reported a failed publish after issuance.
    PublishFailed(EngineError),
    /// The engine reported a failed subscribe after issuance.
    SubscribeFailed(EngineError),
}
