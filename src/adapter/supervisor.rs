//! Connection setup and the connection state machine.

use core::cell::Cell;

use embassy_net::IpAddress;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::engine::{ConnectionCallback, ConnectionStatus, InboundCallback, MqttEngine};
use crate::error::MqttError;
use crate::options::ConnectInfo;

/// Connection state as observed by the adapter.
///
/// `Connected` is only left when the engine reports a new status; there is no
/// automatic reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(ConnectionStatus),
}

/// What the adapter has to do after a connection status was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusOutcome {
    /// The status did not belong to our handle.
    Ignored,
    /// Inbound callbacks are registered, the success hook should run.
    Connected,
    /// The error hook should run.
    Refused,
}

/// Owns the single engine client handle and tracks the connection state.
///
/// The handle is created on the first connect attempt and kept for the life
/// of the adapter. It is never recreated.
pub struct ConnectionSupervisor<H, M: RawMutex> {
    handle: Mutex<M, Cell<Option<H>>>,
    state: Mutex<M, Cell<ConnectionState>>,
}

impl<H: Copy + PartialEq, M: RawMutex> ConnectionSupervisor<H, M> {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(Cell::new(None)),
            state: Mutex::new(Cell::new(ConnectionState::Disconnected)),
        }
    }

    /// The client handle, once one has been created.
    pub fn handle(&self) -> Option<H> {
        self.handle.lock(Cell::get)
    }

    pub fn state(&self) -> ConnectionState {
        self.state.lock(Cell::get)
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.lock(|cell| cell.set(state));
    }

    fn ensure_handle<E>(&self, engine: &E) -> Result<H, MqttError>
    where
        E: MqttEngine<Handle = H>,
    {
        self.handle.lock(|cell| {
            if let Some(handle) = cell.get() {
                return Ok(handle);
            }
            match engine.client_new() {
                Some(handle) => {
                    debug!("supervisor: client handle created");
                    cell.set(Some(handle));
                    Ok(handle)
                }
                None => {
                    error!("supervisor: client handle allocation failed");
                    Err(MqttError::ResourceExhaustion)
                }
            }
        })
    }

    /// Start connecting to `broker:port`.
    ///
    /// `callback` is what the engine invokes with the final outcome; it must
    /// outlive the connection, hence `'static`. An `Ok` return only means the
    /// engine accepted the request.
    ///
    /// When the engine rejects the request immediately the previous state is
    /// restored: a rejection such as "already connected" says nothing about
    /// the session that is already live or being set up.
    pub fn connect<E>(
        &self,
        engine: &E,
        broker: IpAddress,
        port: u16,
        info: &ConnectInfo<'_>,
        callback: &'static dyn ConnectionCallback<H>,
    ) -> Result<(), MqttError>
    where
        E: MqttEngine<Handle = H>,
    {
        info!("supervisor: connecting to {}:{} as {}", broker, port, info.client_id);

        let handle = self.ensure_handle(engine)?;
        let previous = self.state.lock(|cell| cell.replace(ConnectionState::Connecting));

        match engine.connect(handle, broker, port, info, callback) {
            Ok(()) => {
                debug!("supervisor: connect issued, waiting for broker");
                Ok(())
            }
            Err(err) => {
                warn!("supervisor: connect rejected: {}", engine.describe(err));
                self.set_state(previous);
                Err(MqttError::EngineRejected(err))
            }
        }
    }

    /// Process a status reported by the engine's connection callback.
    ///
    /// On acceptance the inbound callbacks are registered for `handle` before
    /// returning, so no publish can arrive unhandled once the hooks run.
    pub(crate) fn on_connection_status<E>(
        &self,
        engine: &E,
        handle: H,
        status: ConnectionStatus,
        inbound: &'static dyn InboundCallback,
    ) -> StatusOutcome
    where
        E: MqttEngine<Handle = H>,
    {
        if self.handle() != Some(handle) {
            warn!("supervisor: status for an unknown client handle, ignoring");
            return StatusOutcome::Ignored;
        }

        if status.is_accepted() {
            info!("supervisor: connected");
            self.set_state(ConnectionState::Connected);
            engine.set_inbound_callback(handle, inbound);
            StatusOutcome::Connected
        } else {
            warn!("supervisor: connection failed, status = {:?}", status);
            self.set_state(ConnectionState::Failed(status));
            StatusOutcome::Refused
        }
    }
}

impl<H: Copy + PartialEq, M: RawMutex> Default for ConnectionSupervisor<H, M> {
    fn default() -> Self {
        Self::new()
    }
}
