//! MQTT Adapter Module
//!
//! Wraps a callback-driven [`MqttEngine`] into an application interface.
//!
//! # Overview
//!
//! [`MqttAdapter`] is the process-wide state container. It owns:
//! - the single engine client handle and the connection state
//!   ([`ConnectionSupervisor`]),
//! - the receive buffer that turns chunked inbound data into whole messages
//!   ([`ReceiveReassembler`]),
//! - the mutex that serializes publish issuance from concurrent tasks
//!   ([`PublishGate`]),
//! - the application's [`MqttHooks`].
//!
//! # Static Lifetime
//!
//! The engine keeps the callback objects it is given for as long as the
//! connection lives, so the adapter itself is handed over as that callback.
//! Operations that talk to the engine therefore take `&'static self`. On
//! embedded targets store the adapter in a `StaticCell`:
//!
//! ```ignore
//! static ADAPTER: StaticCell<MqttAdapter<LwipEngine, Board, CriticalSectionRawMutex>> = StaticCell::new();
//!
//! let adapter = ADAPTER.init(MqttAdapter::new(engine, Board, options));
//! adapter.init().await;
//! ```
//!
//! Engine glue forwards its C-style callbacks into the [`ConnectionCallback`],
//! [`InboundCallback`] and [`RequestCallback`] implementations of the adapter.

pub(crate) mod bsp;
pub(crate) mod gate;
pub(crate) mod hooks;
pub(crate) mod reassembler;
pub(crate) mod subscription;
pub(crate) mod supervisor;

pub use bsp::{MqttBsp, StubBsp};
pub use gate::PublishGate;
pub use hooks::{DefaultHooks, MqttHooks};
pub use reassembler::{DEFAULT_RECV_BUF_SIZE, MAX_TOPIC_LEN, ReceiveReassembler};
pub use subscription::Session;
pub use supervisor::{ConnectionState, ConnectionSupervisor};

use embassy_net::IpAddress;
use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_time::Timer;

use crate::engine::{
    ConnectionCallback, ConnectionStatus, InboundCallback, MqttEngine, RequestCallback,
    RequestKind,
};
use crate::error::{EngineError, HookError, MqttError};
use crate::options::{ConnectInfo, MqttOptions, QoS};
use supervisor::StatusOutcome;

/// The full board-level adapter.
///
/// # Type Parameters
///
/// - `E`: the network stack's MQTT engine
/// - `H`: application hooks
/// - `M`: raw mutex kind guarding the adapter state
/// - `BUF_SIZE`: receive buffer capacity; longer messages are truncated
pub struct MqttAdapter<
    E,
    H = DefaultHooks,
    M = NoopRawMutex,
    const BUF_SIZE: usize = DEFAULT_RECV_BUF_SIZE,
> where
    E: MqttEngine,
    H: MqttHooks<E>,
    M: RawMutex,
{
    engine: E,
    hooks: H,
    options: MqttOptions<'static>,
    supervisor: ConnectionSupervisor<E::Handle, M>,
    reassembler: ReceiveReassembler<M, BUF_SIZE>,
    gate: PublishGate<M>,
}

impl<E, H, M, const BUF_SIZE: usize> MqttAdapter<E, H, M, BUF_SIZE>
where
    E: MqttEngine + 'static,
    H: MqttHooks<E> + 'static,
    M: RawMutex + 'static,
{
    pub fn new(engine: E, hooks: H, options: MqttOptions<'static>) -> Self {
        Self {
            engine,
            hooks,
            options,
            supervisor: ConnectionSupervisor::new(),
            reassembler: ReceiveReassembler::new(),
            gate: PublishGate::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn options(&self) -> &MqttOptions<'static> {
        &self.options
    }

    pub fn state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    /// The engine client handle, once the first connect attempt created it.
    pub fn handle(&self) -> Option<E::Handle> {
        self.supervisor.handle()
    }

    pub fn reassembler(&self) -> &ReceiveReassembler<M, BUF_SIZE> {
        &self.reassembler
    }

    pub fn publish_gate(&self) -> &PublishGate<M> {
        &self.gate
    }

    /// Connect to the broker configured in the options.
    pub fn connect(&'static self) -> Result<(), MqttError> {
        let options = &self.options;
        self.connect_to(options.broker, options.port, &options.connect)
    }

    /// Connect to `broker:port` with `identity`.
    ///
    /// Returns the engine's immediate result. The outcome of the attempt
    /// reaches the hooks later through the connection callback.
    pub fn connect_to(
        &'static self,
        broker: IpAddress,
        port: u16,
        identity: &ConnectInfo<'_>,
    ) -> Result<(), MqttError> {
        self.supervisor
            .connect(&self.engine, broker, port, identity, self)
    }

    /// Publish `payload` to `topic`. Callable from any task.
    ///
    /// Waits, without a timeout, until no other task is issuing a publish.
    /// `Ok` means the engine queued the message; a later failure is reported
    /// to [`MqttHooks::on_error`].
    pub async fn publish(
        &'static self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), MqttError> {
        self.gate
            .publish(
                &self.engine,
                self.supervisor.handle(),
                topic,
                payload,
                qos,
                retain,
                self,
            )
            .await
    }

    /// Subscribe to `topic`. A failed completion goes to [`MqttHooks::on_error`].
    pub fn subscribe(&'static self, topic: &str, qos: QoS) -> Result<(), MqttError> {
        subscription::subscribe(&self.engine, self.supervisor.handle(), topic, qos, self)
    }

    /// Connect, then send the configured startup message a fixed number of
    /// times with a fixed delay in between.
    ///
    /// Publishes issued before the broker has accepted the connection fail
    /// with [`MqttError::NotConnected`]; that is logged and the loop goes on.
    pub async fn init(&'static self) {
        info!("mqtt: init");

        if let Err(err) = self.connect() {
            warn!("mqtt: connect failed: {}", err);
        }

        let Some(startup) = self.options.startup else {
            return;
        };

        for _ in 0..startup.count {
            if let Err(err) = self
                .publish(startup.topic, startup.payload, startup.qos, startup.retain)
                .await
            {
                warn!("mqtt: startup publish failed: {}", err);
            }
            Timer::after(startup.interval).await;
        }
    }
}

impl<E, H, M, const BUF_SIZE: usize> ConnectionCallback<E::Handle> for MqttAdapter<E, H, M, BUF_SIZE>
where
    E: MqttEngine + 'static,
    H: MqttHooks<E> + 'static,
    M: RawMutex + 'static,
{
    fn on_connection_status(&'static self, handle: E::Handle, status: ConnectionStatus) {
        match self
            .supervisor
            .on_connection_status(&self.engine, handle, status, self)
        {
            StatusOutcome::Connected => {
                let session = Session::new(
                    &self.engine,
                    handle,
                    self,
                    self.options.default_subscription,
                );
                self.hooks.on_connect_success(&session);
            }
            StatusOutcome::Refused => {
                self.hooks
                    .on_error(handle, HookError::ConnectionRefused(status));
            }
            StatusOutcome::Ignored => {}
        }
    }
}

impl<E, H, M, const BUF_SIZE: usize> InboundCallback for MqttAdapter<E, H, M, BUF_SIZE>
where
    E: MqttEngine + 'static,
    H: MqttHooks<E> + 'static,
    M: RawMutex + 'static,
{
    fn on_publish_begin(&'static self, topic: &str, total_len: u32) {
        self.reassembler.on_begin_message(topic, total_len);
    }

    fn on_publish_data(&'static self, data: &[u8], last: bool) {
        self.reassembler
            .on_data_chunk(data, last, |topic, payload| {
                self.hooks.on_message(topic, payload)
            });
    }
}

impl<E, H, M, const BUF_SIZE: usize> RequestCallback<E::Handle> for MqttAdapter<E, H, M, BUF_SIZE>
where
    E: MqttEngine + 'static,
    H: MqttHooks<E> + 'static,
    M: RawMutex + 'static,
{
    fn on_request_complete(
        &'static self,
        kind: RequestKind,
        handle: E::Handle,
        result: Result<(), EngineError>,
    ) {
        match result {
            Ok(()) => debug!("mqtt: {:?} complete", kind),
            Err(err) => {
                warn!("mqtt: {:?} failed: {}", kind, self.engine.describe(err));
                let cause = match kind {
                    RequestKind::Publish => HookError::PublishFailed(err),
                    RequestKind::Subscribe => HookError::SubscribeFailed(err),
                };
                self.hooks.on_error(handle, cause);
            }
        }
    }
}
