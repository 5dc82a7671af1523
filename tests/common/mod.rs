#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use embassy_net::{IpAddress, Ipv4Address};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use myrtio_mqtt_bsp::engine::{
    Completion, ConnectionCallback, ConnectionStatus, InboundCallback, MqttEngine,
};
use myrtio_mqtt_bsp::{
    ConnectInfo, DefaultHooks, EngineError, HookError, MqttAdapter, MqttHooks, MqttOptions, QoS,
    Session,
};

pub const BROKER: IpAddress = IpAddress::Ipv4(Ipv4Address::new(127, 0, 0, 1));
pub const PORT: u16 = 18830;
pub const CMD_TOPIC: &str = "/board/test/cmd";
pub const STATUS_TOPIC: &str = "/board/test/status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCall {
    pub broker: IpAddress,
    pub port: u16,
    pub client_id: String,
    pub keep_alive: u16,
    pub will_topic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

/// Knobs and recorded calls of the mock engine.
#[derive(Debug, Default)]
pub struct MockState {
    pub fail_client_new: bool,
    pub clients_created: u32,
    pub connected: bool,
    pub connect_marks_connected: bool,
    pub connect_error: Option<EngineError>,
    pub publish_error: Option<EngineError>,
    pub subscribe_error: Option<EngineError>,
    /// Outcome reported through the completion right after a request is queued.
    pub publish_completion: Option<Result<(), EngineError>>,
    pub subscribe_completion: Option<Result<(), EngineError>>,
    pub connects: Vec<ConnectCall>,
    pub inbound_registered: Vec<MockHandle>,
    pub publishes: Vec<PublishCall>,
    pub subscribes: Vec<(String, QoS)>,
}

/// An engine that records every call instead of talking to a broker.
///
/// Publish issuance is instrumented: entering `publish` while another call
/// is still inside it sets `overlapped`.
#[derive(Debug, Default)]
pub struct MockEngine {
    pub state: Mutex<MockState>,
    issuing: AtomicBool,
    pub overlapped: AtomicBool,
    pub issue_delay: Duration,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(configure: impl FnOnce(&mut MockState)) -> Self {
        let engine = Self::new();
        configure(&mut engine.state.lock().unwrap());
        engine
    }

    pub fn with_issue_delay(mut self, delay: Duration) -> Self {
        self.issue_delay = delay;
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().unwrap().connected = connected;
    }

    pub fn publishes(&self) -> Vec<PublishCall> {
        self.state.lock().unwrap().publishes.clone()
    }

    pub fn subscribes(&self) -> Vec<(String, QoS)> {
        self.state.lock().unwrap().subscribes.clone()
    }
}

impl MqttEngine for MockEngine {
    type Handle = MockHandle;

    fn client_new(&self) -> Option<Self::Handle> {
        let mut state = self.state.lock().unwrap();
        if state.fail_client_new {
            return None;
        }
        state.clients_created += 1;
        Some(MockHandle(state.clients_created))
    }

    fn connect(
        &self,
        _handle: Self::Handle,
        broker: IpAddress,
        port: u16,
        info: &ConnectInfo<'_>,
        _callback: &'static dyn ConnectionCallback<Self::Handle>,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.connects.push(ConnectCall {
            broker,
            port,
            client_id: info.client_id.to_string(),
            keep_alive: info.keep_alive,
            will_topic: info.will.map(|w| w.topic.to_string()),
        });
        if let Some(err) = state.connect_error {
            return Err(err);
        }
        if state.connect_marks_connected {
            state.connected = true;
        }
        Ok(())
    }

    fn is_connected(&self, _handle: Self::Handle) -> bool {
        self.state.lock().unwrap().connected
    }

    fn set_inbound_callback(&self, handle: Self::Handle, _callback: &'static dyn InboundCallback) {
        self.state.lock().unwrap().inbound_registered.push(handle);
    }

    fn publish(
        &self,
        _handle: Self::Handle,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
        completion: Completion<Self::Handle>,
    ) -> Result<(), EngineError> {
        if self.issuing.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        if !self.issue_delay.is_zero() {
            std::thread::sleep(self.issue_delay);
        }

        let (result, outcome) = {
            let mut state = self.state.lock().unwrap();
            state.publishes.push(PublishCall {
                topic: topic.to_string(),
                payload: payload.to_vec(),
                qos,
                retain,
            });
            match state.publish_error {
                Some(err) => (Err(err), None),
                None => (Ok(()), state.publish_completion),
            }
        };

        self.issuing.store(false, Ordering::SeqCst);

        if let Some(outcome) = outcome {
            completion.complete(outcome);
        }
        result
    }

    fn subscribe(
        &self,
        _handle: Self::Handle,
        topic: &str,
        qos: QoS,
        completion: Completion<Self::Handle>,
    ) -> Result<(), EngineError> {
        let (result, outcome) = {
            let mut state = self.state.lock().unwrap();
            state.subscribes.push((topic.to_string(), qos));
            match state.subscribe_error {
                Some(err) => (Err(err), None),
                None => (Ok(()), state.subscribe_completion),
            }
        };
        if let Some(outcome) = outcome {
            completion.complete(outcome);
        }
        result
    }
}

/// Hooks that record what the adapter reported and keep the default
/// subscription behavior.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub messages: Mutex<Vec<(String, Vec<u8>)>>,
    pub errors: Mutex<Vec<(MockHandle, HookError)>>,
    pub connects: AtomicUsize,
}

impl RecordingHooks {
    pub fn messages(&self) -> Vec<(String, Vec<u8>)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<(MockHandle, HookError)> {
        self.errors.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl MqttHooks<MockEngine> for RecordingHooks {
    fn on_message(&self, topic: &str, payload: &[u8]) {
        self.messages
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_vec()));
    }

    fn on_connect_success(&self, session: &Session<'_, MockEngine>) {
        self.connects.fetch_add(1, Ordering::SeqCst);
        MqttHooks::<MockEngine>::on_connect_success(&DefaultHooks, session);
    }

    fn on_error(&self, handle: MockHandle, cause: HookError) {
        self.errors.lock().unwrap().push((handle, cause));
    }
}

pub type TestAdapter<const N: usize = 1024> =
    MqttAdapter<MockEngine, RecordingHooks, CriticalSectionRawMutex, N>;

/// Adapter that keeps every library default hook.
pub type PlainAdapter = MqttAdapter<MockEngine, DefaultHooks, CriticalSectionRawMutex>;

pub fn plain_adapter(engine: MockEngine) -> &'static PlainAdapter {
    Box::leak(Box::new(MqttAdapter::new(engine, DefaultHooks, options())))
}

pub fn options() -> MqttOptions<'static> {
    MqttOptions::new(BROKER, PORT, ConnectInfo::new("board-test"))
        .with_default_subscription(CMD_TOPIC, QoS::AtMostOnce)
}

pub fn adapter_with<const N: usize>(
    engine: MockEngine,
    options: MqttOptions<'static>,
) -> &'static TestAdapter<N> {
    Box::leak(Box::new(MqttAdapter::new(
        engine,
        RecordingHooks::default(),
        options,
    )))
}

pub fn adapter(engine: MockEngine) -> &'static TestAdapter {
    adapter_with(engine, options())
}

/// Connect and let the broker accept, the way the engine would.
pub fn connect_accepted<const N: usize>(adapter: &'static TestAdapter<N>) -> MockHandle {
    adapter.connect().expect("connect issued");
    adapter.engine().set_connected(true);
    let handle = adapter.handle().expect("handle created");
    adapter.on_connection_status(handle, ConnectionStatus::Accepted);
    handle
}
