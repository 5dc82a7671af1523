mod common;

use embassy_futures::block_on;
use embassy_time::Duration;
use myrtio_mqtt_bsp::{MqttBsp, MqttError, MqttOptions, QoS, StubBsp};

use common::{MockEngine, STATUS_TOPIC, TestAdapter, adapter_with, options};

fn startup_options(count: usize) -> MqttOptions<'static> {
    options()
        .with_startup_publish(STATUS_TOPIC, b"Hello mqtt server", QoS::AtLeastOnce)
        .with_startup_schedule(count, Duration::from_millis(1))
}

/// Firmware code written only against the board support trait.
async fn bring_up<B: MqttBsp>(bsp: &'static B) -> Result<(), MqttError> {
    bsp.init().await;
    bsp.publish(STATUS_TOPIC, b"online", QoS::AtMostOnce, false).await
}

#[test]
fn test_init_connects_then_publishes_startup_message() {
    let adapter: &'static TestAdapter = adapter_with(
        MockEngine::with(|s| s.connect_marks_connected = true),
        startup_options(3),
    );

    block_on(adapter.init());

    let engine = adapter.engine();
    assert_eq!(engine.state.lock().unwrap().connects.len(), 1);
    let publishes = engine.publishes();
    assert_eq!(publishes.len(), 3);
    assert!(publishes.iter().all(|p| p.topic == STATUS_TOPIC
        && p.payload == b"Hello mqtt server"
        && p.qos == QoS::AtLeastOnce
        && !p.retain));
}

#[test]
fn test_init_keeps_going_when_not_yet_connected() {
    let adapter: &'static TestAdapter = adapter_with(MockEngine::new(), startup_options(2));

    block_on(adapter.init());

    assert_eq!(adapter.engine().state.lock().unwrap().connects.len(), 1);
    assert!(adapter.engine().publishes().is_empty());
    assert!(!adapter.publish_gate().is_initialized());
}

#[test]
fn test_default_startup_schedule() {
    let opts = options().with_startup_publish(STATUS_TOPIC, b"hi", QoS::AtMostOnce);
    let startup = opts.startup.unwrap();
    assert_eq!(startup.count, MqttOptions::STARTUP_COUNT);
    assert_eq!(startup.interval, Duration::from_secs(1));
}

#[test]
fn test_full_adapter_through_bsp_trait() {
    let adapter: &'static TestAdapter = adapter_with(
        MockEngine::with(|s| s.connect_marks_connected = true),
        startup_options(0),
    );

    assert_eq!(block_on(bring_up(adapter)), Ok(()));
    assert_eq!(adapter.engine().publishes().len(), 1);
}

#[test]
fn test_stub_logs_and_never_publishes() {
    static STUB: StubBsp = StubBsp;

    assert_eq!(block_on(bring_up(&STUB)), Err(MqttError::NotConnected));
}
