//! # Adapter Options
//!
//! Connection parameters, the default subscription and the startup publish,
//! built with the same `new` + `with_*` pattern the client options use.

use embassy_net::{IpAddress, Ipv4Address};
use embassy_time::Duration;

use crate::error::MqttError;

/// Represents the Quality of Service (QoS) levels for MQTT messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

/// Raw QoS bytes above 2 are rejected before they can reach the engine.
impl TryFrom<u8> for QoS {
    type Error = MqttError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(MqttError::InvalidArgument),
        }
    }
}

/// Message the broker publishes on the client's behalf when it drops offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastWill<'a> {
    pub topic: &'a str,
    pub message: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
}

/// Everything the engine needs to open a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectInfo<'a> {
    pub client_id: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    /// Keep-alive interval in seconds.
    pub keep_alive: u16,
    pub will: Option<LastWill<'a>>,
}

impl<'a> ConnectInfo<'a> {
    pub const DEFAULT_KEEP_ALIVE: u16 = 60;

    pub const fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            username: None,
            password: None,
            keep_alive: Self::DEFAULT_KEEP_ALIVE,
            will: None,
        }
    }

    pub const fn with_credentials(mut self, username: &'a str, password: &'a str) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    pub const fn with_keep_alive(mut self, seconds: u16) -> Self {
        self.keep_alive = seconds;
        self
    }

    pub const fn with_last_will(mut self, will: LastWill<'a>) -> Self {
        self.will = Some(will);
        self
    }
}

/// A topic filter together with the QoS it is requested at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription<'a> {
    pub topic: &'a str,
    pub qos: QoS,
}

/// The message `init()` publishes repeatedly after connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupPublish<'a> {
    pub topic: &'a str,
    pub payload: &'a [u8],
    pub qos: QoS,
    pub retain: bool,
    pub count: usize,
    pub interval: Duration,
}

/// Options for the board-level adapter.
///
/// ```ignore
/// let options = MqttOptions::new(Ipv4Address::new(192, 168, 1, 10).into(), 1883, ConnectInfo::new("board-01"))
///     .with_default_subscription("board-01/cmd", QoS::AtMostOnce);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MqttOptions<'a> {
    pub broker: IpAddress,
    pub port: u16,
    pub connect: ConnectInfo<'a>,
    pub default_subscription: Option<Subscription<'a>>,
    pub startup: Option<StartupPublish<'a>>,
}

impl<'a> MqttOptions<'a> {
    pub const DEFAULT_PORT: u16 = 1883;
    pub const STARTUP_COUNT: usize = 10;
    pub const STARTUP_INTERVAL: Duration = Duration::from_secs(1);

    pub const fn new(broker: IpAddress, port: u16, connect: ConnectInfo<'a>) -> Self {
        Self {
            broker,
            port,
            connect,
            default_subscription: None,
            startup: None,
        }
    }

    /// Options pointing at `broker` on the default MQTT port.
    pub const fn ipv4(broker: Ipv4Address, connect: ConnectInfo<'a>) -> Self {
        Self::new(IpAddress::Ipv4(broker), Self::DEFAULT_PORT, connect)
    }

    pub const fn with_default_subscription(mut self, topic: &'a str, qos: QoS) -> Self {
        self.default_subscription = Some(Subscription { topic, qos });
        self
    }

    /// Publish `payload` to `topic` [`Self::STARTUP_COUNT`] times from `init()`,
    /// [`Self::STARTUP_INTERVAL`] apart.
    pub const fn with_startup_publish(mut self, topic: &'a str, payload: &'a [u8], qos: QoS) -> Self {
        self.startup = Some(StartupPublish {
            topic,
            payload,
            qos,
            retain: false,
            count: Self::STARTUP_COUNT,
            interval: Self::STARTUP_INTERVAL,
        });
        self
    }

    /// Override how often and how far apart the startup message is sent.
    pub const fn with_startup_schedule(mut self, count: usize, interval: Duration) -> Self {
        if let Some(startup) = self.startup.as_mut() {
            startup.count = count;
            startup.interval = interval;
        }
        self
    }
}
