//! Protocols without an integration
//!
//! Each config is accepted and carried through plans so a real client can be
//! added later without changing the dispatch shape; today the handler only
//! reports which crate it would need.

use serde::{Deserialize, Serialize};

pub(crate) const SERIAL_NOTICE: &str =
    "Serial communication requires a crate like serialport or a platform-specific implementation.";
pub(crate) const I2C_NOTICE: &str =
    "I2C requires a crate like i2cdev or a platform-specific implementation.";
pub(crate) const SPI_NOTICE: &str =
    "SPI requires a crate like spidev or a platform-specific implementation.";
pub(crate) const CAN_NOTICE: &str =
    "CAN requires a crate like socketcan or a platform-specific implementation.";
pub(crate) const MQTT_NOTICE: &str = "MQTT requires a crate like rumqttc.";
pub(crate) const FTP_NOTICE: &str =
    "FTP requires a crate like suppaftp or a platform-specific implementation.";

/// Serial port parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port name (e.g., COM3, /dev/ttyUSB0)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
}

impl SerialConfig {
    /// Create a new serial configuration
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
        }
    }
}

/// I2C bus parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2cConfig {
    /// Bus number (`/dev/i2c-N`)
    pub bus: u8,
}

impl I2cConfig {
    /// Create a new I2C configuration
    pub fn new(bus: u8) -> Self {
        Self { bus }
    }
}

/// SPI bus parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiConfig {
    /// Bus number
    #[serde(default)]
    pub bus: u8,
    /// Chip select
    #[serde(default)]
    pub device: u8,
    /// Clock speed in Hz
    #[serde(default = "default_spi_speed")]
    pub max_speed_hz: u32,
}

fn default_spi_speed() -> u32 {
    500_000
}

impl SpiConfig {
    /// Create a new SPI configuration
    pub fn new(bus: u8, device: u8) -> Self {
        Self {
            bus,
            device,
            max_speed_hz: default_spi_speed(),
        }
    }
}

/// CAN interface parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanConfig {
    /// Interface name (e.g., can0)
    pub interface: String,
}

impl CanConfig {
    /// Create a new CAN configuration
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
        }
    }
}

fn default_mqtt_port() -> u16 {
    1883
}

/// MQTT broker parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    /// Broker host
    pub broker: String,
    /// Broker port
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
}

impl MqttConfig {
    /// Create a new MQTT configuration
    pub fn new(broker: &str, port: u16) -> Self {
        Self {
            broker: broker.to_string(),
            port,
        }
    }
}

/// FTP server parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtpConfig {
    /// Host
    pub host: String,
    /// Login name
    pub username: String,
    /// Login password
    #[serde(default)]
    pub password: String,
}

impl FtpConfig {
    /// Create a new FTP configuration
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probe::{create_probe, ProbeHandler, ProbeSpec};

    fn notice(spec: ProbeSpec) -> &'static str {
        match create_probe(spec) {
            ProbeHandler::Unsupported(notice) => notice,
            ProbeHandler::Implemented(_) => panic!("stub resolved to a real probe"),
        }
    }

    #[test]
    fn test_notice_ignores_parameters() {
        let a = notice(ProbeSpec::Serial(SerialConfig::new("/dev/ttyUSB0", 9600)));
        let b = notice(ProbeSpec::Serial(SerialConfig::new("COM3", 115_200)));
        assert_eq!(a, b);
        assert_eq!(a, SERIAL_NOTICE);
    }

    #[test]
    fn test_each_stub_has_its_own_notice() {
        assert_eq!(notice(ProbeSpec::I2c(I2cConfig::new(1))), I2C_NOTICE);
        assert_eq!(notice(ProbeSpec::Spi(SpiConfig::new(0, 0))), SPI_NOTICE);
        assert_eq!(notice(ProbeSpec::Can(CanConfig::new("can0"))), CAN_NOTICE);
        assert_eq!(notice(ProbeSpec::Mqtt(MqttConfig::new("localhost", 1883))), MQTT_NOTICE);
        assert_eq!(notice(ProbeSpec::Ftp(FtpConfig::new("ftp.local", "anon", ""))), FTP_NOTICE);
    }
}
