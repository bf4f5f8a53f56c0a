//! LoRaWAN field telemetry node in Rust
//!
//! This crate provides the transport core of a battery-powered sensor node that
//! reports over a LoRaWAN modem. It owns the radio lifecycle (reset, autobaud,
//! OTAA join) with blocking retries, encodes sensor readings into fixed-size
//! uplink frames and decodes the modem's hex downlinks into application commands.
//!
//! # Features
//! - Radio session manager with unbounded reset/join retries and an injectable clock
//! - 1-byte keep-alive and 5-byte sensor uplink frames
//! - Hex downlink decoding with explicit malformed-input reporting
//! - RN2483 ASCII command driver over any `embedded-hal` serial port
//! - Averaging analog sensors and threshold levels
//! - No unsafe code
//!
//! # Example
//! ```no_run
//! use field_node::{
//!     config::{DeviceConfig, Rn2483Config},
//!     device::TransportManager,
//!     lorawan::uplink::{SensorReadings, UplinkFrame},
//!     radio::{DelayClock, NoIndicator, RadioLink, Rn2483},
//! };
//! # fn run<S, RST, D1, D2>(serial: S, reset: RST, poll_delay: D1, delay: D2)
//! # where
//! #     S: embedded_hal::serial::Read<u8> + embedded_hal::serial::Write<u8>,
//! #     RST: embedded_hal::digital::v2::OutputPin,
//! #     D1: embedded_hal::blocking::delay::DelayUs<u32>,
//! #     D2: embedded_hal::blocking::delay::DelayMs<u32>,
//! # {
//! let config = DeviceConfig::new_otaa(
//!     "70B3D57ED0000000",
//!     "00112233445566778899AABBCCDDEEFF",
//! ).unwrap();
//!
//! let modem = Rn2483::new(serial, reset, poll_delay, Rn2483Config::default());
//! let link = RadioLink::new(modem, DelayClock::new(delay), NoIndicator, config.timing);
//! let mut manager = TransportManager::new(link);
//!
//! // Blocks until the modem is up and the network accepted the join
//! manager.join_with(&config);
//!
//! let readings = SensorReadings { humidity: 40, temperature: 21, soil: 55, light: 70, battery: 90 };
//! let outcome = manager.transmit(&UplinkFrame::Sensor(readings));
//! # let _ = outcome;
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod fmt;

/// Device and link configuration
pub mod config;

/// High-level transport interface
pub mod device;

/// Uplink and downlink payload codecs
pub mod lorawan;

/// Application cycle
pub mod node;

/// Radio transport and session management
pub mod radio;

/// Sensor drivers and thresholds
pub mod sensor;
