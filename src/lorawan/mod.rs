//! Application payload codecs
//!
//! This module contains the wire formats the node exchanges with the network:
//! - Uplink frames (keep-alive and sensor data)
//! - Downlink decoding of the modem's hex replies
//! - Application commands carried by downlinks

/// Application commands carried in downlinks
pub mod commands;

/// Downlink decoding
pub mod downlink;

/// Uplink frame encoding
pub mod uplink;

pub use commands::AppCommand;
pub use downlink::{decode, DownlinkError, DownlinkResult};
pub use uplink::{SensorReadings, UplinkFrame};
