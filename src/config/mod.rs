//! Device and link configuration
//!
//! This module contains the configuration types for a field node:
//! - OTAA credentials (AppEUI, AppKey)
//! - Radio link timing (reset pulse, retry backoffs)
//! - Serial modem settings

/// OTAA credentials and identifier validation
pub mod device;

/// Serial modem settings
pub mod modem;

/// Link lifecycle timing
pub mod timing;

pub use device::{ConfigError, DeviceConfig};
pub use modem::{Band, Rn2483Config};
pub use timing::TimingConfig;
