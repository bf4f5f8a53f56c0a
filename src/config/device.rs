use heapless::String;

use super::timing::TimingConfig;

/// Length of an EUI-64 written as hex characters
pub const EUI_HEX_LEN: usize = 16;
/// Length of an AES-128 key written as hex characters
pub const KEY_HEX_LEN: usize = 32;

/// Device EUI as reported by the modem (16 hex characters)
pub type DevEui = String<EUI_HEX_LEN>;
/// Application EUI (16 hex characters)
pub type AppEui = String<EUI_HEX_LEN>;
/// Application key (32 hex characters)
pub type AppKey = String<KEY_HEX_LEN>;

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// AppEUI is not 16 hex characters
    InvalidAppEui,
    /// AppKey is not 32 hex characters
    InvalidAppKey,
}

/// Device configuration for OTAA activation
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Application EUI
    pub app_eui: AppEui,
    /// Application key
    pub app_key: AppKey,
    /// Link lifecycle timing
    pub timing: TimingConfig,
}

impl DeviceConfig {
    /// Create a new OTAA device configuration
    pub fn new_otaa(app_eui: &str, app_key: &str) -> Result<Self, ConfigError> {
        if !is_hex_of_len(app_eui, EUI_HEX_LEN) {
            return Err(ConfigError::InvalidAppEui);
        }
        if !is_hex_of_len(app_key, KEY_HEX_LEN) {
            return Err(ConfigError::InvalidAppKey);
        }

        let mut eui = AppEui::new();
        eui.push_str(app_eui).map_err(|_| ConfigError::InvalidAppEui)?;
        let mut key = AppKey::new();
        key.push_str(app_key).map_err(|_| ConfigError::InvalidAppKey)?;

        Ok(Self {
            app_eui: eui,
            app_key: key,
            timing: TimingConfig::default(),
        })
    }

    /// Replace the link timing
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }
}

/// Check that `s` is exactly `len` ASCII hex digits
pub fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a modem identifier into a [`DevEui`]
///
/// Returns `None` unless the string is exactly 16 hex characters.
pub fn parse_dev_eui(s: &str) -> Option<DevEui> {
    if !is_hex_of_len(s, EUI_HEX_LEN) {
        return None;
    }
    let mut eui = DevEui::new();
    eui.push_str(s).ok()?;
    Some(eui)
}
