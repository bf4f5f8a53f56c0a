/// Frequency band passed to `mac reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    /// EU 863-870 MHz
    Eu868,
    /// EU 433 MHz
    Eu433,
}

impl Band {
    /// Argument used on the modem command line
    pub fn as_arg(&self) -> &'static str {
        match self {
            Band::Eu868 => "868",
            Band::Eu433 => "433",
        }
    }
}

/// RN2483 serial modem settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rn2483Config {
    /// Band selected on `mac reset`
    pub band: Band,
    /// Application port for uplinks (1-223)
    pub port: u8,
    /// Send confirmed uplinks
    pub confirmed: bool,
    /// Timeout for a plain command reply
    pub response_timeout_ms: u32,
    /// Timeout for the second join reply (`accepted`/`denied`)
    pub join_timeout_ms: u32,
    /// Timeout for the second tx reply, covers both receive windows
    pub tx_timeout_ms: u32,
}

impl Default for Rn2483Config {
    fn default() -> Self {
        Self {
            band: Band::Eu868,
            port: 1,
            confirmed: false,
            response_timeout_ms: 2_000,
            join_timeout_ms: 20_000,
            tx_timeout_ms: 20_000,
        }
    }
}
