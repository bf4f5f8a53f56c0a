use embedded_hal::blocking::delay::DelayMs;
use heapless::String;

use crate::config::device::DevEui;

/// Largest LoRaWAN application payload (EU868, DR5 to DR7)
pub const MAX_APP_PAYLOAD: usize = 222;
/// Maximum downlink length in hex characters
pub const MAX_DOWNLINK_HEX: usize = 2 * MAX_APP_PAYLOAD;

/// Raw downlink as returned by the modem
pub type DownlinkHex = String<MAX_DOWNLINK_HEX>;

/// Modem reply to a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinResponse {
    /// Network accepted the join
    Accepted,
    /// Network denied the join, or the modem refused to start it
    Denied,
}

/// Modem status after a transmission
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxStatus {
    /// Sent, receive windows closed without data
    Success,
    /// Sent, and a downlink arrived in a receive window
    SuccessWithRx(DownlinkHex),
    /// The modem refused the frame or reported a MAC error
    Failed,
}

/// Byte-level transport to a LoRaWAN modem
///
/// Every call blocks until the modem has answered. Implementations own the bus
/// exclusively.
pub trait Transport {
    /// Error type for transport operations
    type Error;

    /// Drive the modem reset line
    fn set_reset_line(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Discard anything buffered on the bus
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Re-synchronise the modem baud rate
    fn autobaud(&mut self) -> Result<(), Self::Error>;

    /// Read the hardware identifier; callers validate it
    fn read_identifier(&mut self) -> Result<DevEui, Self::Error>;

    /// Run an OTAA join with the given hex credentials
    fn join(&mut self, app_eui: &str, app_key: &str) -> Result<JoinResponse, Self::Error>;

    /// Transmit a payload and wait for the receive windows to close
    fn send(&mut self, payload: &[u8]) -> Result<TxStatus, Self::Error>;
}

/// Time source for the link's retry loops
pub trait Clock {
    /// Milliseconds since an arbitrary origin
    fn now_ms(&mut self) -> u64;

    /// Block for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);
}

/// [`Clock`] over a blocking delay
///
/// Time advances only by what this clock itself sleeps.
pub struct DelayClock<D> {
    delay: D,
    elapsed_ms: u64,
}

impl<D: DelayMs<u32>> DelayClock<D> {
    /// Wrap a delay provider
    pub fn new(delay: D) -> Self {
        Self {
            delay,
            elapsed_ms: 0,
        }
    }

    /// Release the delay provider
    pub fn free(self) -> D {
        self.delay
    }
}

impl<D: DelayMs<u32>> Clock for DelayClock<D> {
    fn now_ms(&mut self) -> u64 {
        self.elapsed_ms
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
        self.elapsed_ms += u64::from(ms);
    }
}
