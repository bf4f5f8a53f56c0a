/// Radio link lifecycle timing, all values in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// How long the reset line is held low
    pub reset_pulse_ms: u32,
    /// Settle time after the reset line is released
    pub reset_settle_ms: u32,
    /// Backoff between reset attempts when the identifier is bad
    pub reset_retry_ms: u32,
    /// Backoff between join attempts
    pub join_retry_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reset_pulse_ms: 500,
            reset_settle_ms: 100,
            reset_retry_ms: 10_000,
            join_retry_ms: 60_000,
        }
    }
}
