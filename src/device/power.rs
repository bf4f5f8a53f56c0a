//! Battery monitoring for field nodes
//!
//! Converts a battery voltage into the percentage carried in the sensor frame and
//! classifies it into a coarse power state.

/// Power states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Normal operation
    Normal,
    /// Battery running low
    Low,
    /// Critical battery level
    Critical,
}

/// Battery gauge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryGauge {
    /// Voltage read as 0 %
    pub empty_mv: u16,
    /// Voltage read as 100 %
    pub full_mv: u16,
    /// At or below this percentage the state is `Low`
    pub low_percent: u8,
    /// At or below this percentage the state is `Critical`
    pub critical_percent: u8,
}

impl Default for BatteryGauge {
    /// Single Li-ion cell
    fn default() -> Self {
        Self {
            empty_mv: 3_300,
            full_mv: 4_200,
            low_percent: 30,
            critical_percent: 10,
        }
    }
}

impl BatteryGauge {
    /// Battery level in percent, linear between `empty_mv` and `full_mv`
    pub fn percent(&self, millivolts: u16) -> u8 {
        if self.full_mv <= self.empty_mv {
            return 0;
        }
        let span = u32::from(self.full_mv - self.empty_mv);
        let above = u32::from(millivolts.saturating_sub(self.empty_mv)).min(span);
        (above * 100 / span) as u8
    }

    /// Power state for a battery percentage
    pub fn state(&self, percent: u8) -> PowerState {
        if percent <= self.critical_percent {
            PowerState::Critical
        } else if percent <= self.low_percent {
            PowerState::Low
        } else {
            PowerState::Normal
        }
    }
}
