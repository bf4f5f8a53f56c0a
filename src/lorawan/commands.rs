use crate::sensor::threshold::ThresholdLevel;

use super::downlink::DownlinkResult;

/// Command carried by a downlink
///
/// The network sends a single number: the calibration profile (threshold level)
/// the node should apply to its sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppCommand {
    /// Apply the given threshold level to all sensors
    SelectProfile(ThresholdLevel),
    /// A value this firmware does not know
    Unsupported(u64),
}

impl AppCommand {
    /// Interpret a decoded command value
    pub fn from_value(value: u64) -> Self {
        match value {
            1 => AppCommand::SelectProfile(ThresholdLevel::Low),
            2 => AppCommand::SelectProfile(ThresholdLevel::Medium),
            3 => AppCommand::SelectProfile(ThresholdLevel::High),
            other => AppCommand::Unsupported(other),
        }
    }

    /// Interpret a downlink; `None` unless it carried a well-formed command
    pub fn from_downlink(downlink: &DownlinkResult) -> Option<Self> {
        match downlink {
            DownlinkResult::Command(value) => Some(Self::from_value(*value)),
            _ => None,
        }
    }
}
