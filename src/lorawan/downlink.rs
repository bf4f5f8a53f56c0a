//! Downlink decoding
//!
//! The modem hands back a downlink as an ASCII hex string (possibly empty). The
//! application reads it as a single unsigned integer.

/// Why a downlink string could not be read as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DownlinkError {
    /// A character outside `0-9a-fA-F`
    InvalidDigit,
    /// The value does not fit in `u64`
    Overflow,
}

/// Decoded downlink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DownlinkResult {
    /// Nothing was received
    NoDownlink,
    /// Numeric command value
    Command(u64),
    /// A downlink arrived but was not valid hex
    Malformed(DownlinkError),
}

impl DownlinkResult {
    /// Command value, reading a malformed downlink as 0
    ///
    /// Older firmware parsed downlinks with `strtol` and got 0 for garbage.
    pub fn command_or_zero(&self) -> Option<u64> {
        match self {
            DownlinkResult::NoDownlink => None,
            DownlinkResult::Command(value) => Some(*value),
            DownlinkResult::Malformed(_) => Some(0),
        }
    }
}

/// Decode a hex downlink string
///
/// Whitespace is not stripped; the string must be exactly what the modem returned.
pub fn decode(hex: &str) -> DownlinkResult {
    if hex.is_empty() {
        return DownlinkResult::NoDownlink;
    }

    let mut value: u64 = 0;
    for c in hex.chars() {
        let digit = match c.to_digit(16) {
            Some(d) => d,
            None => return DownlinkResult::Malformed(DownlinkError::InvalidDigit),
        };
        value = match value.checked_mul(16).and_then(|v| v.checked_add(u64::from(digit))) {
            Some(v) => v,
            None => return DownlinkResult::Malformed(DownlinkError::Overflow),
        };
    }

    DownlinkResult::Command(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zeros() {
        assert_eq!(decode("0000000004"), DownlinkResult::Command(4));
    }

    #[test]
    fn test_whitespace_is_not_stripped() {
        assert_eq!(
            decode(" 04"),
            DownlinkResult::Malformed(DownlinkError::InvalidDigit)
        );
        assert_eq!(
            decode("04\r"),
            DownlinkResult::Malformed(DownlinkError::InvalidDigit)
        );
    }
}
