//! Uplink frame encoding
//!
//! Two fixed-length frame kinds are sent, with no header or checksum:
//!
//! | Kind      | Len | 0    | 1        | 2     | 3      | 4        |
//! |-----------|-----|------|----------|-------|--------|----------|
//! | KeepAlive | 1   | 0x00 |          |       |        |          |
//! | Sensor    | 5   | hum% | temp (i8)| soil% | light% | battery% |
//!
//! The length alone tells the kinds apart.

/// Keep-alive payload byte
pub const KEEP_ALIVE_BYTE: u8 = 0x00;
/// Keep-alive frame length
pub const KEEP_ALIVE_LEN: usize = 1;
/// Sensor frame length
pub const SENSOR_FRAME_LEN: usize = 5;

/// One set of sensor values, already scaled to their wire ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReadings {
    /// Relative humidity in percent
    pub humidity: u8,
    /// Temperature in whole degrees Celsius
    pub temperature: i8,
    /// Soil moisture in percent
    pub soil: u8,
    /// Light level in percent
    pub light: u8,
    /// Battery level in percent
    pub battery: u8,
}

/// Uplink frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkFrame {
    /// 1-byte keep-alive, sent while waiting for a profile
    KeepAlive,
    /// 5-byte sensor frame
    Sensor(SensorReadings),
}

impl UplinkFrame {
    /// Encode the frame into `buf` and return the bytes written
    pub fn encode_into<'a>(&self, buf: &'a mut [u8; SENSOR_FRAME_LEN]) -> &'a [u8] {
        match self {
            UplinkFrame::KeepAlive => {
                buf[..KEEP_ALIVE_LEN].copy_from_slice(&encode_keep_alive());
                &buf[..KEEP_ALIVE_LEN]
            }
            UplinkFrame::Sensor(r) => {
                *buf = encode_sensor_frame(r.humidity, r.temperature, r.soil, r.light, r.battery);
                &buf[..]
            }
        }
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        match self {
            UplinkFrame::KeepAlive => KEEP_ALIVE_LEN,
            UplinkFrame::Sensor(_) => SENSOR_FRAME_LEN,
        }
    }

    /// Frames are never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Recover a frame from its wire bytes, keyed on length
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [KEEP_ALIVE_BYTE] => Some(UplinkFrame::KeepAlive),
            [humidity, temperature, soil, light, battery] => {
                Some(UplinkFrame::Sensor(SensorReadings {
                    humidity,
                    temperature: temperature as i8,
                    soil,
                    light,
                    battery,
                }))
            }
            _ => None,
        }
    }
}

/// Encode a keep-alive frame
pub fn encode_keep_alive() -> [u8; KEEP_ALIVE_LEN] {
    [KEEP_ALIVE_BYTE]
}

/// Encode a sensor frame
///
/// Temperature goes on the wire as its two's complement byte, unscaled.
pub fn encode_sensor_frame(
    humidity: u8,
    temperature: i8,
    soil: u8,
    light: u8,
    battery: u8,
) -> [u8; SENSOR_FRAME_LEN] {
    [humidity, temperature as u8, soil, light, battery]
}
