use super::threshold::{SensorKind, ThresholdLevel, ThresholdPolicy};

/// One temperature/humidity sample
///
/// NaN in either field marks a failed read.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClimateReading {
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent
    pub humidity: f32,
}

impl ClimateReading {
    /// Both values are numbers
    pub fn is_valid(&self) -> bool {
        !self.temperature.is_nan() && !self.humidity.is_nan()
    }

    /// Temperature rounded to whole degrees, saturating at the `i8` range
    pub fn temperature_i8(&self) -> i8 {
        round(self.temperature).clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
    }

    /// Humidity rounded to whole percent, clamped to 0..=100
    pub fn humidity_percent(&self) -> u8 {
        round(self.humidity).clamp(0, 100) as u8
    }
}

fn round(value: f32) -> i32 {
    if value < 0.0 {
        (value - 0.5) as i32
    } else {
        (value + 0.5) as i32
    }
}

/// Source of climate samples, such as a DHT11
pub trait ClimateSource {
    /// Error type, left up to the implementor
    type Error;

    /// Take one sample
    fn read(&mut self) -> Result<ClimateReading, Self::Error>;
}

/// Climate sensor that remembers its last valid reading
///
/// Threshold queries always look at the last valid reading, so a failed sample
/// does not flip them.
pub struct ClimateSensor<S> {
    source: S,
    last_valid: Option<ClimateReading>,
    policy: ThresholdPolicy,
    temperature_level: ThresholdLevel,
    humidity_level: ThresholdLevel,
}

impl<S: ClimateSource> ClimateSensor<S> {
    /// Create a sensor with no reading yet
    pub fn new(source: S) -> Self {
        Self {
            source,
            last_valid: None,
            policy: ThresholdPolicy::default(),
            temperature_level: ThresholdLevel::default(),
            humidity_level: ThresholdLevel::default(),
        }
    }

    /// Use a different cutoff table
    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sample the sensor
    ///
    /// Returns `None` on a failed read; the cached reading is kept in that case.
    pub fn read(&mut self) -> Option<ClimateReading> {
        match self.source.read() {
            Ok(reading) if reading.is_valid() => {
                self.last_valid = Some(reading);
                Some(reading)
            }
            _ => {
                warn!("Climate sensor read failed");
                None
            }
        }
    }

    /// Most recent valid reading
    pub fn last_valid(&self) -> Option<ClimateReading> {
        self.last_valid
    }

    /// Select the temperature threshold level
    pub fn set_temperature_threshold_level(&mut self, level: ThresholdLevel) {
        self.temperature_level = level;
    }

    /// Select the humidity threshold level
    pub fn set_humidity_threshold_level(&mut self, level: ThresholdLevel) {
        self.humidity_level = level;
    }

    /// Last valid temperature is above its cutoff; false without a reading
    pub fn is_temperature_above_threshold(&self) -> bool {
        let cutoff = self
            .policy
            .cutoff(SensorKind::Temperature, self.temperature_level);
        self.last_valid
            .map_or(false, |r| r.temperature > cutoff as f32)
    }

    /// Last valid humidity is above its cutoff; false without a reading
    pub fn is_humidity_above_threshold(&self) -> bool {
        let cutoff = self.policy.cutoff(SensorKind::Humidity, self.humidity_level);
        self.last_valid.map_or(false, |r| r.humidity > cutoff as f32)
    }
}
