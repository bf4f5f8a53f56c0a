//! Threshold levels
//!
//! Callers pick an abstract level (1, 2 or 3); each sensor kind maps it to its
//! own cutoff. Readings strictly above the cutoff count as "above threshold".

/// Abstract threshold level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdLevel {
    /// Level 1
    Low,
    /// Level 2, also the fallback for unknown levels
    #[default]
    Medium,
    /// Level 3
    High,
}

impl ThresholdLevel {
    /// Map a raw level number, falling back to `Medium` outside 1..=3
    pub fn from_raw(level: u32) -> Self {
        match level {
            1 => ThresholdLevel::Low,
            3 => ThresholdLevel::High,
            _ => ThresholdLevel::Medium,
        }
    }

    /// Level number (1..=3)
    pub fn as_raw(&self) -> u8 {
        match self {
            ThresholdLevel::Low => 1,
            ThresholdLevel::Medium => 2,
            ThresholdLevel::High => 3,
        }
    }

    fn index(&self) -> usize {
        usize::from(self.as_raw() - 1)
    }
}

/// Kind of sensor a cutoff applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Raw light ADC reading
    Light,
    /// Raw soil moisture ADC reading
    Soil,
    /// Degrees Celsius
    Temperature,
    /// Relative humidity in percent
    Humidity,
}

/// Cutoff tables, one entry per level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThresholdPolicy {
    /// Light cutoffs (raw ADC)
    pub light: [i32; 3],
    /// Soil moisture cutoffs (raw ADC)
    pub soil: [i32; 3],
    /// Temperature cutoffs (°C)
    pub temperature: [i32; 3],
    /// Humidity cutoffs (%)
    pub humidity: [i32; 3],
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            light: [100, 500, 2000],
            soil: [300, 600, 900],
            temperature: [20, 25, 30],
            humidity: [40, 60, 80],
        }
    }
}

impl ThresholdPolicy {
    /// Cutoff for `kind` at `level`
    pub fn cutoff(&self, kind: SensorKind, level: ThresholdLevel) -> i32 {
        let table = match kind {
            SensorKind::Light => &self.light,
            SensorKind::Soil => &self.soil,
            SensorKind::Temperature => &self.temperature,
            SensorKind::Humidity => &self.humidity,
        };
        table[level.index()]
    }

    /// Whether `reading` is strictly above the cutoff
    pub fn is_above(&self, kind: SensorKind, level: ThresholdLevel, reading: i32) -> bool {
        reading > self.cutoff(kind, level)
    }
}
