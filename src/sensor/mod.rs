//! Sensor drivers
//!
//! Sensors hand the node plain numbers: an average of several analog samples, or a
//! temperature/humidity pair. Each driver also keeps a threshold so the
//! application can ask whether the current reading is "above" a chosen level.

use core::marker::PhantomData;

use embedded_hal::{
    adc::{Channel, OneShot},
    blocking::delay::DelayMs,
};

/// Climate (temperature/humidity) sensor with last-valid caching
pub mod climate;
/// Threshold levels and per-sensor cutoffs
pub mod threshold;

use threshold::{SensorKind, ThresholdLevel, ThresholdPolicy};

/// Default number of samples averaged per reading
pub const DEFAULT_SAMPLES: u8 = 10;
/// Pause between samples so the ADC can settle
pub const SAMPLE_INTERVAL_MS: u8 = 2;

/// Source of raw analog samples
pub trait AnalogSource {
    /// Error type, left up to the implementor
    type Error;

    /// Take one sample
    fn sample(&mut self) -> nb::Result<u16, Self::Error>;
}

/// [`AnalogSource`] backed by an `embedded-hal` one-shot ADC and one of its pins
pub struct OneShotSource<A, ADC, PIN> {
    adc: A,
    pin: PIN,
    _adc: PhantomData<ADC>,
}

impl<A, ADC, PIN> OneShotSource<A, ADC, PIN>
where
    A: OneShot<ADC, u16, PIN>,
    PIN: Channel<ADC>,
{
    /// Pair an ADC with the pin to sample
    pub fn new(adc: A, pin: PIN) -> Self {
        Self {
            adc,
            pin,
            _adc: PhantomData,
        }
    }

    /// Release the ADC and pin
    pub fn free(self) -> (A, PIN) {
        (self.adc, self.pin)
    }
}

impl<A, ADC, PIN> AnalogSource for OneShotSource<A, ADC, PIN>
where
    A: OneShot<ADC, u16, PIN>,
    PIN: Channel<ADC>,
{
    type Error = A::Error;

    fn sample(&mut self) -> nb::Result<u16, Self::Error> {
        self.adc.read(&mut self.pin)
    }
}

/// Analog sensor that averages several samples per reading
pub struct AveragingSensor<S, D> {
    source: S,
    delay: D,
    kind: SensorKind,
    samples: u8,
    policy: ThresholdPolicy,
    level: ThresholdLevel,
}

impl<S: AnalogSource, D: DelayMs<u8>> AveragingSensor<S, D> {
    /// Create a sensor at the default threshold level
    ///
    /// `samples` is raised to 1 if zero.
    pub fn new(source: S, delay: D, kind: SensorKind, samples: u8) -> Self {
        Self {
            source,
            delay,
            kind,
            samples: samples.max(1),
            policy: ThresholdPolicy::default(),
            level: ThresholdLevel::default(),
        }
    }

    /// Use a different cutoff table
    pub fn with_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sensor kind
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Average of `samples` readings, spaced [`SAMPLE_INTERVAL_MS`] apart
    pub fn read_average(&mut self) -> Result<u16, S::Error> {
        let mut sum: u32 = 0;
        for _ in 0..self.samples {
            sum += u32::from(nb::block!(self.source.sample())?);
            self.delay.delay_ms(SAMPLE_INTERVAL_MS);
        }
        Ok((sum / u32::from(self.samples)) as u16)
    }

    /// Select the threshold level
    pub fn set_threshold_level(&mut self, level: ThresholdLevel) {
        debug!("Threshold update: level {}", level.as_raw());
        self.level = level;
    }

    /// Current cutoff
    pub fn threshold(&self) -> i32 {
        self.policy.cutoff(self.kind, self.level)
    }

    /// Take a fresh reading and compare it to the cutoff
    pub fn is_above_threshold(&mut self) -> Result<bool, S::Error> {
        let reading = self.read_average()?;
        Ok(self.policy.is_above(self.kind, self.level, i32::from(reading)))
    }
}

/// Map `raw` onto 0..=100 between a `dry` (0 %) and a `wet` (100 %) calibration point
///
/// Works for both rising and falling sensors; values outside the range clamp.
pub fn scale_percent(raw: u16, dry: u16, wet: u16) -> u8 {
    if dry == wet {
        return 0;
    }
    let span = i32::from(wet) - i32::from(dry);
    let offset = i32::from(raw) - i32::from(dry);
    (offset * 100 / span).clamp(0, 100) as u8
}
