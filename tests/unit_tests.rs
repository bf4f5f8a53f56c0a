use field_node::{
    config::{device::parse_dev_eui, ConfigError, DeviceConfig, TimingConfig},
    device::power::{BatteryGauge, PowerState},
    lorawan::{
        commands::AppCommand,
        downlink::{decode, DownlinkError, DownlinkResult},
        uplink::{
            encode_keep_alive, encode_sensor_frame, SensorReadings, UplinkFrame, SENSOR_FRAME_LEN,
        },
    },
    sensor::{
        climate::{ClimateReading, ClimateSensor},
        scale_percent,
        threshold::{SensorKind, ThresholdLevel, ThresholdPolicy},
        AnalogSource, AveragingSensor, OneShotSource,
    },
};

use mock::{
    MockAdc, MockAdcUnit, MockAnalogPin, MockDelay, MockError, ScriptedAnalog, ScriptedClimate,
    APP_EUI, APP_KEY,
};

#[test]
fn test_keep_alive_frame() {
    assert_eq!(encode_keep_alive(), [0x00]);
    let mut buf = [0u8; SENSOR_FRAME_LEN];
    assert_eq!(UplinkFrame::KeepAlive.encode_into(&mut buf), &[0x00]);
    assert_eq!(UplinkFrame::KeepAlive.len(), 1);
}

#[test]
fn test_sensor_frame_layout() {
    let frame = encode_sensor_frame(45, -1, 60, 12, 88);
    assert_eq!(frame, [45, 0xFF, 60, 12, 88]);

    // Temperature is carried as its two's complement byte
    assert_eq!(encode_sensor_frame(0, -40, 0, 0, 0)[1], 0xD8);
    assert_eq!(encode_sensor_frame(0, 127, 0, 0, 0)[1], 0x7F);
    assert_eq!(encode_sensor_frame(0, -128, 0, 0, 0)[1], 0x80);
}

fn assert_recovered(readings: SensorReadings) {
    let frame = encode_sensor_frame(
        readings.humidity,
        readings.temperature,
        readings.soil,
        readings.light,
        readings.battery,
    );
    assert_eq!(
        UplinkFrame::decode(&frame),
        Some(UplinkFrame::Sensor(readings)),
        "{:?}",
        readings
    );
}

#[test]
fn test_sensor_frame_fields_recovered() {
    let base = SensorReadings {
        humidity: 100,
        temperature: -12,
        soil: 0,
        light: 255,
        battery: 7,
    };

    for temperature in i8::MIN..=i8::MAX {
        assert_recovered(SensorReadings { temperature, ..base });
    }
    for value in u8::MIN..=u8::MAX {
        assert_recovered(SensorReadings { humidity: value, ..base });
        assert_recovered(SensorReadings { soil: value, ..base });
        assert_recovered(SensorReadings { light: value, ..base });
        assert_recovered(SensorReadings { battery: value, ..base });
        // All fields moving together, temperature across its full range
        assert_recovered(SensorReadings {
            humidity: value,
            temperature: value as i8,
            soil: value.wrapping_add(1),
            light: value.wrapping_mul(3),
            battery: !value,
        });
    }
}

#[test]
fn test_frame_encoding_matches_decode() {
    let readings = SensorReadings {
        humidity: 100,
        temperature: -12,
        soil: 0,
        light: 255,
        battery: 7,
    };
    let frame = UplinkFrame::Sensor(readings);
    let mut buf = [0u8; SENSOR_FRAME_LEN];
    let bytes = frame.encode_into(&mut buf);

    assert_eq!(bytes.len(), frame.len());
    assert_eq!(UplinkFrame::decode(bytes), Some(frame));
    assert_eq!(UplinkFrame::decode(&[0x00]), Some(UplinkFrame::KeepAlive));
    assert_eq!(UplinkFrame::decode(&[0x01]), None);
    assert_eq!(UplinkFrame::decode(&[1, 2, 3]), None);
}

#[test]
fn test_downlink_decode() {
    assert_eq!(decode(""), DownlinkResult::NoDownlink);
    assert_eq!(decode("0"), DownlinkResult::Command(0));
    assert_eq!(decode("04"), DownlinkResult::Command(4));
    assert_eq!(decode("FF"), DownlinkResult::Command(255));
    assert_eq!(decode("ff"), DownlinkResult::Command(255));
    assert_eq!(decode("0100"), DownlinkResult::Command(256));
    assert_eq!(decode("FFFFFFFF"), DownlinkResult::Command(0xFFFF_FFFF));
    assert_eq!(decode("0102030405"), DownlinkResult::Command(0x01_0203_0405));
    assert_eq!(decode("FFFFFFFFFFFFFFFF"), DownlinkResult::Command(u64::MAX));
}

#[test]
fn test_downlink_malformed() {
    assert_eq!(
        decode("zz"),
        DownlinkResult::Malformed(DownlinkError::InvalidDigit)
    );
    assert_eq!(
        decode("0x04"),
        DownlinkResult::Malformed(DownlinkError::InvalidDigit)
    );
    assert_eq!(
        decode("10000000000000000"),
        DownlinkResult::Malformed(DownlinkError::Overflow)
    );
}

#[test]
fn test_command_or_zero() {
    assert_eq!(DownlinkResult::NoDownlink.command_or_zero(), None);
    assert_eq!(DownlinkResult::Command(3).command_or_zero(), Some(3));
    assert_eq!(decode("zz").command_or_zero(), Some(0));
}

#[test]
fn test_app_command_from_value() {
    assert_eq!(
        AppCommand::from_value(1),
        AppCommand::SelectProfile(ThresholdLevel::Low)
    );
    assert_eq!(
        AppCommand::from_value(2),
        AppCommand::SelectProfile(ThresholdLevel::Medium)
    );
    assert_eq!(
        AppCommand::from_value(3),
        AppCommand::SelectProfile(ThresholdLevel::High)
    );
    assert_eq!(AppCommand::from_value(0), AppCommand::Unsupported(0));
    assert_eq!(AppCommand::from_value(255), AppCommand::Unsupported(255));

    assert_eq!(AppCommand::from_downlink(&DownlinkResult::NoDownlink), None);
    assert_eq!(AppCommand::from_downlink(&decode("zz")), None);
    assert_eq!(
        AppCommand::from_downlink(&decode("03")),
        Some(AppCommand::SelectProfile(ThresholdLevel::High))
    );
}

#[test]
fn test_device_config() {
    let config = DeviceConfig::new_otaa(APP_EUI, APP_KEY).unwrap();
    assert_eq!(config.app_eui.as_str(), APP_EUI);
    assert_eq!(config.app_key.as_str(), APP_KEY);
    assert_eq!(config.timing, TimingConfig::default());

    let timing = TimingConfig {
        join_retry_ms: 5_000,
        ..TimingConfig::default()
    };
    let config = config.with_timing(timing);
    assert_eq!(config.timing.join_retry_ms, 5_000);
    assert_eq!(config.timing.reset_pulse_ms, 500);
}

#[test]
fn test_device_config_rejects_bad_credentials() {
    assert_eq!(
        DeviceConfig::new_otaa("70B3D57ED000000", APP_KEY).unwrap_err(),
        ConfigError::InvalidAppEui
    );
    assert_eq!(
        DeviceConfig::new_otaa("70B3D57ED000000G", APP_KEY).unwrap_err(),
        ConfigError::InvalidAppEui
    );
    assert_eq!(
        DeviceConfig::new_otaa(APP_EUI, "00112233").unwrap_err(),
        ConfigError::InvalidAppKey
    );
}

#[test]
fn test_timing_defaults() {
    let timing = TimingConfig::default();
    assert_eq!(timing.reset_pulse_ms, 500);
    assert_eq!(timing.reset_settle_ms, 100);
    assert_eq!(timing.reset_retry_ms, 10_000);
    assert_eq!(timing.join_retry_ms, 60_000);
}

#[test]
fn test_parse_dev_eui() {
    assert!(parse_dev_eui("0004A30B001C0530").is_some());
    assert!(parse_dev_eui("0004a30b001c0530").is_some());
    assert!(parse_dev_eui("0004A30B").is_none());
    assert!(parse_dev_eui("").is_none());
    assert!(parse_dev_eui("invalid_param").is_none());
    assert!(parse_dev_eui("0004A30B001C053Z").is_none());
}

#[test]
fn test_threshold_level_from_raw() {
    assert_eq!(ThresholdLevel::from_raw(1), ThresholdLevel::Low);
    assert_eq!(ThresholdLevel::from_raw(2), ThresholdLevel::Medium);
    assert_eq!(ThresholdLevel::from_raw(3), ThresholdLevel::High);
    assert_eq!(ThresholdLevel::from_raw(0), ThresholdLevel::Medium);
    assert_eq!(ThresholdLevel::from_raw(42), ThresholdLevel::Medium);
    assert_eq!(ThresholdLevel::default(), ThresholdLevel::Medium);
    assert_eq!(ThresholdLevel::High.as_raw(), 3);
}

#[test]
fn test_threshold_tables() {
    let policy = ThresholdPolicy::default();
    let levels = [ThresholdLevel::Low, ThresholdLevel::Medium, ThresholdLevel::High];

    let table = |kind: SensorKind| levels.map(|l| policy.cutoff(kind, l));
    assert_eq!(table(SensorKind::Light), [100, 500, 2000]);
    assert_eq!(table(SensorKind::Soil), [300, 600, 900]);
    assert_eq!(table(SensorKind::Temperature), [20, 25, 30]);
    assert_eq!(table(SensorKind::Humidity), [40, 60, 80]);

    // Strictly above
    assert!(!policy.is_above(SensorKind::Soil, ThresholdLevel::Medium, 600));
    assert!(policy.is_above(SensorKind::Soil, ThresholdLevel::Medium, 601));
}

#[test]
fn test_averaging_sensor() {
    let source = ScriptedAnalog::new(&[100, 200, 300, 400]);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Light, 4);

    assert_eq!(sensor.read_average(), Ok(250));
    assert_eq!(sensor.kind(), SensorKind::Light);
}

#[test]
fn test_averaging_sensor_zero_samples() {
    let source = ScriptedAnalog::new(&[1234]);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Soil, 0);

    assert_eq!(sensor.read_average(), Ok(1234));
}

#[test]
fn test_averaging_sensor_error() {
    let source = ScriptedAnalog::new(&[100]);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Soil, 3);

    assert_eq!(sensor.read_average(), Err(MockError::Error));
}

#[test]
fn test_averaging_sensor_threshold() {
    let source = ScriptedAnalog::new(&[550, 550, 450, 450]);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Light, 2);

    assert_eq!(sensor.threshold(), 500);
    assert_eq!(sensor.is_above_threshold(), Ok(true));

    sensor.set_threshold_level(ThresholdLevel::Low);
    assert_eq!(sensor.threshold(), 100);
    assert_eq!(sensor.is_above_threshold(), Ok(true));

    let source = ScriptedAnalog::new(&[2500]);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Light, 1);
    sensor.set_threshold_level(ThresholdLevel::High);
    assert_eq!(sensor.is_above_threshold(), Ok(true));
}

#[test]
fn test_averaging_sensor_custom_policy() {
    let policy = ThresholdPolicy {
        soil: [10, 20, 30],
        ..ThresholdPolicy::default()
    };
    let source = ScriptedAnalog::new(&[20]);
    let mut sensor =
        AveragingSensor::new(source, MockDelay::new(), SensorKind::Soil, 1).with_policy(policy);

    assert_eq!(sensor.threshold(), 20);
    assert_eq!(sensor.is_above_threshold(), Ok(false));
}

#[test]
fn test_one_shot_source_samples_its_pin() {
    let mut source: OneShotSource<_, MockAdcUnit, _> =
        OneShotSource::new(MockAdc::new(&[812, 790]), MockAnalogPin);

    // The conversion is still running on the first poll
    assert_eq!(source.sample(), Err(nb::Error::WouldBlock));
    assert_eq!(source.sample(), Ok(812));

    let (adc, _pin) = source.free();
    assert_eq!(adc.channels, vec![3]);
    assert_eq!(adc.polls, 2);
}

#[test]
fn test_averaging_sensor_over_one_shot_adc() {
    let source: OneShotSource<_, MockAdcUnit, _> =
        OneShotSource::new(MockAdc::new(&[600, 640, 620]), MockAnalogPin);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Soil, 3);

    // Blocks through each pending conversion
    assert_eq!(sensor.read_average(), Ok(620));

    let source: OneShotSource<_, MockAdcUnit, _> =
        OneShotSource::new(MockAdc::new(&[700]), MockAnalogPin);
    let mut sensor = AveragingSensor::new(source, MockDelay::new(), SensorKind::Soil, 2);
    assert_eq!(sensor.read_average(), Err(MockError::Error));
}

#[test]
fn test_climate_sensor_keeps_last_valid() {
    let first = ClimateReading {
        temperature: 26.0,
        humidity: 55.0,
    };
    let nan = ClimateReading {
        temperature: f32::NAN,
        humidity: 50.0,
    };
    let source = ScriptedClimate::new(vec![Some(first), None, Some(nan)]);
    let mut sensor = ClimateSensor::new(source);

    assert_eq!(sensor.last_valid(), None);
    assert!(!sensor.is_temperature_above_threshold());
    assert!(!sensor.is_humidity_above_threshold());

    assert_eq!(sensor.read(), Some(first));
    assert_eq!(sensor.read(), None);
    assert_eq!(sensor.read(), None);
    assert_eq!(sensor.last_valid(), Some(first));

    // Medium: 25 °C and 60 %
    assert!(sensor.is_temperature_above_threshold());
    assert!(!sensor.is_humidity_above_threshold());

    sensor.set_temperature_threshold_level(ThresholdLevel::High);
    sensor.set_humidity_threshold_level(ThresholdLevel::Low);
    assert!(!sensor.is_temperature_above_threshold());
    assert!(sensor.is_humidity_above_threshold());
}

#[test]
fn test_climate_reading_conversion() {
    let reading = ClimateReading {
        temperature: -2.6,
        humidity: 101.2,
    };
    assert_eq!(reading.temperature_i8(), -3);
    assert_eq!(reading.humidity_percent(), 100);

    let reading = ClimateReading {
        temperature: 21.4,
        humidity: 44.5,
    };
    assert_eq!(reading.temperature_i8(), 21);
    assert_eq!(reading.humidity_percent(), 45);
}

#[test]
fn test_scale_percent() {
    // Rising sensor
    assert_eq!(scale_percent(0, 0, 4095), 0);
    assert_eq!(scale_percent(4095, 0, 4095), 100);
    assert_eq!(scale_percent(2048, 0, 4096), 50);

    // Falling sensor (capacitive soil probe: dry reads high)
    assert_eq!(scale_percent(3000, 3000, 1000), 0);
    assert_eq!(scale_percent(1000, 3000, 1000), 100);
    assert_eq!(scale_percent(2000, 3000, 1000), 50);

    // Clamped
    assert_eq!(scale_percent(3500, 3000, 1000), 0);
    assert_eq!(scale_percent(500, 3000, 1000), 100);
    assert_eq!(scale_percent(10, 5, 5), 0);
}

#[test]
fn test_battery_gauge() {
    let gauge = BatteryGauge::default();

    assert_eq!(gauge.percent(4_200), 100);
    assert_eq!(gauge.percent(4_500), 100);
    assert_eq!(gauge.percent(3_300), 0);
    assert_eq!(gauge.percent(3_000), 0);
    assert_eq!(gauge.percent(3_750), 50);

    assert_eq!(gauge.state(100), PowerState::Normal);
    assert_eq!(gauge.state(31), PowerState::Normal);
    assert_eq!(gauge.state(30), PowerState::Low);
    assert_eq!(gauge.state(11), PowerState::Low);
    assert_eq!(gauge.state(10), PowerState::Critical);
    assert_eq!(gauge.state(0), PowerState::Critical);
}
