//! Field node cycle against a simulated modem
//!
//! Runs on the host. The simulated modem needs two resets before it reports a
//! valid identifier, denies the first join and answers the first uplink with a
//! profile downlink, so every retry path shows up in the log:
//!
//! ```text
//! RUST_LOG=debug cargo run --example field_node --features std,log
//! ```
//!
//! Backoff delays are divided by 1000 so the run takes a few seconds.

use std::thread;
use std::time::{Duration, Instant};

use field_node::{
    config::{device::DevEui, DeviceConfig, TimingConfig},
    device::{power::BatteryGauge, TransportManager},
    lorawan::uplink::SensorReadings,
    node::FieldNode,
    radio::{
        traits::{DownlinkHex, JoinResponse, TxStatus},
        Clock, NoIndicator, RadioLink, Transport,
    },
    sensor::{
        climate::{ClimateReading, ClimateSensor, ClimateSource},
        scale_percent,
    },
};

const APP_EUI: &str = "70B3D57ED0000000";
const APP_KEY: &str = "00112233445566778899AABBCCDDEEFF";

#[derive(Debug)]
struct Offline;

/// Modem that misbehaves a fixed number of times before cooperating
struct SimulatedModem {
    bad_identifiers: u32,
    denials: u32,
    uplinks: u32,
}

impl Transport for SimulatedModem {
    type Error = Offline;

    fn set_reset_line(&mut self, _high: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn autobaud(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn read_identifier(&mut self) -> Result<DevEui, Self::Error> {
        let mut eui = DevEui::new();
        if self.bad_identifiers > 0 {
            self.bad_identifiers -= 1;
            eui.push_str("0004A3").map_err(|_| Offline)?;
        } else {
            eui.push_str("0004A30B001C0530").map_err(|_| Offline)?;
        }
        Ok(eui)
    }

    fn join(&mut self, _app_eui: &str, _app_key: &str) -> Result<JoinResponse, Self::Error> {
        if self.denials > 0 {
            self.denials -= 1;
            return Ok(JoinResponse::Denied);
        }
        Ok(JoinResponse::Accepted)
    }

    fn send(&mut self, payload: &[u8]) -> Result<TxStatus, Self::Error> {
        self.uplinks += 1;
        log::debug!("air: {:02X?}", payload);
        match self.uplinks {
            1 => {
                let mut hex = DownlinkHex::new();
                hex.push_str("02").map_err(|_| Offline)?;
                Ok(TxStatus::SuccessWithRx(hex))
            }
            3 => Ok(TxStatus::Failed),
            _ => Ok(TxStatus::Success),
        }
    }
}

/// Wall clock with compressed sleeps
struct HostClock {
    start: Instant,
}

impl Clock for HostClock {
    fn now_ms(&mut self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms) / 1000));
    }
}

/// DHT-style sensor drifting slowly upwards
struct SimulatedClimate {
    step: u32,
}

impl ClimateSource for SimulatedClimate {
    type Error = Offline;

    fn read(&mut self) -> Result<ClimateReading, Self::Error> {
        self.step += 1;
        if self.step % 4 == 0 {
            return Err(Offline);
        }
        Ok(ClimateReading {
            temperature: 17.5 + self.step as f32,
            humidity: 48.0 + 2.0 * self.step as f32,
        })
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match DeviceConfig::new_otaa(APP_EUI, APP_KEY) {
        Ok(config) => config.with_timing(TimingConfig::default()),
        Err(e) => {
            log::error!("Bad credentials: {:?}", e);
            return;
        }
    };

    let modem = SimulatedModem {
        bad_identifiers: 2,
        denials: 1,
        uplinks: 0,
    };
    let clock = HostClock {
        start: Instant::now(),
    };
    let link = RadioLink::new(modem, clock, NoIndicator, config.timing);
    let mut manager = TransportManager::new(link);

    let session = manager.join_with(&config);
    log::info!("Session up, DevEUI {}", session.dev_eui.as_str());

    let mut node = FieldNode::new(manager);
    let mut climate = ClimateSensor::new(SimulatedClimate { step: 0 });
    let gauge = BatteryGauge::default();

    for cycle in 0..6u16 {
        climate.read();
        let reading = climate.last_valid().unwrap_or(ClimateReading {
            temperature: 0.0,
            humidity: 0.0,
        });
        let battery_mv = 4_100 - cycle * 150;
        let battery = gauge.percent(battery_mv);

        let readings = SensorReadings {
            humidity: reading.humidity_percent(),
            temperature: reading.temperature_i8(),
            soil: scale_percent(2_400 - cycle * 100, 3_000, 1_200),
            light: scale_percent(1_000 + cycle * 300, 0, 4_095),
            battery,
        };

        let report = node.run_cycle(&readings);
        log::info!(
            "cycle {}: mode {:?}, {} byte(s), {:?}, battery {:?}",
            cycle,
            node.mode(),
            report.frame_len,
            report.outcome,
            gauge.state(battery)
        );
    }
}
