//! High-level transport interface
//!
//! [`TransportManager`] is the single entry point the application loop uses to
//! bring the radio up and to send frames. It drives a link built elsewhere and
//! never retries a routine uplink: whether to skip a cycle or try again is the
//! application's call.

/// Battery gauge
pub mod power;

use crate::{
    config::device::DeviceConfig,
    lorawan::{
        downlink::{self, DownlinkResult},
        uplink::{UplinkFrame, SENSOR_FRAME_LEN},
    },
    radio::link::{LinkState, RadioSession, SessionLink, TxOutcome},
};

/// Sequences link operations into `initialize_and_join` and `transmit`
pub struct TransportManager<L> {
    link: L,
}

impl<L: SessionLink> TransportManager<L> {
    /// Drive an already-constructed link
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Reset the radio once, then join; blocks until both succeed
    pub fn initialize_and_join(&mut self, app_eui: &str, app_key: &str) -> RadioSession {
        let mut session = self.link.reset();
        self.link.join(app_eui, app_key);
        session.joined = true;
        session
    }

    /// [`initialize_and_join`](Self::initialize_and_join) with stored credentials
    pub fn join_with(&mut self, config: &DeviceConfig) -> RadioSession {
        self.initialize_and_join(config.app_eui.as_str(), config.app_key.as_str())
    }

    /// Send one frame and decode any downlink
    ///
    /// A downlink that decodes to nothing is reported as plain `Success`.
    pub fn transmit(&mut self, frame: &UplinkFrame) -> TxOutcome {
        let mut buf = [0u8; SENSOR_FRAME_LEN];
        let payload = frame.encode_into(&mut buf);
        match frame {
            UplinkFrame::KeepAlive => info!("TX: keep-alive"),
            UplinkFrame::Sensor(r) => info!(
                "TX: sensor data hum {} temp {} soil {} light {} batt {}",
                r.humidity,
                r.temperature,
                r.soil,
                r.light,
                r.battery
            ),
        }

        match self.link.send(payload, true).map_downlink(|hex| downlink::decode(&hex)) {
            TxOutcome::SuccessWithDownlink(DownlinkResult::NoDownlink) => TxOutcome::Success,
            outcome => outcome,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.link.state()
    }

    /// Borrow the link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the link
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Release the link
    pub fn into_inner(self) -> L {
        self.link
    }
}
