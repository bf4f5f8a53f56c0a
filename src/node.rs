//! Application cycle
//!
//! A freshly deployed node does not know which calibration profile it serves. It
//! starts in setup mode and sends small keep-alive frames until a downlink assigns
//! a profile. From then on it sends full sensor frames. A later downlink may switch
//! the profile again.

use crate::{
    device::TransportManager,
    lorawan::{
        commands::AppCommand,
        downlink::DownlinkResult,
        uplink::{SensorReadings, UplinkFrame},
    },
    radio::link::{SessionLink, TxOutcome},
    sensor::threshold::ThresholdLevel,
};

/// Operating mode of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeMode {
    /// Waiting for a profile; sends keep-alives
    Setup,
    /// Profile assigned; sends sensor data
    Active(ThresholdLevel),
}

/// What happened during one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Length of the frame sent
    pub frame_len: usize,
    /// Transmission outcome
    pub outcome: TxOutcome,
    /// Command received in this cycle, if any
    pub command: Option<AppCommand>,
}

/// Field node application state
pub struct FieldNode<L> {
    manager: TransportManager<L>,
    mode: NodeMode,
}

impl<L: SessionLink> FieldNode<L> {
    /// Start in setup mode
    pub fn new(manager: TransportManager<L>) -> Self {
        Self {
            manager,
            mode: NodeMode::Setup,
        }
    }

    /// Start directly in active mode with a known profile
    pub fn with_profile(manager: TransportManager<L>, level: ThresholdLevel) -> Self {
        Self {
            manager,
            mode: NodeMode::Active(level),
        }
    }

    /// Current mode
    pub fn mode(&self) -> NodeMode {
        self.mode
    }

    /// Active profile, if any
    pub fn profile(&self) -> Option<ThresholdLevel> {
        match self.mode {
            NodeMode::Setup => None,
            NodeMode::Active(level) => Some(level),
        }
    }

    /// Borrow the transport manager
    pub fn manager(&self) -> &TransportManager<L> {
        &self.manager
    }

    /// Mutably borrow the transport manager
    pub fn manager_mut(&mut self) -> &mut TransportManager<L> {
        &mut self.manager
    }

    /// Run one uplink cycle
    ///
    /// `readings` is only sent in active mode. A profile command switches the node
    /// to (or keeps it in) active mode with the new level. A failed send never
    /// changes the mode.
    pub fn run_cycle(&mut self, readings: &SensorReadings) -> CycleReport {
        let frame = match self.mode {
            NodeMode::Setup => UplinkFrame::KeepAlive,
            NodeMode::Active(_) => UplinkFrame::Sensor(*readings),
        };

        let outcome = self.manager.transmit(&frame);
        let command = match &outcome {
            TxOutcome::SuccessWithDownlink(DownlinkResult::Malformed(_)) => {
                warn!("Ignoring malformed downlink");
                None
            }
            TxOutcome::SuccessWithDownlink(downlink) => AppCommand::from_downlink(downlink),
            _ => None,
        };

        match command {
            Some(AppCommand::SelectProfile(level)) => {
                info!("Profile selected: level {}", level.as_raw());
                self.mode = NodeMode::Active(level);
            }
            Some(AppCommand::Unsupported(value)) => {
                warn!("Unsupported downlink command {}", value);
            }
            None => {}
        }

        CycleReport {
            frame_len: frame.len(),
            outcome,
            command,
        }
    }
}
