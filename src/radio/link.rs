//! Radio session manager
//!
//! [`RadioLink`] owns the modem transport and turns its byte-level operations into
//! a session lifecycle:
//!
//! ```text
//! Uninitialized --reset--> Ready --join--> Joined --send*--> Joined
//! ```
//!
//! Reset and join retry forever with a fixed backoff: a field node without a
//! working radio or without network access has nothing else to do. A send is
//! attempted once and its outcome reported, whatever it is.

use core::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;

use super::traits::{Clock, DownlinkHex, JoinResponse, Transport, TxStatus};
use crate::config::device::{parse_dev_eui, DevEui};
use crate::config::timing::TimingConfig;
use crate::lorawan::downlink::DownlinkResult;

/// Link lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No valid modem identity yet
    Uninitialized,
    /// Modem reset and identified, not joined
    Ready,
    /// OTAA join completed
    Joined,
}

/// State of the physical link after a successful reset
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioSession {
    /// Set once the OTAA join succeeds
    pub joined: bool,
    /// Hardware EUI reported by the modem
    pub dev_eui: DevEui,
    /// Clock reading when the reset completed
    pub last_reset_ms: u64,
}

/// Bookkeeping of the most recent retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryState {
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Time spent in backoff between attempts
    pub waited_ms: u64,
}

/// Why a transmission failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxFailure {
    /// The link has not joined a network
    NotJoined,
    /// The modem refused the frame or reported a MAC error
    Rejected,
    /// Bus error or timeout while talking to the modem
    Transport,
}

/// Result of one send attempt
///
/// `D` is the downlink representation: the raw hex string at the link level, a
/// [`DownlinkResult`] once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome<D = DownlinkResult> {
    /// Sent, no downlink
    Success,
    /// Sent, and a downlink arrived
    SuccessWithDownlink(D),
    /// Not sent, or not acknowledged by the modem
    Failure(TxFailure),
}

impl<D> TxOutcome<D> {
    /// Convert the downlink payload, keeping the outcome kind
    pub fn map_downlink<E, F: FnOnce(D) -> E>(self, f: F) -> TxOutcome<E> {
        match self {
            TxOutcome::Success => TxOutcome::Success,
            TxOutcome::SuccessWithDownlink(d) => TxOutcome::SuccessWithDownlink(f(d)),
            TxOutcome::Failure(reason) => TxOutcome::Failure(reason),
        }
    }

    /// True unless the send failed
    pub fn is_success(&self) -> bool {
        !matches!(self, TxOutcome::Failure(_))
    }

    /// Downlink payload, if any
    pub fn downlink(&self) -> Option<&D> {
        match self {
            TxOutcome::SuccessWithDownlink(d) => Some(d),
            _ => None,
        }
    }
}

/// Session operations the transport manager drives
pub trait SessionLink {
    /// Current lifecycle state
    fn state(&self) -> LinkState;

    /// Reset the modem, retrying until it reports a valid identity
    fn reset(&mut self) -> RadioSession;

    /// Join the network, retrying until accepted
    fn join(&mut self, app_eui: &str, app_key: &str);

    /// Transmit once
    fn send(&mut self, payload: &[u8], await_downlink: bool) -> TxOutcome<DownlinkHex>;
}

impl<L: SessionLink + ?Sized> SessionLink for &mut L {
    fn state(&self) -> LinkState {
        (**self).state()
    }

    fn reset(&mut self) -> RadioSession {
        (**self).reset()
    }

    fn join(&mut self, app_eui: &str, app_key: &str) {
        (**self).join(app_eui, app_key)
    }

    fn send(&mut self, payload: &[u8], await_downlink: bool) -> TxOutcome<DownlinkHex> {
        (**self).send(payload, await_downlink)
    }
}

/// Indicator for boards without a TX LED
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl OutputPin for NoIndicator {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Holds the indicator high until dropped
struct IndicatorGuard<'a, I: OutputPin> {
    pin: &'a mut I,
}

impl<'a, I: OutputPin> IndicatorGuard<'a, I> {
    fn new(pin: &'a mut I) -> Self {
        if pin.set_high().is_err() {
            warn!("Indicator could not be switched on");
        }
        Self { pin }
    }
}

impl<I: OutputPin> Drop for IndicatorGuard<'_, I> {
    fn drop(&mut self) {
        if self.pin.set_low().is_err() {
            warn!("Indicator could not be switched off");
        }
    }
}

/// Step of the reset sequence that went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum ResetFault {
    ResetLine,
    Flush,
    Autobaud,
    Identifier,
    BadIdentifier,
}

/// Radio session manager
pub struct RadioLink<T, C, I = NoIndicator> {
    transport: T,
    clock: C,
    indicator: I,
    timing: TimingConfig,
    state: LinkState,
    session: Option<RadioSession>,
    last_reset: RetryState,
    last_join: RetryState,
}

impl<T: Transport, C: Clock, I: OutputPin> RadioLink<T, C, I> {
    /// Create a link in the `Uninitialized` state
    pub fn new(transport: T, clock: C, indicator: I, timing: TimingConfig) -> Self {
        Self {
            transport,
            clock,
            indicator,
            timing,
            state: LinkState::Uninitialized,
            session: None,
            last_reset: RetryState::default(),
            last_join: RetryState::default(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Current session, if the modem has been reset successfully
    pub fn session(&self) -> Option<&RadioSession> {
        self.session.as_ref()
    }

    /// Retry bookkeeping of the last reset
    pub fn last_reset(&self) -> RetryState {
        self.last_reset
    }

    /// Retry bookkeeping of the last join
    pub fn last_join(&self) -> RetryState {
        self.last_join
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Borrow the indicator
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Release the owned resources
    pub fn free(self) -> (T, C, I) {
        (self.transport, self.clock, self.indicator)
    }

    /// Reset the modem until it reports a well-formed identifier
    ///
    /// Never returns without a valid session. Any existing session is dropped first.
    pub fn reset(&mut self) -> RadioSession {
        self.state = LinkState::Uninitialized;
        self.session = None;

        let mut retry = RetryState::default();
        loop {
            retry.attempts += 1;
            match self.try_reset() {
                Ok(dev_eui) => {
                    info!("Radio init OK. DevEUI: {}", dev_eui.as_str());
                    let session = RadioSession {
                        joined: false,
                        dev_eui,
                        last_reset_ms: self.clock.now_ms(),
                    };
                    self.state = LinkState::Ready;
                    self.session = Some(session.clone());
                    self.last_reset = retry;
                    return session;
                }
                Err(fault) => {
                    warn!(
                        "Radio comms failed ({:?}), retrying in {} ms",
                        fault,
                        self.timing.reset_retry_ms
                    );
                    self.clock.sleep_ms(self.timing.reset_retry_ms);
                    retry.waited_ms += u64::from(self.timing.reset_retry_ms);
                }
            }
        }
    }

    fn try_reset(&mut self) -> Result<DevEui, ResetFault> {
        self.transport
            .set_reset_line(false)
            .map_err(|_| ResetFault::ResetLine)?;
        self.clock.sleep_ms(self.timing.reset_pulse_ms);
        self.transport
            .set_reset_line(true)
            .map_err(|_| ResetFault::ResetLine)?;
        self.clock.sleep_ms(self.timing.reset_settle_ms);

        self.transport.flush().map_err(|_| ResetFault::Flush)?;
        self.transport.autobaud().map_err(|_| ResetFault::Autobaud)?;

        let id = self
            .transport
            .read_identifier()
            .map_err(|_| ResetFault::Identifier)?;
        parse_dev_eui(&id).ok_or(ResetFault::BadIdentifier)
    }

    /// Join the network over OTAA until accepted
    ///
    /// An `Uninitialized` link is reset first.
    pub fn join(&mut self, app_eui: &str, app_key: &str) {
        if self.state == LinkState::Uninitialized {
            warn!("Join requested before reset, resetting radio");
            self.reset();
        }
        self.state = LinkState::Ready;
        if let Some(session) = self.session.as_mut() {
            session.joined = false;
        }

        let mut retry = RetryState::default();
        loop {
            retry.attempts += 1;
            info!("Attempting join ({})...", retry.attempts);
            match self.transport.join(app_eui, app_key) {
                Ok(JoinResponse::Accepted) => break,
                Ok(JoinResponse::Denied) => {
                    warn!(
                        "Join denied. Retrying in {} ms",
                        self.timing.join_retry_ms
                    );
                }
                Err(_) => {
                    warn!(
                        "Join timed out or modem error. Retrying in {} ms",
                        self.timing.join_retry_ms
                    );
                }
            }
            self.clock.sleep_ms(self.timing.join_retry_ms);
            retry.waited_ms += u64::from(self.timing.join_retry_ms);
        }

        self.state = LinkState::Joined;
        if let Some(session) = self.session.as_mut() {
            session.joined = true;
        }
        self.last_join = retry;
        info!("Joined network after {} attempt(s)", retry.attempts);
    }

    /// Transmit `payload` once
    ///
    /// The indicator is high for the duration of the modem exchange. Failures are
    /// returned, never retried, and never change the link state.
    pub fn send(&mut self, payload: &[u8], await_downlink: bool) -> TxOutcome<DownlinkHex> {
        if self.state != LinkState::Joined {
            warn!("Send requested while not joined");
            return TxOutcome::Failure(TxFailure::NotJoined);
        }

        let status = {
            let _indicator = IndicatorGuard::new(&mut self.indicator);
            self.transport.send(payload)
        };

        match status {
            Ok(TxStatus::Success) => {
                debug!("TX success (no downlink)");
                TxOutcome::Success
            }
            Ok(TxStatus::SuccessWithRx(hex)) if await_downlink => {
                info!("RX downlink hex: {}", hex.as_str());
                TxOutcome::SuccessWithDownlink(hex)
            }
            Ok(TxStatus::SuccessWithRx(_)) => {
                debug!("TX success, downlink ignored");
                TxOutcome::Success
            }
            Ok(TxStatus::Failed) => {
                warn!("TX rejected by modem");
                TxOutcome::Failure(TxFailure::Rejected)
            }
            Err(_) => {
                error!("TX failed: modem did not respond");
                TxOutcome::Failure(TxFailure::Transport)
            }
        }
    }
}

impl<T: Transport, C: Clock, I: OutputPin> SessionLink for RadioLink<T, C, I> {
    fn state(&self) -> LinkState {
        self.state
    }

    fn reset(&mut self) -> RadioSession {
        RadioLink::reset(self)
    }

    fn join(&mut self, app_eui: &str, app_key: &str) {
        RadioLink::join(self, app_eui, app_key)
    }

    fn send(&mut self, payload: &[u8], await_downlink: bool) -> TxOutcome<DownlinkHex> {
        RadioLink::send(self, payload, await_downlink)
    }
}
