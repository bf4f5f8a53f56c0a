use core::fmt::Write as _;

use embedded_hal::{
    blocking::delay::DelayUs,
    digital::v2::OutputPin,
    serial::{Read, Write},
};
use heapless::String;

use super::traits::{
    DownlinkHex, JoinResponse, Transport, TxStatus, MAX_APP_PAYLOAD, MAX_DOWNLINK_HEX,
};
use crate::config::device::DevEui;
use crate::config::modem::Rn2483Config;

/// Longest reply line kept, in bytes; fits `mac_rx <port> ` and a full downlink
pub const MAX_LINE_LEN: usize = 16 + MAX_DOWNLINK_HEX;
/// Largest uplink payload accepted, in bytes
pub const MAX_PAYLOAD_LEN: usize = MAX_APP_PAYLOAD;

/// Attempts at reading a version string during autobaud
const AUTOBAUD_ATTEMPTS: u8 = 10;
/// Poll period while waiting for reply bytes
const POLL_INTERVAL_US: u32 = 50;
/// Upper bound on bytes discarded by a flush
const FLUSH_LIMIT: usize = 1024;

type Line = String<MAX_LINE_LEN>;
type Command = String<{ 32 + 2 * MAX_PAYLOAD_LEN }>;

/// Possible errors talking to the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rn2483Error {
    /// UART read or write error
    Serial,
    /// Reset pin error
    Gpio,
    /// No complete reply within the timeout
    Timeout,
    /// Reply line longer than [`MAX_LINE_LEN`]
    LineTooLong,
    /// Reply that does not belong to the command sent
    Unexpected,
    /// Payload larger than [`MAX_PAYLOAD_LEN`]
    PayloadTooLarge,
}

/// RN2483 LoRaWAN modem driven over its ASCII command interface
///
/// Every command is a line terminated by `\r\n`; every reply is a line as well.
/// `mac join` and `mac tx` answer twice: `ok` when the command is accepted and a
/// second line once the exchange with the network is over.
pub struct Rn2483<S, RST, D> {
    serial: S,
    reset: RST,
    delay: D,
    config: Rn2483Config,
    hweui: Option<DevEui>,
}

impl<S, RST, D> Rn2483<S, RST, D>
where
    S: Read<u8> + Write<u8>,
    RST: OutputPin,
    D: DelayUs<u32>,
{
    /// Create new instance of the RN2483 driver
    pub fn new(serial: S, reset: RST, delay: D, config: Rn2483Config) -> Self {
        Self {
            serial,
            reset,
            delay,
            config,
            hweui: None,
        }
    }

    /// Modem settings
    pub fn config(&self) -> &Rn2483Config {
        &self.config
    }

    /// Release the serial port, reset pin and delay
    pub fn free(self) -> (S, RST, D) {
        (self.serial, self.reset, self.delay)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Rn2483Error> {
        for &b in bytes {
            nb::block!(self.serial.write(b)).map_err(|_| Rn2483Error::Serial)?;
        }
        Ok(())
    }

    fn write_command(&mut self, command: &str) -> Result<(), Rn2483Error> {
        debug!("RN2483 << {}", command);
        self.write_bytes(command.as_bytes())?;
        self.write_bytes(b"\r\n")?;
        nb::block!(self.serial.flush()).map_err(|_| Rn2483Error::Serial)
    }

    /// Read one reply line, without its terminator
    ///
    /// An overlong line is consumed up to its terminator before `LineTooLong` is
    /// returned, so the next reply starts on a line boundary.
    fn read_line(&mut self, timeout_ms: u32) -> Result<Line, Rn2483Error> {
        let mut line = Line::new();
        let mut overflow = false;
        let mut budget = timeout_ms.saturating_mul(1_000 / POLL_INTERVAL_US);

        loop {
            match self.serial.read() {
                Ok(b'\n') if overflow => {
                    warn!("RN2483 reply longer than {} bytes dropped", MAX_LINE_LEN);
                    return Err(Rn2483Error::LineTooLong);
                }
                Ok(b'\n') => {
                    debug!("RN2483 >> {}", line.as_str());
                    return Ok(line);
                }
                Ok(b'\r') => {}
                Ok(byte) => {
                    if !overflow && line.push(char::from(byte)).is_err() {
                        overflow = true;
                    }
                }
                Err(nb::Error::WouldBlock) => {
                    if budget == 0 {
                        return Err(Rn2483Error::Timeout);
                    }
                    budget -= 1;
                    self.delay.delay_us(POLL_INTERVAL_US);
                }
                Err(nb::Error::Other(_)) => return Err(Rn2483Error::Serial),
            }
        }
    }

    fn command(&mut self, command: &str) -> Result<Line, Rn2483Error> {
        self.write_command(command)?;
        self.read_line(self.config.response_timeout_ms)
    }

    fn expect_ok(&mut self, command: &str) -> Result<(), Rn2483Error> {
        let reply = self.command(command)?;
        if reply.as_str() == "ok" {
            Ok(())
        } else {
            warn!("RN2483 rejected command: {}", reply.as_str());
            Err(Rn2483Error::Unexpected)
        }
    }

    fn hweui(&mut self) -> Result<DevEui, Rn2483Error> {
        if let Some(eui) = &self.hweui {
            return Ok(eui.clone());
        }
        self.read_identifier()
    }
}

impl<S, RST, D> Transport for Rn2483<S, RST, D>
where
    S: Read<u8> + Write<u8>,
    RST: OutputPin,
    D: DelayUs<u32>,
{
    type Error = Rn2483Error;

    fn set_reset_line(&mut self, high: bool) -> Result<(), Self::Error> {
        if high {
            self.reset.set_high().map_err(|_| Rn2483Error::Gpio)
        } else {
            self.hweui = None;
            self.reset.set_low().map_err(|_| Rn2483Error::Gpio)
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        nb::block!(self.serial.flush()).map_err(|_| Rn2483Error::Serial)?;
        for _ in 0..FLUSH_LIMIT {
            match self.serial.read() {
                Ok(_) => {}
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(_)) => return Err(Rn2483Error::Serial),
            }
        }
        Ok(())
    }

    fn autobaud(&mut self) -> Result<(), Self::Error> {
        for _ in 0..AUTOBAUD_ATTEMPTS {
            // A zero byte stands in for the break condition, 0x55 sets the rate.
            self.write_bytes(&[0x00, 0x55])?;
            self.write_bytes(b"\r\n")?;
            match self.command("sys get ver") {
                Ok(version) if !version.is_empty() => {
                    debug!("RN2483 firmware: {}", version.as_str());
                    return Ok(());
                }
                Ok(_) | Err(Rn2483Error::Timeout) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Rn2483Error::Timeout)
    }

    fn read_identifier(&mut self) -> Result<DevEui, Self::Error> {
        let reply = self.command("sys get hweui")?;
        let mut eui = DevEui::new();
        eui.push_str(reply.as_str())
            .map_err(|_| Rn2483Error::Unexpected)?;
        self.hweui = Some(eui.clone());
        Ok(eui)
    }

    fn join(&mut self, app_eui: &str, app_key: &str) -> Result<JoinResponse, Self::Error> {
        let hweui = self.hweui()?;
        let mut cmd = Command::new();

        write!(cmd, "mac reset {}", self.config.band.as_arg()).map_err(|_| Rn2483Error::Unexpected)?;
        self.expect_ok(&cmd)?;

        cmd.clear();
        write!(cmd, "mac set deveui {}", hweui.as_str()).map_err(|_| Rn2483Error::Unexpected)?;
        self.expect_ok(&cmd)?;

        cmd.clear();
        write!(cmd, "mac set appeui {}", app_eui).map_err(|_| Rn2483Error::Unexpected)?;
        self.expect_ok(&cmd)?;

        cmd.clear();
        write!(cmd, "mac set appkey {}", app_key).map_err(|_| Rn2483Error::Unexpected)?;
        self.expect_ok(&cmd)?;

        let reply = self.command("mac join otaa")?;
        if reply.as_str() != "ok" {
            // keys_not_init, no_free_ch, silent, busy, mac_paused
            warn!("Join not started: {}", reply.as_str());
            return Ok(JoinResponse::Denied);
        }

        let result = self.read_line(self.config.join_timeout_ms)?;
        match result.as_str() {
            "accepted" => Ok(JoinResponse::Accepted),
            "denied" => Ok(JoinResponse::Denied),
            _ => Err(Rn2483Error::Unexpected),
        }
    }

    fn send(&mut self, payload: &[u8]) -> Result<TxStatus, Self::Error> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Rn2483Error::PayloadTooLarge);
        }

        let kind = if self.config.confirmed { "cnf" } else { "uncnf" };
        let mut cmd = Command::new();
        write!(cmd, "mac tx {} {} ", kind, self.config.port).map_err(|_| Rn2483Error::Unexpected)?;
        for b in payload {
            write!(cmd, "{:02X}", b).map_err(|_| Rn2483Error::Unexpected)?;
        }

        let reply = self.command(&cmd)?;
        if reply.as_str() != "ok" {
            // not_joined, no_free_ch, busy, invalid_data_len, frame_counter_err_rejoin_needed
            warn!("TX not started: {}", reply.as_str());
            return Ok(TxStatus::Failed);
        }

        let result = self.read_line(self.config.tx_timeout_ms)?;
        let result = result.as_str();
        if result == "mac_tx_ok" {
            return Ok(TxStatus::Success);
        }
        if let Some(rest) = result.strip_prefix("mac_rx ") {
            // mac_rx <port> <data>
            let data = rest.split_once(' ').map(|(_, data)| data).unwrap_or("");
            let mut hex = DownlinkHex::new();
            hex.push_str(data).map_err(|_| Rn2483Error::LineTooLong)?;
            return Ok(TxStatus::SuccessWithRx(hex));
        }

        warn!("TX failed: {}", result);
        Ok(TxStatus::Failed)
    }
}
