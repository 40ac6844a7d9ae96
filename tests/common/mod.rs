//! Simulated Si47xx chip behind an embedded-hal I2C implementation.
//!
//! The simulator models the command/status/response protocol closely enough
//! to exercise the driver end to end: CTS is always ready, STC completion can
//! be delayed or stalled, seeks walk the programmed band by the programmed
//! spacing, and an RDS FIFO can be preloaded with groups.

use std::collections::{HashMap, VecDeque};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

const FM_SEEK_BAND_BOTTOM: u16 = 0x1400;
const FM_SEEK_BAND_TOP: u16 = 0x1401;
const FM_SEEK_SPACING: u16 = 0x1402;
const AM_SEEK_BAND_BOTTOM: u16 = 0x3400;
const AM_SEEK_BAND_TOP: u16 = 0x3401;
const AM_SEEK_SPACING: u16 = 0x3402;

#[derive(Debug)]
pub struct SimError(pub ErrorKind);

impl embedded_hal::i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stc {
    Idle,
    Pending(u32),
    Ready,
}

pub struct SimBus {
    /// Chip absent: every transfer is NAKed
    absent: bool,
    /// Property writes fail on the bus
    fail_property_writes: bool,
    /// Seek/tune never completes
    stall_stc: bool,
    /// GetIntStatus polls before a started seek raises STC
    seek_delay_polls: u32,
    powered: bool,
    patch_mode: bool,
    freq: u16,
    valid: bool,
    band_limit: bool,
    stc: Stc,
    props: HashMap<u16, u16>,
    stations: Vec<u16>,
    rds_fifo: VecDeque<[u16; 4]>,
    response: Vec<u8>,
    pub patch_bytes: usize,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            absent: false,
            fail_property_writes: false,
            stall_stc: false,
            seek_delay_polls: 0,
            powered: false,
            patch_mode: false,
            freq: 0,
            valid: false,
            band_limit: false,
            stc: Stc::Idle,
            props: HashMap::new(),
            stations: Vec::new(),
            rds_fifo: VecDeque::new(),
            response: Vec::new(),
            patch_bytes: 0,
        }
    }

    pub fn with_stations(mut self, stations: &[u16]) -> Self {
        self.stations = stations.to_vec();
        self
    }

    pub fn with_seek_delay(mut self, polls: u32) -> Self {
        self.seek_delay_polls = polls;
        self
    }

    pub fn stalled(mut self) -> Self {
        self.stall_stc = true;
        self
    }

    pub fn absent(mut self) -> Self {
        self.absent = true;
        self
    }

    pub fn failing_property_writes(mut self) -> Self {
        self.fail_property_writes = true;
        self
    }

    pub fn push_rds_group(&mut self, blocks: [u16; 4]) {
        self.rds_fifo.push_back(blocks);
    }

    pub fn property(&self, id: u16) -> Option<u16> {
        self.props.get(&id).copied()
    }

    fn status(&self) -> u8 {
        let mut status = 0x80;
        if self.stc == Stc::Ready {
            status |= 0x01;
        }
        status
    }

    fn start_completion(&mut self, polls: u32) {
        self.stc = if self.stall_stc {
            Stc::Pending(u32::MAX)
        } else if polls == 0 {
            Stc::Ready
        } else {
            Stc::Pending(polls)
        };
    }

    fn tune(&mut self, frequency: u16) {
        self.freq = frequency;
        self.valid = self.stations.contains(&frequency);
        self.band_limit = false;
        self.start_completion(0);
    }

    fn seek(&mut self, up: bool, bottom_id: u16, top_id: u16, spacing_id: u16) {
        let bottom = i32::from(self.props.get(&bottom_id).copied().unwrap_or(1));
        let top = i32::from(self.props.get(&top_id).copied().unwrap_or(u16::MAX));
        let spacing = i32::from(self.props.get(&spacing_id).copied().unwrap_or(1)).max(1);

        let start = i32::from(self.freq);
        let mut f = start;
        self.band_limit = false;
        loop {
            f += if up { spacing } else { -spacing };
            if f > top {
                f = bottom;
                self.band_limit = true;
            } else if f < bottom {
                f = top;
                self.band_limit = true;
            }
            if self.stations.contains(&(f as u16)) {
                self.freq = f as u16;
                self.valid = true;
                break;
            }
            if f == start {
                self.valid = false;
                break;
            }
        }
        let polls = self.seek_delay_polls;
        self.start_completion(polls);
    }

    fn tune_status_response(&mut self, ack: u8, fm: bool) {
        if ack & 0x03 != 0 {
            self.stc = Stc::Idle;
        }
        let freq = self.freq.to_be_bytes();
        let mut flags = 0u8;
        if self.valid {
            flags |= 0x01;
        }
        if self.band_limit {
            flags |= 0x80;
        }
        let rssi = if self.valid { 42 } else { 5 };
        let snr = if self.valid { 30 } else { 2 };
        self.response = if fm {
            vec![0, flags, freq[0], freq[1], rssi, snr, 3, 0]
        } else {
            vec![0, flags, freq[0], freq[1], rssi, snr, 0, 0]
        };
    }

    fn rds_status_response(&mut self) {
        match self.rds_fifo.pop_front() {
            Some(blocks) => {
                let remaining = self.rds_fifo.len() as u8;
                let mut resp = vec![0, 0x01, 0x01, remaining];
                for block in blocks {
                    resp.extend_from_slice(&block.to_be_bytes());
                }
                resp.push(0x00);
                self.response = resp;
            }
            None => {
                self.response = vec![0, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
            }
        }
    }

    fn process_command(&mut self, cmd: &[u8]) {
        self.response.clear();
        match cmd[0] {
            0x01 => {
                self.powered = true;
                self.patch_mode = cmd[1] & 0x20 != 0;
                self.stc = Stc::Idle;
            }
            0x10 => {
                self.response = vec![0, 35, b'6', b'0', 0x00, 0x00, b'6', b'0', b'D'];
            }
            0x11 => {
                self.powered = false;
                self.patch_mode = false;
            }
            0x12 => {
                let id = u16::from_be_bytes([cmd[2], cmd[3]]);
                let value = u16::from_be_bytes([cmd[4], cmd[5]]);
                self.props.insert(id, value);
            }
            0x13 => {
                let id = u16::from_be_bytes([cmd[2], cmd[3]]);
                let value = self.props.get(&id).copied().unwrap_or(0).to_be_bytes();
                self.response = vec![0, 0, value[0], value[1]];
            }
            0x14 => {
                if let Stc::Pending(n) = self.stc {
                    self.stc = if n <= 1 && !self.stall_stc {
                        Stc::Ready
                    } else {
                        Stc::Pending(n.saturating_sub(1))
                    };
                }
            }
            0x20 | 0x40 => {
                self.tune(u16::from_be_bytes([cmd[2], cmd[3]]));
            }
            0x21 => {
                self.seek(
                    cmd[1] & 0x08 != 0,
                    FM_SEEK_BAND_BOTTOM,
                    FM_SEEK_BAND_TOP,
                    FM_SEEK_SPACING,
                );
            }
            0x41 => {
                self.seek(
                    cmd[1] & 0x08 != 0,
                    AM_SEEK_BAND_BOTTOM,
                    AM_SEEK_BAND_TOP,
                    AM_SEEK_SPACING,
                );
            }
            0x22 => self.tune_status_response(cmd[1], true),
            0x42 => self.tune_status_response(cmd[1], false),
            0x23 => {
                self.response = vec![0, 0, 0x01, 0xE4, 50, 28, 2, 0xFF];
            }
            0x43 => {
                self.response = vec![0, 0, 0x01, 0, 40, 18];
            }
            0x24 => self.rds_status_response(),
            0x27 | 0x47 => {
                self.response = vec![0, 0, 10];
            }
            0x28 | 0x48 => {}
            _ => {
                // Patch records and anything else with no modeled effect
                if self.patch_mode {
                    self.patch_bytes += cmd.len();
                }
            }
        }
    }

    fn fill_read(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        let n = buf.len().min(self.response.len());
        buf[..n].copy_from_slice(&self.response[..n]);
        buf[0] = self.status();
    }
}

impl ErrorType for SimBus {
    type Error = SimError;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.absent {
            return Err(SimError(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            )));
        }
        if self.fail_property_writes {
            if let Some(Operation::Write(bytes)) = operations.first() {
                if bytes.first() == Some(&0x12) {
                    return Err(SimError(ErrorKind::Other));
                }
            }
        }

        let mut written: Vec<u8> = Vec::new();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => written.extend_from_slice(bytes),
                Operation::Read(buf) => {
                    if !written.is_empty() {
                        self.process_command(&written);
                        written.clear();
                    }
                    self.fill_read(buf);
                }
            }
        }
        if !written.is_empty() {
            self.process_command(&written);
        }
        Ok(())
    }
}

/// Delay source that spends no real time; deadlines still count down.
pub struct NoopDelay;

impl embedded_hal::delay::DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Reset pin that goes nowhere.
pub struct SimPin;

impl embedded_hal::digital::ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
