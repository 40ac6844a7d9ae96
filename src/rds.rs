//! Radio Data System group decoder
//!
//! RDS data arrives as fixed-format groups of four 16-bit blocks while tuned
//! to an FM station. Groups of the same type repeat continuously and carry
//! their own segment addresses, so assembly is purely additive: any group may
//! arrive before or after any other, identical replays are no-ops and
//! differing replays overwrite (broadcaster correction).
//!
//! The chip reports a per-block error-correction code with every group. A
//! block flagged uncorrectable is discarded on its own; the remaining blocks
//! of the group are still applied.
//!
//! Supported group types:
//! - 0A/0B: 8-character program service name, 2 characters per group
//! - 2A/2B: 64/32-character radio text, 4/2 characters per group, with the
//!   text A/B flag clearing the buffer when the broadcaster starts a new
//!   message
//! - 4A: clock time and date (Modified Julian Day + UTC offset)

/// One raw RDS group: four 16-bit blocks as delivered by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdsGroup {
    blocks: [u16; 4],
}

impl RdsGroup {
    /// Creates a group from its four blocks in A, B, C, D order.
    pub fn new(a: u16, b: u16, c: u16, d: u16) -> Self {
        Self {
            blocks: [a, b, c, d],
        }
    }

    /// Block A: the program identification code.
    pub fn block_a(&self) -> u16 {
        self.blocks[0]
    }

    /// Block B: group type, version, program type and segment address.
    pub fn block_b(&self) -> u16 {
        self.blocks[1]
    }

    /// Block C: payload (version A) or program id again (version B).
    pub fn block_c(&self) -> u16 {
        self.blocks[2]
    }

    /// Block D: payload.
    pub fn block_d(&self) -> u16 {
        self.blocks[3]
    }

    /// The group type tag decoded from block B.
    pub fn group_type(&self) -> RdsGroupType {
        let group = (self.blocks[1] >> 12) as u8;
        let version_b = self.blocks[1] & 0x0800 != 0;
        match (group, version_b) {
            (0, false) => RdsGroupType::BasicTuning0A,
            (0, true) => RdsGroupType::BasicTuning0B,
            (2, false) => RdsGroupType::RadioText2A,
            (2, true) => RdsGroupType::RadioText2B,
            (4, false) => RdsGroupType::ClockTime4A,
            _ => RdsGroupType::Other { group, version_b },
        }
    }

    /// The 5-bit program type code from block B.
    pub fn program_type(&self) -> u8 {
        ((self.blocks[1] >> 5) & 0x1F) as u8
    }
}

/// Decoded group type variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RdsGroupType {
    /// Basic tuning and switching, version A: program service name
    BasicTuning0A,
    /// Basic tuning and switching, version B: program service name
    BasicTuning0B,
    /// Radio text, version A: 4 characters per group
    RadioText2A,
    /// Radio text, version B: 2 characters per group
    RadioText2B,
    /// Clock time and date
    ClockTime4A,
    /// Any group type this decoder does not interpret
    Other {
        /// Group number 0-15
        group: u8,
        /// Version B when set
        version_b: bool,
    },
}

/// Per-block error-correction codes reported by the chip.
///
/// 0 = no errors, 1 = 1-2 bits corrected, 2 = 3-5 bits corrected,
/// 3 = uncorrectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdsBlockErrors {
    /// Error code for block A
    pub block_a: u8,
    /// Error code for block B
    pub block_b: u8,
    /// Error code for block C
    pub block_c: u8,
    /// Error code for block D
    pub block_d: u8,
}

const UNCORRECTABLE: u8 = 3;

impl RdsBlockErrors {
    /// Unpacks the codes from the packed byte (block A in bits 7:6).
    pub fn from_byte(byte: u8) -> Self {
        Self {
            block_a: (byte >> 6) & 0x3,
            block_b: (byte >> 4) & 0x3,
            block_c: (byte >> 2) & 0x3,
            block_d: byte & 0x3,
        }
    }

    fn a_usable(&self) -> bool {
        self.block_a < UNCORRECTABLE
    }

    fn b_usable(&self) -> bool {
        self.block_b < UNCORRECTABLE
    }

    fn c_usable(&self) -> bool {
        self.block_c < UNCORRECTABLE
    }

    fn d_usable(&self) -> bool {
        self.block_d < UNCORRECTABLE
    }
}

/// Decoded clock time from a 4A group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdsTime {
    /// Calendar year (e.g. 2024)
    pub year: u16,
    /// Month 1-12
    pub month: u8,
    /// Day of month 1-31
    pub day: u8,
    /// Hour 0-23, UTC
    pub hour: u8,
    /// Minute 0-59
    pub minute: u8,
    /// Local time offset in half-hour steps, signed
    pub offset_half_hours: i8,
}

/// Rolling assembly state for the currently tuned station.
///
/// Owned by the driver and cleared on every re-tune, seek and band change;
/// callers read the assembled views through the accessors.
#[derive(Debug, Clone)]
pub struct RdsDecoder {
    program_id: Option<u16>,
    program_type: Option<u8>,
    ps: [u8; 8],
    ps_seen: u8,
    rt: [u8; 64],
    rt_seen: u64,
    rt_ab: Option<bool>,
    clock: Option<RdsTime>,
}

impl Default for RdsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RdsDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self {
            program_id: None,
            program_type: None,
            ps: [b' '; 8],
            ps_seen: 0,
            rt: [b' '; 64],
            rt_seen: 0,
            rt_ab: None,
            clock: None,
        }
    }

    /// Drops all assembled state. Called on re-tune and band change.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Applies one group to the assembly buffers.
    ///
    /// Blocks flagged uncorrectable are skipped individually; a group whose
    /// block B is unusable is dropped entirely since the segment address
    /// cannot be trusted.
    pub fn process(&mut self, group: &RdsGroup, errors: RdsBlockErrors) {
        if errors.a_usable() {
            self.program_id = Some(group.block_a());
        }
        if !errors.b_usable() {
            return;
        }
        self.program_type = Some(group.program_type());

        match group.group_type() {
            RdsGroupType::BasicTuning0A | RdsGroupType::BasicTuning0B => {
                if errors.d_usable() {
                    let segment = (group.block_b() & 0x3) as usize;
                    let chars = group.block_d().to_be_bytes();
                    self.ps[2 * segment] = sanitize(chars[0]);
                    self.ps[2 * segment + 1] = sanitize(chars[1]);
                    self.ps_seen |= 0x3 << (2 * segment);
                }
            }
            RdsGroupType::RadioText2A => {
                self.check_text_flag(group.block_b());
                let segment = (group.block_b() & 0xF) as usize;
                if errors.c_usable() {
                    self.set_text(4 * segment, group.block_c());
                }
                if errors.d_usable() {
                    self.set_text(4 * segment + 2, group.block_d());
                }
            }
            RdsGroupType::RadioText2B => {
                self.check_text_flag(group.block_b());
                if errors.d_usable() {
                    let segment = (group.block_b() & 0xF) as usize;
                    self.set_text(2 * segment, group.block_d());
                }
            }
            RdsGroupType::ClockTime4A => {
                if errors.c_usable() && errors.d_usable() {
                    self.decode_clock(group.block_b(), group.block_c(), group.block_d());
                }
            }
            RdsGroupType::Other { .. } => {}
        }
    }

    /// The 8-character program service name, once every segment has arrived.
    pub fn program_service(&self) -> Option<&str> {
        if self.ps_seen != 0xFF {
            return None;
        }
        core::str::from_utf8(&self.ps).ok().map(str::trim_end)
    }

    /// The assembled radio text, once every character up to the terminator
    /// (or the full 64 characters) has arrived.
    pub fn radio_text(&self) -> Option<&str> {
        let end = match self.rt.iter().position(|&b| b == 0x0D) {
            Some(cr) => cr,
            None => 64,
        };
        let needed = if end >= 63 {
            u64::MAX
        } else {
            // CR itself must have been received too
            (1u64 << (end + 1)) - 1
        };
        if self.rt_seen & needed != needed {
            return None;
        }
        core::str::from_utf8(&self.rt[..end]).ok().map(str::trim_end)
    }

    /// The program identification code of the tuned station.
    pub fn program_id(&self) -> Option<u16> {
        self.program_id
    }

    /// The 5-bit program type code of the tuned station.
    pub fn program_type(&self) -> Option<u8> {
        self.program_type
    }

    /// The most recent clock time broadcast, UTC plus local offset.
    pub fn clock_time(&self) -> Option<RdsTime> {
        self.clock
    }

    fn check_text_flag(&mut self, block_b: u16) {
        let flag = block_b & 0x10 != 0;
        if self.rt_ab != Some(flag) {
            // New message announced by the broadcaster
            self.rt = [b' '; 64];
            self.rt_seen = 0;
            self.rt_ab = Some(flag);
        }
    }

    fn set_text(&mut self, index: usize, chars: u16) {
        let chars = chars.to_be_bytes();
        self.rt[index] = sanitize(chars[0]);
        self.rt[index + 1] = sanitize(chars[1]);
        self.rt_seen |= 0x3 << index;
    }

    fn decode_clock(&mut self, block_b: u16, block_c: u16, block_d: u16) {
        let mjd = ((block_b as u32 & 0x3) << 15) | (block_c as u32 >> 1);
        let hour = (((block_c & 0x1) << 4) | (block_d >> 12)) as u8;
        let minute = ((block_d >> 6) & 0x3F) as u8;
        if hour >= 24 || minute >= 60 {
            return;
        }
        let magnitude = (block_d & 0x1F) as i8;
        let offset_half_hours = if block_d & 0x20 != 0 {
            -magnitude
        } else {
            magnitude
        };
        let (year, month, day) = mjd_to_ymd(mjd);
        self.clock = Some(RdsTime {
            year,
            month,
            day,
            hour,
            minute,
            offset_half_hours,
        });
    }
}

/// Replaces characters outside printable ASCII with a space, keeping the
/// radio text carriage-return terminator.
fn sanitize(byte: u8) -> u8 {
    match byte {
        0x0D => byte,
        0x20..=0x7E => byte,
        _ => b' ',
    }
}

/// Converts a Modified Julian Day number to a calendar date, per the
/// algorithm in the RDS standard (CENELEC EN 50067 annex G).
fn mjd_to_ymd(mjd: u32) -> (u16, u8, u8) {
    let mjd = mjd as i64;
    let yp = (20 * mjd - 301_564) / 7305;
    let days_y = yp * 36_525 / 100;
    let mp = (10_000 * (mjd - 14_956) - 10_000 * days_y - 1_000) / 306_001;
    let day = mjd - 14_956 - days_y - mp * 306_001 / 10_000;
    let k = if mp == 14 || mp == 15 { 1 } else { 0 };
    let year = 1900 + yp + k;
    let month = mp - 1 - k * 12;
    (year as u16, month as u8, day as u8)
}
