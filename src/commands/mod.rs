//! Receiver command implementations
//!
//! This module contains the implementation of all Si47xx receiver commands.
//! Commands are organized into functional categories:
//!
//! # Command Categories
//! - [`power`]: Power and bootstrap commands
//!   - Power the receiver up in a selected function (FM, AM/SSB)
//!   - Power down, query revision and interrupt status
//!
//! - [`tune`]: Tuning and signal commands
//!   - Tune to a channel, start a seek
//!   - Read tune completion and received signal quality
//!   - Query and override the AGC
//!
//! - [`property`]: Property access commands
//!   - Write and read the 16-bit property space
//!
//! - [`rds`]: RDS commands
//!   - Drain the RDS group FIFO while tuned to FM
//!
//! # Command Execution
//! Every command is a single I2C write of the opcode byte followed by its
//! packed argument bytes. The chip then processes the command internally and
//! raises the CTS (clear-to-send) bit of the status word when it is ready to
//! accept the next command; the response bytes become valid at the same time.
//!
//! # Common Patterns
//! 1. Wait for CTS before reading the response of the previous command
//! 2. Send the command opcode and arguments in one transaction
//! 3. Poll the one-byte status word until CTS is set
//! 4. Read the fixed-length response (the status word is its first byte)
//!
//! # Important Notes
//! - Tune and seek raise CTS quickly but complete asynchronously; completion
//!   is signaled separately through the STC interrupt bit
//! - FM-only commands are rejected by the chip in AM function and vice versa
//! - The SSB commands share opcodes with AM and require the SSB firmware
//!   patch to be loaded

mod power;
mod property;
mod rds;
mod tune;

pub use power::*;
pub use property::*;
pub use rds::*;
pub use tune::*;

use bitflags::bitflags;
use core::convert::Infallible;

use crate::FromByteArray;

bitflags! {
    /// The one-byte status word prefixed to every response.
    ///
    /// CTS gates command submission; the interrupt bits latch until
    /// acknowledged through the corresponding status command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IntStatus: u8 {
        /// Clear to send: the chip is ready for the next command
        const CTS = 0x80;
        /// The last command was rejected or failed inside the chip
        const ERR = 0x40;
        /// Received signal quality crossed a configured threshold
        const RSQ_INT = 0x08;
        /// RDS FIFO reached the configured depth
        const RDS_INT = 0x04;
        /// Seek or tune operation complete
        const STC_INT = 0x01;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for IntStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "IntStatus({=u8:#x})", self.bits());
    }
}

impl FromByteArray for IntStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self::from_bits_retain(bytes[0]))
    }
}
