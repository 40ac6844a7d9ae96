//! RDS commands
//!
//! One command drains the chip's RDS group FIFO. Groups arrive while tuned to
//! an FM station with RDS enabled through [`crate::Property::FmRdsConfig`];
//! assembly of station name, radio text and clock time happens in
//! [`crate::rds`].

use bitflags::bitflags;
use core::convert::Infallible;

use crate::rds::{RdsBlockErrors, RdsGroup};
use crate::{Command, FromByteArray, IntStatus, ToByteArray};

bitflags! {
    /// RDS status acknowledge flags (ARG1 of FmRdsStatus).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RdsAck: u8 {
        /// Return status without popping a group from the FIFO
        const STATUS_ONLY = 0x04;
        /// Empty the FIFO
        const CLEAR_FIFO = 0x02;
        /// Clear the latched RDS interrupt bit
        const INT_ACK = 0x01;
    }
}

impl ToByteArray for RdsAck {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// RDS status response: one group popped from the FIFO plus sync state.
///
/// # Response Layout
/// - byte 0: status word
/// - byte 1: RDSRECV (0x01), sync lost/found and new-block flags
/// - byte 2: RDSSYNC (0x01), GRPLOST (0x04)
/// - byte 3: groups remaining in the FIFO
/// - bytes 4-11: blocks A-D, big-endian 16-bit each
/// - byte 12: per-block error codes, 2 bits per block (A in bits 7:6)
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RdsStatusResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// The FIFO held at least the configured interrupt depth
    pub group_received: bool,
    /// RDS synchronization was lost since the last read
    pub sync_lost: bool,
    /// RDS synchronization was acquired since the last read
    pub sync_found: bool,
    /// The decoder is currently synchronized
    pub synced: bool,
    /// One or more groups were dropped because the FIFO overflowed
    pub group_lost: bool,
    /// Groups remaining in the FIFO after this read
    pub fifo_used: u8,
    /// The group popped by this read
    pub group: RdsGroup,
    /// Chip-reported error correction state per block
    pub block_errors: RdsBlockErrors,
}

impl FromByteArray for RdsStatusResponse {
    type Error = Infallible;
    type Array = [u8; 13];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            group_received: bytes[1] & 0x01 != 0,
            sync_lost: bytes[1] & 0x02 != 0,
            sync_found: bytes[1] & 0x04 != 0,
            synced: bytes[2] & 0x01 != 0,
            group_lost: bytes[2] & 0x04 != 0,
            fifo_used: bytes[3],
            group: RdsGroup::new(
                u16::from_be_bytes([bytes[4], bytes[5]]),
                u16::from_be_bytes([bytes[6], bytes[7]]),
                u16::from_be_bytes([bytes[8], bytes[9]]),
                u16::from_be_bytes([bytes[10], bytes[11]]),
            ),
            block_errors: RdsBlockErrors::from_byte(bytes[12]),
        })
    }
}

/// FmRdsStatus command (0x24)
///
/// Pops one group from the RDS FIFO and reports decoder sync state. Only
/// meaningful in FM function with RDS enabled.
#[derive(Debug, Clone)]
pub struct FmRdsStatus {
    /// Acknowledge flags
    pub ack: RdsAck,
}

impl Command for FmRdsStatus {
    type IdType = u8;
    type CommandParameters = RdsAck;
    type ResponseParameters = RdsStatusResponse;

    fn id() -> Self::IdType {
        0x24
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.ack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rds_status_decodes_blocks_and_errors() {
        let resp = RdsStatusResponse::from_bytes([
            0x84, 0x01, 0x01, 0x02, 0x12, 0x34, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0b01_00_11_00,
        ])
        .unwrap();
        assert!(resp.group_received);
        assert!(resp.synced);
        assert_eq!(resp.fifo_used, 2);
        assert_eq!(resp.group.block_a(), 0x1234);
        assert_eq!(resp.group.block_d(), 0x89AB);
        assert_eq!(resp.block_errors.block_a, 1);
        assert_eq!(resp.block_errors.block_b, 0);
        assert_eq!(resp.block_errors.block_c, 3);
        assert_eq!(resp.block_errors.block_d, 0);
    }
}
