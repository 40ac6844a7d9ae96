//! Power and bootstrap commands
//!
//! This module contains the commands that bring the receiver in and out of
//! operation:
//! - Power-up with function selection (FM or AM/SSB) and audio path
//! - Power-down into the low-current state
//! - Silicon/firmware revision query
//! - Interrupt status query used to poll seek/tune completion
//!
//! The power-up function selects which command set the chip accepts until the
//! next power cycle; switching between FM and AM/SSB requires powering down
//! first.

use bitflags::bitflags;
use core::convert::Infallible;

use crate::{Command, FromByteArray, IntStatus, NoParameters, ToByteArray};

bitflags! {
    /// Power-up option flags (ARG1 high nibble).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerUpFlags: u8 {
        /// Enable the CTS interrupt on GPO2/INT
        const CTS_INT_ENABLE = 0x80;
        /// Enable the GPO2/INT output pin
        const GPO2_ENABLE = 0x40;
        /// Boot into patch-download mode instead of starting the receiver
        const PATCH = 0x20;
        /// Use the crystal oscillator (32.768 kHz on RCLK) as reference
        const CRYSTAL_ENABLE = 0x10;
    }
}

/// Receiver function selected at power-up (ARG1 low nibble).
///
/// SSB reception uses the AM function with the SSB firmware patch loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioFunction {
    /// FM broadcast receiver (0x0)
    FmReceiver = 0x0,
    /// AM receiver, also covering LW/SW and patched SSB (0x1)
    AmReceiver = 0x1,
}

/// Audio output path selection (ARG2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpMode {
    /// Analog audio on LOUT/ROUT (0x05)
    AnalogAudio = 0x05,
    /// Digital audio on DCLK/DFS/DIO (0x0B)
    DigitalAudio1 = 0x0B,
    /// Digital audio on LOUT/DFS/ROUT (0xB0)
    DigitalAudio2 = 0xB0,
    /// Analog and digital audio outputs together (0xB5)
    AnalogDigitalAudio = 0xB5,
}

/// Power-up arguments: option flags, function and audio path.
#[derive(Debug, Clone, Copy)]
pub struct PowerUpArgs {
    /// Option flags packed into the high bits of ARG1
    pub flags: PowerUpFlags,
    /// Receiver function packed into the low bits of ARG1
    pub function: RadioFunction,
    /// Audio output path (ARG2)
    pub opmode: OpMode,
}

impl ToByteArray for PowerUpArgs {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits() | self.function as u8, self.opmode as u8])
    }
}

/// PowerUp command (0x01)
///
/// Boots the chip into the selected receiver function. The chip is not ready
/// for further commands until CTS is raised, which can take several
/// milliseconds with the crystal oscillator option.
///
/// # Important Notes
/// - Issued while powered up, the command is rejected with the ERR bit
/// - With [`PowerUpFlags::PATCH`] the chip waits for patch data instead of
///   starting reception
#[derive(Debug, Clone)]
pub struct PowerUp {
    /// Power-up arguments
    pub args: PowerUpArgs,
}

impl Command for PowerUp {
    type IdType = u8;
    type CommandParameters = PowerUpArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x01
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}

/// PowerDown command (0x11)
///
/// Moves the chip into its low-current powered-down state. Only PowerUp is
/// accepted afterwards.
#[derive(Debug, Clone)]
pub struct PowerDown;

impl Command for PowerDown {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x11
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Silicon and firmware revision information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Revision {
    /// Final two digits of the part number (e.g. 35 for the Si4735)
    pub part_number: u8,
    /// Firmware revision, major digit (ASCII)
    pub firmware_major: u8,
    /// Firmware revision, minor digit (ASCII)
    pub firmware_minor: u8,
    /// Patch id, high byte
    pub patch_high: u8,
    /// Patch id, low byte
    pub patch_low: u8,
    /// Component revision, major digit (ASCII)
    pub component_major: u8,
    /// Component revision, minor digit (ASCII)
    pub component_minor: u8,
    /// Chip die revision (ASCII)
    pub chip_revision: u8,
}

/// GetRevision response: status word plus the eight revision bytes.
#[derive(Debug, Clone, Copy)]
pub struct GetRevisionResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// Decoded revision information
    pub revision: Revision,
}

impl FromByteArray for GetRevisionResponse {
    type Error = Infallible;
    type Array = [u8; 9];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            revision: Revision {
                part_number: bytes[1],
                firmware_major: bytes[2],
                firmware_minor: bytes[3],
                patch_high: bytes[4],
                patch_low: bytes[5],
                component_major: bytes[6],
                component_minor: bytes[7],
                chip_revision: bytes[8],
            },
        })
    }
}

/// GetRevision command (0x10)
///
/// Returns the part number and firmware/component revisions. Also serves as
/// the cheapest post-power-up presence check: a part that answers this command
/// is alive on the bus.
#[derive(Debug, Clone)]
pub struct GetRevision;

impl Command for GetRevision {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = GetRevisionResponse;

    fn id() -> Self::IdType {
        0x10
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// GetIntStatus command (0x14)
///
/// Refreshes and returns the status word. Used by the completion-poll loops
/// to observe the STC (seek/tune complete) and RDS interrupt bits without
/// acknowledging them.
#[derive(Debug, Clone)]
pub struct GetIntStatus;

impl Command for GetIntStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x14
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_args_pack_flags_and_function() {
        let args = PowerUpArgs {
            flags: PowerUpFlags::CRYSTAL_ENABLE | PowerUpFlags::GPO2_ENABLE,
            function: RadioFunction::AmReceiver,
            opmode: OpMode::AnalogAudio,
        };
        assert_eq!(args.to_bytes().unwrap(), [0x51, 0x05]);
    }

    #[test]
    fn revision_response_decodes_all_fields() {
        let resp = GetRevisionResponse::from_bytes([
            0x80, 35, b'6', b'0', 0x12, 0x34, b'6', b'0', b'D',
        ])
        .unwrap();
        assert!(resp.status.contains(IntStatus::CTS));
        assert_eq!(resp.revision.part_number, 35);
        assert_eq!(resp.revision.patch_high, 0x12);
        assert_eq!(resp.revision.chip_revision, b'D');
    }
}
