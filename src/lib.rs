#![no_std]
//! Si4732/35 Radio Receiver Driver
//!
//! This crate provides a type-safe interface for the Silicon Labs Si4732/Si4735
//! single-chip AM/FM/SSB broadcast receivers. The Si47xx family integrates the
//! complete receive chain from antenna to audio output and is controlled through
//! a small command/response protocol over I2C.
//!
//! # Features
//! - FM broadcast reception (64-108 MHz) with RDS/RBDS decoding
//! - AM reception covering MW/LW and SW (149 kHz-23 MHz)
//! - SSB (LSB/USB) reception via the chip firmware patch mechanism
//! - Station seek with configurable RSSI/SNR thresholds and band wrap
//! - Typed access to the chip property space (AGC, soft mute, blend,
//!   bandwidth, seek thresholds, BFO) with range validation
//! - Signal quality metrics: RSSI, SNR, multipath, stereo pilot/blend
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Low-level bus transport
//!   - Owns the I2C address (SEN pin variant) and the CTS handshake
//!   - Executes typed commands and streams firmware patch chunks
//!
//! - [`commands`]: Command interface for receiver control
//!   - [`commands::power`]: Power-up/down, revision and interrupt status
//!   - [`commands::tune`]: Tune, seek, tune/RSQ status and AGC commands
//!   - [`commands::property`]: Property get/set commands
//!   - [`commands::rds`]: RDS FIFO status command
//!
//! - [`radio`]: The blocking tuning state machine
//!   - Orchestrates power-up, band selection, tune, seek and mode switches
//!   - Owns the completion-poll loops and their timeout budgets
//!
//! - [`rds`]: Radio Data System group decoder
//!   - Assembles station name, radio text and clock time from raw groups
//!
//! - [`properties`]: The closed enumeration of chip property ids with
//!   documented ranges and mode validity
//!
//! # Usage
//! The driver uses the `regiface` crate to provide a type-safe interface for
//! command encoding and response decoding. The main entry point is the
//! [`Si4735`] struct, which wraps an I2C bus, the reset pin and a delay source.
//!
//! A session follows a specific sequence:
//!
//! 1. Create a [`Si4735`] with your bus, reset pin and delay implementation
//! 2. Select a band with `set_fm`/`set_am` (or upload a patch and `set_ssb`)
//! 3. Tune or seek; both block until the chip signals completion
//! 4. Poll RDS while tuned to an FM station, query signal quality at will
//!
//! # Important Notes
//! - All operations against one device are serialized; the driver never
//!   issues a command while another is outstanding
//! - Tune and seek complete asynchronously inside the chip; this driver
//!   models them as blocking calls with per-operation timeout budgets
//! - Multi-threaded hosts must wrap the driver in their own exclusion
//!   mechanism; the core itself is single-threaded by contract
//! - Switching between AM, FM and SSB requires a full power cycle, which
//!   `set_fm`/`set_am`/`set_ssb` perform internally
//!
//! # Example
//! ```no_run
//! use si4735::{SeekDirection, SenPin, Si4735};
//!
//! fn tune_fm<I2C, RST, D>(i2c: I2C, reset: RST, delay: D) -> Result<(), si4735::Error>
//! where
//!     I2C: embedded_hal::i2c::I2c,
//!     RST: embedded_hal::digital::OutputPin,
//!     D: embedded_hal::delay::DelayNs,
//! {
//!     let mut radio = Si4735::new(i2c, SenPin::Low, reset, delay);
//!
//!     // 87.5-108 MHz band, start at 103.9 MHz, 100 kHz steps
//!     radio.set_fm(8750, 10800, 10390, 10)?;
//!     radio.set_volume(45)?;
//!     radio.seek_station(SeekDirection::Up)?;
//!
//!     Ok(())
//! }
//! ```

use regiface::*;

pub mod commands;
pub mod device;
pub mod properties;
pub mod radio;
pub mod rds;

mod poll;

pub use commands::*;
pub use device::{Device, SenPin};
pub use properties::{Property, PropertyScope};
pub use radio::{
    FrequencyRange, Mode, SeekDirection, SeekOutcome, Si4735, SignalQuality, TuneStatus,
};
pub use rds::{RdsBlockErrors, RdsDecoder, RdsGroup, RdsGroupType, RdsTime};

/// Driver error taxonomy.
///
/// Bus-level failures (`NoAck`, `BusTimeout`) are transient; the caller may
/// retry after re-checking hardware presence. `OutOfRange`, `InvalidProperty`
/// and `ModeMismatch` are caller bugs rejected before anything is transmitted.
/// The timeout variants indicate the chip did not signal completion within the
/// configured budget; the state machine's model stays consistent because the
/// cached frequency and mode are only updated on confirmed success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The device did not acknowledge its bus address.
    NoAck,
    /// A bus transfer stalled, or the device never raised clear-to-send.
    BusTimeout,
    /// The device reported the error status bit for the last command.
    DeviceError,
    /// A response could not be decoded into its typed form.
    InvalidResponse,
    /// Frequency outside the configured band limits or not aligned to the
    /// configured step.
    OutOfRange,
    /// Property value outside its documented range, or the property is not
    /// valid in the current mode.
    InvalidProperty,
    /// The operation is not valid in the current function (AM/FM/SSB).
    ModeMismatch,
    /// The chip did not raise tune-complete within the configured budget.
    TuneTimeout,
    /// The chip did not raise seek-complete within the configured budget.
    SeekTimeout,
    /// No response from the hardware after reset; the handle is unusable.
    PowerUpFailed,
    /// The device is powered down; only power-up operations are accepted.
    PoweredDown,
}
