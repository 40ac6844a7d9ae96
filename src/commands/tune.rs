//! Tuning and signal commands
//!
//! This module contains the commands that move the receiver around the band
//! and report what it hears:
//! - Tune to a channel (FM, AM, and SSB via the firmware patch)
//! - Start a seek with the configured thresholds and band wrap
//! - Read the tune result (valid channel, band limit, frequency, RSSI/SNR)
//! - Read received signal quality while listening
//! - Query and override the AGC
//!
//! Tune and seek raise CTS almost immediately but complete asynchronously;
//! completion is observed through the STC bit of the status word and the
//! result through the tune status commands.

use bitflags::bitflags;
use core::convert::Infallible;

use crate::{Command, FromByteArray, IntStatus, NoParameters, ToByteArray};

bitflags! {
    /// FM tune option flags (ARG1 of FmTuneFreq).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TuneOptions: u8 {
        /// Keep audio unmuted and metrics frozen during the tune
        const FREEZE = 0x02;
        /// Fast tune at the cost of metric accuracy
        const FAST = 0x01;
    }
}

bitflags! {
    /// Seek option flags (ARG1 of the seek commands).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SeekOptions: u8 {
        /// Seek towards higher frequencies (down when clear)
        const SEEK_UP = 0x08;
        /// Wrap around at the band limit and keep seeking
        const WRAP = 0x04;
    }
}

bitflags! {
    /// Status acknowledge flags (ARG1 of the tune/RSQ status commands).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusAck: u8 {
        /// Abort an in-progress seek or tune
        const CANCEL = 0x02;
        /// Clear the latched STC/RSQ interrupt bit
        const INT_ACK = 0x01;
    }
}

/// Sideband selection for SSB reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sideband {
    /// Lower sideband (1)
    Lsb = 1,
    /// Upper sideband (2)
    Usb = 2,
}

/// FM tune arguments: options, 16-bit frequency and antenna capacitor.
///
/// Frequency is in units of 10 kHz (8750 = 87.5 MHz). Antenna capacitor 0
/// selects automatic tuning; 1-191 forces a value on the TXO/LPI pin.
#[derive(Debug, Clone, Copy)]
pub struct FmTuneArgs {
    /// Tune option flags
    pub options: TuneOptions,
    /// Channel frequency in 10 kHz units
    pub frequency: u16,
    /// Antenna tuning capacitor override (0 = automatic)
    pub antenna_cap: u8,
}

impl ToByteArray for FmTuneArgs {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let freq = self.frequency.to_be_bytes();
        Ok([self.options.bits(), freq[0], freq[1], self.antenna_cap])
    }
}

/// FmTuneFreq command (0x20)
///
/// Tunes the FM receiver to a channel. STC is raised when the tune settles.
#[derive(Debug, Clone)]
pub struct FmTuneFreq {
    /// Tune arguments
    pub args: FmTuneArgs,
}

impl Command for FmTuneFreq {
    type IdType = u8;
    type CommandParameters = FmTuneArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x20
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}

/// AM tune arguments: 16-bit frequency in kHz and 16-bit antenna capacitor.
#[derive(Debug, Clone, Copy)]
pub struct AmTuneArgs {
    /// Fast tune at the cost of metric accuracy
    pub fast: bool,
    /// Channel frequency in kHz
    pub frequency: u16,
    /// Antenna tuning capacitor override (0 = automatic)
    pub antenna_cap: u16,
}

impl ToByteArray for AmTuneArgs {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let freq = self.frequency.to_be_bytes();
        let cap = self.antenna_cap.to_be_bytes();
        Ok([self.fast as u8, freq[0], freq[1], cap[0], cap[1]])
    }
}

/// AmTuneFreq command (0x40)
///
/// Tunes the AM receiver to a channel. Also used for LW and SW; the band
/// limits come from the seek-band properties.
#[derive(Debug, Clone)]
pub struct AmTuneFreq {
    /// Tune arguments
    pub args: AmTuneArgs,
}

impl Command for AmTuneFreq {
    type IdType = u8;
    type CommandParameters = AmTuneArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x40
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}

/// SSB tune arguments.
///
/// The SSB firmware patch reuses the AM tune opcode; the final argument byte
/// selects the demodulated sideband instead of the low antenna-capacitor byte.
#[derive(Debug, Clone, Copy)]
pub struct SsbTuneArgs {
    /// Fast tune at the cost of metric accuracy
    pub fast: bool,
    /// Channel frequency in kHz
    pub frequency: u16,
    /// Sideband to demodulate
    pub sideband: Sideband,
}

impl ToByteArray for SsbTuneArgs {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let freq = self.frequency.to_be_bytes();
        Ok([self.fast as u8, freq[0], freq[1], 0x00, self.sideband as u8])
    }
}

/// SsbTuneFreq command (0x40, patched firmware)
///
/// Tunes the patched receiver to an SSB channel. Only valid after the SSB
/// patch has been uploaded; on stock firmware this is an ordinary AM tune.
#[derive(Debug, Clone)]
pub struct SsbTuneFreq {
    /// Tune arguments
    pub args: SsbTuneArgs,
}

impl Command for SsbTuneFreq {
    type IdType = u8;
    type CommandParameters = SsbTuneArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x40
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}

/// FmSeekStart command (0x21)
///
/// Starts a seek from the current channel using the seek-band, spacing and
/// RSSI/SNR threshold properties. STC is raised when the seek stops, whether
/// or not a valid channel was found.
#[derive(Debug, Clone)]
pub struct FmSeekStart {
    /// Seek direction and wrap flags
    pub options: SeekOptions,
}

impl Command for FmSeekStart {
    type IdType = u8;
    type CommandParameters = SeekOptions;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x21
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.options
    }
}

impl ToByteArray for SeekOptions {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// AM seek arguments: direction flags plus the antenna capacitor override.
#[derive(Debug, Clone, Copy)]
pub struct AmSeekArgs {
    /// Seek direction and wrap flags
    pub options: SeekOptions,
    /// Antenna tuning capacitor override (0 = automatic)
    pub antenna_cap: u16,
}

impl ToByteArray for AmSeekArgs {
    type Error = Infallible;
    type Array = [u8; 5];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let cap = self.antenna_cap.to_be_bytes();
        Ok([self.options.bits(), 0x00, 0x00, cap[0], cap[1]])
    }
}

/// AmSeekStart command (0x41)
#[derive(Debug, Clone)]
pub struct AmSeekStart {
    /// Seek arguments
    pub args: AmSeekArgs,
}

impl Command for AmSeekStart {
    type IdType = u8;
    type CommandParameters = AmSeekArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x41
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}

/// FM tune status response.
///
/// # Response Layout
/// - byte 0: status word
/// - byte 1: BLTF (0x80), AFCRL (0x02), VALID (0x01)
/// - bytes 2-3: frequency, big-endian, 10 kHz units
/// - byte 4: RSSI in dBµV
/// - byte 5: SNR in dB
/// - byte 6: multipath indicator
/// - byte 7: antenna capacitor read-back
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FmTuneStatusResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// The seek hit the band limit (without wrap) or wrapped the whole band
    pub band_limit: bool,
    /// The AFC is railed; the reported channel is likely invalid
    pub afc_railed: bool,
    /// The channel meets the configured validity thresholds
    pub valid_channel: bool,
    /// Currently tuned frequency in 10 kHz units
    pub frequency: u16,
    /// Received signal strength in dBµV
    pub rssi: u8,
    /// Signal to noise ratio in dB
    pub snr: u8,
    /// Multipath indicator (higher is worse)
    pub multipath: u8,
    /// Antenna tuning capacitor currently selected
    pub antenna_cap: u8,
}

impl FromByteArray for FmTuneStatusResponse {
    type Error = Infallible;
    type Array = [u8; 8];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            band_limit: bytes[1] & 0x80 != 0,
            afc_railed: bytes[1] & 0x02 != 0,
            valid_channel: bytes[1] & 0x01 != 0,
            frequency: u16::from_be_bytes([bytes[2], bytes[3]]),
            rssi: bytes[4],
            snr: bytes[5],
            multipath: bytes[6],
            antenna_cap: bytes[7],
        })
    }
}

/// FmTuneStatus command (0x22)
///
/// Returns the result of the last FM tune or seek. [`StatusAck::INT_ACK`]
/// clears the latched STC bit; [`StatusAck::CANCEL`] aborts an in-progress
/// seek while leaving the receiver where it currently sits.
#[derive(Debug, Clone)]
pub struct FmTuneStatus {
    /// Acknowledge/cancel flags
    pub ack: StatusAck,
}

impl ToByteArray for StatusAck {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

impl Command for FmTuneStatus {
    type IdType = u8;
    type CommandParameters = StatusAck;
    type ResponseParameters = FmTuneStatusResponse;

    fn id() -> Self::IdType {
        0x22
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.ack
    }
}

/// AM tune status response.
///
/// Same layout as FM except bytes 6-7 carry the 16-bit antenna capacitor
/// read-back instead of multipath and an 8-bit capacitor.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmTuneStatusResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// The seek hit the band limit (without wrap) or wrapped the whole band
    pub band_limit: bool,
    /// The AFC is railed; the reported channel is likely invalid
    pub afc_railed: bool,
    /// The channel meets the configured validity thresholds
    pub valid_channel: bool,
    /// Currently tuned frequency in kHz
    pub frequency: u16,
    /// Received signal strength in dBµV
    pub rssi: u8,
    /// Signal to noise ratio in dB
    pub snr: u8,
    /// Antenna tuning capacitor currently selected
    pub antenna_cap: u16,
}

impl FromByteArray for AmTuneStatusResponse {
    type Error = Infallible;
    type Array = [u8; 8];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            band_limit: bytes[1] & 0x80 != 0,
            afc_railed: bytes[1] & 0x02 != 0,
            valid_channel: bytes[1] & 0x01 != 0,
            frequency: u16::from_be_bytes([bytes[2], bytes[3]]),
            rssi: bytes[4],
            snr: bytes[5],
            antenna_cap: u16::from_be_bytes([bytes[6], bytes[7]]),
        })
    }
}

/// AmTuneStatus command (0x42)
///
/// AM/SSB counterpart of [`FmTuneStatus`].
#[derive(Debug, Clone)]
pub struct AmTuneStatus {
    /// Acknowledge/cancel flags
    pub ack: StatusAck,
}

impl Command for AmTuneStatus {
    type IdType = u8;
    type CommandParameters = StatusAck;
    type ResponseParameters = AmTuneStatusResponse;

    fn id() -> Self::IdType {
        0x42
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.ack
    }
}

/// FM received signal quality response.
///
/// # Response Layout
/// - byte 0: status word
/// - byte 1: threshold interrupt flags
/// - byte 2: SMUTE (0x08), AFCRL (0x02), VALID (0x01)
/// - byte 3: PILOT (0x80), stereo blend percentage (0x7F)
/// - byte 4: RSSI, byte 5: SNR, byte 6: multipath
/// - byte 7: frequency offset in kHz, signed
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FmRsqStatusResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// Soft mute is currently engaged
    pub soft_mute: bool,
    /// The AFC is railed
    pub afc_railed: bool,
    /// The tuned channel is currently valid
    pub valid_channel: bool,
    /// A stereo pilot is present
    pub stereo_pilot: bool,
    /// Stereo blend: 0 = full mono, 100 = full stereo
    pub stereo_blend: u8,
    /// Received signal strength in dBµV
    pub rssi: u8,
    /// Signal to noise ratio in dB
    pub snr: u8,
    /// Multipath indicator (higher is worse)
    pub multipath: u8,
    /// Frequency offset of the received carrier in kHz
    pub freq_offset: i8,
}

impl FromByteArray for FmRsqStatusResponse {
    type Error = Infallible;
    type Array = [u8; 8];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            soft_mute: bytes[2] & 0x08 != 0,
            afc_railed: bytes[2] & 0x02 != 0,
            valid_channel: bytes[2] & 0x01 != 0,
            stereo_pilot: bytes[3] & 0x80 != 0,
            stereo_blend: bytes[3] & 0x7F,
            rssi: bytes[4],
            snr: bytes[5],
            multipath: bytes[6],
            freq_offset: bytes[7] as i8,
        })
    }
}

/// FmRsqStatus command (0x23)
#[derive(Debug, Clone)]
pub struct FmRsqStatus {
    /// Acknowledge flags ([`StatusAck::CANCEL`] is ignored here)
    pub ack: StatusAck,
}

impl Command for FmRsqStatus {
    type IdType = u8;
    type CommandParameters = StatusAck;
    type ResponseParameters = FmRsqStatusResponse;

    fn id() -> Self::IdType {
        0x23
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.ack
    }
}

/// AM received signal quality response.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmRsqStatusResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// Soft mute is currently engaged
    pub soft_mute: bool,
    /// The AFC is railed
    pub afc_railed: bool,
    /// The tuned channel is currently valid
    pub valid_channel: bool,
    /// Received signal strength in dBµV
    pub rssi: u8,
    /// Signal to noise ratio in dB
    pub snr: u8,
}

impl FromByteArray for AmRsqStatusResponse {
    type Error = Infallible;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            soft_mute: bytes[2] & 0x08 != 0,
            afc_railed: bytes[2] & 0x02 != 0,
            valid_channel: bytes[2] & 0x01 != 0,
            rssi: bytes[4],
            snr: bytes[5],
        })
    }
}

/// AmRsqStatus command (0x43)
#[derive(Debug, Clone)]
pub struct AmRsqStatus {
    /// Acknowledge flags
    pub ack: StatusAck,
}

impl Command for AmRsqStatus {
    type IdType = u8;
    type CommandParameters = StatusAck;
    type ResponseParameters = AmRsqStatusResponse;

    fn id() -> Self::IdType {
        0x43
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.ack
    }
}

/// AGC status response.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AgcStatusResponse {
    /// Status word from the first response byte
    pub status: IntStatus,
    /// The RF AGC is currently disabled
    pub agc_disabled: bool,
    /// Current LNA gain index (0 = minimum attenuation)
    pub lna_gain_index: u8,
}

impl FromByteArray for AgcStatusResponse {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: IntStatus::from_bits_retain(bytes[0]),
            agc_disabled: bytes[1] & 0x01 != 0,
            lna_gain_index: bytes[2],
        })
    }
}

/// FmAgcStatus command (0x27)
#[derive(Debug, Clone)]
pub struct FmAgcStatus;

impl Command for FmAgcStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = AgcStatusResponse;

    fn id() -> Self::IdType {
        0x27
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// AmAgcStatus command (0x47)
#[derive(Debug, Clone)]
pub struct AmAgcStatus;

impl Command for AmAgcStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = AgcStatusResponse;

    fn id() -> Self::IdType {
        0x47
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// AGC override arguments.
#[derive(Debug, Clone, Copy)]
pub struct AgcOverrideArgs {
    /// Disable the RF AGC and force the index below
    pub disable_agc: bool,
    /// LNA gain index to force (0 = minimum attenuation)
    pub lna_gain_index: u8,
}

impl ToByteArray for AgcOverrideArgs {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.disable_agc as u8, self.lna_gain_index])
    }
}

/// FmAgcOverride command (0x28)
#[derive(Debug, Clone)]
pub struct FmAgcOverride {
    /// Override arguments
    pub args: AgcOverrideArgs,
}

impl Command for FmAgcOverride {
    type IdType = u8;
    type CommandParameters = AgcOverrideArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x28
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}

/// AmAgcOverride command (0x48)
#[derive(Debug, Clone)]
pub struct AmAgcOverride {
    /// Override arguments
    pub args: AgcOverrideArgs,
}

impl Command for AmAgcOverride {
    type IdType = u8;
    type CommandParameters = AgcOverrideArgs;
    type ResponseParameters = IntStatus;

    fn id() -> Self::IdType {
        0x48
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.args
    }
}
