//! Si47xx Tuning State Machine
//!
//! This module provides the high-level blocking driver for Si47xx series
//! receivers. It owns the bus transport, the reset pin and a delay source,
//! and tracks the receiver's mode and band so that invalid requests are
//! rejected before anything reaches the chip.
//!
//! The interface is built around the [`Si4735`] struct which provides
//! methods for:
//! - Band selection with a full power cycle per mode switch
//! - Blocking tune and seek with per-operation timeout budgets
//! - Validated property access, volume/mute and the SSB BFO
//! - Signal quality queries and RDS polling
//!
//! # Important Notes
//! - Tune and seek complete asynchronously inside the chip; completion is
//!   observed by polling the STC status bit under a deadline
//! - The cached frequency is only updated from chip-confirmed tune status,
//!   never from the requested value

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::commands::*;
use crate::device::{Device, SenPin};
use crate::poll::Deadline;
use crate::properties::{Property, PropertyScope};
use crate::rds::RdsDecoder;
use crate::Error;

/// CTS budget for ordinary commands, restored after a power-up.
const CTS_BUDGET_MS: u32 = 100;

/// Poll interval while waiting for seek/tune completion.
const STC_POLL_STEP_US: u32 = 1_000;

/// RDS enable with up to two corrected bit errors accepted per block.
const FM_RDS_CONFIG_DEFAULT: u16 = 0xAA01;

/// The receiver function the chip is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// FM broadcast reception
    Fm,
    /// AM reception (MW/LW/SW)
    Am,
    /// SSB reception through the firmware patch
    Ssb(Sideband),
}

/// Power and boot state of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerState {
    /// Powered down; only power-up operations are accepted
    Off,
    /// Booted in patch-download mode, waiting for patch chunks
    PatchPending,
    /// Running the given receiver function
    Ready(Mode),
}

/// The configured band: limits, channel step and the current channel.
///
/// Frequencies are in the chip's native units for the active mode: 10 kHz
/// steps for FM (8750 = 87.5 MHz), kHz for AM and SSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyRange {
    bottom: u16,
    top: u16,
    step: u16,
    current: Option<u16>,
}

impl FrequencyRange {
    /// Builds a band from its limits and channel step.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - zero bottom or step, or bottom above top
    pub fn new(bottom: u16, top: u16, step: u16) -> Result<Self, Error> {
        if bottom == 0 || step == 0 || bottom > top {
            return Err(Error::OutOfRange);
        }
        Ok(Self {
            bottom,
            top,
            step,
            current: None,
        })
    }

    /// Lower band limit.
    pub fn bottom(&self) -> u16 {
        self.bottom
    }

    /// Upper band limit.
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Channel step.
    pub fn step(&self) -> u16 {
        self.step
    }

    /// The current channel, once the chip has confirmed a tune.
    pub fn current(&self) -> Option<u16> {
        self.current
    }

    /// Whether a frequency lies inside the band and on the channel raster.
    ///
    /// Misaligned frequencies are rejected rather than snapped; the caller
    /// asked for a channel that does not exist in this band plan.
    pub fn accepts(&self, frequency: u16) -> bool {
        frequency >= self.bottom
            && frequency <= self.top
            && (frequency - self.bottom) % self.step == 0
    }
}

/// Direction of a station seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekDirection {
    /// Towards higher frequencies
    Up,
    /// Towards lower frequencies
    Down,
}

/// Where a seek left the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeekOutcome {
    /// The seek stopped on a channel meeting the configured thresholds
    Station(u16),
    /// The seek wrapped the whole band without finding a station; the
    /// receiver sits on the reported frequency
    NoStationFound(u16),
}

/// Mode-independent view of a tune or seek result.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TuneStatus {
    /// The channel meets the configured validity thresholds
    pub valid_channel: bool,
    /// The last seek hit or wrapped the band limit
    pub band_limit: bool,
    /// The AFC is railed
    pub afc_railed: bool,
    /// Currently tuned frequency in the mode's native units
    pub frequency: u16,
    /// Received signal strength in dBµV
    pub rssi: u8,
    /// Signal to noise ratio in dB
    pub snr: u8,
    /// Multipath indicator; FM only
    pub multipath: Option<u8>,
    /// Antenna tuning capacitor read-back
    pub antenna_cap: u16,
}

impl From<FmTuneStatusResponse> for TuneStatus {
    fn from(resp: FmTuneStatusResponse) -> Self {
        Self {
            valid_channel: resp.valid_channel,
            band_limit: resp.band_limit,
            afc_railed: resp.afc_railed,
            frequency: resp.frequency,
            rssi: resp.rssi,
            snr: resp.snr,
            multipath: Some(resp.multipath),
            antenna_cap: resp.antenna_cap.into(),
        }
    }
}

impl From<AmTuneStatusResponse> for TuneStatus {
    fn from(resp: AmTuneStatusResponse) -> Self {
        Self {
            valid_channel: resp.valid_channel,
            band_limit: resp.band_limit,
            afc_railed: resp.afc_railed,
            frequency: resp.frequency,
            rssi: resp.rssi,
            snr: resp.snr,
            multipath: None,
            antenna_cap: resp.antenna_cap,
        }
    }
}

/// Mode-independent view of received signal quality.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality {
    /// Received signal strength in dBµV
    pub rssi: u8,
    /// Signal to noise ratio in dB
    pub snr: u8,
    /// Multipath indicator; FM only
    pub multipath: Option<u8>,
    /// Carrier frequency offset in kHz; FM only
    pub freq_offset: Option<i8>,
    /// A stereo pilot is present; FM only
    pub stereo_pilot: Option<bool>,
    /// Stereo blend, 0 = full mono to 100 = full stereo; FM only
    pub stereo_blend: Option<u8>,
    /// Soft mute is currently engaged
    pub soft_mute: bool,
    /// The AFC is railed
    pub afc_railed: bool,
    /// The tuned channel is currently valid
    pub valid_channel: bool,
}

impl From<FmRsqStatusResponse> for SignalQuality {
    fn from(resp: FmRsqStatusResponse) -> Self {
        Self {
            rssi: resp.rssi,
            snr: resp.snr,
            multipath: Some(resp.multipath),
            freq_offset: Some(resp.freq_offset),
            stereo_pilot: Some(resp.stereo_pilot),
            stereo_blend: Some(resp.stereo_blend),
            soft_mute: resp.soft_mute,
            afc_railed: resp.afc_railed,
            valid_channel: resp.valid_channel,
        }
    }
}

impl From<AmRsqStatusResponse> for SignalQuality {
    fn from(resp: AmRsqStatusResponse) -> Self {
        Self {
            rssi: resp.rssi,
            snr: resp.snr,
            multipath: None,
            freq_offset: None,
            stereo_pilot: None,
            stereo_blend: None,
            soft_mute: resp.soft_mute,
            afc_railed: resp.afc_railed,
            valid_channel: resp.valid_channel,
        }
    }
}

/// Blocking driver for a Si47xx receiver.
///
/// Wraps the bus transport together with the reset pin and a delay source.
/// All operations are serialized through `&mut self`; the driver never
/// issues a command while another is outstanding.
pub struct Si4735<I2C, RST, D> {
    device: Device<I2C>,
    reset: RST,
    delay: D,
    state: PowerState,
    range: Option<FrequencyRange>,
    antenna_cap: u16,
    audio_mode: OpMode,
    rds: RdsDecoder,
    max_delay_power_up: u32,
    max_delay_set_frequency: u32,
    max_seek_time: u32,
}

impl<I2C, RST, D> Si4735<I2C, RST, D> {
    /// Creates a new driver instance in the powered-down state.
    ///
    /// # Arguments
    /// * `i2c` - An I2C bus implementing the required embedded-hal traits
    /// * `sen` - Strap level of the chip's SEN pin
    /// * `reset` - Push-pull output driving the chip's RST pin
    /// * `delay` - Delay provider used for reset timing and status polling
    pub fn new(i2c: I2C, sen: SenPin, reset: RST, delay: D) -> Self {
        Self {
            device: Device::new(i2c, sen),
            reset,
            delay,
            state: PowerState::Off,
            range: None,
            antenna_cap: 0,
            audio_mode: OpMode::AnalogAudio,
            rds: RdsDecoder::new(),
            max_delay_power_up: 10,
            max_delay_set_frequency: 100,
            max_seek_time: 8_000,
        }
    }

    /// Releases the wrapped bus, reset pin and delay source.
    pub fn release(self) -> (I2C, RST, D) {
        (self.device.release(), self.reset, self.delay)
    }

    /// The current receiver function, if powered up.
    pub fn mode(&self) -> Option<Mode> {
        match self.state {
            PowerState::Ready(mode) => Some(mode),
            _ => None,
        }
    }

    /// The currently tuned frequency in the mode's native units.
    ///
    /// `None` until the chip has confirmed a tune in the selected band.
    pub fn frequency(&self) -> Option<u16> {
        match self.state {
            PowerState::Ready(_) => self.range.and_then(|r| r.current()),
            _ => None,
        }
    }

    /// The configured band, if one has been selected.
    pub fn frequency_range(&self) -> Option<FrequencyRange> {
        self.range
    }

    /// The RDS decoder state assembled from polled groups.
    pub fn rds(&self) -> &RdsDecoder {
        &self.rds
    }

    /// Sets the time budget for the power-up CTS wait in milliseconds.
    pub fn set_max_delay_power_up(&mut self, ms: u32) {
        self.max_delay_power_up = ms;
    }

    /// Sets the time budget for tune completion in milliseconds.
    pub fn set_max_delay_set_frequency(&mut self, ms: u32) {
        self.max_delay_set_frequency = ms;
    }

    /// Sets the time budget for seek completion in milliseconds.
    ///
    /// A full-band AM seek over a quiet band can take many seconds; size the
    /// budget for the widest configured band.
    pub fn set_max_seek_time(&mut self, ms: u32) {
        self.max_seek_time = ms;
    }

    /// Selects the audio output path used by subsequent power-ups.
    pub fn set_audio_mode(&mut self, audio_mode: OpMode) {
        self.audio_mode = audio_mode;
    }

    /// Sets the antenna tuning capacitor override (0 = automatic).
    pub fn set_antenna_cap(&mut self, antenna_cap: u16) {
        self.antenna_cap = antenna_cap;
    }

    fn require_ready(&self) -> Result<Mode, Error> {
        match self.state {
            PowerState::Ready(mode) => Ok(mode),
            _ => Err(Error::PoweredDown),
        }
    }
}

impl<I2C, RST, D> Si4735<I2C, RST, D>
where
    I2C: I2c,
    RST: OutputPin,
    D: DelayNs,
{
    /// Selects the FM band and tunes to an initial channel.
    ///
    /// Performs a full power cycle into the FM function, programs the seek
    /// band and channel spacing, enables RDS and tunes. Frequencies are in
    /// 10 kHz units (8750 = 87.5 MHz).
    ///
    /// # Errors
    /// * `Error::OutOfRange` - invalid band limits, or `initial` off the raster
    /// * `Error::InvalidProperty` - band limits or step outside the chip's
    ///   documented seek property ranges
    /// * `Error::PowerUpFailed` - no response from the hardware after reset
    pub fn set_fm(&mut self, bottom: u16, top: u16, initial: u16, step: u16) -> Result<(), Error> {
        let range = FrequencyRange::new(bottom, top, step)?;
        if !range.accepts(initial) {
            return Err(Error::OutOfRange);
        }
        if !Property::FmSeekBandBottom.validate(bottom)
            || !Property::FmSeekBandTop.validate(top)
            || !Property::FmSeekFreqSpacing.validate(step)
        {
            return Err(Error::InvalidProperty);
        }

        self.power_cycle(RadioFunction::FmReceiver)?;
        self.state = PowerState::Ready(Mode::Fm);
        self.range = Some(range);

        self.write_property(Property::FmSeekBandBottom, bottom)?;
        self.write_property(Property::FmSeekBandTop, top)?;
        self.write_property(Property::FmSeekFreqSpacing, step)?;
        self.write_property(Property::FmRdsConfig, FM_RDS_CONFIG_DEFAULT)?;
        self.rds.clear();

        self.set_frequency(initial)
    }

    /// Selects an AM band (MW/LW/SW) and tunes to an initial channel.
    ///
    /// Performs a full power cycle into the AM function, programs the seek
    /// band and channel spacing and tunes. Frequencies are in kHz.
    ///
    /// # Errors
    /// * `Error::OutOfRange` - invalid band limits, or `initial` off the raster
    /// * `Error::InvalidProperty` - band limits or step outside the chip's
    ///   documented seek property ranges
    /// * `Error::PowerUpFailed` - no response from the hardware after reset
    pub fn set_am(&mut self, bottom: u16, top: u16, initial: u16, step: u16) -> Result<(), Error> {
        let range = FrequencyRange::new(bottom, top, step)?;
        if !range.accepts(initial) {
            return Err(Error::OutOfRange);
        }
        if !Property::AmSeekBandBottom.validate(bottom)
            || !Property::AmSeekBandTop.validate(top)
            || !Property::AmSeekFreqSpacing.validate(step)
        {
            return Err(Error::InvalidProperty);
        }

        self.power_cycle(RadioFunction::AmReceiver)?;
        self.state = PowerState::Ready(Mode::Am);
        self.range = Some(range);

        self.write_property(Property::AmSeekBandBottom, bottom)?;
        self.write_property(Property::AmSeekBandTop, top)?;
        self.write_property(Property::AmSeekFreqSpacing, step)?;
        self.rds.clear();

        self.set_frequency(initial)
    }

    /// Boots the chip into patch-download mode.
    ///
    /// The chip accepts only patch chunks until [`set_ssb`](Si4735::set_ssb)
    /// completes the sequence.
    pub fn patch_power_up(&mut self) -> Result<(), Error> {
        if self.state != PowerState::Off {
            self.power_down()?;
        }
        self.power_up(
            RadioFunction::AmReceiver,
            PowerUpFlags::PATCH | PowerUpFlags::CRYSTAL_ENABLE | PowerUpFlags::GPO2_ENABLE,
        )?;
        self.state = PowerState::PatchPending;
        self.range = None;
        Ok(())
    }

    /// Streams one chunk of the SSB firmware patch.
    ///
    /// # Errors
    /// * `Error::ModeMismatch` - the chip is not in patch-download mode
    /// * `Error::DeviceError` - the chip rejected the chunk
    pub fn send_patch_chunk(&mut self, chunk: &[u8]) -> Result<(), Error> {
        if self.state != PowerState::PatchPending {
            return Err(Error::ModeMismatch);
        }
        self.device.send_patch_chunk(chunk, &mut self.delay)
    }

    /// Completes a patch upload: selects an SSB band and tunes.
    ///
    /// Must follow [`patch_power_up`](Si4735::patch_power_up) and the patch
    /// chunks. Frequencies are in kHz; fine tuning within a channel is done
    /// with [`set_bfo`](Si4735::set_bfo).
    ///
    /// # Errors
    /// * `Error::ModeMismatch` - no patch upload is in progress
    /// * `Error::OutOfRange` - invalid band limits, or `initial` off the raster
    pub fn set_ssb(
        &mut self,
        bottom: u16,
        top: u16,
        initial: u16,
        step: u16,
        sideband: Sideband,
    ) -> Result<(), Error> {
        if self.state != PowerState::PatchPending {
            return Err(Error::ModeMismatch);
        }
        let range = FrequencyRange::new(bottom, top, step)?;
        if !range.accepts(initial) {
            return Err(Error::OutOfRange);
        }

        self.state = PowerState::Ready(Mode::Ssb(sideband));
        self.range = Some(range);
        self.write_property(Property::SsbMode, 0x0000)?;
        self.rds.clear();

        self.set_frequency(initial)
    }

    /// Powers the chip down into its low-current state.
    pub fn power_down(&mut self) -> Result<(), Error> {
        if self.state == PowerState::Off {
            return Ok(());
        }
        self.device.execute_command(PowerDown, &mut self.delay)?;
        self.state = PowerState::Off;
        self.range = None;
        self.rds.clear();
        Ok(())
    }

    /// Silicon and firmware revision of the chip.
    ///
    /// # Errors
    /// * `Error::PoweredDown` - the chip is powered down
    pub fn revision(&mut self) -> Result<Revision, Error> {
        if self.state == PowerState::Off {
            return Err(Error::PoweredDown);
        }
        let resp = self.device.execute_command(GetRevision, &mut self.delay)?;
        Ok(resp.revision)
    }

    /// Tunes to a channel within the configured band.
    ///
    /// Blocks until the chip raises seek/tune-complete or the configured
    /// budget expires. The cached frequency is updated from the chip's tune
    /// status, so on success [`frequency`](Si4735::frequency) reflects what
    /// the chip actually tuned.
    ///
    /// # Errors
    /// * `Error::PoweredDown` - no band has been selected
    /// * `Error::OutOfRange` - outside the band or off the channel raster
    /// * `Error::TuneTimeout` - STC not raised within the budget
    pub fn set_frequency(&mut self, frequency: u16) -> Result<(), Error> {
        let mode = self.require_ready()?;
        let range = self.range.ok_or(Error::PoweredDown)?;
        if !range.accepts(frequency) {
            return Err(Error::OutOfRange);
        }

        match mode {
            Mode::Fm => {
                self.device.execute_command(
                    FmTuneFreq {
                        args: FmTuneArgs {
                            options: TuneOptions::empty(),
                            frequency,
                            antenna_cap: self.antenna_cap.min(191) as u8,
                        },
                    },
                    &mut self.delay,
                )?;
            }
            Mode::Am => {
                self.device.execute_command(
                    AmTuneFreq {
                        args: AmTuneArgs {
                            fast: false,
                            frequency,
                            antenna_cap: self.antenna_cap,
                        },
                    },
                    &mut self.delay,
                )?;
            }
            Mode::Ssb(sideband) => {
                self.device.execute_command(
                    SsbTuneFreq {
                        args: SsbTuneArgs {
                            fast: false,
                            frequency,
                            sideband,
                        },
                    },
                    &mut self.delay,
                )?;
            }
        }

        match self.wait_stc(self.max_delay_set_frequency) {
            Ok(()) => {
                let status = self.read_tune_status(mode, StatusAck::INT_ACK)?;
                self.update_current(status.frequency);
                if mode == Mode::Fm {
                    self.rds.clear();
                }
                Ok(())
            }
            Err(_) => {
                // Abort the tune and resynchronize with wherever the chip sits
                if let Ok(status) =
                    self.read_tune_status(mode, StatusAck::CANCEL | StatusAck::INT_ACK)
                {
                    self.update_current(status.frequency);
                }
                Err(Error::TuneTimeout)
            }
        }
    }

    /// Seeks to the next station in the given direction, wrapping at the
    /// band limits.
    ///
    /// Blocks until the seek completes or the configured budget expires. A
    /// full wrap without a qualifying channel is not an error; it is reported
    /// as [`SeekOutcome::NoStationFound`] with the frequency the receiver
    /// landed on.
    ///
    /// # Errors
    /// * `Error::PoweredDown` - no band has been selected
    /// * `Error::ModeMismatch` - seek is not available in SSB
    /// * `Error::SeekTimeout` - STC not raised within the budget
    pub fn seek_station(&mut self, direction: SeekDirection) -> Result<SeekOutcome, Error> {
        self.seek_station_with_progress(direction, |_| {})
    }

    /// Like [`seek_station`](Si4735::seek_station), invoking `progress` with
    /// the in-flight tune status at every completion poll.
    pub fn seek_station_with_progress<F>(
        &mut self,
        direction: SeekDirection,
        mut progress: F,
    ) -> Result<SeekOutcome, Error>
    where
        F: FnMut(TuneStatus),
    {
        let mode = self.require_ready()?;
        let mut options = SeekOptions::WRAP;
        if direction == SeekDirection::Up {
            options |= SeekOptions::SEEK_UP;
        }

        match mode {
            Mode::Fm => {
                self.device
                    .execute_command(FmSeekStart { options }, &mut self.delay)?;
            }
            Mode::Am => {
                self.device.execute_command(
                    AmSeekStart {
                        args: AmSeekArgs {
                            options,
                            antenna_cap: self.antenna_cap,
                        },
                    },
                    &mut self.delay,
                )?;
            }
            Mode::Ssb(_) => return Err(Error::ModeMismatch),
        }

        let mut deadline = Deadline::new(self.max_seek_time);
        loop {
            let status = self.device.execute_command(GetIntStatus, &mut self.delay)?;
            if status.contains(IntStatus::STC_INT) {
                break;
            }
            progress(self.read_tune_status(mode, StatusAck::empty())?);
            if !deadline.tick(&mut self.delay, STC_POLL_STEP_US) {
                // Abort the seek and resynchronize with wherever the chip sits
                if let Ok(status) =
                    self.read_tune_status(mode, StatusAck::CANCEL | StatusAck::INT_ACK)
                {
                    self.update_current(status.frequency);
                }
                return Err(Error::SeekTimeout);
            }
        }

        let status = self.read_tune_status(mode, StatusAck::INT_ACK)?;
        self.update_current(status.frequency);
        if mode == Mode::Fm {
            self.rds.clear();
        }

        if status.valid_channel {
            Ok(SeekOutcome::Station(status.frequency))
        } else {
            Ok(SeekOutcome::NoStationFound(status.frequency))
        }
    }

    /// The result of the last tune or seek, without clearing anything.
    pub fn tune_status(&mut self) -> Result<TuneStatus, Error> {
        let mode = self.require_ready()?;
        self.read_tune_status(mode, StatusAck::empty())
    }

    /// Received signal quality of the currently tuned channel.
    pub fn signal_quality(&mut self) -> Result<SignalQuality, Error> {
        match self.require_ready()? {
            Mode::Fm => {
                let resp = self.device.execute_command(
                    FmRsqStatus {
                        ack: StatusAck::empty(),
                    },
                    &mut self.delay,
                )?;
                Ok(resp.into())
            }
            Mode::Am | Mode::Ssb(_) => {
                let resp = self.device.execute_command(
                    AmRsqStatus {
                        ack: StatusAck::empty(),
                    },
                    &mut self.delay,
                )?;
                Ok(resp.into())
            }
        }
    }

    /// Current AGC state.
    pub fn agc_status(&mut self) -> Result<AgcStatusResponse, Error> {
        match self.require_ready()? {
            Mode::Fm => self.device.execute_command(FmAgcStatus, &mut self.delay),
            Mode::Am | Mode::Ssb(_) => {
                self.device.execute_command(AmAgcStatus, &mut self.delay)
            }
        }
    }

    /// Overrides the RF AGC, or re-enables it with `disable_agc` clear.
    pub fn set_agc_override(&mut self, disable_agc: bool, lna_gain_index: u8) -> Result<(), Error> {
        let args = AgcOverrideArgs {
            disable_agc,
            lna_gain_index,
        };
        match self.require_ready()? {
            Mode::Fm => {
                self.device
                    .execute_command(FmAgcOverride { args }, &mut self.delay)?;
            }
            Mode::Am | Mode::Ssb(_) => {
                self.device
                    .execute_command(AmAgcOverride { args }, &mut self.delay)?;
            }
        }
        Ok(())
    }

    /// Writes a property after checking its mode validity and value range.
    ///
    /// # Errors
    /// * `Error::InvalidProperty` - the property is not valid in the current
    ///   mode, or the value is outside its documented range
    pub fn set_property(&mut self, property: Property, value: u16) -> Result<(), Error> {
        let mode = self.require_ready()?;
        if !property_valid_in(property, mode) || !property.validate(value) {
            return Err(Error::InvalidProperty);
        }
        self.write_property(property, value)
    }

    /// Reads a property back from the chip.
    ///
    /// Always reads through to the chip rather than a cache, since several
    /// properties are also updated by the chip firmware itself.
    ///
    /// # Errors
    /// * `Error::InvalidProperty` - the property is not valid in the current mode
    pub fn get_property(&mut self, property: Property) -> Result<u16, Error> {
        let mode = self.require_ready()?;
        if !property_valid_in(property, mode) {
            return Err(Error::InvalidProperty);
        }
        let resp = self.device.execute_command(
            GetProperty {
                query: PropertyQuery {
                    property: property.id(),
                },
            },
            &mut self.delay,
        )?;
        Ok(resp.value)
    }

    /// Sets the audio output volume (0-63).
    pub fn set_volume(&mut self, volume: u8) -> Result<(), Error> {
        self.set_property(Property::RxVolume, volume.into())
    }

    /// Hard-mutes or unmutes both audio channels.
    pub fn set_mute(&mut self, mute: bool) -> Result<(), Error> {
        self.set_property(Property::RxHardMute, if mute { 0x3 } else { 0x0 })
    }

    /// Sets the SSB beat frequency oscillator offset in Hz.
    ///
    /// # Errors
    /// * `Error::ModeMismatch` - the receiver is not in SSB mode
    pub fn set_bfo(&mut self, offset_hz: i16) -> Result<(), Error> {
        match self.require_ready()? {
            Mode::Ssb(_) => self.write_property(Property::SsbBfo, offset_hz as u16),
            _ => Err(Error::ModeMismatch),
        }
    }

    /// Pops one group from the RDS FIFO and feeds it to the decoder.
    ///
    /// Returns `true` if a group was consumed. Call repeatedly while tuned to
    /// an FM station; assembled results are read through
    /// [`rds`](Si4735::rds).
    ///
    /// # Errors
    /// * `Error::ModeMismatch` - the receiver is not in FM mode
    pub fn poll_rds(&mut self) -> Result<bool, Error> {
        match self.require_ready()? {
            Mode::Fm => {}
            _ => return Err(Error::ModeMismatch),
        }
        let resp = self.device.execute_command(
            FmRdsStatus {
                ack: RdsAck::INT_ACK,
            },
            &mut self.delay,
        )?;
        if !resp.group_received {
            return Ok(false);
        }
        self.rds.process(&resp.group, resp.block_errors);
        Ok(true)
    }

    fn power_cycle(&mut self, function: RadioFunction) -> Result<(), Error> {
        if self.state != PowerState::Off {
            self.power_down()?;
        }
        self.power_up(
            function,
            PowerUpFlags::CRYSTAL_ENABLE | PowerUpFlags::GPO2_ENABLE,
        )
    }

    fn power_up(&mut self, function: RadioFunction, flags: PowerUpFlags) -> Result<(), Error> {
        self.reset_pulse();
        self.device.set_cts_budget_ms(self.max_delay_power_up);
        let result = self.device.execute_command(
            PowerUp {
                args: PowerUpArgs {
                    flags,
                    function,
                    opmode: self.audio_mode,
                },
            },
            &mut self.delay,
        );
        self.device.set_cts_budget_ms(CTS_BUDGET_MS);
        result.map_err(|e| match e {
            Error::NoAck | Error::BusTimeout => Error::PowerUpFailed,
            other => other,
        })?;
        Ok(())
    }

    fn reset_pulse(&mut self) {
        self.reset.set_low().ok();
        self.delay.delay_ms(10);
        self.reset.set_high().ok();
        self.delay.delay_ms(10);
    }

    fn wait_stc(&mut self, budget_ms: u32) -> Result<(), Error> {
        let mut deadline = Deadline::new(budget_ms);
        loop {
            let status = self.device.execute_command(GetIntStatus, &mut self.delay)?;
            if status.contains(IntStatus::STC_INT) {
                return Ok(());
            }
            if !deadline.tick(&mut self.delay, STC_POLL_STEP_US) {
                return Err(Error::TuneTimeout);
            }
        }
    }

    fn read_tune_status(&mut self, mode: Mode, ack: StatusAck) -> Result<TuneStatus, Error> {
        match mode {
            Mode::Fm => {
                let resp = self
                    .device
                    .execute_command(FmTuneStatus { ack }, &mut self.delay)?;
                Ok(resp.into())
            }
            Mode::Am | Mode::Ssb(_) => {
                let resp = self
                    .device
                    .execute_command(AmTuneStatus { ack }, &mut self.delay)?;
                Ok(resp.into())
            }
        }
    }

    fn update_current(&mut self, frequency: u16) {
        if let Some(range) = self.range.as_mut() {
            range.current = Some(frequency);
        }
    }

    fn write_property(&mut self, property: Property, value: u16) -> Result<(), Error> {
        self.device.execute_command(
            SetProperty {
                value: PropertyValue {
                    property: property.id(),
                    value,
                },
            },
            &mut self.delay,
        )?;
        Ok(())
    }
}

fn property_valid_in(property: Property, mode: Mode) -> bool {
    match property.scope() {
        PropertyScope::Global => true,
        PropertyScope::Fm => mode == Mode::Fm,
        PropertyScope::Am => mode == Mode::Am,
        PropertyScope::Ssb => matches!(mode, Mode::Ssb(_)),
        PropertyScope::AmSsb => matches!(mode, Mode::Am | Mode::Ssb(_)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FromByteArray;

    #[test]
    fn range_accepts_only_on_raster_channels() {
        let range = FrequencyRange::new(8750, 10800, 10).unwrap();
        assert_eq!(range.current(), None);
        assert!(range.accepts(8750));
        assert!(range.accepts(9500));
        assert!(range.accepts(10800));
        assert!(!range.accepts(9505));
        assert!(!range.accepts(8740));
        assert!(!range.accepts(10810));
    }

    #[test]
    fn range_rejects_degenerate_bands() {
        assert_eq!(FrequencyRange::new(0, 10800, 10), Err(Error::OutOfRange));
        assert_eq!(FrequencyRange::new(8750, 10800, 0), Err(Error::OutOfRange));
        assert_eq!(FrequencyRange::new(10800, 8750, 10), Err(Error::OutOfRange));
    }

    #[test]
    fn fm_tune_status_converts_with_multipath() {
        let status: TuneStatus = FmTuneStatusResponse::from_bytes([
            0x81, 0x01, 0x25, 0x1C, 42, 30, 5, 7,
        ])
        .unwrap()
        .into();
        assert!(status.valid_channel);
        assert_eq!(status.frequency, 9500);
        assert_eq!(status.multipath, Some(5));
        assert_eq!(status.antenna_cap, 7);
    }

    #[test]
    fn am_tune_status_converts_without_multipath() {
        let status: TuneStatus = AmTuneStatusResponse::from_bytes([
            0x81, 0x01, 0x03, 0x2A, 40, 20, 0x12, 0x34,
        ])
        .unwrap()
        .into();
        assert_eq!(status.frequency, 810);
        assert_eq!(status.multipath, None);
        assert_eq!(status.antenna_cap, 0x1234);
    }

    #[test]
    fn property_mode_validity_follows_scope() {
        assert!(property_valid_in(Property::RxVolume, Mode::Am));
        assert!(property_valid_in(Property::FmRdsConfig, Mode::Fm));
        assert!(!property_valid_in(Property::FmRdsConfig, Mode::Am));
        assert!(property_valid_in(Property::SsbBfo, Mode::Ssb(Sideband::Usb)));
        assert!(!property_valid_in(Property::SsbBfo, Mode::Fm));
        assert!(property_valid_in(
            Property::AmChannelFilter,
            Mode::Ssb(Sideband::Lsb)
        ));
    }
}
