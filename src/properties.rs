//! Chip property space
//!
//! The Si47xx keeps its tunable parameters in a flat 16-bit property space
//! written through SetProperty and read through GetProperty. This module is
//! the closed enumeration of the documented ids together with each id's
//! validated range and the receiver function it applies to, so that bad
//! values and wrong-mode writes are rejected before anything reaches the bus.
//!
//! Seek thresholds, spacing and soft-mute defaults vary between chip firmware
//! revisions; the chip's own power-up defaults are left in place until the
//! caller writes a property, and every default is reachable through this
//! table rather than baked into driver behavior.

/// The receiver function(s) a property id is valid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyScope {
    /// Valid in every function
    Global,
    /// FM receiver only
    Fm,
    /// AM receiver only
    Am,
    /// Patched SSB receiver only
    Ssb,
    /// AM or patched SSB receiver
    AmSsb,
}

/// The closed set of documented property ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Property {
    /// Interrupt sources routed to the GPO2/INT pin
    GpoIen = 0x0001,
    /// Digital audio output format
    DigitalOutputFormat = 0x0102,
    /// Digital audio output sample rate in Hz (or 0 to disable)
    DigitalOutputSampleRate = 0x0104,
    /// Reference clock frequency in Hz (31130-34406)
    RefClkFreq = 0x0201,
    /// Reference clock prescaler (1-4095)
    RefClkPrescale = 0x0202,

    /// SSB beat frequency oscillator offset in Hz, signed (patched firmware)
    SsbBfo = 0x0100,
    /// SSB demodulation mode flags (patched firmware)
    SsbMode = 0x0101,

    /// FM de-emphasis time constant (1 = 50 us, 2 = 75 us)
    FmDeemphasis = 0x1100,
    /// FM channel filter bandwidth selection (0 = automatic)
    FmChannelFilter = 0x1102,
    /// SNR below which the blend starts moving towards mono
    FmBlendStereoThreshold = 0x1105,
    /// SNR below which the output is fully mono
    FmBlendMonoThreshold = 0x1106,
    /// Maximum tune error in kHz before AFCRL is flagged
    FmMaxTuneError = 0x1108,
    /// RSQ interrupt source enable bits
    FmRsqIntSource = 0x1200,
    /// FM soft mute attack/release rate
    FmSoftMuteRate = 0x1300,
    /// FM soft mute attenuation slope in dB per dB of SNR
    FmSoftMuteSlope = 0x1301,
    /// FM soft mute maximum attenuation in dB (0 disables soft mute)
    FmSoftMuteMaxAttenuation = 0x1302,
    /// SNR below which FM soft mute engages
    FmSoftMuteSnrThreshold = 0x1303,
    /// Bottom of the FM seek band in 10 kHz units
    FmSeekBandBottom = 0x1400,
    /// Top of the FM seek band in 10 kHz units
    FmSeekBandTop = 0x1401,
    /// FM seek step in 10 kHz units (5, 10 or 20)
    FmSeekFreqSpacing = 0x1402,
    /// SNR a channel must reach to stop a seek
    FmSeekTuneSnrThreshold = 0x1403,
    /// RSSI a channel must reach to stop a seek
    FmSeekTuneRssiThreshold = 0x1404,
    /// RDS interrupt source enable bits
    FmRdsIntSource = 0x1500,
    /// RDS FIFO depth that raises the RDS interrupt (0 disables the FIFO)
    FmRdsIntFifoCount = 0x1501,
    /// RDS enable and per-block error tolerance thresholds
    FmRdsConfig = 0x1502,
    /// RDS block confidence thresholds
    FmRdsConfidence = 0x1503,
    /// RSSI below which the blend starts moving towards mono
    FmBlendRssiStereoThreshold = 0x1800,
    /// RSSI below which the output is fully mono
    FmBlendRssiMonoThreshold = 0x1801,

    /// AM de-emphasis (0 = off, 1 = 50 us)
    AmDeemphasis = 0x3100,
    /// AM channel filter bandwidth selection
    AmChannelFilter = 0x3102,
    /// Maximum gain of the automatic volume control
    AmAvcMaxGain = 0x3103,
    /// AM AFC software pull-in range in kHz
    AmAfcPullInRange = 0x3104,
    /// AM soft mute attack/release rate
    AmSoftMuteRate = 0x3300,
    /// AM soft mute attenuation slope in dB per dB of SNR
    AmSoftMuteSlope = 0x3301,
    /// AM soft mute maximum attenuation in dB (0 disables soft mute)
    AmSoftMuteMaxAttenuation = 0x3302,
    /// SNR below which AM soft mute engages
    AmSoftMuteSnrThreshold = 0x3303,
    /// Bottom of the AM seek band in kHz
    AmSeekBandBottom = 0x3400,
    /// Top of the AM seek band in kHz
    AmSeekBandTop = 0x3401,
    /// AM seek step in kHz (1, 5, 9 or 10)
    AmSeekFreqSpacing = 0x3402,
    /// SNR a channel must reach to stop a seek
    AmSeekSnrThreshold = 0x3403,
    /// RSSI a channel must reach to stop a seek
    AmSeekRssiThreshold = 0x3404,
    /// Front-end AGC attack/hold control
    AmFrontendAgcControl = 0x3705,

    /// Audio output volume (0-63)
    RxVolume = 0x4000,
    /// Hard mute of the left (bit 1) and right (bit 0) channels
    RxHardMute = 0x4001,
}

impl Property {
    /// The 16-bit wire id.
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Looks a property up by wire id.
    pub fn from_id(id: u16) -> Option<Self> {
        Some(match id {
            0x0001 => Self::GpoIen,
            0x0102 => Self::DigitalOutputFormat,
            0x0104 => Self::DigitalOutputSampleRate,
            0x0201 => Self::RefClkFreq,
            0x0202 => Self::RefClkPrescale,
            0x0100 => Self::SsbBfo,
            0x0101 => Self::SsbMode,
            0x1100 => Self::FmDeemphasis,
            0x1102 => Self::FmChannelFilter,
            0x1105 => Self::FmBlendStereoThreshold,
            0x1106 => Self::FmBlendMonoThreshold,
            0x1108 => Self::FmMaxTuneError,
            0x1200 => Self::FmRsqIntSource,
            0x1300 => Self::FmSoftMuteRate,
            0x1301 => Self::FmSoftMuteSlope,
            0x1302 => Self::FmSoftMuteMaxAttenuation,
            0x1303 => Self::FmSoftMuteSnrThreshold,
            0x1400 => Self::FmSeekBandBottom,
            0x1401 => Self::FmSeekBandTop,
            0x1402 => Self::FmSeekFreqSpacing,
            0x1403 => Self::FmSeekTuneSnrThreshold,
            0x1404 => Self::FmSeekTuneRssiThreshold,
            0x1500 => Self::FmRdsIntSource,
            0x1501 => Self::FmRdsIntFifoCount,
            0x1502 => Self::FmRdsConfig,
            0x1503 => Self::FmRdsConfidence,
            0x1800 => Self::FmBlendRssiStereoThreshold,
            0x1801 => Self::FmBlendRssiMonoThreshold,
            0x3100 => Self::AmDeemphasis,
            0x3102 => Self::AmChannelFilter,
            0x3103 => Self::AmAvcMaxGain,
            0x3104 => Self::AmAfcPullInRange,
            0x3300 => Self::AmSoftMuteRate,
            0x3301 => Self::AmSoftMuteSlope,
            0x3302 => Self::AmSoftMuteMaxAttenuation,
            0x3303 => Self::AmSoftMuteSnrThreshold,
            0x3400 => Self::AmSeekBandBottom,
            0x3401 => Self::AmSeekBandTop,
            0x3402 => Self::AmSeekFreqSpacing,
            0x3403 => Self::AmSeekSnrThreshold,
            0x3404 => Self::AmSeekRssiThreshold,
            0x3705 => Self::AmFrontendAgcControl,
            0x4000 => Self::RxVolume,
            0x4001 => Self::RxHardMute,
            _ => return None,
        })
    }

    /// The receiver function(s) this id is valid in.
    pub fn scope(self) -> PropertyScope {
        match self {
            Self::GpoIen
            | Self::DigitalOutputFormat
            | Self::DigitalOutputSampleRate
            | Self::RefClkFreq
            | Self::RefClkPrescale
            | Self::RxVolume
            | Self::RxHardMute => PropertyScope::Global,

            Self::SsbBfo | Self::SsbMode => PropertyScope::Ssb,

            Self::FmDeemphasis
            | Self::FmChannelFilter
            | Self::FmBlendStereoThreshold
            | Self::FmBlendMonoThreshold
            | Self::FmMaxTuneError
            | Self::FmRsqIntSource
            | Self::FmSoftMuteRate
            | Self::FmSoftMuteSlope
            | Self::FmSoftMuteMaxAttenuation
            | Self::FmSoftMuteSnrThreshold
            | Self::FmSeekBandBottom
            | Self::FmSeekBandTop
            | Self::FmSeekFreqSpacing
            | Self::FmSeekTuneSnrThreshold
            | Self::FmSeekTuneRssiThreshold
            | Self::FmRdsIntSource
            | Self::FmRdsIntFifoCount
            | Self::FmRdsConfig
            | Self::FmRdsConfidence
            | Self::FmBlendRssiStereoThreshold
            | Self::FmBlendRssiMonoThreshold => PropertyScope::Fm,

            Self::AmSeekBandBottom
            | Self::AmSeekBandTop
            | Self::AmSeekFreqSpacing
            | Self::AmSeekSnrThreshold
            | Self::AmSeekRssiThreshold
            | Self::AmDeemphasis
            | Self::AmFrontendAgcControl => PropertyScope::Am,

            Self::AmChannelFilter
            | Self::AmAvcMaxGain
            | Self::AmAfcPullInRange
            | Self::AmSoftMuteRate
            | Self::AmSoftMuteSlope
            | Self::AmSoftMuteMaxAttenuation
            | Self::AmSoftMuteSnrThreshold => PropertyScope::AmSsb,
        }
    }

    /// Checks a raw value against the documented range for this id.
    ///
    /// Bit-field properties (interrupt enables, RDS config, SSB mode) accept
    /// any value; their individual bits are all defined.
    pub fn validate(self, value: u16) -> bool {
        match self {
            Self::RxVolume => value <= 63,
            Self::RxHardMute => value <= 0x3,
            Self::RefClkFreq => (31_130..=34_406).contains(&value),
            Self::RefClkPrescale => (1..=4095).contains(&value),

            Self::FmDeemphasis => value == 1 || value == 2,
            Self::FmChannelFilter => value <= 4,
            Self::FmBlendStereoThreshold | Self::FmBlendMonoThreshold => value <= 127,
            Self::FmMaxTuneError => value <= 255,
            Self::FmSoftMuteRate => (1..=255).contains(&value),
            Self::FmSoftMuteSlope => value <= 5,
            Self::FmSoftMuteMaxAttenuation => value <= 31,
            Self::FmSoftMuteSnrThreshold => value <= 15,
            Self::FmSeekBandBottom | Self::FmSeekBandTop => (6400..=10800).contains(&value),
            Self::FmSeekFreqSpacing => matches!(value, 5 | 10 | 20),
            Self::FmSeekTuneSnrThreshold | Self::FmSeekTuneRssiThreshold => value <= 127,
            Self::FmRdsIntFifoCount => value <= 25,
            Self::FmBlendRssiStereoThreshold | Self::FmBlendRssiMonoThreshold => value <= 127,

            Self::AmDeemphasis => value <= 1,
            Self::AmChannelFilter => value <= 6,
            Self::AmAvcMaxGain => value <= 0x7800,
            Self::AmSoftMuteRate => (1..=255).contains(&value),
            Self::AmSoftMuteSlope => (1..=5).contains(&value),
            Self::AmSoftMuteMaxAttenuation => value <= 63,
            Self::AmSoftMuteSnrThreshold => value <= 63,
            Self::AmSeekBandBottom | Self::AmSeekBandTop => (149..=23_000).contains(&value),
            Self::AmSeekFreqSpacing => matches!(value, 1 | 5 | 9 | 10),
            Self::AmSeekSnrThreshold | Self::AmSeekRssiThreshold => value <= 63,

            // Bit fields and full-range values
            Self::GpoIen
            | Self::DigitalOutputFormat
            | Self::DigitalOutputSampleRate
            | Self::SsbBfo
            | Self::SsbMode
            | Self::FmRsqIntSource
            | Self::FmRdsIntSource
            | Self::FmRdsConfig
            | Self::FmRdsConfidence
            | Self::AmAfcPullInRange
            | Self::AmFrontendAgcControl => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_id_round_trips() {
        for property in [
            Property::GpoIen,
            Property::SsbBfo,
            Property::FmSeekBandBottom,
            Property::FmRdsConfig,
            Property::AmAvcMaxGain,
            Property::RxHardMute,
        ] {
            assert_eq!(Property::from_id(property.id()), Some(property));
        }
        assert_eq!(Property::from_id(0xBEEF), None);
    }

    #[test]
    fn volume_range_is_0_to_63() {
        assert!(Property::RxVolume.validate(0));
        assert!(Property::RxVolume.validate(63));
        assert!(!Property::RxVolume.validate(64));
    }

    #[test]
    fn seek_spacing_accepts_only_documented_steps() {
        assert!(Property::FmSeekFreqSpacing.validate(10));
        assert!(!Property::FmSeekFreqSpacing.validate(7));
        assert!(Property::AmSeekFreqSpacing.validate(9));
        assert!(!Property::AmSeekFreqSpacing.validate(2));
    }

    #[test]
    fn scope_separates_functions() {
        assert_eq!(Property::RxVolume.scope(), PropertyScope::Global);
        assert_eq!(Property::FmRdsConfig.scope(), PropertyScope::Fm);
        assert_eq!(Property::AmSeekBandTop.scope(), PropertyScope::Am);
        assert_eq!(Property::SsbBfo.scope(), PropertyScope::Ssb);
        assert_eq!(Property::AmChannelFilter.scope(), PropertyScope::AmSsb);
    }

    #[test]
    fn bfo_accepts_full_signed_range() {
        assert!(Property::SsbBfo.validate(0));
        assert!(Property::SsbBfo.validate((-1_000i16) as u16));
        assert!(Property::SsbBfo.validate(0xFFFF));
    }
}
