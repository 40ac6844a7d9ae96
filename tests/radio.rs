//! End-to-end driver tests against the simulated chip.

mod common;

use common::{NoopDelay, SimBus, SimPin};
use si4735::{
    Error, Mode, Property, SeekDirection, SeekOutcome, SenPin, Si4735, Sideband,
};

fn radio(sim: SimBus) -> Si4735<SimBus, SimPin, NoopDelay> {
    Si4735::new(sim, SenPin::Low, SimPin, NoopDelay)
}

/// PS name group (0A): segment address in B, two characters in D.
fn ps_group(pi: u16, segment: u16, chars: [u8; 2]) -> [u16; 4] {
    [pi, segment, 0, u16::from_be_bytes(chars)]
}

#[test]
fn fm_setup_tunes_initial_channel_and_programs_band() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    assert_eq!(radio.mode(), Some(Mode::Fm));
    assert_eq!(radio.frequency(), Some(10390));

    let (sim, _, _) = radio.release();
    assert_eq!(sim.property(Property::FmSeekBandBottom.id()), Some(8750));
    assert_eq!(sim.property(Property::FmSeekBandTop.id()), Some(10800));
    assert_eq!(sim.property(Property::FmSeekFreqSpacing.id()), Some(10));
}

#[test]
fn band_plans_outside_the_property_ranges_are_rejected_before_power_up() {
    let mut radio = radio(SimBus::new());

    // Spacing 7 is not a documented FM seek step
    assert_eq!(
        radio.set_fm(8750, 10800, 8757, 7),
        Err(Error::InvalidProperty)
    );
    // Band bottom below the documented FM seek range
    assert_eq!(
        radio.set_fm(6000, 10800, 8750, 10),
        Err(Error::InvalidProperty)
    );
    // Band bottom below the documented AM seek range
    assert_eq!(
        radio.set_am(100, 1710, 1000, 10),
        Err(Error::InvalidProperty)
    );
    assert_eq!(radio.mode(), None);
    assert_eq!(radio.frequency(), None);

    let (sim, _, _) = radio.release();
    assert_eq!(sim.property(Property::FmSeekFreqSpacing.id()), None);
    assert_eq!(sim.property(Property::FmSeekBandBottom.id()), None);
    assert_eq!(sim.property(Property::AmSeekBandBottom.id()), None);
}

#[test]
fn failed_band_programming_reports_no_phantom_frequency() {
    let mut radio = radio(SimBus::new().failing_property_writes());
    assert!(radio.set_fm(8750, 10800, 10390, 10).is_err());
    assert_eq!(radio.frequency(), None);
}

#[test]
fn out_of_band_and_off_raster_frequencies_are_rejected() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    assert_eq!(radio.set_frequency(10810), Err(Error::OutOfRange));
    assert_eq!(radio.set_frequency(9505), Err(Error::OutOfRange));
    assert_eq!(radio.frequency(), Some(10390));
}

#[test]
fn seek_up_wraps_and_lands_on_the_station() {
    let mut radio = radio(SimBus::new().with_stations(&[9500]));
    radio.set_fm(8750, 10800, 10000, 10).unwrap();

    let outcome = radio.seek_station(SeekDirection::Up).unwrap();
    assert_eq!(outcome, SeekOutcome::Station(9500));
    assert_eq!(radio.frequency(), Some(9500));
}

#[test]
fn seek_down_finds_the_nearer_station_below() {
    let mut radio = radio(SimBus::new().with_stations(&[9500, 10100]));
    radio.set_fm(8750, 10800, 10000, 10).unwrap();

    let outcome = radio.seek_station(SeekDirection::Down).unwrap();
    assert_eq!(outcome, SeekOutcome::Station(9500));
}

#[test]
fn repeated_seeks_over_an_empty_band_return_to_the_start() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10000, 10).unwrap();

    let outcome = radio.seek_station(SeekDirection::Up).unwrap();
    assert_eq!(outcome, SeekOutcome::NoStationFound(10000));
    assert_eq!(radio.frequency(), Some(10000));

    // Idempotent: a second full wrap lands on the same starting channel
    let outcome = radio.seek_station(SeekDirection::Up).unwrap();
    assert_eq!(outcome, SeekOutcome::NoStationFound(10000));
    assert_eq!(radio.frequency(), Some(10000));
}

#[test]
fn seek_reports_progress_while_pending() {
    let mut radio = radio(SimBus::new().with_stations(&[9500]).with_seek_delay(3));
    radio.set_fm(8750, 10800, 10000, 10).unwrap();

    let mut polls = 0;
    let outcome = radio
        .seek_station_with_progress(SeekDirection::Up, |_| polls += 1)
        .unwrap();
    assert_eq!(outcome, SeekOutcome::Station(9500));
    assert!(polls >= 1);
}

#[test]
fn stalled_tune_times_out() {
    let mut radio = radio(SimBus::new().stalled());
    radio.set_max_delay_set_frequency(5);
    assert_eq!(radio.set_fm(8750, 10800, 10000, 10), Err(Error::TuneTimeout));
}

#[test]
fn seek_budget_expiry_reports_seek_timeout() {
    let sim = SimBus::new().with_stations(&[9500]).with_seek_delay(1_000);
    let mut radio = radio(sim);
    radio.set_fm(8750, 10800, 10000, 10).unwrap();

    radio.set_max_seek_time(5);
    assert_eq!(
        radio.seek_station(SeekDirection::Up),
        Err(Error::SeekTimeout)
    );
}

#[test]
fn properties_round_trip_through_the_chip() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    radio
        .set_property(Property::FmBlendStereoThreshold, 49)
        .unwrap();
    assert_eq!(radio.get_property(Property::FmBlendStereoThreshold), Ok(49));
}

#[test]
fn invalid_property_values_and_wrong_mode_ids_are_rejected() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    assert_eq!(
        radio.set_property(Property::RxVolume, 64),
        Err(Error::InvalidProperty)
    );
    assert_eq!(
        radio.set_property(Property::AmSeekBandTop, 1710),
        Err(Error::InvalidProperty)
    );
    assert_eq!(
        radio.get_property(Property::AmSeekBandTop),
        Err(Error::InvalidProperty)
    );
}

#[test]
fn volume_and_mute_write_the_output_properties() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    radio.set_volume(45).unwrap();
    radio.set_mute(true).unwrap();

    let (sim, _, _) = radio.release();
    assert_eq!(sim.property(Property::RxVolume.id()), Some(45));
    assert_eq!(sim.property(Property::RxHardMute.id()), Some(3));
}

#[test]
fn powered_down_driver_rejects_tuning() {
    let mut radio = radio(SimBus::new());
    assert_eq!(radio.set_frequency(10390), Err(Error::PoweredDown));

    radio.set_fm(8750, 10800, 10390, 10).unwrap();
    radio.power_down().unwrap();
    assert_eq!(radio.set_frequency(10390), Err(Error::PoweredDown));
    assert_eq!(radio.frequency(), None);
}

#[test]
fn absent_hardware_reports_power_up_failure() {
    let mut radio = radio(SimBus::new().absent());
    assert_eq!(
        radio.set_fm(8750, 10800, 10390, 10),
        Err(Error::PowerUpFailed)
    );
}

#[test]
fn am_band_uses_the_am_property_set() {
    let mut radio = radio(SimBus::new());
    radio.set_am(520, 1710, 1000, 10).unwrap();

    assert_eq!(radio.mode(), Some(Mode::Am));
    assert_eq!(radio.frequency(), Some(1000));

    let (sim, _, _) = radio.release();
    assert_eq!(sim.property(Property::AmSeekBandBottom.id()), Some(520));
    assert_eq!(sim.property(Property::AmSeekBandTop.id()), Some(1710));
}

#[test]
fn rds_polling_is_fm_only() {
    let mut radio = radio(SimBus::new());
    radio.set_am(520, 1710, 1000, 10).unwrap();
    assert_eq!(radio.poll_rds(), Err(Error::ModeMismatch));
}

#[test]
fn rds_station_name_assembles_from_polled_groups() {
    let mut sim = SimBus::new();
    sim.push_rds_group(ps_group(0x1234, 0, *b"RU"));
    sim.push_rds_group(ps_group(0x1234, 1, *b"ST"));
    sim.push_rds_group(ps_group(0x1234, 2, *b" F"));
    sim.push_rds_group(ps_group(0x1234, 3, *b"M "));

    let mut radio = radio(sim);
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    while radio.poll_rds().unwrap() {}
    assert_eq!(radio.rds().program_id(), Some(0x1234));
    assert_eq!(radio.rds().program_service(), Some("RUST FM"));
}

#[test]
fn ssb_patch_flow_tunes_and_accepts_bfo() {
    let mut radio = radio(SimBus::new());
    assert_eq!(radio.send_patch_chunk(&[0x15; 8]), Err(Error::ModeMismatch));

    radio.patch_power_up().unwrap();
    radio.send_patch_chunk(&[0x15; 8]).unwrap();
    radio.send_patch_chunk(&[0x16; 8]).unwrap();
    radio.set_ssb(7000, 7300, 7074, 1, Sideband::Usb).unwrap();

    assert_eq!(radio.mode(), Some(Mode::Ssb(Sideband::Usb)));
    assert_eq!(radio.frequency(), Some(7074));
    radio.set_bfo(-500).unwrap();

    assert_eq!(
        radio.seek_station(SeekDirection::Up),
        Err(Error::ModeMismatch)
    );
    assert_eq!(radio.send_patch_chunk(&[0x15; 8]), Err(Error::ModeMismatch));

    let (sim, _, _) = radio.release();
    assert_eq!(sim.patch_bytes, 16);
}

#[test]
fn bfo_is_rejected_outside_ssb() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();
    assert_eq!(radio.set_bfo(-500), Err(Error::ModeMismatch));
}

#[test]
fn signal_quality_carries_fm_only_fields() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();

    let quality = radio.signal_quality().unwrap();
    assert_eq!(quality.rssi, 50);
    assert_eq!(quality.stereo_pilot, Some(true));
    assert_eq!(quality.stereo_blend, Some(100));
    assert_eq!(quality.freq_offset, Some(-1));

    radio.set_am(520, 1710, 1000, 10).unwrap();
    let quality = radio.signal_quality().unwrap();
    assert_eq!(quality.rssi, 40);
    assert_eq!(quality.stereo_pilot, None);
}

#[test]
fn revision_reports_the_part_number() {
    let mut radio = radio(SimBus::new());
    radio.set_fm(8750, 10800, 10390, 10).unwrap();
    assert_eq!(radio.revision().unwrap().part_number, 35);
}
