use black_box::record::{TelemetryRecord, ALTITUDE_MAX_M, ALTITUDE_MIN_M};
use shared::{
    gps_hal::{parse_ascii_meters, parse_digit_pair, PositionSnapshot},
    payload_hal::PressureSource,
};

use crate::{
    history::{HistoryEvaluator, HistoryVerdict},
    MissionCtl,
};

impl<'a, const RECORDS_PER_BANK: usize> MissionCtl<'a, RECORDS_PER_BANK> {
    pub fn history_verdict(&mut self) -> HistoryVerdict {
        HistoryEvaluator::new(
            self.params.history_depth,
            self.params.burst_tail,
            self.params.timeout_hours,
        )
        .verdict(&mut self.store, &self.config, &self.current)
    }

    /// Fills `self.current` from the sensor and GPS collaborators,
    /// deriving the ascending/moving flags against `self.previous`.
    pub(crate) fn acquire_current_record(&mut self) {
        let mut record = TelemetryRecord::empty();
        // Shape comes from the slot; this bit is wire-format filler.
        record.status.config = false;
        record.status.radio_on = true;
        record.status.chute_deployed = self.config.status.chute_deployed;

        match self.sensors.read_temperature_pair() {
            Ok((internal, external)) => {
                record.internal_temp = internal;
                record.external_temp = external;
            }
            Err(_) => record.status.error = true,
        }

        match self.sensors.read_pressure() {
            Ok((pascals, source)) => {
                record.pressure_pa = pascals & 0x00ff_ffff;
                record.baro_digital = source == PressureSource::Digital;
            }
            Err(_) => record.status.error = true,
        }

        // A sentence can take a second or more to arrive; do not let the
        // watchdog fire while waiting on it.
        self.driver.feed_watchdog();
        match self.gps.acquire_position() {
            Some(snapshot) => self.apply_position(&mut record, &snapshot),
            None => self.apply_stale_position(&mut record),
        }
        self.driver.feed_watchdog();

        record.status.ascending = record.altitude_m > self.previous.altitude_m;
        record.status.moving = moving_between(&record, &self.previous);
        record.status.gsm_on = self.cellular.modem_ready();

        self.current = record;
    }

    fn apply_position(&mut self, record: &mut TelemetryRecord, snapshot: &PositionSnapshot) {
        record.status.gps_lock = snapshot.has_lock();
        record.status.error |= !snapshot.has_lock();
        record.lat_north = snapshot.lat_north;
        record.lon_east = snapshot.lon_east;

        record.hours = parse_digit_pair(&snapshot.time[0..2]);
        record.minutes = parse_digit_pair(&snapshot.time[2..4]);
        record.seconds = parse_digit_pair(&snapshot.time[4..6]);
        record.days = if record.hours < self.previous.hours {
            self.previous.days.saturating_add(1)
        } else {
            self.previous.days
        };

        record.altitude_m =
            parse_ascii_meters(&snapshot.altitude).clamp(ALTITUDE_MIN_M, ALTITUDE_MAX_M);

        // Latitude ddmm.mmmm and longitude dddmm.mmmm are stored with
        // the dot elided.
        record.latitude[..4].copy_from_slice(&snapshot.latitude[..4]);
        record.latitude[4..].copy_from_slice(&snapshot.latitude[5..9]);
        record.longitude[..5].copy_from_slice(&snapshot.longitude[..5]);
        record.longitude[5..].copy_from_slice(&snapshot.longitude[6..10]);
    }

    /// No sentence at all: carry the previous position fields, mark the
    /// cycle as lockless, and fall back to the barometric altitude so
    /// the ascent comparison still means something.
    fn apply_stale_position(&mut self, record: &mut TelemetryRecord) {
        record.status.gps_lock = false;
        record.status.error = true;
        record.latitude = self.previous.latitude;
        record.longitude = self.previous.longitude;
        record.lat_north = self.previous.lat_north;
        record.lon_east = self.previous.lon_east;
        record.hours = self.previous.hours;
        record.minutes = self.previous.minutes;
        record.seconds = self.previous.seconds;
        record.days = self.previous.days;

        record.altitude_m = match self.sensors.read_altitude_reference() {
            Ok(meters) => meters.clamp(ALTITUDE_MIN_M, ALTITUDE_MAX_M),
            Err(_) => self.previous.altitude_m,
        };
    }
}

/// Movement test between consecutive records: without a lock on both
/// sides nothing real can be said, otherwise any differing position
/// digit or altitude counts. Exact comparison, no tolerance.
pub(crate) fn moving_between(current: &TelemetryRecord, previous: &TelemetryRecord) -> bool {
    if !current.status.gps_lock || !previous.status.gps_lock {
        return false;
    }

    current.longitude != previous.longitude
        || current.latitude != previous.latitude
        || current.altitude_m != previous.altitude_m
}
