use black_box::{
    record::{ConfigRecord, Record, TelemetryRecord},
    store::RecordStore,
};
use serde::{Deserialize, Serialize};

/// Upper bound on the configurable history window, sized for the stack
/// of the smallest target this runs on.
pub const MAX_HISTORY_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryVerdict {
    /// Too few stored records, or one of them would not read back.
    InsufficientHistory,
    BurstDetected,
    Timeout,
    Continue,
}

/// Reads the most recent stored altitudes, oldest first, appends the
/// current unsaved one, and judges the tail of the window.
///
/// Descent counts only when every step of the tail is strictly downhill;
/// a single flat or rising sample clears the detector. No partial
/// credit, no hysteresis.
pub struct HistoryEvaluator {
    depth: usize,
    tail: usize,
    timeout_hours: u8,
}

impl HistoryEvaluator {
    pub fn new(depth: u16, tail: u16, timeout_hours: u8) -> Self {
        let depth = (depth as usize).min(MAX_HISTORY_DEPTH).max(1);
        Self {
            depth,
            tail: (tail as usize).clamp(1, depth),
            timeout_hours,
        }
    }

    pub fn verdict<const RECORDS_PER_BANK: usize>(
        &self,
        store: &mut RecordStore<RECORDS_PER_BANK>,
        config: &ConfigRecord,
        current: &TelemetryRecord,
    ) -> HistoryVerdict {
        let last = config.last_record as usize;
        if last < self.depth {
            return HistoryVerdict::InsufficientHistory;
        }

        let mut altitudes = [0_i32; MAX_HISTORY_DEPTH + 1];
        for i in 0..self.depth {
            let slot = (last - (self.depth - 1) + i) as u16;
            match store.load(slot) {
                Ok(Record::Telemetry(record)) => altitudes[i] = record.altitude_m,
                // An unreadable sample disqualifies detection for this
                // cycle rather than feeding the detector garbage.
                _ => return HistoryVerdict::InsufficientHistory,
            }
        }
        altitudes[self.depth] = current.altitude_m;

        if self.tail_is_descending(&altitudes) {
            return HistoryVerdict::BurstDetected;
        }

        if mission_timed_out(config, current, self.timeout_hours) {
            return HistoryVerdict::Timeout;
        }

        HistoryVerdict::Continue
    }

    fn tail_is_descending(&self, altitudes: &[i32; MAX_HISTORY_DEPTH + 1]) -> bool {
        for i in (self.depth - self.tail)..self.depth {
            if altitudes[i] <= altitudes[i + 1] {
                return false;
            }
        }
        true
    }
}

/// Elapsed-time half of the monitored-ascent check: true once the
/// mission has been airborne longer than `timeout_hours` measured from
/// the launch time of day recorded in the configuration.
pub fn mission_timed_out(config: &ConfigRecord, current: &TelemetryRecord, timeout_hours: u8) -> bool {
    if current.days > 0 {
        return true;
    }

    let hour_diff = i16::from(current.hours) - i16::from(config.launch_hours);
    hour_diff > i16::from(timeout_hours)
        || (hour_diff == i16::from(timeout_hours) && current.minutes >= config.launch_minutes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn config_with_launch(hours: u8, minutes: u8) -> ConfigRecord {
        let mut config = ConfigRecord::first_boot();
        config.launch_hours = hours;
        config.launch_minutes = minutes;
        config
    }

    fn record_at(hours: u8, minutes: u8, days: u8) -> TelemetryRecord {
        let mut record = TelemetryRecord::empty();
        record.hours = hours;
        record.minutes = minutes;
        record.days = days;
        record
    }

    #[test]
    fn timeout_on_day_rollover() {
        let config = config_with_launch(23, 50);
        assert!(mission_timed_out(&config, &record_at(0, 10, 1), 6));
    }

    #[test]
    fn timeout_after_six_hours() {
        let config = config_with_launch(9, 30);
        assert!(!mission_timed_out(&config, &record_at(15, 29, 0), 6));
        assert!(mission_timed_out(&config, &record_at(15, 30, 0), 6));
        assert!(mission_timed_out(&config, &record_at(16, 0, 0), 6));
    }

    #[test]
    fn no_timeout_early_in_flight() {
        let config = config_with_launch(9, 30);
        assert!(!mission_timed_out(&config, &record_at(10, 45, 0), 6));
    }
}
