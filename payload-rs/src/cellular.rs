//! Position message assembly for the cellular path. Best-effort: the
//! message carries a maps link so a phone on the recovery crew can open
//! the landing site directly.

use black_box::record::{ConfigRecord, TelemetryRecord};

use crate::downlink::{push_latitude, push_longitude, push_time, SentenceBuilder, CALLSIGN};

pub const MESSAGE_CAPACITY: usize = 160;

const MAPS_URL: &[u8] = b"http://maps.google.com/maps?q=";

/// Renders the recovery SMS text and returns its length.
pub fn build_position_message(
    config: &ConfigRecord,
    record: &TelemetryRecord,
    buffer: &mut [u8; MESSAGE_CAPACITY],
) -> usize {
    let mut message = SentenceBuilder::new(buffer);

    message.push_bytes(CALLSIGN);
    message.push_unsigned(u32::from(config.last_record));
    message.push_byte(b' ');
    message.push_unsigned(u32::from(config.mode.as_byte()));
    message.push_unsigned(u32::from(record.status.to_byte()));
    message.push_byte(b' ');
    message.push_signed(record.altitude_m);
    message.push_bytes(b"m ");
    message.push_bytes(MAPS_URL);
    // `+` keeps the degree/minute split URL-safe.
    push_latitude(&mut message, record, b'+');
    message.push_byte(b',');
    push_longitude(&mut message, record, b'+');
    message.push_byte(b' ');
    push_time(&mut message, record);

    message.len()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn message_contains_maps_link() {
        let mut record = TelemetryRecord::empty();
        record.latitude = *b"52061234";
        record.longitude = *b"005284321";
        record.lat_north = true;
        record.lon_east = true;
        record.altitude_m = 152;

        let config = ConfigRecord::first_boot();

        let mut buffer = [0_u8; MESSAGE_CAPACITY];
        let len = build_position_message(&config, &record, &mut buffer);
        let message = &buffer[..len];

        let expected = b"http://maps.google.com/maps?q=52+06.1234N,005+28.4321E";
        assert!(message
            .windows(expected.len())
            .any(|window| window == expected));
        assert!(message.starts_with(b"STRATO1"));
    }
}
