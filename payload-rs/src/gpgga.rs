//! Minimal GPGGA sentence parsing. Only the fields the mission needs
//! are pulled out, all of them kept as the fixed-width ASCII the record
//! layout stores; nothing here touches floating point.

use serde::{Deserialize, Serialize};
use shared::gps_hal::PositionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpggaError {
    NotGpgga,
    TooFewFields,
    BadChecksum,
}

const FIELD_COUNT: usize = 10;

/// Parses a raw `$GPGGA` sentence into a position snapshot.
///
/// The trailing `*hh` checksum is verified when present; sentences from
/// a receiver that omits it are accepted as-is.
pub fn parse(sentence: &[u8]) -> Result<PositionSnapshot, GpggaError> {
    let body = checksum_verified_body(sentence)?;

    let mut fields: [&[u8]; FIELD_COUNT] = [&[]; FIELD_COUNT];
    let mut count = 0;
    for field in body.split(|&byte| byte == b',') {
        if count == FIELD_COUNT {
            break;
        }
        fields[count] = field;
        count += 1;
    }

    if fields[0] != b"GPGGA" && fields[0] != b"$GPGGA" {
        return Err(GpggaError::NotGpgga);
    }
    // Through the altitude field: talker, time, lat, N/S, lon, E/W,
    // quality, satellites, HDOP, altitude.
    if count < FIELD_COUNT {
        return Err(GpggaError::TooFewFields);
    }

    let mut snapshot = PositionSnapshot::empty();
    copy_field(&mut snapshot.time, fields[1]);
    copy_field(&mut snapshot.latitude, fields[2]);
    snapshot.lat_north = fields[3].first() == Some(&b'N');
    copy_field(&mut snapshot.longitude, fields[4]);
    snapshot.lon_east = fields[5].first() == Some(&b'E');
    snapshot.fix_quality = fields[6]
        .first()
        .filter(|byte| byte.is_ascii_digit())
        .map(|byte| byte - b'0')
        .unwrap_or(0);
    snapshot.satellites = parse_small_number(fields[7]);
    copy_field(&mut snapshot.altitude, fields[9]);

    Ok(snapshot)
}

/// Strips the leading `$` and trailing `*hh`, verifying the checksum if
/// one is there. NMEA checksums are the XOR of everything between them.
fn checksum_verified_body(sentence: &[u8]) -> Result<&[u8], GpggaError> {
    let sentence = sentence.strip_prefix(b"$").unwrap_or(sentence);

    let star = match sentence.iter().rposition(|&byte| byte == b'*') {
        Some(position) => position,
        None => return Ok(sentence),
    };

    let body = &sentence[..star];
    let mut checksum = 0_u8;
    for &byte in body {
        checksum ^= byte;
    }

    let expected = &sentence[star + 1..];
    if expected.len() < 2 {
        return Err(GpggaError::BadChecksum);
    }
    match (hex_digit(expected[0]), hex_digit(expected[1])) {
        (Some(high), Some(low)) if (high << 4 | low) == checksum => Ok(body),
        _ => Err(GpggaError::BadChecksum),
    }
}

fn copy_field(target: &mut [u8], field: &[u8]) {
    let len = field.len().min(target.len());
    target[..len].copy_from_slice(&field[..len]);
}

fn parse_small_number(field: &[u8]) -> u8 {
    let mut value: u16 = 0;
    for &byte in field {
        if !byte.is_ascii_digit() {
            return 0;
        }
        value = (value * 10 + u16::from(byte - b'0')).min(255);
    }
    value as u8
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}
