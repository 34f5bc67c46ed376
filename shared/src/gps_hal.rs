use serde::{Deserialize, Serialize};

/// Field widths of a GPGGA fix, ASCII as received. Latitude is
/// `ddmm.mmmm`, longitude `dddmm.mmmm`, both with the dot in place.
pub const TIME_WIDTH: usize = 6;
pub const LATITUDE_WIDTH: usize = 9;
pub const LONGITUDE_WIDTH: usize = 10;
pub const ALTITUDE_WIDTH: usize = 10;

/// One position fix as reported by the GPS collaborator. All positional
/// fields are fixed-width ASCII; the core never converts them to floating
/// point, it compares digit sequences and parses small integers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// UTC time of day, `hhmmss`.
    pub time: [u8; TIME_WIDTH],
    pub latitude: [u8; LATITUDE_WIDTH],
    pub lat_north: bool,
    pub longitude: [u8; LONGITUDE_WIDTH],
    pub lon_east: bool,
    /// GPGGA fix quality: 0 none, 1 SPS, 2 differential.
    pub fix_quality: u8,
    pub satellites: u8,
    /// Altitude in meters, ASCII, optionally signed, NUL padded.
    pub altitude: [u8; ALTITUDE_WIDTH],
}

impl PositionSnapshot {
    pub const fn empty() -> Self {
        Self {
            time: [b'0'; TIME_WIDTH],
            latitude: [b'0'; LATITUDE_WIDTH],
            lat_north: false,
            longitude: [b'0'; LONGITUDE_WIDTH],
            lon_east: false,
            fix_quality: 0,
            satellites: 0,
            altitude: [0; ALTITUDE_WIDTH],
        }
    }

    /// An SPS fix is the only quality this receiver reports in practice;
    /// anything else counts as no lock.
    pub fn has_lock(&self) -> bool {
        self.fix_quality == 1
    }
}

/// GPS collaborator. `None` means no sentence could be acquired at all;
/// the caller then proceeds with lock false and stale position fields.
pub trait PositionSource {
    fn acquire_position(&mut self) -> Option<PositionSnapshot>;
}

/// Parses a two-ASCII-digit field (`"07"` -> 7). Anything that is not two
/// digits parses as 0, matching the tolerant behavior of the original
/// time handling.
pub fn parse_digit_pair(field: &[u8]) -> u8 {
    if field.len() < 2 {
        return 0;
    }
    match (ascii_digit(field[0]), ascii_digit(field[1])) {
        (Some(tens), Some(ones)) => tens * 10 + ones,
        _ => 0,
    }
}

/// Parses an optionally signed ASCII integer, stopping at the first
/// non-digit (a decimal point truncates). Saturates instead of wrapping.
pub fn parse_ascii_meters(field: &[u8]) -> i32 {
    let mut value: i32 = 0;
    let mut seen_digit = false;
    let negative = field.first() == Some(&b'-');
    let digits = if negative { &field[1..] } else { field };

    for &byte in digits {
        match ascii_digit(byte) {
            Some(digit) => {
                seen_digit = true;
                value = value.saturating_mul(10).saturating_add(i32::from(digit));
            }
            None => break,
        }
    }

    if !seen_digit {
        return 0;
    }
    if negative {
        -value
    } else {
        value
    }
}

fn ascii_digit(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}
