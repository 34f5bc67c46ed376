use serde::{Deserialize, Serialize};
use shared::FlightMode;

/// Every stored record occupies exactly this many bytes, telemetry and
/// configuration alike. The layout is the EEPROM wire format of the
/// flown hardware and must not drift.
pub const RECORD_SIZE: usize = 32;

pub const CELL_NUMBER_LEN: usize = 16;
pub const PHONE_PIN_LEN: usize = 4;
pub const LATITUDE_LEN: usize = 8;
pub const LONGITUDE_LEN: usize = 9;

/// Range of the stored 24-bit signed altitude, in meters.
pub const ALTITUDE_MIN_M: i32 = -8_388_608;
pub const ALTITUDE_MAX_M: i32 = 8_388_607;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecError {
    WrongLength,
    UnknownMode(u8),
}

/// Which shape a slot holds. Decided by the slot index at the store
/// boundary, never by inspecting record content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Config,
    Telemetry,
}

/// Status byte present in every record. Bit positions are wire format.
///
/// `config` marks nothing the firmware acts on (shape comes from the slot
/// index); it is kept at its bit position and written 0 on telemetry
/// records for compatibility with logged flights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStatus {
    pub ascending: bool,
    pub moving: bool,
    pub chute_deployed: bool,
    pub gps_lock: bool,
    pub radio_on: bool,
    pub gsm_on: bool,
    pub error: bool,
    pub config: bool,
}

impl RecordStatus {
    pub fn to_byte(&self) -> u8 {
        (self.ascending as u8)
            | (self.moving as u8) << 1
            | (self.chute_deployed as u8) << 2
            | (self.gps_lock as u8) << 3
            | (self.radio_on as u8) << 4
            | (self.gsm_on as u8) << 5
            | (self.error as u8) << 6
            | (self.config as u8) << 7
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            ascending: byte & 0x01 != 0,
            moving: byte & 0x02 != 0,
            chute_deployed: byte & 0x04 != 0,
            gps_lock: byte & 0x08 != 0,
            radio_on: byte & 0x10 != 0,
            gsm_on: byte & 0x20 != 0,
            error: byte & 0x40 != 0,
            config: byte & 0x80 != 0,
        }
    }
}

/// One mission sample. Multi-byte fields are little-endian on the wire;
/// latitude/longitude are ASCII digits with the decimal dot elided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub status: RecordStatus,
    /// UTC time of day of the fix.
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    /// Whole days elapsed since launch.
    pub days: u8,
    /// Raw internal sensor count, 12 significant bits.
    pub internal_temp: i16,
    /// Raw external sensor count, 12 significant bits.
    pub external_temp: i16,
    /// Pascals, 24 significant bits.
    pub pressure_pa: u32,
    pub baro_digital: bool,
    pub lat_north: bool,
    pub lon_east: bool,
    /// `ddmm.mmmm` with the dot elided.
    pub latitude: [u8; LATITUDE_LEN],
    /// `dddmm.mmmm` with the dot elided.
    pub longitude: [u8; LONGITUDE_LEN],
    /// GPS altitude in meters, clamped to the stored 24-bit range.
    pub altitude_m: i32,
}

impl TelemetryRecord {
    pub const fn empty() -> Self {
        Self {
            status: RecordStatus {
                ascending: false,
                moving: false,
                chute_deployed: false,
                gps_lock: false,
                radio_on: false,
                gsm_on: false,
                error: false,
                config: false,
            },
            seconds: 0,
            minutes: 0,
            hours: 0,
            days: 0,
            internal_temp: 0,
            external_temp: 0,
            pressure_pa: 0,
            baro_digital: false,
            lat_north: false,
            lon_east: false,
            latitude: [b'0'; LATITUDE_LEN],
            longitude: [b'0'; LONGITUDE_LEN],
            altitude_m: 0,
        }
    }

    /// Stand-in for the record before the first real one: lowest
    /// representable altitude, not moving, not ascending. Whatever the
    /// first real fix reports will read as higher.
    pub const fn sentinel() -> Self {
        let mut record = Self::empty();
        record.altitude_m = ALTITUDE_MIN_M;
        record
    }

    pub fn encode(&self, buffer: &mut [u8; RECORD_SIZE]) {
        buffer.fill(0);
        buffer[0] = self.status.to_byte();
        buffer[1] = self.seconds;
        buffer[2] = self.minutes;
        buffer[3] = self.hours;
        buffer[4] = self.days;

        let packed_temp = pack_temperatures(self.internal_temp, self.external_temp);
        buffer[5..8].copy_from_slice(&packed_temp.to_le_bytes()[..3]);
        buffer[8..11].copy_from_slice(&(self.pressure_pa & 0x00ff_ffff).to_le_bytes()[..3]);

        buffer[11] = (self.baro_digital as u8)
            | (self.lat_north as u8) << 1
            | (self.lon_east as u8) << 2;

        buffer[12..12 + LATITUDE_LEN].copy_from_slice(&self.latitude);
        buffer[20..20 + LONGITUDE_LEN].copy_from_slice(&self.longitude);

        let altitude = self.altitude_m.clamp(ALTITUDE_MIN_M, ALTITUDE_MAX_M);
        buffer[29..32].copy_from_slice(&(altitude as u32).to_le_bytes()[..3]);
    }

    pub fn decode(buffer: &[u8]) -> Result<Self, CodecError> {
        if buffer.len() != RECORD_SIZE {
            return Err(CodecError::WrongLength);
        }

        let packed_temp =
            u32::from(buffer[5]) | u32::from(buffer[6]) << 8 | u32::from(buffer[7]) << 16;
        let (internal_temp, external_temp) = unpack_temperatures(packed_temp);

        let mut latitude = [0_u8; LATITUDE_LEN];
        latitude.copy_from_slice(&buffer[12..12 + LATITUDE_LEN]);
        let mut longitude = [0_u8; LONGITUDE_LEN];
        longitude.copy_from_slice(&buffer[20..20 + LONGITUDE_LEN]);

        let raw_altitude =
            u32::from(buffer[29]) | u32::from(buffer[30]) << 8 | u32::from(buffer[31]) << 16;

        Ok(Self {
            status: RecordStatus::from_byte(buffer[0]),
            seconds: buffer[1],
            minutes: buffer[2],
            hours: buffer[3],
            days: buffer[4],
            internal_temp,
            external_temp,
            pressure_pa: u32::from(buffer[8])
                | u32::from(buffer[9]) << 8
                | u32::from(buffer[10]) << 16,
            baro_digital: buffer[11] & 0x01 != 0,
            lat_north: buffer[11] & 0x02 != 0,
            lon_east: buffer[11] & 0x04 != 0,
            latitude,
            longitude,
            altitude_m: sign_extend_24(raw_altitude),
        })
    }
}

/// Mission-wide state held in slot 0. Rewritten after every mode change
/// and after every telemetry save, always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub status: RecordStatus,
    pub mode: FlightMode,
    /// Altitude carried over from the last record. Stored for layout
    /// compatibility; the controller does not act on it.
    pub last_altitude: u16,
    /// Index of the last written telemetry slot; 0 means none yet.
    pub last_record: u16,
    pub cell_number: [u8; CELL_NUMBER_LEN],
    pub phone_pin: [u8; PHONE_PIN_LEN],
    /// Calibration offset for the analog pressure sensor.
    pub analog_pressure_offset: i16,
    pub launch_seconds: u8,
    pub launch_minutes: u8,
    pub launch_hours: u8,
    pub radio_invert: bool,
}

impl ConfigRecord {
    /// First-boot defaults: command mode, no records, blank credentials.
    pub const fn first_boot() -> Self {
        Self {
            status: RecordStatus {
                ascending: false,
                moving: false,
                chute_deployed: false,
                gps_lock: false,
                radio_on: false,
                gsm_on: false,
                error: false,
                config: true,
            },
            mode: FlightMode::GroundCommand,
            last_altitude: 0,
            last_record: 0,
            cell_number: [0; CELL_NUMBER_LEN],
            phone_pin: [0; PHONE_PIN_LEN],
            analog_pressure_offset: 0,
            launch_seconds: 0,
            launch_minutes: 0,
            launch_hours: 0,
            radio_invert: false,
        }
    }

    pub fn encode(&self, buffer: &mut [u8; RECORD_SIZE]) {
        buffer.fill(0);
        buffer[0] = self.status.to_byte();
        buffer[1] = self.mode.as_byte();
        buffer[2..4].copy_from_slice(&self.last_altitude.to_le_bytes());
        buffer[4..6].copy_from_slice(&self.last_record.to_le_bytes());
        buffer[6..6 + CELL_NUMBER_LEN].copy_from_slice(&self.cell_number);
        buffer[22..22 + PHONE_PIN_LEN].copy_from_slice(&self.phone_pin);
        buffer[26..28].copy_from_slice(&self.analog_pressure_offset.to_le_bytes());
        buffer[28] = self.launch_seconds;
        buffer[29] = self.launch_minutes;
        buffer[30] = self.launch_hours;
        buffer[31] = self.radio_invert as u8;
    }

    pub fn decode(buffer: &[u8]) -> Result<Self, CodecError> {
        if buffer.len() != RECORD_SIZE {
            return Err(CodecError::WrongLength);
        }

        let mode = FlightMode::from_byte(buffer[1]).ok_or(CodecError::UnknownMode(buffer[1]))?;

        let mut cell_number = [0_u8; CELL_NUMBER_LEN];
        cell_number.copy_from_slice(&buffer[6..6 + CELL_NUMBER_LEN]);
        let mut phone_pin = [0_u8; PHONE_PIN_LEN];
        phone_pin.copy_from_slice(&buffer[22..22 + PHONE_PIN_LEN]);

        Ok(Self {
            status: RecordStatus::from_byte(buffer[0]),
            mode,
            last_altitude: u16::from_le_bytes([buffer[2], buffer[3]]),
            last_record: u16::from_le_bytes([buffer[4], buffer[5]]),
            cell_number,
            phone_pin,
            analog_pressure_offset: i16::from_le_bytes([buffer[26], buffer[27]]),
            launch_seconds: buffer[28],
            launch_minutes: buffer[29],
            launch_hours: buffer[30],
            radio_invert: buffer[31] != 0,
        })
    }
}

/// A decoded record, tagged by shape. The tag comes from the slot index
/// at the store boundary, replacing the positional union of the flown
/// firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    Config(ConfigRecord),
    Telemetry(TelemetryRecord),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Config(_) => RecordKind::Config,
            Record::Telemetry(_) => RecordKind::Telemetry,
        }
    }

    pub fn encode(&self, buffer: &mut [u8; RECORD_SIZE]) {
        match self {
            Record::Config(config) => config.encode(buffer),
            Record::Telemetry(telemetry) => telemetry.encode(buffer),
        }
    }

    pub fn decode(kind: RecordKind, buffer: &[u8]) -> Result<Self, CodecError> {
        match kind {
            RecordKind::Config => ConfigRecord::decode(buffer).map(Record::Config),
            RecordKind::Telemetry => TelemetryRecord::decode(buffer).map(Record::Telemetry),
        }
    }
}

/// Packs the raw temperature pair into 24 bits: internal in the low 12,
/// external in the high 12.
pub fn pack_temperatures(internal: i16, external: i16) -> u32 {
    ((external as u32 & 0x0fff) << 12) | (internal as u32 & 0x0fff)
}

/// Inverse of [`pack_temperatures`], sign-extending both 12-bit fields.
pub fn unpack_temperatures(packed: u32) -> (i16, i16) {
    (
        sign_extend_12((packed & 0x0fff) as u16),
        sign_extend_12(((packed >> 12) & 0x0fff) as u16),
    )
}

fn sign_extend_12(raw: u16) -> i16 {
    if raw & 0x0800 != 0 {
        (raw | 0xf000) as i16
    } else {
        raw as i16
    }
}

fn sign_extend_24(raw: u32) -> i32 {
    if raw & 0x0080_0000 != 0 {
        (raw | 0xff00_0000) as i32
    } else {
        raw as i32
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_byte_round_trip() {
        for byte in 0..=255_u8 {
            assert_eq!(RecordStatus::from_byte(byte).to_byte(), byte);
        }
    }

    #[test]
    fn temperature_packing_sign_extends() {
        let cases = [(0, 0), (100, -256), (-2048, 2047), (-1, 1)];
        for (internal, external) in cases {
            let packed = pack_temperatures(internal, external);
            assert!(packed <= 0x00ff_ffff);
            assert_eq!(unpack_temperatures(packed), (internal, external));
        }
    }

    #[test]
    fn sentinel_is_floor_altitude() {
        let sentinel = TelemetryRecord::sentinel();
        assert_eq!(sentinel.altitude_m, ALTITUDE_MIN_M);
        assert!(!sentinel.status.ascending);
        assert!(!sentinel.status.moving);
    }

    #[test]
    fn altitude_clamps_to_wire_range() {
        let mut record = TelemetryRecord::empty();
        record.altitude_m = i32::MAX;

        let mut buffer = [0_u8; RECORD_SIZE];
        record.encode(&mut buffer);
        let decoded = TelemetryRecord::decode(&buffer).unwrap();

        assert_eq!(decoded.altitude_m, ALTITUDE_MAX_M);
    }

    #[test]
    fn config_decode_rejects_unknown_mode() {
        let mut buffer = [0_u8; RECORD_SIZE];
        ConfigRecord::first_boot().encode(&mut buffer);
        buffer[1] = 6;

        assert_eq!(
            ConfigRecord::decode(&buffer),
            Err(CodecError::UnknownMode(6))
        );
    }

    #[test]
    fn decode_requires_exact_length() {
        let buffer = [0_u8; RECORD_SIZE - 1];
        assert_eq!(TelemetryRecord::decode(&buffer), Err(CodecError::WrongLength));
        assert_eq!(ConfigRecord::decode(&buffer), Err(CodecError::WrongLength));
    }
}
