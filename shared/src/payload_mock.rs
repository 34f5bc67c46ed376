use core::any::Any;

use crate::{
    comms_hal::{CellularLink, CommsError, TelemetryLink},
    gps_hal::{PositionSnapshot, PositionSource},
    payload_hal::{PayloadDriver, PressureSource, SensorFault, SensorSuite},
};

pub const MOCK_SENTENCE_CAPACITY: usize = 256;

/// Board driver mock. Counts every irreversible action so tests can
/// assert exactly-once behavior.
#[derive(Debug)]
pub struct PayloadDriverMock {
    pub watchdog_feeds: u32,
    pub deploy_count: u32,
    pub reset_count: u32,
    pub shell_entries: u32,
    pub escape_request: bool,
    pub radio_on: bool,
    pub radio_inverted: bool,
}

impl PayloadDriver for PayloadDriverMock {
    fn feed_watchdog(&mut self) {
        self.watchdog_feeds += 1;
    }

    fn deploy_recovery(&mut self) {
        self.deploy_count += 1;
    }

    fn set_radio_power(&mut self, on: bool, invert: bool) {
        self.radio_on = on;
        self.radio_inverted = invert;
    }

    fn reset_mcu(&mut self) {
        self.reset_count += 1;
    }

    fn enter_command_shell(&mut self) {
        self.shell_entries += 1;
    }

    fn command_escape_requested(&mut self) -> bool {
        self.escape_request
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl PayloadDriverMock {
    pub fn new() -> Self {
        Self {
            watchdog_feeds: 0,
            deploy_count: 0,
            reset_count: 0,
            shell_entries: 0,
            escape_request: false,
            radio_on: false,
            radio_inverted: false,
        }
    }
}

impl Default for PayloadDriverMock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SensorSuiteMock {
    pub altitude_m: i32,
    pub internal_temp: i16,
    pub external_temp: i16,
    pub pressure_pa: u32,
    pub pressure_source: PressureSource,
    pub fail_next: bool,
}

impl SensorSuite for SensorSuiteMock {
    fn read_altitude_reference(&mut self) -> Result<i32, SensorFault> {
        if self.fail_next {
            return Err(SensorFault::NoAcknowledge);
        }
        Ok(self.altitude_m)
    }

    fn read_temperature_pair(&mut self) -> Result<(i16, i16), SensorFault> {
        if self.fail_next {
            return Err(SensorFault::NoAcknowledge);
        }
        Ok((self.internal_temp, self.external_temp))
    }

    fn read_pressure(&mut self) -> Result<(u32, PressureSource), SensorFault> {
        if self.fail_next {
            return Err(SensorFault::NoAcknowledge);
        }
        Ok((self.pressure_pa, self.pressure_source))
    }
}

impl SensorSuiteMock {
    pub fn new() -> Self {
        Self {
            altitude_m: 0,
            internal_temp: 0,
            external_temp: 0,
            pressure_pa: 101_325,
            pressure_source: PressureSource::Digital,
            fail_next: false,
        }
    }
}

impl Default for SensorSuiteMock {
    fn default() -> Self {
        Self::new()
    }
}

/// Replays whatever snapshot a test loads into it.
#[derive(Debug)]
pub struct PositionSourceMock {
    pub snapshot: Option<PositionSnapshot>,
}

impl PositionSource for PositionSourceMock {
    fn acquire_position(&mut self) -> Option<PositionSnapshot> {
        self.snapshot
    }
}

impl PositionSourceMock {
    pub fn new() -> Self {
        Self { snapshot: None }
    }
}

impl Default for PositionSourceMock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct TelemetryLinkMock {
    pub sent_count: u32,
    pub last_sentence: [u8; MOCK_SENTENCE_CAPACITY],
    pub last_len: usize,
    pub fail_next: bool,
}

impl TelemetryLink for TelemetryLinkMock {
    fn transmit(&mut self, sentence: &[u8]) -> Result<(), CommsError> {
        if self.fail_next {
            return Err(CommsError::SendFailure);
        }

        let len = sentence.len().min(MOCK_SENTENCE_CAPACITY);
        self.last_sentence[..len].copy_from_slice(&sentence[..len]);
        self.last_len = len;
        self.sent_count += 1;
        Ok(())
    }
}

impl TelemetryLinkMock {
    pub fn new() -> Self {
        Self {
            sent_count: 0,
            last_sentence: [0; MOCK_SENTENCE_CAPACITY],
            last_len: 0,
            fail_next: false,
        }
    }

    pub fn last(&self) -> &[u8] {
        &self.last_sentence[..self.last_len]
    }
}

impl Default for TelemetryLinkMock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CellularLinkMock {
    pub ready: bool,
    pub enabled: bool,
    pub sent_count: u32,
    pub last_message: [u8; MOCK_SENTENCE_CAPACITY],
    pub last_len: usize,
    pub fail_next: bool,
}

impl CellularLink for CellularLinkMock {
    fn modem_ready(&mut self) -> bool {
        self.ready
    }

    fn enable(&mut self) {
        self.enabled = true;
        self.ready = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.ready = false;
    }

    fn send_position(&mut self, message: &[u8]) -> Result<(), CommsError> {
        if !self.ready {
            return Err(CommsError::ModemNotReady);
        }
        if self.fail_next {
            return Err(CommsError::SendFailure);
        }

        let len = message.len().min(MOCK_SENTENCE_CAPACITY);
        self.last_message[..len].copy_from_slice(&message[..len]);
        self.last_len = len;
        self.sent_count += 1;
        Ok(())
    }
}

impl CellularLinkMock {
    pub fn new() -> Self {
        Self {
            ready: false,
            enabled: false,
            sent_count: 0,
            last_message: [0; MOCK_SENTENCE_CAPACITY],
            last_len: 0,
            fail_next: false,
        }
    }

    pub fn last(&self) -> &[u8] {
        &self.last_message[..self.last_len]
    }
}

impl Default for CellularLinkMock {
    fn default() -> Self {
        Self::new()
    }
}
