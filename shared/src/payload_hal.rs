use core::any::Any;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, FromRepr};

/// Mission phase, persisted as a single byte in the configuration record.
///
/// The discriminants are part of the storage layout and must not be
/// renumbered; 6 was retired before this hardware revision flew.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro, EnumIter, FromRepr,
)]
#[repr(u8)]
pub enum FlightMode {
    GroundCommand = 0,
    Prelaunch = 1,
    PrelaunchGps = 2,
    Ascent = 3,
    AscentMonitored = 4,
    AscentTimeout = 5,
    DescentBurst = 7,
    DescentPyro = 8,
    DescentRecovery = 9,
    Landed = 10,
    Error = 255,
}

impl FlightMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_repr(byte)
    }

    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Phases that are entered and left within the same cycle; the
    /// cutaway must not wait out a watchdog period in one of these.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, FlightMode::AscentTimeout | FlightMode::DescentBurst)
    }
}

/// Tunable mission parameters. These were hard constants in earlier
/// firmware revisions; the burst detector window in particular is tied to
/// the sampling cadence and must move with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightParams {
    /// Altitude above which the burst detector starts watching, in meters.
    pub monitor_altitude_m: i32,
    /// Altitude below which the recovery (GSM) phase begins, in meters.
    pub recovery_altitude_m: i32,
    /// Mission duration ceiling measured from the recorded launch time.
    pub timeout_hours: u8,
    /// Number of stored telemetry records the burst detector reads back.
    pub history_depth: u16,
    /// Length of the strictly-descending tail that signals a burst.
    pub burst_tail: u16,
}

impl FlightParams {
    pub const fn default() -> Self {
        Self {
            monitor_altitude_m: 20_000,
            recovery_altitude_m: 2_000,
            timeout_hours: 6,
            history_depth: 10,
            burst_tail: 5,
        }
    }
}

/// Actions a state handler wants performed this cycle. State code only
/// requests; the mission cycle driver executes, in a fixed order, with the
/// deploy request guarded by the persisted chute flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffects {
    pub deploy_recovery: bool,
    /// Persist the configuration record before any transmission happens.
    pub persist_config_early: bool,
    pub transmit_record: bool,
    pub ensure_cellular: bool,
    pub transmit_cellular: bool,
}

impl SideEffects {
    pub const fn none() -> Self {
        Self {
            deploy_recovery: false,
            persist_config_early: false,
            transmit_record: false,
            ensure_cellular: false,
            transmit_cellular: false,
        }
    }

    pub fn any(&self) -> bool {
        self.deploy_recovery
            || self.persist_config_early
            || self.transmit_record
            || self.ensure_cellular
            || self.transmit_cellular
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureSource {
    Analog,
    Digital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorFault {
    NoAcknowledge,
    OutOfRange,
}

/// Environmental sensor collaborators. A fault is surfaced, never retried
/// here; the cycle driver decides what a failed reading costs.
pub trait SensorSuite {
    /// Barometric altitude estimate, used when the GPS has no fix.
    fn read_altitude_reference(&mut self) -> Result<i32, SensorFault>;
    /// Raw (internal, external) temperature counts, 12 significant bits.
    fn read_temperature_pair(&mut self) -> Result<(i16, i16), SensorFault>;
    fn read_pressure(&mut self) -> Result<(u32, PressureSource), SensorFault>;
}

/// Board-level controls owned by the mission cycle driver.
pub trait PayloadDriver {
    /// Defers the hardware watchdog; called inside any loop expected to
    /// run longer than a few milliseconds.
    fn feed_watchdog(&mut self);

    /// Fires the pyrotechnic charge. Unconditional at this level; the
    /// caller holds the idempotency guard.
    fn deploy_recovery(&mut self);

    fn set_radio_power(&mut self, on: bool, invert: bool);

    fn reset_mcu(&mut self);

    /// Hands control to the interactive shell. Does not return in flight
    /// hardware; mocks return so tests can observe the handoff.
    fn enter_command_shell(&mut self);

    /// Polled once before flight mode starts; true when the operator asked
    /// to drop back into the shell.
    fn command_escape_requested(&mut self) -> bool;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}
