// Define no_std except for testing and sil feature
#![cfg_attr(not(any(test, feature = "sil")), no_std)]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "sil"))]
macro_rules! silprintln {
    () => { println!() };
    ($($arg:tt)*) => { println!($($arg)*) };
}

#[cfg(not(any(test, feature = "sil")))]
macro_rules! silprintln {
    () => {};
    ($($arg:tt)*) => {};
}

pub mod cellular;
pub mod downlink;
pub mod flight_fsm;
pub mod gpgga;
pub mod history;
mod measurements;
pub mod mission_cycle;

pub(crate) use silprintln;

use black_box::{
    interface::EepromInterface,
    record::{ConfigRecord, TelemetryRecord},
    store::RecordStore,
};
use flight_fsm::FsmState;
use shared::{
    comms_hal::{CellularLink, TelemetryLink},
    gps_hal::PositionSource,
    payload_hal::{FlightMode, FlightParams, PayloadDriver, SensorSuite, SideEffects},
    ControllerEntity,
};
use strum::EnumCount;

pub use history::{HistoryEvaluator, HistoryVerdict};
pub use mission_cycle::{CycleError, CycleOutcome};

pub type FlightFsm<'a, const RECORDS_PER_BANK: usize> =
    ControllerEntity<FsmState, MissionCtl<'a, RECORDS_PER_BANK>, FlightMode>;

/// The mission controller. One instance lives for exactly one power
/// cycle; everything it must remember across cycles goes through the
/// record store.
pub struct MissionCtl<'a, const RECORDS_PER_BANK: usize> {
    pub params: FlightParams,
    /// Working copy of the slot-0 record, re-loaded fresh every cycle.
    pub config: ConfigRecord,
    pub driver: &'a mut dyn PayloadDriver,
    pub sensors: &'a mut dyn SensorSuite,
    pub gps: &'a mut dyn PositionSource,
    pub radio: &'a mut dyn TelemetryLink,
    pub cellular: &'a mut dyn CellularLink,
    pub store: RecordStore<'a, RECORDS_PER_BANK>,
    pub effects: SideEffects,
    pub previous: TelemetryRecord,
    pub current: TelemetryRecord,
    flight_fsm: Option<FlightFsm<'a, RECORDS_PER_BANK>>,
}

impl<'a, const RECORDS_PER_BANK: usize> MissionCtl<'a, RECORDS_PER_BANK> {
    pub fn new(
        params: FlightParams,
        driver: &'a mut dyn PayloadDriver,
        sensors: &'a mut dyn SensorSuite,
        gps: &'a mut dyn PositionSource,
        radio: &'a mut dyn TelemetryLink,
        cellular: &'a mut dyn CellularLink,
        eeprom: &'a mut dyn EepromInterface,
    ) -> Self {
        Self {
            params,
            config: ConfigRecord::first_boot(),
            driver,
            sensors,
            gps,
            radio,
            cellular,
            store: RecordStore::new(eeprom),
            effects: SideEffects::none(),
            previous: TelemetryRecord::sentinel(),
            current: TelemetryRecord::empty(),
            flight_fsm: None,
        }
    }

    /// Current mode as the FSM sees it; before the FSM is initialized
    /// this is whatever the configuration record said.
    pub fn flight_mode(&self) -> FlightMode {
        self.flight_fsm
            .as_ref()
            .map(|fsm| fsm.hal_state())
            .unwrap_or(self.config.mode)
    }

    pub(crate) fn init_flight_fsm(&mut self) {
        let initial = FsmState::from_mode(self.config.mode);
        let fsm = FlightFsm::new(&mut *self, initial);
        self.flight_fsm = Some(fsm);
    }

    /// Runs one state-machine step, chaining on through any
    /// pass-through state it lands in so a burst or timeout reaches the
    /// pyro phase within the same cycle.
    pub(crate) fn update_flight_fsm(&mut self) {
        let mut iterations = 0;
        loop {
            if let Some(mut fsm) = self.flight_fsm.take() {
                fsm.update(self);
                self.flight_fsm = Some(fsm);
            }

            iterations += 1;
            if !self.flight_mode().is_pass_through() || iterations >= FlightMode::COUNT {
                break;
            }
        }
    }
}
