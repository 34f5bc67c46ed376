//! Software-in-loop harness: flies the mission controller through a
//! simulated balloon flight, power-cycling it between cycles exactly
//! the way the hardware watchdog does, with optional storage faults
//! thrown in.

pub mod dynamics;

use black_box::{
    interface::mock_eeprom::MockEeprom,
    record::{ConfigRecord, Record, RECORD_SIZE},
    store::RecordStore,
};
use dynamics::BalloonDynamics;
use payload_rs::{CycleError, CycleOutcome, MissionCtl};
use rand::Rng;
use shared::{
    payload_hal::{FlightMode, FlightParams},
    payload_mock::{
        CellularLinkMock, PayloadDriverMock, PositionSourceMock, SensorSuiteMock,
        TelemetryLinkMock,
    },
};

pub const RECORDS_PER_BANK: usize = 256;
pub const BANK_SIZE: usize = RECORDS_PER_BANK * RECORD_SIZE;

/// Seconds between watchdog resets, i.e. between mission cycles.
pub const CYCLE_PERIOD_S: f64 = 30.0;

/// How many quiet prelaunch cycles pass before the simulated operator
/// lets go of the balloon.
const LAUNCH_CYCLE: u32 = 4;

const ASCENT_RATE_MS: f64 = 5.0;

pub struct SimulatedFlight {
    pub dynamics: BalloonDynamics,
    pub driver: PayloadDriverMock,
    pub sensors: SensorSuiteMock,
    pub gps: PositionSourceMock,
    pub radio: TelemetryLinkMock,
    pub cellular: CellularLinkMock,
    pub eeprom: MockEeprom<BANK_SIZE>,
    pub params: FlightParams,
    cycles_flown: u32,
}

#[derive(Debug, Default)]
pub struct FlightReport {
    pub cycles: u32,
    pub failed_cycles: u32,
    pub deploys: u32,
    pub records_written: u16,
    pub final_mode: Option<FlightMode>,
}

impl SimulatedFlight {
    pub fn new() -> Self {
        let launch_utc = 9 * 3600 + 30 * 60;

        let mut flight = Self {
            dynamics: BalloonDynamics::new(launch_utc),
            driver: PayloadDriverMock::new(),
            sensors: SensorSuiteMock::new(),
            gps: PositionSourceMock::new(),
            radio: TelemetryLinkMock::new(),
            cellular: CellularLinkMock::new(),
            eeprom: MockEeprom::new(0x00),
            params: FlightParams::default(),
            cycles_flown: 0,
        };

        // What the operator's launch command would have written.
        let mut config = ConfigRecord::first_boot();
        config.mode = FlightMode::Prelaunch;
        config.launch_hours = 9;
        config.launch_minutes = 30;
        config.cell_number[..13].copy_from_slice(b"0031612345678");
        RecordStore::<RECORDS_PER_BANK>::new(&mut flight.eeprom)
            .save(0, &Record::Config(config))
            .expect("Seeding the config record cannot fail");

        flight
    }

    /// One watchdog period: advance the world, then boot a fresh
    /// controller and let it run a single mission cycle.
    pub fn run_cycle<R: Rng>(
        &mut self,
        rng: &mut R,
        gps_dropout: bool,
    ) -> Result<CycleOutcome, CycleError> {
        self.dynamics.step(CYCLE_PERIOD_S);
        self.cycles_flown += 1;
        if self.cycles_flown == LAUNCH_CYCLE {
            self.dynamics.launch(ASCENT_RATE_MS);
        }

        self.sensors.altitude_m = self.dynamics.altitude_m as i32;
        self.sensors.internal_temp = 215;
        self.sensors.external_temp = (self.dynamics.external_temp_c() * 16.0) as i16;
        self.sensors.pressure_pa = self.dynamics.pressure_pa();
        self.gps.snapshot = if gps_dropout {
            None
        } else {
            Some(self.dynamics.snapshot(rng, 1))
        };

        let deploys_before = self.driver.deploy_count;
        let result = MissionCtl::<RECORDS_PER_BANK>::new(
            self.params,
            &mut self.driver,
            &mut self.sensors,
            &mut self.gps,
            &mut self.radio,
            &mut self.cellular,
            &mut self.eeprom,
        )
        .run_cycle();

        if self.driver.deploy_count > deploys_before {
            self.dynamics.release();
        }

        result
    }

    /// Flies until the controller has reported `Landed` a few times or
    /// the cycle budget runs out. `fault_rate` is the chance per cycle
    /// of power dying during a storage write.
    pub fn run_to_landing<R: Rng>(
        &mut self,
        rng: &mut R,
        max_cycles: u32,
        fault_rate: f64,
        dropout_rate: f64,
    ) -> FlightReport {
        let mut report = FlightReport::default();
        let mut landed_cycles = 0;

        for _ in 0..max_cycles {
            if fault_rate > 0.0 && rng.gen_bool(fault_rate) {
                self.eeprom.cut_power_after_acks = Some(rng.gen_range(0..2));
            }
            let dropout = dropout_rate > 0.0 && rng.gen_bool(dropout_rate);

            report.cycles += 1;
            match self.run_cycle(rng, dropout) {
                Ok(CycleOutcome::Flight { mode, slot }) => {
                    report.final_mode = Some(mode);
                    report.records_written = slot;
                    if mode == FlightMode::Landed {
                        landed_cycles += 1;
                        if landed_cycles >= 3 {
                            break;
                        }
                    }
                }
                Ok(_) => {}
                Err(_) => report.failed_cycles += 1,
            }

            // A power cut that outlived the cycle would hit the next
            // boot's config read; the watchdog restart clears it.
            self.eeprom.cut_power_after_acks = None;
        }

        report.deploys = self.driver.deploy_count;
        report
    }
}

impl Default for SimulatedFlight {
    fn default() -> Self {
        Self::new()
    }
}
