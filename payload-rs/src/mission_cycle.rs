//! Once-per-reset mission cycle. There is no loop anywhere in here:
//! the hardware watchdog resets the board tens of seconds after this
//! returns, and the next cycle reconstructs everything it needs from
//! the record store.

use black_box::{
    record::{ConfigRecord, Record, TelemetryRecord},
    store::{RecordStore, StorageError},
};
use serde::{Deserialize, Serialize};
use shared::payload_hal::{FlightMode, SideEffects};

use crate::{cellular, downlink, silprintln, MissionCtl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleOutcome {
    /// Slot 0 said command mode; control went to the shell.
    CommandMode,
    /// The operator asked for the shell during the escape window; the
    /// mode was persisted and a reset requested.
    CommandEscape,
    Flight { mode: FlightMode, slot: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleError {
    Storage(StorageError),
}

impl From<StorageError> for CycleError {
    fn from(err: StorageError) -> Self {
        CycleError::Storage(err)
    }
}

impl<'a, const RECORDS_PER_BANK: usize> MissionCtl<'a, RECORDS_PER_BANK> {
    /// Runs exactly one mission cycle: resume from durable state, take
    /// measurements, step the state machine, persist, transmit.
    ///
    /// An error means this cycle's persistence could not be trusted;
    /// nothing is retried here. The watchdog restarts the process and
    /// the next cycle re-derives everything from what last made it to
    /// storage.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        self.driver.feed_watchdog();
        self.effects = SideEffects::none();

        self.load_config()?;

        if self.config.mode == FlightMode::GroundCommand {
            self.driver.enter_command_shell();
            return Ok(CycleOutcome::CommandMode);
        }

        if self.driver.command_escape_requested() {
            silprintln!("CYCLE: escape to command mode");
            self.config.mode = FlightMode::GroundCommand;
            self.store.save(0, &Record::Config(self.config))?;
            self.driver.reset_mcu();
            return Ok(CycleOutcome::CommandEscape);
        }

        self.load_previous_record()?;
        self.acquire_current_record();

        self.init_flight_fsm();
        self.update_flight_fsm();
        self.config.mode = self.flight_mode();
        silprintln!("CYCLE: mode {:?}", self.config.mode);

        self.execute_side_effects()?;
        self.persist_cycle()?;
        self.transmit_current();

        Ok(CycleOutcome::Flight {
            mode: self.config.mode,
            slot: self.config.last_record,
        })
    }

    /// Slot 0 is re-read every cycle; the shell may have rewritten it
    /// behind our back. A record that does not decode means a blank or
    /// scrambled part, and the only safe mode for that is the shell.
    fn load_config(&mut self) -> Result<(), CycleError> {
        self.config = match self.store.load(0) {
            Ok(Record::Config(config)) => config,
            Ok(Record::Telemetry(_)) | Err(StorageError::Codec(_)) => ConfigRecord::first_boot(),
            Err(err) => return Err(err.into()),
        };
        Ok(())
    }

    fn load_previous_record(&mut self) -> Result<(), CycleError> {
        self.previous = if self.config.last_record == 0 {
            silprintln!("CYCLE: no previous record, using sentinel");
            TelemetryRecord::sentinel()
        } else {
            match self.store.load(self.config.last_record) {
                Ok(Record::Telemetry(record)) => record,
                // A scrambled index must not wedge the mission; restart
                // the comparison chain from the sentinel instead.
                Ok(Record::Config(_)) | Err(StorageError::SlotOutOfRange) => {
                    TelemetryRecord::sentinel()
                }
                Err(err) => return Err(err.into()),
            }
        };
        Ok(())
    }

    fn execute_side_effects(&mut self) -> Result<(), CycleError> {
        if self.effects.deploy_recovery && !self.config.status.chute_deployed {
            self.driver.deploy_recovery();
            self.config.status.chute_deployed = true;
            self.current.status.chute_deployed = true;
            // The firing must be durable before anything slower runs; a
            // reset right here must not lead to a second charge.
            self.store.save(0, &Record::Config(self.config))?;
        }

        if self.effects.persist_config_early {
            self.store.save(0, &Record::Config(self.config))?;
        }

        if self.effects.transmit_record {
            self.transmit_current();
        }

        if self.effects.ensure_cellular && !self.cellular.modem_ready() {
            self.cellular.enable();
        }

        if self.effects.transmit_cellular {
            let mut buffer = [0_u8; cellular::MESSAGE_CAPACITY];
            let len = cellular::build_position_message(&self.config, &self.current, &mut buffer);
            let _ = self.cellular.send_position(&buffer[..len]);
        }

        Ok(())
    }

    /// Telemetry slot first, index second. A reset between the two
    /// leaves the index one step stale, which the next cycle simply
    /// overwrites; the reverse order could point at a slot that was
    /// never written.
    fn persist_cycle(&mut self) -> Result<(), CycleError> {
        let next = self
            .config
            .last_record
            .saturating_add(1)
            .min(RecordStore::<RECORDS_PER_BANK>::max_slot());

        self.store.save(next, &Record::Telemetry(self.current))?;
        self.config.last_record = next;
        self.store.save(0, &Record::Config(self.config))?;

        Ok(())
    }

    fn transmit_current(&mut self) {
        let mut buffer = [0_u8; downlink::SENTENCE_CAPACITY];
        let len = downlink::build_record_sentence(&self.config, &self.current, &mut buffer);

        self.driver
            .set_radio_power(true, self.config.radio_invert);
        // Transmission is best effort; durable state already holds
        // everything a retry needs.
        let _ = self.radio.transmit(&buffer[..len]);
        self.driver
            .set_radio_power(false, self.config.radio_invert);
    }
}
