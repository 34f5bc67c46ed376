use serde::{Deserialize, Serialize};

use crate::interface::{Bank, EepromError, EepromInterface, PAGE_SIZE};
use crate::record::{CodecError, Record, RecordKind, RECORD_SIZE};

/// Per-bank record capacity of the flight storage part: a 64 KiB bank
/// holds 2048 records of 32 bytes.
pub const FLIGHT_RECORDS_PER_BANK: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageError {
    /// Slot index at or beyond twice the per-bank capacity.
    SlotOutOfRange,
    /// Telemetry record aimed at slot 0, or a config record elsewhere.
    ShapeMismatch,
    Codec(CodecError),
    /// The device rejected the transfer or never acknowledged the write
    /// cycle. Not retried here; the next mission cycle is the retry.
    WriteFailed(EepromError),
    ReadFailed(EepromError),
}

impl From<CodecError> for StorageError {
    fn from(err: CodecError) -> Self {
        StorageError::Codec(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeControl {
    Continue,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WipeOutcome {
    Completed,
    Aborted,
}

/// Slot-addressed view of the two-bank array. Slot 0 is the
/// configuration singleton; slots 1.. hold the append-only telemetry
/// log, saturating at the final slot instead of wrapping.
pub struct RecordStore<'a, const RECORDS_PER_BANK: usize> {
    eeprom: &'a mut dyn EepromInterface,
}

impl<'a, const RECORDS_PER_BANK: usize> RecordStore<'a, RECORDS_PER_BANK> {
    pub const BANK_BYTES: usize = RECORDS_PER_BANK * RECORD_SIZE;

    pub fn new(eeprom: &'a mut dyn EepromInterface) -> Self {
        Self { eeprom }
    }

    /// Total slot count across both banks, configuration slot included.
    pub const fn capacity() -> usize {
        RECORDS_PER_BANK * 2
    }

    /// Highest usable telemetry slot; the log overwrites this slot once
    /// it is full.
    pub const fn max_slot() -> u16 {
        (RECORDS_PER_BANK * 2 - 1) as u16
    }

    pub fn kind_of(slot: u16) -> RecordKind {
        if slot == 0 {
            RecordKind::Config
        } else {
            RecordKind::Telemetry
        }
    }

    fn address(slot: u16) -> Result<(Bank, u32), StorageError> {
        let slot = slot as usize;
        if slot >= Self::capacity() {
            return Err(StorageError::SlotOutOfRange);
        }

        let bank = if slot < RECORDS_PER_BANK {
            Bank::Low
        } else {
            Bank::High
        };
        let offset = ((slot % RECORDS_PER_BANK) * RECORD_SIZE) as u32;
        Ok((bank, offset))
    }

    /// Writes one record and waits for the device's write cycle to
    /// finish. The record shape must match the slot.
    pub fn save(&mut self, slot: u16, record: &Record) -> Result<(), StorageError> {
        if Self::kind_of(slot) != record.kind() {
            return Err(StorageError::ShapeMismatch);
        }

        let (bank, offset) = Self::address(slot)?;
        let mut buffer = [0_u8; RECORD_SIZE];
        record.encode(&mut buffer);

        self.eeprom
            .page_write(bank, offset, &buffer)
            .map_err(StorageError::WriteFailed)?;
        self.eeprom.ack_poll(bank).map_err(StorageError::WriteFailed)?;

        Ok(())
    }

    /// Reads one record; the shape is decided by the slot index here, at
    /// the boundary, and surfaces as the matching [`Record`] variant.
    pub fn load(&mut self, slot: u16) -> Result<Record, StorageError> {
        let (bank, offset) = Self::address(slot)?;
        let mut buffer = [0_u8; RECORD_SIZE];

        self.eeprom
            .sequential_read(bank, offset, &mut buffer)
            .map_err(StorageError::ReadFailed)?;

        Ok(Record::decode(Self::kind_of(slot), &buffer)?)
    }

    /// Overwrites every byte of both banks with `fill`, sparing the
    /// configuration record. `progress` runs after each chunk so the
    /// caller can feed the watchdog or abort; wiping a full part takes
    /// much longer than a watchdog period.
    pub fn wipe(
        &mut self,
        fill: u8,
        progress: &mut dyn FnMut(Bank, u32) -> WipeControl,
    ) -> Result<WipeOutcome, StorageError> {
        let chunk_size = PAGE_SIZE.min(Self::BANK_BYTES);
        let chunks_per_bank = Self::BANK_BYTES / chunk_size;
        let filler = [fill; PAGE_SIZE];

        for bank in [Bank::Low, Bank::High] {
            for chunk in 0..chunks_per_bank {
                let offset = (chunk * chunk_size) as u32;

                // The very first chunk holds the configuration record.
                let (offset, len) = if bank == Bank::Low && chunk == 0 {
                    (RECORD_SIZE as u32, chunk_size - RECORD_SIZE)
                } else {
                    (offset, chunk_size)
                };

                self.eeprom
                    .page_write(bank, offset, &filler[..len])
                    .map_err(StorageError::WriteFailed)?;
                self.eeprom.ack_poll(bank).map_err(StorageError::WriteFailed)?;

                if progress(bank, chunk as u32) == WipeControl::Abort {
                    return Ok(WipeOutcome::Aborted);
                }
            }
        }

        Ok(WipeOutcome::Completed)
    }
}
