pub mod mock_eeprom;

use serde::{Deserialize, Serialize};

/// Write granularity of the storage device. A write must stay inside one
/// page; the store only ever issues chunks that do.
pub const PAGE_SIZE: usize = 128;

/// The two physically addressable regions of the storage part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bank {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EepromError {
    /// The device did not acknowledge the transfer.
    NoAcknowledge,
    /// The write would cross a page boundary.
    PageOverrun,
    /// Address outside the bank.
    AddressOutOfRange,
}

/// Raw storage device operations. Writes complete asynchronously inside
/// the device; callers must `ack_poll` before trusting the data. Reads
/// are plain sequential fetches.
pub trait EepromInterface {
    fn page_write(&mut self, bank: Bank, offset: u32, data: &[u8]) -> Result<(), EepromError>;
    fn sequential_read(
        &mut self,
        bank: Bank,
        offset: u32,
        buffer: &mut [u8],
    ) -> Result<(), EepromError>;
    /// Polls the device until its internal write cycle finishes.
    fn ack_poll(&mut self, bank: Bank) -> Result<(), EepromError>;
}
