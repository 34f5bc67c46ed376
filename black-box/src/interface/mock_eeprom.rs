use super::{Bank, EepromError, EepromInterface, PAGE_SIZE};

struct PendingWrite {
    bank: Bank,
    offset: usize,
    data: [u8; PAGE_SIZE],
    len: usize,
}

/// In-memory stand-in for the two-bank EEPROM. Writes land in a staging
/// buffer and only reach the array once `ack_poll` observes the write
/// cycle finishing, so tests can cut power mid-write.
pub struct MockEeprom<const BANK_SIZE: usize> {
    low: [u8; BANK_SIZE],
    high: [u8; BANK_SIZE],
    pending: Option<PendingWrite>,
    /// Fail the next `page_write` outright.
    pub fail_next_write: bool,
    /// Fail every `sequential_read`.
    pub fail_reads: bool,
    /// Simulate power loss during a write cycle: after this many
    /// successful acknowledgments, the next `ack_poll` reports nothing
    /// and the staged data is lost. `Some(0)` cuts the very next write.
    pub cut_power_after_acks: Option<u32>,
    pub write_count: u32,
    pub read_count: u32,
}

impl<const BANK_SIZE: usize> MockEeprom<BANK_SIZE> {
    pub fn new(fill: u8) -> Self {
        Self {
            low: [fill; BANK_SIZE],
            high: [fill; BANK_SIZE],
            pending: None,
            fail_next_write: false,
            fail_reads: false,
            cut_power_after_acks: None,
            write_count: 0,
            read_count: 0,
        }
    }

    pub fn bank(&self, bank: Bank) -> &[u8] {
        match bank {
            Bank::Low => &self.low,
            Bank::High => &self.high,
        }
    }

    fn bank_mut(&mut self, bank: Bank) -> &mut [u8; BANK_SIZE] {
        match bank {
            Bank::Low => &mut self.low,
            Bank::High => &mut self.high,
        }
    }

    fn commit_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            let offset = pending.offset;
            let len = pending.len;
            self.bank_mut(pending.bank)[offset..offset + len]
                .copy_from_slice(&pending.data[..len]);
        }
    }
}

impl<const BANK_SIZE: usize> EepromInterface for MockEeprom<BANK_SIZE> {
    fn page_write(&mut self, bank: Bank, offset: u32, data: &[u8]) -> Result<(), EepromError> {
        // A prior write cycle the caller never polled for has long since
        // finished by the time a new transfer starts.
        self.commit_pending();

        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(EepromError::NoAcknowledge);
        }

        let offset = offset as usize;
        if data.len() > PAGE_SIZE || offset % PAGE_SIZE + data.len() > PAGE_SIZE {
            return Err(EepromError::PageOverrun);
        }
        if offset + data.len() > BANK_SIZE {
            return Err(EepromError::AddressOutOfRange);
        }

        let mut staged = [0_u8; PAGE_SIZE];
        staged[..data.len()].copy_from_slice(data);
        self.pending = Some(PendingWrite {
            bank,
            offset,
            data: staged,
            len: data.len(),
        });
        self.write_count += 1;

        Ok(())
    }

    fn sequential_read(
        &mut self,
        bank: Bank,
        offset: u32,
        buffer: &mut [u8],
    ) -> Result<(), EepromError> {
        if self.fail_reads {
            return Err(EepromError::NoAcknowledge);
        }

        let offset = offset as usize;
        if offset + buffer.len() > BANK_SIZE {
            return Err(EepromError::AddressOutOfRange);
        }

        self.read_count += 1;
        buffer.copy_from_slice(&self.bank(bank)[offset..offset + buffer.len()]);
        Ok(())
    }

    fn ack_poll(&mut self, _bank: Bank) -> Result<(), EepromError> {
        match self.cut_power_after_acks {
            Some(0) => {
                self.cut_power_after_acks = None;
                self.pending = None;
                return Err(EepromError::NoAcknowledge);
            }
            Some(remaining) => self.cut_power_after_acks = Some(remaining - 1),
            None => {}
        }

        self.commit_pending();
        Ok(())
    }
}
