#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod interface;
pub mod record;
pub mod store;

pub use record::{ConfigRecord, Record, RecordKind, TelemetryRecord, RECORD_SIZE};
pub use store::RecordStore;
