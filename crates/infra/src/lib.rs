//! Infrastructure layer: record storage, reconciliation and the intake pipeline.

pub mod intake;
pub mod reconcile;
pub mod store;

pub use intake::InvoiceIntake;
pub use store::{
    InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError, StoreResult,
    StoreTransaction,
};

#[cfg(test)]
mod integration_tests;
