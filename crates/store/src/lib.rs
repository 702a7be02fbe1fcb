//! `gatehouse-store` — reference persistence for the identity engine.
//!
//! One concrete [`gatehouse_auth::Storage`] implementation: an append-only
//! journal file replayed at startup to rebuild in-memory state.

pub mod journal;

pub use journal::JournalStore;
