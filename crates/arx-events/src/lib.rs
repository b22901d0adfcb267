//! Event records for the Arx registry.
//!
//! Every successful state-changing operation appends one [`EventRecord`] to
//! the [`EventLog`]. Records name the operation, the affected asset, and the
//! principals and amounts involved, so an external observer can reconstruct
//! ownership and payment history without replaying internal state.
//!
//! The log is append-only with a dense sequence number, and offers a
//! broadcast subscription interface with per-subscriber filters.

pub mod log;
pub mod record;

pub use log::{EventFilter, EventLog, EventStream};
pub use record::{EventKind, EventPayload, EventRecord};
