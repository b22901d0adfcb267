//! Descriptive bookkeeping for Arx assets.
//!
//! Everything here is plain key-value state with no interesting invariants:
//! metadata and document pointers, translations, previews, tags, comments,
//! reader feedback, view counters, engagement points, and update logs. The
//! core registry treats this crate as an external collaborator — nothing in
//! it can affect ownership, payments, or locks.
//!
//! Authorization for the owner-gated writes (pointer updates, digest
//! registration) is the facade's job; the store itself records what it is
//! told.

pub mod store;

pub use store::{Annex, AnnexRecord, Comment, Feedback, LogEntry};
