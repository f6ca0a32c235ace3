//! driftwood-core
//!
//! Pure domain types and rules for the reminder engine: clients,
//! questionnaires, failures, the reminder cadence, the message composer and
//! the questionnaire requirement table. No I/O; this is the shared
//! vocabulary of the Driftwood system.

pub mod cadence;
pub mod compose;
pub mod error;
pub mod models;
pub mod requirements;
pub mod selection;
pub mod stage;
