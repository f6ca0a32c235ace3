//! driftwood-engine
//!
//! One reminder run: resolve what finished on its own, decide per client
//! whether to text, escalate to a phone call or wait, send and confirm the
//! texts, persist counters, and report to the office.

pub mod collab;
pub mod error;
pub mod resolve;
pub mod run;
pub mod sent;
pub mod target;

pub use collab::{BoxFuture, Messenger, StatusChecker};
pub use error::EngineError;
pub use run::{RunReport, RunSettings, run, run_with_summary};
pub use sent::SentNumbers;
pub use target::ReminderTarget;
