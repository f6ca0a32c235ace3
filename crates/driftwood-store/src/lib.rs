//! driftwood-store
//!
//! SQLite persistence for clients, questionnaires and failures, plus the
//! `ReminderStore` seam the reminder engine runs against.

pub mod error;
pub mod rows;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use error::StoreError;
pub use sqlite::{NewQuestionnaire, SqliteStore};
pub use store::{
    ClientFailures, ClientQuestionnaires, FailureUpdate, QuestionnaireUpdate, ReminderStore,
};
