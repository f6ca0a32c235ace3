use driftwood_core::models::{Client, Failure, Questionnaire, QuestionnaireStatus};
use jiff::civil::Date;
use serde::Serialize;

use crate::error::StoreError;

/// An active client and every questionnaire assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientQuestionnaires {
    pub client: Client,
    pub questionnaires: Vec<Questionnaire>,
}

/// A client and their unresolved failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientFailures {
    pub client: Client,
    pub failures: Vec<Failure>,
}

/// Mutable reminder state of one questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionnaireUpdate {
    pub id: i64,
    pub status: QuestionnaireStatus,
    pub reminded: u32,
    pub last_reminded: Option<Date>,
}

impl From<&Questionnaire> for QuestionnaireUpdate {
    fn from(q: &Questionnaire) -> Self {
        Self {
            id: q.id,
            status: q.status,
            reminded: q.reminded,
            last_reminded: q.last_reminded,
        }
    }
}

/// Mutable reminder state of one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureUpdate {
    pub id: i64,
    pub reminded: u32,
    pub last_reminded: Option<Date>,
    pub resolved: bool,
}

impl From<&Failure> for FailureUpdate {
    fn from(f: &Failure) -> Self {
        Self {
            id: f.id,
            reminded: f.reminded,
            last_reminded: f.last_reminded,
            resolved: f.resolved,
        }
    }
}

/// Persistence the reminder run needs. Rows that fail validation are
/// skipped by implementations, never returned half-parsed.
pub trait ReminderStore {
    fn active_clients_with_questionnaires(&self) -> Result<Vec<ClientQuestionnaires>, StoreError>;

    fn open_failures(&self) -> Result<Vec<ClientFailures>, StoreError>;

    /// Apply all updates atomically.
    fn update_questionnaires(&self, updates: &[QuestionnaireUpdate]) -> Result<(), StoreError>;

    /// Apply all updates atomically.
    fn update_failures(&self, updates: &[FailureUpdate]) -> Result<(), StoreError>;
}
