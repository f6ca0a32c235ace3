use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid row in {table} (id {id}): {reason}")]
    InvalidRow {
        table: &'static str,
        id: i64,
        reason: String,
    },

    #[error("client not found: {0}")]
    ClientNotFound(i64),

    #[error("questionnaire not found: {0}")]
    QuestionnaireNotFound(i64),

    #[error("no open failure '{reason}' for client {client_id}")]
    FailureNotFound { client_id: i64, reason: String },

    #[error("database schema version {found} is newer than this build supports ({supported})")]
    SchemaTooNew { found: i64, supported: i64 },
}
