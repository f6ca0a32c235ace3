use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown questionnaire status: {0}")]
    UnknownStatus(String),

    #[error("unknown questionnaire type: {0}")]
    UnknownQuestionnaireType(String),

    #[error("unknown evaluation type: {0}")]
    UnknownEvaluationType(String),

    #[error("unknown diagnosis category: {0}")]
    UnknownDiagnosis(String),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),
}
