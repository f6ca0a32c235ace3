pub mod client;
pub mod failure;
pub mod questionnaire;

pub use client::{Client, Contact, DiagnosisCategory, Language};
pub use failure::{EvaluationType, Failure, FailureReason};
pub use questionnaire::{Questionnaire, QuestionnaireStatus, QuestionnaireType};
