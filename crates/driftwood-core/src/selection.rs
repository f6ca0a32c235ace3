//! Picking which tracked item drives a client's reminder.

use crate::models::{Failure, Questionnaire, QuestionnaireStatus};

/// True when every questionnaire is COMPLETED. Vacuously true for an empty
/// slice.
pub fn all_questionnaires_done(questionnaires: &[Questionnaire]) -> bool {
    questionnaires
        .iter()
        .all(|q| q.status == QuestionnaireStatus::Completed)
}

/// The not-done questionnaire with the latest send date. Questionnaires
/// that were never sent rank below every sent one.
pub fn most_recent_not_done(questionnaires: &[Questionnaire]) -> Option<&Questionnaire> {
    questionnaires
        .iter()
        .filter(|q| q.status.is_not_done())
        .max_by_key(|q| q.sent)
}

/// Number of questionnaires still waiting on the client.
pub fn pending_count(questionnaires: &[Questionnaire]) -> usize {
    questionnaires.iter().filter(|q| q.status.is_not_done()).count()
}

/// Whether the client is ignoring questionnaires or asked to reschedule.
pub fn is_ignoring(questionnaires: &[Questionnaire]) -> bool {
    questionnaires.iter().any(|q| {
        matches!(
            q.status,
            QuestionnaireStatus::Ignoring | QuestionnaireStatus::Rescheduled
        )
    })
}

/// Whether the client still has something worth tracking this run.
pub fn has_open_questionnaires(questionnaires: &[Questionnaire]) -> bool {
    questionnaires.iter().any(|q| {
        q.status.is_not_done()
            || matches!(
                q.status,
                QuestionnaireStatus::Ignoring | QuestionnaireStatus::Rescheduled
            )
    })
}

/// The most recent unresolved failure worth texting about.
pub fn most_recent_open_failure(failures: &[Failure]) -> Option<&Failure> {
    failures
        .iter()
        .filter(|f| !f.resolved && f.reason.is_remindable())
        .max_by_key(|f| f.failed_date)
}
