//! Resolution pass: find out what finished on its own before texting anyone.

use driftwood_core::models::{Contact, QuestionnaireStatus};
use driftwood_core::selection::{all_questionnaires_done, pending_count};
use driftwood_store::{ClientFailures, ClientQuestionnaires, FailureUpdate, QuestionnaireUpdate};
use driftwood_summary::AdminSummary;
use jiff::civil::Date;
use tracing::{info, warn};

use crate::collab::StatusChecker;

/// Ask the checker about every not-done questionnaire and mark the completed
/// ones. Clients whose last open questionnaire completed are added to the
/// summary's download list.
pub async fn resolve_questionnaires(
    checker: &dyn StatusChecker,
    clients: &mut [ClientQuestionnaires],
    summary: &mut AdminSummary,
) -> Vec<QuestionnaireUpdate> {
    let mut updates = Vec::new();

    for ClientQuestionnaires {
        client,
        questionnaires,
    } in clients.iter_mut()
    {
        let had_open = pending_count(questionnaires) > 0;

        for questionnaire in questionnaires.iter_mut().filter(|q| q.status.is_not_done()) {
            match checker.questionnaire_completed(client, questionnaire).await {
                Ok(true) => {
                    info!(
                        client = client.full_name(),
                        questionnaire = %questionnaire.questionnaire_type,
                        "questionnaire completed"
                    );
                    questionnaire.status = QuestionnaireStatus::Completed;
                    updates.push(QuestionnaireUpdate::from(&*questionnaire));
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(client = client.full_name(), error = %e, "questionnaire check failed");
                    summary.add_error(format!(
                        "Could not check {} for {}: {e}",
                        questionnaire.questionnaire_type,
                        client.full_name()
                    ));
                }
            }
        }

        if had_open && all_questionnaires_done(questionnaires) {
            summary.completed.push(client.full_name.clone());
        }
    }

    updates
}

/// Re-check open failures. Age failures resolve from the date of birth;
/// everything else needs the checker, and stays open without one.
pub async fn resolve_failures(
    checker: Option<&dyn StatusChecker>,
    clients: &mut [ClientFailures],
    today: Date,
    summary: &mut AdminSummary,
) -> Vec<FailureUpdate> {
    let mut updates = Vec::new();

    for ClientFailures { client, failures } in clients.iter_mut() {
        for failure in failures.iter_mut().filter(|f| !f.resolved) {
            let resolved = match failure.reason.resolved_by_age(client.dob, today) {
                Some(resolved) => resolved,
                None => match checker {
                    Some(checker) => match checker.failure_resolved(client, failure).await {
                        Ok(resolved) => resolved,
                        Err(e) => {
                            warn!(client = client.full_name(), error = %e, "failure check failed");
                            summary.add_error(format!(
                                "Could not check '{}' for {}: {e}",
                                failure.reason,
                                client.full_name()
                            ));
                            false
                        }
                    },
                    None => false,
                },
            };

            if resolved {
                info!(client = client.full_name(), reason = %failure.reason, "failure resolved");
                failure.resolved = true;
                updates.push(FailureUpdate::from(&*failure));
            }
        }
    }

    updates
}
