use driftwood_core::cadence::ReminderAction;
use driftwood_core::compose::ClinicProfile;
use driftwood_core::models::Contact;
use driftwood_core::selection::{
    all_questionnaires_done, is_ignoring, most_recent_not_done, most_recent_open_failure,
    pending_count,
};
use driftwood_core::stage::ReminderStage;
use driftwood_openphone::normalize_phone_number;
use driftwood_store::{
    ClientFailures, ClientQuestionnaires, FailureUpdate, QuestionnaireUpdate, ReminderStore,
};
use driftwood_summary::{AdminSummary, SummarySink};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::collab::{Messenger, StatusChecker};
use crate::error::EngineError;
use crate::resolve::{resolve_failures, resolve_questionnaires};
use crate::sent::SentNumbers;
use crate::target::ReminderTarget;

/// Who the texts come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub clinic: ClinicProfile,
    /// Staff member named in the texts.
    pub sender_name: String,
    /// Send Spanish copy to clients whose language is Spanish. Off means
    /// everyone gets English.
    #[serde(default)]
    pub spanish_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: AdminSummary,
    pub sent_numbers: SentNumbers,
    pub sent: usize,
    pub delivered: usize,
    pub escalated: usize,
    /// The messaging account ran out of credits part way through.
    pub credits_exhausted: bool,
}

// ── Run ──────────────────────────────────────────────────────────────────────

/// Execute one reminder run against `store` and return what happened.
///
/// Failures are considered before questionnaires, and each phone number
/// gets at most one text across both. Counters only move for texts that
/// were confirmed delivered, and for escalations. Running out of credits
/// ends the pass: no later client is texted, escalated or reported.
pub async fn run<S, M>(
    store: &S,
    messenger: &M,
    checker: Option<&dyn StatusChecker>,
    settings: &RunSettings,
    today: Date,
    sent_numbers: SentNumbers,
) -> Result<RunReport, EngineError>
where
    S: ReminderStore + ?Sized,
    M: Messenger + ?Sized,
{
    let mut summary = AdminSummary::default();
    let totals = run_into(
        store,
        messenger,
        checker,
        settings,
        today,
        sent_numbers,
        &mut summary,
    )
    .await?;
    Ok(totals.into_report(summary))
}

/// Run, then always deliver the summary. A failed run keeps everything
/// recorded before the failure, gets the error appended, and the error is
/// returned after delivery.
pub async fn run_with_summary<S, M>(
    store: &S,
    messenger: &M,
    checker: Option<&dyn StatusChecker>,
    sink: &dyn SummarySink,
    settings: &RunSettings,
    today: Date,
    sent_numbers: SentNumbers,
) -> Result<RunReport, EngineError>
where
    S: ReminderStore + ?Sized,
    M: Messenger + ?Sized,
{
    let mut summary = AdminSummary::default();
    let result = run_into(
        store,
        messenger,
        checker,
        settings,
        today,
        sent_numbers,
        &mut summary,
    )
    .await;
    if let Err(e) = &result {
        error!(error = %e, "reminder run failed");
        summary.add_error(e.to_string());
    }

    let delivery = sink.deliver(&summary, today);

    match (result, delivery) {
        (Ok(totals), Ok(())) => Ok(totals.into_report(summary)),
        (Err(run_error), Ok(())) => Err(run_error),
        (Err(run_error), Err(e)) => {
            error!(error = %e, "failed to send run summary");
            Err(run_error)
        }
        (Ok(_), Err(e)) => Err(e.into()),
    }
}

/// Counts from a run whose summary lives with the caller.
struct RunTotals {
    sent_numbers: SentNumbers,
    sent: usize,
    delivered: usize,
    escalated: usize,
    credits_exhausted: bool,
}

impl RunTotals {
    fn into_report(self, summary: AdminSummary) -> RunReport {
        RunReport {
            summary,
            sent_numbers: self.sent_numbers,
            sent: self.sent,
            delivered: self.delivered,
            escalated: self.escalated,
            credits_exhausted: self.credits_exhausted,
        }
    }
}

async fn run_into<S, M>(
    store: &S,
    messenger: &M,
    checker: Option<&dyn StatusChecker>,
    settings: &RunSettings,
    today: Date,
    sent_numbers: SentNumbers,
    summary: &mut AdminSummary,
) -> Result<RunTotals, EngineError>
where
    S: ReminderStore + ?Sized,
    M: Messenger + ?Sized,
{
    let mut clients = store.active_clients_with_questionnaires()?;
    let mut failures = store.open_failures()?;
    info!(
        clients = clients.len(),
        clients_with_failures = failures.len(),
        "loaded reminder state"
    );
    summary.ifsp_download_needed.extend(
        clients
            .iter()
            .map(|c| &c.client)
            .filter(|client| client.needs_ifsp_download())
            .map(|client| client.full_name.clone()),
    );

    if let Some(checker) = checker {
        let updates = resolve_questionnaires(checker, &mut clients, summary).await;
        store.update_questionnaires(&updates)?;
    }
    let updates = resolve_failures(checker, &mut failures, today, summary).await;
    store.update_failures(&updates)?;

    let mut pass = ReminderPass {
        messenger,
        settings,
        today,
        summary,
        sent_numbers,
        outgoing: Vec::new(),
        escalated: Vec::new(),
        credits_exhausted: false,
    };

    for ClientFailures {
        client,
        failures: open,
    } in &failures
    {
        if pass.credits_exhausted {
            break;
        }
        if let Some(failure) = most_recent_open_failure(open) {
            let target = ReminderTarget::Failure { client, failure };
            pass.consider(target, Tracked::Failure(failure.id)).await;
        }
    }

    for ClientQuestionnaires {
        client,
        questionnaires,
    } in &clients
    {
        if pass.credits_exhausted {
            break;
        }
        if is_ignoring(questionnaires) {
            pass.summary.ignoring.push(client.full_name.clone());
        }
        if all_questionnaires_done(questionnaires) {
            continue;
        }
        let Some(questionnaire) = most_recent_not_done(questionnaires) else {
            continue;
        };
        let target = ReminderTarget::Questionnaire {
            client,
            questionnaire,
            pending: pending_count(questionnaires),
        };
        pass.consider(target, Tracked::Questionnaires(client.id)).await;
    }

    let ReminderPass {
        summary,
        sent_numbers,
        outgoing,
        escalated,
        credits_exhausted,
        ..
    } = pass;

    let sent = outgoing.len();
    let mut delivered = Vec::with_capacity(sent);
    for out in outgoing {
        if messenger.check_text_delivered(&out.message_id).await {
            delivered.push(out.tracked);
        } else {
            warn!(client = %out.name, message_id = %out.message_id, "reminder not delivered");
            summary.add_failed(out.name, "Message not delivered");
        }
    }

    let mut progress = Progress::default();
    for tracked in &delivered {
        progress.bump(&mut clients, &mut failures, *tracked, Some(today));
    }
    for tracked in &escalated {
        progress.bump(&mut clients, &mut failures, *tracked, None);
    }
    store.update_questionnaires(&progress.questionnaires)?;
    store.update_failures(&progress.failures)?;

    info!(
        sent,
        delivered = delivered.len(),
        escalated = escalated.len(),
        credits_exhausted,
        "reminder run finished"
    );

    Ok(RunTotals {
        sent_numbers,
        sent,
        delivered: delivered.len(),
        escalated: escalated.len(),
        credits_exhausted,
    })
}

// ── Reminder pass ────────────────────────────────────────────────────────────

/// What a delivered text or an escalation advances.
#[derive(Debug, Clone, Copy)]
enum Tracked {
    /// Every not-done questionnaire of this client.
    Questionnaires(i64),
    Failure(i64),
}

struct Outgoing {
    tracked: Tracked,
    name: String,
    message_id: String,
}

struct ReminderPass<'r, M: ?Sized> {
    messenger: &'r M,
    settings: &'r RunSettings,
    today: Date,
    summary: &'r mut AdminSummary,
    sent_numbers: SentNumbers,
    outgoing: Vec<Outgoing>,
    escalated: Vec<Tracked>,
    credits_exhausted: bool,
}

impl<M: Messenger + ?Sized> ReminderPass<'_, M> {
    async fn consider(&mut self, target: ReminderTarget<'_>, tracked: Tracked) {
        let name = target.full_name().to_string();
        let stage = target.stage();

        let template = match target.action(self.today) {
            ReminderAction::Wait => return,
            ReminderAction::Escalate => {
                info!(client = %name, stage = stage.as_str(), "escalating to call list");
                self.summary.call.push(target.call_entry());
                self.escalated.push(tracked);
                return;
            }
            ReminderAction::Send { template } => template,
        };

        let Some(phone) = target.phone_number() else {
            warn!(client = %name, "no phone number, adding to call list");
            self.summary.call.push(target.call_entry());
            return;
        };
        let to = match normalize_phone_number(phone) {
            Ok(to) => to,
            Err(e) => {
                warn!(client = %name, error = %e, "cannot text client");
                self.summary.add_failed(name, "Invalid phone number");
                return;
            }
        };
        if self.sent_numbers.contains(&to) {
            info!(client = %name, "already messaged this number today");
            return;
        }
        let Some(message) = target.compose(self.settings, self.today) else {
            error!(client = %name, template, "no message for this reminder");
            self.summary.add_failed(name, "Could not build message");
            return;
        };

        info!(client = %name, template, stage = stage.as_str(), "sending reminder");
        match self.messenger.send_text(&message, &to).await {
            Ok(sent) => {
                self.sent_numbers.insert(&to);
                self.outgoing.push(Outgoing {
                    tracked,
                    name,
                    message_id: sent.id,
                });
            }
            Err(e) if e.is_fatal_to_run() => {
                error!(client = %name, error = %e, "out of credits, stopping the run");
                self.credits_exhausted = true;
                self.summary
                    .add_error(format!("Stopped sending reminders at {name}: {e}"));
            }
            Err(e) => {
                error!(client = %name, error = %e, "failed to send reminder");
                self.summary.add_failed(name, e.to_string());
            }
        }
    }
}

// ── Counter updates ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    questionnaires: Vec<QuestionnaireUpdate>,
    failures: Vec<FailureUpdate>,
}

impl Progress {
    /// Increment the counters behind `tracked`; `reminded_on` is set for a
    /// delivered text and left alone for an escalation.
    fn bump(
        &mut self,
        clients: &mut [ClientQuestionnaires],
        failures: &mut [ClientFailures],
        tracked: Tracked,
        reminded_on: Option<Date>,
    ) {
        match tracked {
            Tracked::Questionnaires(client_id) => {
                let Some(entry) = clients.iter_mut().find(|c| c.client.id == client_id) else {
                    return;
                };
                for q in entry
                    .questionnaires
                    .iter_mut()
                    .filter(|q| q.status.is_not_done())
                {
                    q.reminded += 1;
                    q.last_reminded = reminded_on.or(q.last_reminded);
                    debug!(
                        questionnaire_id = q.id,
                        stage = ReminderStage::from_counter(q.reminded, false).as_str(),
                        "questionnaire advanced"
                    );
                    self.questionnaires.push(QuestionnaireUpdate::from(&*q));
                }
            }
            Tracked::Failure(failure_id) => {
                let Some(failure) = failures
                    .iter_mut()
                    .flat_map(|c| c.failures.iter_mut())
                    .find(|f| f.id == failure_id)
                else {
                    return;
                };
                failure.reminded += 1;
                failure.last_reminded = reminded_on.or(failure.last_reminded);
                debug!(
                    failure_id,
                    stage =
                        ReminderStage::from_counter(failure.reminded, failure.resolved).as_str(),
                    "failure advanced"
                );
                self.failures.push(FailureUpdate::from(&*failure));
            }
        }
    }
}
