//! Command handlers behind the `driftwood` subcommands.

use driftwood_core::models::{
    Client, Contact, DiagnosisCategory, EvaluationType, FailureReason, Language,
    QuestionnaireStatus, QuestionnaireType,
};
use driftwood_core::requirements::{Requirement, required_questionnaires};
use driftwood_core::stage::ReminderStage;
use driftwood_engine::{RunReport, SentNumbers, run_with_summary};
use driftwood_openphone::OpenPhoneClient;
use driftwood_store::{NewQuestionnaire, SqliteStore};
use driftwood_summary::{
    AdminSummary, SmtpMailer, SummaryError, SummarySink, render_summary, subject_for,
};
use jiff::civil::Date;
use serde::Serialize;

use crate::config::DriftwoodConfig;

/// Prints the summary instead of mailing it.
pub struct StdoutSink;

impl SummarySink for StdoutSink {
    fn deliver(&self, summary: &AdminSummary, run_date: Date) -> Result<(), SummaryError> {
        if summary.is_empty() {
            println!("{}: nothing to report", subject_for(run_date));
            return Ok(());
        }
        let rendered = render_summary(summary)?;
        println!("{}\n\n{}", subject_for(run_date), rendered.text);
        Ok(())
    }
}

pub fn open_store(config: &DriftwoodConfig) -> eyre::Result<SqliteStore> {
    if let Some(dir) = config.database_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(SqliteStore::open(&config.database_path)?)
}

/// Run one reminder batch and deliver the summary.
pub async fn run_reminders(config: &DriftwoodConfig, today: Date) -> eyre::Result<RunReport> {
    let store = open_store(config)?;
    let messenger = OpenPhoneClient::new(config.openphone.clone())?;
    let sink: Box<dyn SummarySink> = match &config.summary {
        Some(smtp) => Box::new(SmtpMailer::new(smtp)?),
        None => Box::new(StdoutSink),
    };

    let report = run_with_summary(
        &store,
        &messenger,
        None,
        sink.as_ref(),
        &config.run_settings(),
        today,
        SentNumbers::new(),
    )
    .await?;

    if report.credits_exhausted {
        return Err(eyre::eyre!(
            "messaging account ran out of credits; {} of the due reminders were sent",
            report.sent
        ));
    }
    Ok(report)
}

#[derive(Debug, Clone)]
pub struct AddClient {
    pub id: i64,
    pub dob: Date,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub diagnosis: Option<DiagnosisCategory>,
    pub language: Language,
    pub ifsp: bool,
}

pub fn add_client(store: &SqliteStore, new: AddClient) -> eyre::Result<Client> {
    let full_name = format!("{} {}", new.first_name, new.last_name);
    let client = Client {
        id: new.id,
        dob: new.dob,
        first_name: new.first_name,
        last_name: new.last_name,
        preferred_name: new.preferred_name,
        full_name,
        phone_number: new.phone_number,
        gender: new.gender,
        diagnosis: new.diagnosis,
        language: new.language,
        active: true,
        ifsp: new.ifsp,
        ifsp_downloaded: false,
    };
    store.upsert_client(&client)?;
    tracing::info!(client_id = client.id, name = client.full_name(), "client saved");
    Ok(client)
}

pub fn assign(
    store: &SqliteStore,
    client_id: i64,
    questionnaire_type: QuestionnaireType,
    link: Option<String>,
    sent: Option<Date>,
    status: QuestionnaireStatus,
) -> eyre::Result<i64> {
    let id = store.assign_questionnaire(&NewQuestionnaire {
        client_id,
        questionnaire_type,
        link,
        sent,
        status,
    })?;
    tracing::info!(client_id, questionnaire_id = id, %questionnaire_type, "questionnaire assigned");
    Ok(id)
}

/// Questionnaires to assign for a client, by their age today.
pub fn required_for_client(
    store: &SqliteStore,
    client_id: i64,
    evaluation: EvaluationType,
    vineland_on_file: bool,
    today: Date,
) -> eyre::Result<Requirement> {
    let client = store
        .client(client_id)?
        .ok_or_else(|| eyre::eyre!("client {client_id} not found"))?;
    let diagnosis = client
        .diagnosis
        .ok_or_else(|| eyre::eyre!("client {client_id} has no diagnosis category"))?;
    Ok(required_questionnaires(
        client.age_on(today),
        diagnosis,
        evaluation,
        vineland_on_file,
    ))
}

#[derive(Debug, Serialize)]
pub struct ClientStatus {
    pub client: Client,
    pub questionnaires: Vec<ItemStatus>,
    pub failures: Vec<ItemStatus>,
}

#[derive(Debug, Serialize)]
pub struct ItemStatus {
    pub id: i64,
    pub label: String,
    pub status: String,
    pub stage: ReminderStage,
    pub reminded: u32,
    pub last_reminded: Option<Date>,
}

pub fn client_status(store: &SqliteStore, client_id: i64) -> eyre::Result<ClientStatus> {
    let client = store
        .client(client_id)?
        .ok_or_else(|| eyre::eyre!("client {client_id} not found"))?;

    let questionnaires = store
        .questionnaires_for(client_id)?
        .into_iter()
        .map(|q| ItemStatus {
            id: q.id,
            label: q.questionnaire_type.to_string(),
            status: q.status.to_string(),
            stage: if q.status.is_not_done() {
                ReminderStage::from_counter(q.reminded, false)
            } else {
                ReminderStage::Resolved
            },
            reminded: q.reminded,
            last_reminded: q.last_reminded,
        })
        .collect();

    let failures = store
        .failures_for(client_id)?
        .into_iter()
        .map(|f| ItemStatus {
            id: f.id,
            label: f.reason.to_string(),
            status: if f.resolved { "resolved" } else { "open" }.to_string(),
            stage: ReminderStage::from_counter(f.reminded, f.resolved),
            reminded: f.reminded,
            last_reminded: f.last_reminded,
        })
        .collect();

    Ok(ClientStatus {
        client,
        questionnaires,
        failures,
    })
}

pub fn record_failure(
    store: &SqliteStore,
    client_id: i64,
    reason: &str,
    evaluation: Option<EvaluationType>,
    failed_date: Date,
) -> eyre::Result<i64> {
    let reason = FailureReason::from(reason);
    let id = store.record_failure(client_id, &reason, evaluation, failed_date)?;
    tracing::info!(client_id, failure_id = id, %reason, "failure recorded");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        add_client(
            &store,
            AddClient {
                id: 7,
                dob: date(2017, 9, 14),
                first_name: "Rowan".into(),
                last_name: "Park".into(),
                preferred_name: None,
                phone_number: Some("5551234567".into()),
                gender: None,
                diagnosis: Some(DiagnosisCategory::Adhd),
                language: Language::English,
                ifsp: false,
            },
        )
        .unwrap();
        store
    }

    #[test]
    fn requirements_use_age_today() {
        let store = seeded();
        let requirement =
            required_for_client(&store, 7, EvaluationType::Da, false, date(2024, 3, 8)).unwrap();
        assert_eq!(
            requirement,
            Requirement::Questionnaires(vec![QuestionnaireType::Conners4])
        );
    }

    #[test]
    fn status_reports_stages() {
        let store = seeded();
        let q = assign(
            &store,
            7,
            QuestionnaireType::Conners4,
            None,
            Some(date(2024, 3, 1)),
            QuestionnaireStatus::Pending,
        )
        .unwrap();
        record_failure(&store, 7, "docs not signed", None, date(2024, 3, 2)).unwrap();
        store
            .resolve_failure(7, &FailureReason::DocsNotSigned)
            .unwrap();

        let status = client_status(&store, 7).unwrap();
        assert_eq!(status.client.full_name, "Rowan Park");
        assert_eq!(status.questionnaires[0].id, q);
        assert_eq!(status.questionnaires[0].stage, ReminderStage::New);
        assert_eq!(status.failures[0].stage, ReminderStage::Resolved);
        assert_eq!(status.failures[0].status, "resolved");
    }
}
