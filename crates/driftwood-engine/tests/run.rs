use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::Mutex;

use driftwood_core::compose::ClinicProfile;
use driftwood_core::models::{
    Client, DiagnosisCategory, Failure, FailureReason, Language, Questionnaire,
    QuestionnaireStatus, QuestionnaireType,
};
use driftwood_engine::{
    BoxFuture, EngineError, Messenger, RunSettings, SentNumbers, StatusChecker, run,
    run_with_summary,
};
use driftwood_openphone::{DeliveryError, SentMessage};
use driftwood_store::{
    ClientFailures, ClientQuestionnaires, FailureUpdate, QuestionnaireUpdate, ReminderStore,
    StoreError,
};
use driftwood_summary::{AdminSummary, CallEntry, SummaryError, SummarySink};
use jiff::ToSpan;
use jiff::civil::{Date, date};

const TODAY: Date = date(2024, 3, 8);

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeStore {
    clients: RefCell<Vec<ClientQuestionnaires>>,
    failures: RefCell<Vec<ClientFailures>>,
}

impl FakeStore {
    fn with_clients(clients: Vec<ClientQuestionnaires>) -> Self {
        Self {
            clients: RefCell::new(clients),
            failures: RefCell::default(),
        }
    }

    fn questionnaire(&self, id: i64) -> Questionnaire {
        self.clients
            .borrow()
            .iter()
            .flat_map(|c| c.questionnaires.iter())
            .find(|q| q.id == id)
            .cloned()
            .unwrap()
    }

    fn failure(&self, id: i64) -> Failure {
        self.failures
            .borrow()
            .iter()
            .flat_map(|c| c.failures.iter())
            .find(|f| f.id == id)
            .cloned()
            .unwrap()
    }
}

impl ReminderStore for FakeStore {
    fn active_clients_with_questionnaires(&self) -> Result<Vec<ClientQuestionnaires>, StoreError> {
        Ok(self.clients.borrow().clone())
    }

    fn open_failures(&self) -> Result<Vec<ClientFailures>, StoreError> {
        Ok(self
            .failures
            .borrow()
            .iter()
            .map(|c| ClientFailures {
                client: c.client.clone(),
                failures: c.failures.iter().filter(|f| !f.resolved).cloned().collect(),
            })
            .filter(|c| !c.failures.is_empty())
            .collect())
    }

    fn update_questionnaires(&self, updates: &[QuestionnaireUpdate]) -> Result<(), StoreError> {
        for u in updates {
            for c in self.clients.borrow_mut().iter_mut() {
                for q in c.questionnaires.iter_mut().filter(|q| q.id == u.id) {
                    q.status = u.status;
                    q.reminded = u.reminded;
                    q.last_reminded = u.last_reminded;
                }
            }
        }
        Ok(())
    }

    fn update_failures(&self, updates: &[FailureUpdate]) -> Result<(), StoreError> {
        for u in updates {
            for c in self.failures.borrow_mut().iter_mut() {
                for f in c.failures.iter_mut().filter(|f| f.id == u.id) {
                    f.reminded = u.reminded;
                    f.last_reminded = u.last_reminded;
                    f.resolved = u.resolved;
                }
            }
        }
        Ok(())
    }
}

struct BrokenStore;

impl ReminderStore for BrokenStore {
    fn active_clients_with_questionnaires(&self) -> Result<Vec<ClientQuestionnaires>, StoreError> {
        Err(StoreError::SchemaTooNew {
            found: 9,
            supported: 2,
        })
    }

    fn open_failures(&self) -> Result<Vec<ClientFailures>, StoreError> {
        Ok(Vec::new())
    }

    fn update_questionnaires(&self, _: &[QuestionnaireUpdate]) -> Result<(), StoreError> {
        Ok(())
    }

    fn update_failures(&self, _: &[FailureUpdate]) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Loads like `FakeStore` but cannot save questionnaire counters.
struct ReadOnlyStore(FakeStore);

impl ReminderStore for ReadOnlyStore {
    fn active_clients_with_questionnaires(&self) -> Result<Vec<ClientQuestionnaires>, StoreError> {
        self.0.active_clients_with_questionnaires()
    }

    fn open_failures(&self) -> Result<Vec<ClientFailures>, StoreError> {
        self.0.open_failures()
    }

    fn update_questionnaires(&self, updates: &[QuestionnaireUpdate]) -> Result<(), StoreError> {
        match updates.first() {
            Some(update) => Err(StoreError::QuestionnaireNotFound(update.id)),
            None => Ok(()),
        }
    }

    fn update_failures(&self, updates: &[FailureUpdate]) -> Result<(), StoreError> {
        self.0.update_failures(updates)
    }
}

#[derive(Default)]
struct FakeMessenger {
    /// (to, message) for every send attempt, including failed ones.
    attempts: Mutex<Vec<(String, String)>>,
    undelivered: BTreeSet<String>,
    /// Sends succeed until this many have gone out, then the account is
    /// out of credits.
    credit_limit: Option<usize>,
}

impl FakeMessenger {
    fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Messenger for FakeMessenger {
    fn send_text<'a>(
        &'a self,
        message: &'a str,
        to_number: &'a str,
    ) -> BoxFuture<'a, Result<SentMessage, DeliveryError>> {
        Box::pin(async move {
            let mut attempts = self.attempts.lock().unwrap();
            if self.credit_limit.is_some_and(|limit| attempts.len() >= limit) {
                attempts.push((to_number.to_string(), message.to_string()));
                return Err(DeliveryError::NotEnoughCredits);
            }
            attempts.push((to_number.to_string(), message.to_string()));
            Ok(SentMessage {
                id: format!("msg-{to_number}"),
                status: Some("queued".into()),
                to: vec![to_number.to_string()],
                from: None,
            })
        })
    }

    fn check_text_delivered<'a>(&'a self, message_id: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let to = message_id.trim_start_matches("msg-");
            !self.undelivered.contains(to)
        })
    }
}

#[derive(Default)]
struct FakeChecker {
    completed: BTreeSet<i64>,
    resolved: BTreeSet<i64>,
    broken: BTreeSet<i64>,
}

impl StatusChecker for FakeChecker {
    fn questionnaire_completed<'a>(
        &'a self,
        _client: &'a Client,
        questionnaire: &'a Questionnaire,
    ) -> BoxFuture<'a, Result<bool, EngineError>> {
        Box::pin(async move {
            if self.broken.contains(&questionnaire.id) {
                return Err(EngineError::StatusCheck("portal timed out".into()));
            }
            Ok(self.completed.contains(&questionnaire.id))
        })
    }

    fn failure_resolved<'a>(
        &'a self,
        _client: &'a Client,
        failure: &'a Failure,
    ) -> BoxFuture<'a, Result<bool, EngineError>> {
        Box::pin(async move { Ok(self.resolved.contains(&failure.id)) })
    }
}

#[derive(Default)]
struct FakeSink {
    delivered: Mutex<Vec<AdminSummary>>,
}

impl SummarySink for FakeSink {
    fn deliver(&self, summary: &AdminSummary, _run_date: Date) -> Result<(), SummaryError> {
        self.delivered.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn settings() -> RunSettings {
    RunSettings {
        clinic: ClinicProfile {
            name: "Driftwood Evaluation Center".into(),
            portal_url: "https://portal.example".into(),
        },
        sender_name: "Maddy".into(),
        spanish_enabled: false,
    }
}

fn client(id: i64, phone: Option<&str>) -> Client {
    Client {
        id,
        dob: date(2015, 6, 1),
        first_name: "Client".into(),
        last_name: id.to_string(),
        preferred_name: None,
        full_name: format!("Client {id}"),
        phone_number: phone.map(str::to_string),
        gender: None,
        diagnosis: Some(DiagnosisCategory::Asd),
        language: Language::English,
        active: true,
        ifsp: false,
        ifsp_downloaded: false,
    }
}

fn questionnaire(id: i64, client_id: i64, sent: Date, reminded: u32) -> Questionnaire {
    Questionnaire {
        id,
        client_id,
        questionnaire_type: QuestionnaireType::BascChild,
        link: None,
        sent: Some(sent),
        status: QuestionnaireStatus::Pending,
        reminded,
        last_reminded: None,
    }
}

fn failure(id: i64, client_id: i64, reason: FailureReason, failed: Date) -> Failure {
    Failure {
        id,
        client_id,
        reason,
        evaluation_type: None,
        failed_date: failed,
        reminded: 0,
        last_reminded: None,
        resolved: false,
    }
}

fn with_questionnaires(client: Client, questionnaires: Vec<Questionnaire>) -> ClientQuestionnaires {
    ClientQuestionnaires {
        client,
        questionnaires,
    }
}

fn days_ago(n: i64) -> Date {
    TODAY.checked_sub(n.days()).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_reminder_goes_out_after_a_week() {
    let mut q = questionnaire(10, 1, days_ago(14), 1);
    q.last_reminded = Some(days_ago(7));
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("555-123-4567")),
        vec![q],
    )]);
    let messenger = FakeMessenger::default();

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    let attempts = messenger.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].0, "+15551234567");
    assert!(attempts[0].1.contains("still incomplete"));
    assert_eq!(report.delivered, 1);
    let stored = store.questionnaire(10);
    assert_eq!(stored.reminded, 2);
    assert_eq!(stored.last_reminded, Some(TODAY));
    assert!(report.sent_numbers.contains("5551234567"));
}

#[tokio::test]
async fn rerunning_the_same_day_sends_nothing_new() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("5551234567")),
        vec![questionnaire(10, 1, days_ago(1), 0)],
    )]);
    let messenger = FakeMessenger::default();

    run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();
    run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert_eq!(messenger.attempts().len(), 1);
    assert_eq!(store.questionnaire(10).reminded, 1);
}

#[tokio::test]
async fn third_reminder_escalates_once() {
    let mut q = questionnaire(10, 1, days_ago(30), 3);
    q.last_reminded = Some(days_ago(3));
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("5551234567")),
        vec![q],
    )]);
    let messenger = FakeMessenger::default();

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert!(messenger.attempts().is_empty());
    assert_eq!(report.escalated, 1);
    assert_eq!(
        report.summary.call,
        vec![CallEntry::Questionnaire {
            name: "Client 1".into(),
            sent: Some(days_ago(30)),
            reminded: Some(3),
        }]
    );
    let stored = store.questionnaire(10);
    assert_eq!(stored.reminded, 4);
    assert_eq!(stored.last_reminded, Some(days_ago(3)));

    let later = TODAY.checked_add(10.days()).unwrap();
    let report = run(&store, &messenger, None, &settings(), later, SentNumbers::new())
        .await
        .unwrap();
    assert!(report.summary.call.is_empty());
}

#[tokio::test]
async fn clients_without_phone_go_to_call_list() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, None),
        vec![questionnaire(10, 1, TODAY, 0)],
    )]);
    let messenger = FakeMessenger::default();

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert!(messenger.attempts().is_empty());
    assert_eq!(report.summary.call.len(), 1);
    assert_eq!(report.summary.call[0].name(), "Client 1");
    assert_eq!(store.questionnaire(10).reminded, 0);
}

#[tokio::test]
async fn shared_number_is_texted_once() {
    let store = FakeStore::with_clients(vec![
        with_questionnaires(
            client(1, Some("(555) 123-4567")),
            vec![questionnaire(10, 1, TODAY, 0)],
        ),
        with_questionnaires(
            client(2, Some("+1 555 123 4567")),
            vec![questionnaire(20, 2, TODAY, 0)],
        ),
    ]);
    let messenger = FakeMessenger::default();

    run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert_eq!(messenger.attempts().len(), 1);
    assert_eq!(store.questionnaire(10).reminded, 1);
    assert_eq!(store.questionnaire(20).reminded, 0);
}

#[tokio::test]
async fn numbers_from_an_earlier_batch_are_skipped() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("5551234567")),
        vec![questionnaire(10, 1, TODAY, 0)],
    )]);
    let messenger = FakeMessenger::default();
    let mut already = SentNumbers::new();
    already.insert("+15551234567");

    run(&store, &messenger, None, &settings(), TODAY, already)
        .await
        .unwrap();

    assert!(messenger.attempts().is_empty());
}

#[tokio::test]
async fn out_of_credits_stops_sending_but_keeps_delivered() {
    let store = FakeStore::with_clients(vec![
        with_questionnaires(
            client(1, Some("5550000001")),
            vec![questionnaire(10, 1, TODAY, 0)],
        ),
        with_questionnaires(
            client(2, Some("5550000002")),
            vec![questionnaire(20, 2, TODAY, 0)],
        ),
        with_questionnaires(
            client(3, Some("5550000003")),
            vec![questionnaire(30, 3, TODAY, 0)],
        ),
    ]);
    let messenger = FakeMessenger {
        credit_limit: Some(1),
        ..Default::default()
    };

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    // One success, one refused, and nothing attempted after that.
    assert_eq!(messenger.attempts().len(), 2);
    assert!(report.credits_exhausted);
    assert_eq!(report.summary.errors.len(), 1);
    assert_eq!(store.questionnaire(10).reminded, 1);
    assert_eq!(store.questionnaire(20).reminded, 0);
    assert_eq!(store.questionnaire(30).reminded, 0);
}

#[tokio::test]
async fn out_of_credits_ends_the_pass_for_later_clients() {
    let mut stalled = questionnaire(20, 2, days_ago(30), 3);
    stalled.last_reminded = Some(days_ago(10));
    let store = FakeStore::with_clients(vec![
        with_questionnaires(
            client(1, Some("5550000001")),
            vec![questionnaire(10, 1, TODAY, 0)],
        ),
        with_questionnaires(client(2, Some("5550000002")), vec![stalled]),
        with_questionnaires(client(3, Some("123")), vec![questionnaire(30, 3, TODAY, 0)]),
    ]);
    let messenger = FakeMessenger {
        credit_limit: Some(0),
        ..Default::default()
    };

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert_eq!(messenger.attempts().len(), 1);
    assert!(report.credits_exhausted);
    assert_eq!(report.escalated, 0);
    assert!(report.summary.call.is_empty());
    assert!(report.summary.failed.is_empty());
    assert_eq!(report.summary.errors.len(), 1);
    assert_eq!(store.questionnaire(20).reminded, 3);
    assert_eq!(store.questionnaire(20).last_reminded, Some(days_ago(10)));
}

#[tokio::test]
async fn undelivered_texts_do_not_count() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("5551234567")),
        vec![questionnaire(10, 1, TODAY, 0)],
    )]);
    let messenger = FakeMessenger {
        undelivered: BTreeSet::from(["+15551234567".to_string()]),
        ..Default::default()
    };

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert_eq!(report.sent, 1);
    assert_eq!(report.delivered, 0);
    assert_eq!(report.summary.failed.len(), 1);
    assert_eq!(report.summary.failed[0].name, "Client 1");
    assert_eq!(store.questionnaire(10).reminded, 0);
    assert_eq!(store.questionnaire(10).last_reminded, None);
}

#[tokio::test]
async fn invalid_numbers_are_reported_not_sent() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("555-1234")),
        vec![questionnaire(10, 1, TODAY, 0)],
    )]);
    let messenger = FakeMessenger::default();

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert!(messenger.attempts().is_empty());
    assert_eq!(report.summary.failed[0].reason, "Invalid phone number");
}

#[tokio::test]
async fn failures_are_texted_before_questionnaires() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("5551234567")),
        vec![questionnaire(10, 1, TODAY, 0)],
    )]);
    store.failures.borrow_mut().push(ClientFailures {
        client: client(1, Some("5551234567")),
        failures: vec![failure(7, 1, FailureReason::PortalNotOpened, days_ago(2))],
    });
    let messenger = FakeMessenger::default();

    run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    let attempts = messenger.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].1.contains("patient portal"));
    assert!(attempts[0].1.contains("has not been opened"));
    assert_eq!(store.failure(7).reminded, 1);
    assert_eq!(store.failure(7).last_reminded, Some(TODAY));
    assert_eq!(store.questionnaire(10).reminded, 0);
}

#[tokio::test]
async fn age_failures_resolve_without_a_checker() {
    let store = FakeStore::default();
    let mut toddler = client(1, Some("5551234567"));
    toddler.dob = date(2021, 1, 1);
    store.failures.borrow_mut().push(ClientFailures {
        client: toddler,
        failures: vec![
            failure(7, 1, FailureReason::TooYoungForAsd, days_ago(300)),
            failure(8, 1, FailureReason::TooYoungForAdhd, days_ago(300)),
        ],
    });
    let messenger = FakeMessenger::default();

    run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert!(store.failure(7).resolved);
    assert!(!store.failure(8).resolved);
    assert!(messenger.attempts().is_empty());
}

#[tokio::test]
async fn portal_completions_are_listed_and_not_reminded() {
    let store = FakeStore::with_clients(vec![
        with_questionnaires(
            client(1, Some("5550000001")),
            vec![questionnaire(10, 1, TODAY, 0)],
        ),
        with_questionnaires(
            client(2, Some("5550000002")),
            vec![questionnaire(20, 2, TODAY, 0)],
        ),
    ]);
    store.failures.borrow_mut().push(ClientFailures {
        client: client(3, Some("5550000003")),
        failures: vec![failure(7, 3, FailureReason::DocsNotSigned, TODAY)],
    });
    let checker = FakeChecker {
        completed: BTreeSet::from([10]),
        resolved: BTreeSet::from([7]),
        broken: BTreeSet::from([20]),
    };
    let messenger = FakeMessenger::default();

    let report = run(
        &store,
        &messenger,
        Some(&checker),
        &settings(),
        TODAY,
        SentNumbers::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.summary.completed, vec!["Client 1".to_string()]);
    assert_eq!(store.questionnaire(10).status, QuestionnaireStatus::Completed);
    assert!(store.failure(7).resolved);
    // The broken check is reported but client 2 is still reminded.
    assert_eq!(report.summary.errors.len(), 1);
    let attempts = messenger.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].0, "+15550000002");
}

#[tokio::test]
async fn ignoring_clients_are_flagged() {
    let mut q = questionnaire(10, 1, days_ago(3), 1);
    q.status = QuestionnaireStatus::Ignoring;
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, Some("5551234567")),
        vec![q],
    )]);
    let messenger = FakeMessenger::default();

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert_eq!(report.summary.ignoring, vec!["Client 1".to_string()]);
    assert!(messenger.attempts().is_empty());
}

#[tokio::test]
async fn pending_ifsp_downloads_are_listed() {
    let mut needs_download = client(1, None);
    needs_download.ifsp = true;
    let mut downloaded = client(2, None);
    downloaded.ifsp = true;
    downloaded.ifsp_downloaded = true;
    let store = FakeStore::with_clients(vec![
        with_questionnaires(needs_download, vec![questionnaire(10, 1, days_ago(2), 1)]),
        with_questionnaires(downloaded, vec![questionnaire(20, 2, days_ago(2), 1)]),
    ]);
    let messenger = FakeMessenger::default();

    let report = run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();

    assert_eq!(report.summary.ifsp_download_needed, vec!["Client 1".to_string()]);
    assert!(messenger.attempts().is_empty());
}

#[tokio::test]
async fn spanish_copy_needs_the_flag() {
    let mut hablante = client(1, Some("5551234567"));
    hablante.language = Language::Spanish;
    let clients = vec![with_questionnaires(
        hablante,
        vec![questionnaire(10, 1, TODAY, 0)],
    )];

    let messenger = FakeMessenger::default();
    let store = FakeStore::with_clients(clients.clone());
    run(&store, &messenger, None, &settings(), TODAY, SentNumbers::new())
        .await
        .unwrap();
    assert!(messenger.attempts()[0].1.starts_with("Hello"));

    let messenger = FakeMessenger::default();
    let store = FakeStore::with_clients(clients);
    let mut spanish = settings();
    spanish.spanish_enabled = true;
    run(&store, &messenger, None, &spanish, TODAY, SentNumbers::new())
        .await
        .unwrap();
    assert!(messenger.attempts()[0].1.starts_with("Hola"));
}

#[tokio::test]
async fn summary_is_sent_even_when_the_run_fails() {
    let messenger = FakeMessenger::default();
    let sink = FakeSink::default();

    let err = run_with_summary(
        &BrokenStore,
        &messenger,
        None,
        &sink,
        &settings(),
        TODAY,
        SentNumbers::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].errors.len(), 1);
}

#[tokio::test]
async fn save_failure_keeps_what_the_run_already_reported() {
    let store = ReadOnlyStore(FakeStore::with_clients(vec![
        with_questionnaires(
            client(1, Some("5550000001")),
            vec![questionnaire(10, 1, TODAY, 0)],
        ),
        with_questionnaires(client(2, None), vec![questionnaire(20, 2, TODAY, 0)]),
        with_questionnaires(
            client(3, Some("5550000003")),
            vec![questionnaire(30, 3, TODAY, 0)],
        ),
    ]));
    let messenger = FakeMessenger {
        undelivered: BTreeSet::from(["+15550000003".to_string()]),
        ..Default::default()
    };
    let sink = FakeSink::default();

    let err = run_with_summary(
        &store,
        &messenger,
        None,
        &sink,
        &settings(),
        TODAY,
        SentNumbers::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
    assert_eq!(messenger.attempts().len(), 2);
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    let summary = &delivered[0];
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.call.len(), 1);
    assert_eq!(summary.call[0].name(), "Client 2");
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "Client 3");
}

#[tokio::test]
async fn summary_carries_the_run_report() {
    let store = FakeStore::with_clients(vec![with_questionnaires(
        client(1, None),
        vec![questionnaire(10, 1, TODAY, 0)],
    )]);
    let messenger = FakeMessenger::default();
    let sink = FakeSink::default();

    let report = run_with_summary(
        &store,
        &messenger,
        None,
        &sink,
        &settings(),
        TODAY,
        SentNumbers::new(),
    )
    .await
    .unwrap();

    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered[0], report.summary);
}
