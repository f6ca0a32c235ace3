use std::collections::BTreeMap;
use std::path::Path;

use driftwood_core::models::{
    Client, EvaluationType, Failure, FailureReason, Questionnaire, QuestionnaireStatus,
    QuestionnaireType,
};
use jiff::civil::Date;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::rows::{
    CLIENT_COLUMNS, ClientRow, FAILURE_COLUMNS, FailureRow, QUESTIONNAIRE_COLUMNS,
    QuestionnaireRow, format_date,
};
use crate::schema;
use crate::store::{
    ClientFailures, ClientQuestionnaires, FailureUpdate, QuestionnaireUpdate, ReminderStore,
};

/// A questionnaire to assign to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionnaire {
    pub client_id: i64,
    pub questionnaire_type: QuestionnaireType,
    pub link: Option<String>,
    pub sent: Option<Date>,
    pub status: QuestionnaireStatus,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and migrate it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a client, or refresh the contact details of an existing one.
    /// Clients are never deleted; `active` is the soft switch. A downloaded
    /// IFSP stays downloaded.
    pub fn upsert_client(&self, client: &Client) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO clients (id, dob, first_name, last_name, preferred_name, full_name,
                phone_number, gender, diagnosis, language, active, ifsp, ifsp_downloaded)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO UPDATE SET
                preferred_name = excluded.preferred_name,
                phone_number = excluded.phone_number,
                diagnosis = excluded.diagnosis,
                language = excluded.language,
                active = excluded.active,
                ifsp = excluded.ifsp,
                ifsp_downloaded = MAX(clients.ifsp_downloaded, excluded.ifsp_downloaded)",
            params![
                client.id,
                format_date(client.dob),
                client.first_name,
                client.last_name,
                client.preferred_name,
                client.full_name,
                client.phone_number,
                client.gender,
                client.diagnosis.map(|d| d.as_str()),
                client.language.as_str(),
                client.active,
                client.ifsp,
                client.ifsp_downloaded,
            ],
        )?;
        Ok(())
    }

    pub fn set_client_active(&self, client_id: i64, active: bool) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE clients SET active = ?2 WHERE id = ?1",
            params![client_id, active],
        )?;
        if changed == 0 {
            return Err(StoreError::ClientNotFound(client_id));
        }
        Ok(())
    }

    /// Record that the client's IFSP has been downloaded.
    pub fn mark_ifsp_downloaded(&self, client_id: i64) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE clients SET ifsp_downloaded = 1 WHERE id = ?1",
            params![client_id],
        )?;
        if changed == 0 {
            return Err(StoreError::ClientNotFound(client_id));
        }
        Ok(())
    }

    pub fn client(&self, client_id: i64) -> Result<Option<Client>, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
                params![client_id],
                ClientRow::read,
            )
            .optional()?;
        row.map(ClientRow::into_model).transpose()
    }

    /// Assign a questionnaire. Returns the new questionnaire id.
    pub fn assign_questionnaire(&self, new: &NewQuestionnaire) -> Result<i64, StoreError> {
        self.require_client(new.client_id)?;
        self.conn.execute(
            "INSERT INTO questionnaires (client_id, questionnaire_type, link, sent, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.client_id,
                new.questionnaire_type.as_str(),
                new.link,
                new.sent.map(format_date),
                new.status.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn questionnaires_for(&self, client_id: i64) -> Result<Vec<Questionnaire>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE client_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![client_id], QuestionnaireRow::read)?;
        collect_valid(rows, QuestionnaireRow::into_model)
    }

    pub fn set_questionnaire_status(
        &self,
        questionnaire_id: i64,
        status: QuestionnaireStatus,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE questionnaires SET status = ?2 WHERE id = ?1",
            params![questionnaire_id, status.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::QuestionnaireNotFound(questionnaire_id));
        }
        Ok(())
    }

    /// Record a failure for a client. A client has at most one failure per
    /// reason; recording an existing reason keeps the original row and
    /// returns its id.
    pub fn record_failure(
        &self,
        client_id: i64,
        reason: &FailureReason,
        evaluation_type: Option<EvaluationType>,
        failed_date: Date,
    ) -> Result<i64, StoreError> {
        self.require_client(client_id)?;
        self.conn.execute(
            "INSERT INTO failures (client_id, reason, evaluation_type, failed_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(client_id, reason) DO NOTHING",
            params![
                client_id,
                reason.as_str(),
                evaluation_type.map(|e| e.as_str()),
                format_date(failed_date),
            ],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM failures WHERE client_id = ?1 AND reason = ?2",
            params![client_id, reason.as_str()],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Mark a client's failure for `reason` resolved.
    pub fn resolve_failure(
        &self,
        client_id: i64,
        reason: &FailureReason,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE failures SET resolved = 1
             WHERE client_id = ?1 AND reason = ?2 AND resolved = 0",
            params![client_id, reason.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::FailureNotFound {
                client_id,
                reason: reason.as_str().to_string(),
            });
        }
        Ok(())
    }

    pub fn failures_for(&self, client_id: i64) -> Result<Vec<Failure>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FAILURE_COLUMNS} FROM failures WHERE client_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![client_id], FailureRow::read)?;
        collect_valid(rows, FailureRow::into_model)
    }

    fn require_client(&self, client_id: i64) -> Result<(), StoreError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1)",
            params![client_id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(StoreError::ClientNotFound(client_id))
        }
    }

    fn clients_by_id(&self, sql: &str) -> Result<BTreeMap<i64, Client>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], ClientRow::read)?;
        Ok(collect_valid(rows, ClientRow::into_model)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect())
    }
}

impl ReminderStore for SqliteStore {
    fn active_clients_with_questionnaires(&self) -> Result<Vec<ClientQuestionnaires>, StoreError> {
        let mut clients = self.clients_by_id(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients
             WHERE active = 1 AND id IN (SELECT client_id FROM questionnaires)"
        ))?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires
             WHERE client_id IN (SELECT id FROM clients WHERE active = 1)
             ORDER BY client_id, id"
        ))?;
        let rows = stmt.query_map([], QuestionnaireRow::read)?;

        let mut grouped: BTreeMap<i64, Vec<Questionnaire>> = BTreeMap::new();
        for q in collect_valid(rows, QuestionnaireRow::into_model)? {
            grouped.entry(q.client_id).or_default().push(q);
        }

        Ok(grouped
            .into_iter()
            .filter_map(|(client_id, questionnaires)| {
                clients.remove(&client_id).map(|client| ClientQuestionnaires {
                    client,
                    questionnaires,
                })
            })
            .collect())
    }

    fn open_failures(&self) -> Result<Vec<ClientFailures>, StoreError> {
        let mut clients = self.clients_by_id(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients
             WHERE id IN (SELECT client_id FROM failures WHERE resolved = 0)"
        ))?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FAILURE_COLUMNS} FROM failures WHERE resolved = 0 ORDER BY client_id, id"
        ))?;
        let rows = stmt.query_map([], FailureRow::read)?;

        let mut grouped: BTreeMap<i64, Vec<Failure>> = BTreeMap::new();
        for f in collect_valid(rows, FailureRow::into_model)? {
            grouped.entry(f.client_id).or_default().push(f);
        }

        Ok(grouped
            .into_iter()
            .filter_map(|(client_id, failures)| {
                clients
                    .remove(&client_id)
                    .map(|client| ClientFailures { client, failures })
            })
            .collect())
    }

    fn update_questionnaires(&self, updates: &[QuestionnaireUpdate]) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE questionnaires SET status = ?2, reminded = ?3, last_reminded = ?4
                 WHERE id = ?1",
            )?;
            for u in updates {
                stmt.execute(params![
                    u.id,
                    u.status.as_str(),
                    u.reminded,
                    u.last_reminded.map(format_date),
                ])?;
            }
        }
        tx.commit()?;
        debug!(count = updates.len(), "updated questionnaires");
        Ok(())
    }

    fn update_failures(&self, updates: &[FailureUpdate]) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE failures SET reminded = ?2, last_reminded = ?3, resolved = ?4
                 WHERE id = ?1",
            )?;
            for u in updates {
                stmt.execute(params![
                    u.id,
                    u.reminded,
                    u.last_reminded.map(format_date),
                    u.resolved,
                ])?;
            }
        }
        tx.commit()?;
        debug!(count = updates.len(), "updated failures");
        Ok(())
    }
}

/// Collect validated rows, logging and skipping the ones that fail
/// validation. SQLite errors still abort.
fn collect_valid<R, T>(
    rows: impl Iterator<Item = rusqlite::Result<R>>,
    validate: impl Fn(R) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for row in rows {
        match validate(row?) {
            Ok(value) => out.push(value),
            Err(e @ StoreError::InvalidRow { .. }) => warn!(error = %e, "skipping invalid row"),
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}
