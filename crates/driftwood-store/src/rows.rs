//! Raw table rows and their validation into domain models.
//!
//! Columns are read as loose SQLite values first so that one malformed row
//! (bad date, unknown status) can be reported and skipped without failing
//! the whole query.

use driftwood_core::models::{
    Client, DiagnosisCategory, EvaluationType, Failure, FailureReason, Language, Questionnaire,
    QuestionnaireStatus, QuestionnaireType,
};
use jiff::civil::Date;
use rusqlite::Row;

use crate::error::StoreError;

pub(crate) const CLIENT_COLUMNS: &str = "id, dob, first_name, last_name, preferred_name, \
    full_name, phone_number, gender, diagnosis, language, active, ifsp, ifsp_downloaded";

pub(crate) const QUESTIONNAIRE_COLUMNS: &str =
    "id, client_id, questionnaire_type, link, sent, status, reminded, last_reminded";

pub(crate) const FAILURE_COLUMNS: &str =
    "id, client_id, reason, evaluation_type, failed_date, reminded, last_reminded, resolved";

#[derive(Debug)]
pub(crate) struct ClientRow {
    id: i64,
    dob: String,
    first_name: String,
    last_name: String,
    preferred_name: Option<String>,
    full_name: String,
    phone_number: Option<String>,
    gender: Option<String>,
    diagnosis: Option<String>,
    language: String,
    active: bool,
    ifsp: bool,
    ifsp_downloaded: bool,
}

impl ClientRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            dob: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            preferred_name: row.get(4)?,
            full_name: row.get(5)?,
            phone_number: row.get(6)?,
            gender: row.get(7)?,
            diagnosis: row.get(8)?,
            language: row.get(9)?,
            active: row.get(10)?,
            ifsp: row.get(11)?,
            ifsp_downloaded: row.get(12)?,
        })
    }

    pub(crate) fn into_model(self) -> Result<Client, StoreError> {
        let invalid = |reason: String| StoreError::InvalidRow {
            table: "clients",
            id: self.id,
            reason,
        };
        let diagnosis = self
            .diagnosis
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(str::parse::<DiagnosisCategory>)
            .transpose()
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Client {
            id: self.id,
            dob: parse_date(&self.dob).map_err(&invalid)?,
            language: self.language.parse::<Language>().map_err(|e| invalid(format!("{e}")))?,
            diagnosis,
            first_name: self.first_name,
            last_name: self.last_name,
            preferred_name: self.preferred_name,
            full_name: self.full_name,
            phone_number: self.phone_number,
            gender: self.gender,
            active: self.active,
            ifsp: self.ifsp,
            ifsp_downloaded: self.ifsp_downloaded,
        })
    }
}

#[derive(Debug)]
pub(crate) struct QuestionnaireRow {
    id: i64,
    client_id: i64,
    questionnaire_type: String,
    link: Option<String>,
    sent: Option<String>,
    status: String,
    reminded: i64,
    last_reminded: Option<String>,
}

impl QuestionnaireRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
            questionnaire_type: row.get(2)?,
            link: row.get(3)?,
            sent: row.get(4)?,
            status: row.get(5)?,
            reminded: row.get(6)?,
            last_reminded: row.get(7)?,
        })
    }

    pub(crate) fn into_model(self) -> Result<Questionnaire, StoreError> {
        let invalid = |reason: String| StoreError::InvalidRow {
            table: "questionnaires",
            id: self.id,
            reason,
        };
        let questionnaire_type: QuestionnaireType = self
            .questionnaire_type
            .parse::<QuestionnaireType>()
            .map_err(|e| invalid(format!("{e}")))?;
        let status: QuestionnaireStatus =
            self.status.parse::<QuestionnaireStatus>().map_err(|e| invalid(format!("{e}")))?;
        Ok(Questionnaire {
            id: self.id,
            client_id: self.client_id,
            questionnaire_type,
            link: self.link,
            sent: parse_optional_date(self.sent.as_deref()).map_err(&invalid)?,
            status,
            reminded: parse_counter(self.reminded).map_err(&invalid)?,
            last_reminded: parse_optional_date(self.last_reminded.as_deref()).map_err(&invalid)?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct FailureRow {
    id: i64,
    client_id: i64,
    reason: String,
    evaluation_type: Option<String>,
    failed_date: String,
    reminded: i64,
    last_reminded: Option<String>,
    resolved: bool,
}

impl FailureRow {
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
            reason: row.get(2)?,
            evaluation_type: row.get(3)?,
            failed_date: row.get(4)?,
            reminded: row.get(5)?,
            last_reminded: row.get(6)?,
            resolved: row.get(7)?,
        })
    }

    pub(crate) fn into_model(self) -> Result<Failure, StoreError> {
        let invalid = |reason: String| StoreError::InvalidRow {
            table: "failures",
            id: self.id,
            reason,
        };
        let evaluation_type = self
            .evaluation_type
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(str::parse::<EvaluationType>)
            .transpose()
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Failure {
            id: self.id,
            client_id: self.client_id,
            reason: FailureReason::from(self.reason),
            evaluation_type,
            failed_date: parse_date(&self.failed_date).map_err(&invalid)?,
            reminded: parse_counter(self.reminded).map_err(&invalid)?,
            last_reminded: parse_optional_date(self.last_reminded.as_deref()).map_err(&invalid)?,
            resolved: self.resolved,
        })
    }
}

fn parse_date(raw: &str) -> Result<Date, String> {
    raw.trim()
        .parse::<Date>()
        .map_err(|e| format!("bad date {raw:?}: {e}"))
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<Date>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

fn parse_counter(raw: i64) -> Result<u32, String> {
    u32::try_from(raw).map_err(|_| format!("reminder counter out of range: {raw}"))
}

pub(crate) fn format_date(date: Date) -> String {
    date.strftime("%Y-%m-%d").to_string()
}
