use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The assessment instruments the clinic sends out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionnaireType {
    #[serde(rename = "DP-4")]
    Dp4,
    #[serde(rename = "BASC Preschool")]
    BascPreschool,
    #[serde(rename = "BASC Child")]
    BascChild,
    #[serde(rename = "BASC Adolescent")]
    BascAdolescent,
    #[serde(rename = "Conners EC")]
    ConnersEc,
    #[serde(rename = "Conners 4")]
    Conners4,
    #[serde(rename = "Conners 4 Self")]
    Conners4Self,
    #[serde(rename = "ASRS (2-5 Years)")]
    Asrs2To5,
    #[serde(rename = "ASRS (6-18 Years)")]
    Asrs6To18,
    #[serde(rename = "Vineland")]
    Vineland,
    #[serde(rename = "ABAS 3")]
    Abas3,
    #[serde(rename = "PAI")]
    Pai,
    #[serde(rename = "CAARS 2")]
    Caars2,
    #[serde(rename = "SRS-2")]
    Srs2,
    #[serde(rename = "SRS Self")]
    SrsSelf,
}

impl QuestionnaireType {
    pub const ALL: [QuestionnaireType; 15] = [
        Self::Dp4,
        Self::BascPreschool,
        Self::BascChild,
        Self::BascAdolescent,
        Self::ConnersEc,
        Self::Conners4,
        Self::Conners4Self,
        Self::Asrs2To5,
        Self::Asrs6To18,
        Self::Vineland,
        Self::Abas3,
        Self::Pai,
        Self::Caars2,
        Self::Srs2,
        Self::SrsSelf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dp4 => "DP-4",
            Self::BascPreschool => "BASC Preschool",
            Self::BascChild => "BASC Child",
            Self::BascAdolescent => "BASC Adolescent",
            Self::ConnersEc => "Conners EC",
            Self::Conners4 => "Conners 4",
            Self::Conners4Self => "Conners 4 Self",
            Self::Asrs2To5 => "ASRS (2-5 Years)",
            Self::Asrs6To18 => "ASRS (6-18 Years)",
            Self::Vineland => "Vineland",
            Self::Abas3 => "ABAS 3",
            Self::Pai => "PAI",
            Self::Caars2 => "CAARS 2",
            Self::Srs2 => "SRS-2",
            Self::SrsSelf => "SRS Self",
        }
    }
}

impl fmt::Display for QuestionnaireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionnaireType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // "DP4" is how the scheduling portal spells it.
        if trimmed.eq_ignore_ascii_case("DP4") {
            return Ok(Self::Dp4);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownQuestionnaireType(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionnaireStatus {
    Pending,
    Completed,
    Ignoring,
    PostevalPending,
    Language,
    Teacher,
    External,
    Archived,
    JustAdded,
    Rescheduled,
    /// Parsed for compatibility with older rows; nothing assigns it.
    Spanish,
}

impl QuestionnaireStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Ignoring => "IGNORING",
            Self::PostevalPending => "POSTEVAL_PENDING",
            Self::Language => "LANGUAGE",
            Self::Teacher => "TEACHER",
            Self::External => "EXTERNAL",
            Self::Archived => "ARCHIVED",
            Self::JustAdded => "JUST_ADDED",
            Self::Rescheduled => "RESCHEDULED",
            Self::Spanish => "SPANISH",
        }
    }

    /// Terminal statuses are never reminded again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Archived | Self::Ignoring)
    }

    /// Statuses that still wait on the client.
    pub fn is_not_done(&self) -> bool {
        matches!(self, Self::Pending | Self::PostevalPending)
    }
}

impl fmt::Display for QuestionnaireStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionnaireStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "COMPLETED" => Self::Completed,
            "IGNORING" => Self::Ignoring,
            "POSTEVAL_PENDING" => Self::PostevalPending,
            "LANGUAGE" => Self::Language,
            "TEACHER" => Self::Teacher,
            "EXTERNAL" => Self::External,
            "ARCHIVED" => Self::Archived,
            "JUST_ADDED" => Self::JustAdded,
            "RESCHEDULED" => Self::Rescheduled,
            "SPANISH" => Self::Spanish,
            other => return Err(CoreError::UnknownStatus(other.to_string())),
        };
        Ok(status)
    }
}

/// One assessment instance assigned to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: i64,
    pub client_id: i64,
    pub questionnaire_type: QuestionnaireType,
    pub link: Option<String>,
    pub sent: Option<Date>,
    pub status: QuestionnaireStatus,
    pub reminded: u32,
    pub last_reminded: Option<Date>,
}

impl Questionnaire {
    /// The date reminder cadence is measured from: the last reminder, or the
    /// send date when the client was never reminded.
    pub fn cadence_anchor(&self) -> Option<Date> {
        self.last_reminded.or(self.sent)
    }

    pub fn is_post_eval(&self) -> bool {
        self.status == QuestionnaireStatus::PostevalPending
    }
}
