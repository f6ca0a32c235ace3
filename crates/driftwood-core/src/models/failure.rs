use std::fmt;
use std::str::FromStr;

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Why an automation run could not make progress for a client.
///
/// Stored as the free-text reason string; unknown reasons are kept verbatim
/// in [`FailureReason::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FailureReason {
    PortalNotOpened,
    DocsNotSigned,
    TooYoungForAsd,
    TooYoungForAdhd,
    Other(String),
}

impl FailureReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PortalNotOpened => "portal not opened",
            Self::DocsNotSigned => "docs not signed",
            Self::TooYoungForAsd => "too young for asd",
            Self::TooYoungForAdhd => "too young for adhd",
            Self::Other(reason) => reason,
        }
    }

    /// Age failures clear on their own once the client is old enough, so
    /// texting the family about them is pointless.
    pub fn is_remindable(&self) -> bool {
        !matches!(self, Self::TooYoungForAsd | Self::TooYoungForAdhd)
    }

    /// Whether an age-threshold failure is resolved for someone born on
    /// `dob`. `None` for reasons that do not depend on age.
    pub fn resolved_by_age(&self, dob: Date, today: Date) -> Option<bool> {
        let years: i64 = match self {
            Self::TooYoungForAsd => 2,
            Self::TooYoungForAdhd => 5,
            _ => return None,
        };
        let threshold = today.saturating_sub(years.years());
        Some(dob < threshold)
    }
}

impl From<String> for FailureReason {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "portal not opened" => Self::PortalNotOpened,
            "docs not signed" => Self::DocsNotSigned,
            "too young for asd" => Self::TooYoungForAsd,
            "too young for adhd" => Self::TooYoungForAdhd,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for FailureReason {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<FailureReason> for String {
    fn from(value: FailureReason) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationType {
    /// Diagnostic assessment only.
    #[serde(rename = "DA")]
    Da,
    #[serde(rename = "EVAL")]
    Eval,
    #[serde(rename = "DAEVAL")]
    DaEval,
}

impl EvaluationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Da => "DA",
            Self::Eval => "EVAL",
            Self::DaEval => "DAEVAL",
        }
    }
}

impl fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DA" => Ok(Self::Da),
            "EVAL" => Ok(Self::Eval),
            "DAEVAL" => Ok(Self::DaEval),
            other => Err(CoreError::UnknownEvaluationType(other.to_string())),
        }
    }
}

/// A recorded obstacle blocking progress for a client. A client may carry
/// several at once, one per reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub id: i64,
    pub client_id: i64,
    pub reason: FailureReason,
    pub evaluation_type: Option<EvaluationType>,
    pub failed_date: Date,
    pub reminded: u32,
    pub last_reminded: Option<Date>,
    pub resolved: bool,
}

impl Failure {
    pub fn cadence_anchor(&self) -> Date {
        self.last_reminded.unwrap_or(self.failed_date)
    }
}
