use jiff::civil::Date;
use serde::Serialize;

/// Report of one reminder run, grouped the way the front desk works it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminSummary {
    /// Run-level problems worth a human look.
    pub errors: Vec<String>,
    /// Clients whose questionnaires are all done; results can be downloaded.
    pub completed: Vec<String>,
    /// Clients with an IFSP on file that still has to be downloaded.
    pub ifsp_download_needed: Vec<String>,
    /// Clients marked as ignoring questionnaires or rescheduling.
    pub ignoring: Vec<String>,
    pub failed: Vec<FailedMessage>,
    pub call: Vec<CallEntry>,
}

/// A text that could not be sent or was never confirmed delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMessage {
    pub name: String,
    pub reason: String,
}

/// A client the office should phone instead of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallEntry {
    Questionnaire {
        name: String,
        sent: Option<Date>,
        reminded: Option<u32>,
    },
    Failure {
        name: String,
        reason: String,
        failed_date: Date,
        reminded: u32,
    },
}

impl AdminSummary {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
            && self.completed.is_empty()
            && self.ifsp_download_needed.is_empty()
            && self.ignoring.is_empty()
            && self.failed.is_empty()
            && self.call.is_empty()
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn add_failed(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(FailedMessage {
            name: name.into(),
            reason: reason.into(),
        });
    }
}

impl CallEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Questionnaire { name, .. } | Self::Failure { name, .. } => name,
        }
    }

    /// The parenthesized detail shown next to the name.
    pub fn detail(&self) -> String {
        match self {
            Self::Questionnaire { sent, reminded, .. } => {
                let sent = sent
                    .map(|d| d.strftime("%m/%d").to_string())
                    .unwrap_or_else(|| "unknown date".to_string());
                let reminded = reminded
                    .map(|n| format!("{n} times"))
                    .unwrap_or_else(|| "unknown number of times".to_string());
                format!("sent on {sent}, reminded {reminded}")
            }
            Self::Failure {
                reason,
                failed_date,
                reminded,
                ..
            } => format!(
                "{} on {}, reminded {reminded} times",
                capitalize(reason),
                failed_date.strftime("%m/%d")
            ),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn questionnaire_call_detail() {
        let entry = CallEntry::Questionnaire {
            name: "Jo Smith".into(),
            sent: Some(date(2024, 3, 1)),
            reminded: Some(3),
        };
        assert_eq!(entry.detail(), "sent on 03/01, reminded 3 times");

        let unknown = CallEntry::Questionnaire {
            name: "Jo Smith".into(),
            sent: None,
            reminded: None,
        };
        assert_eq!(
            unknown.detail(),
            "sent on unknown date, reminded unknown number of times"
        );
    }

    #[test]
    fn failure_call_detail_capitalizes_reason() {
        let entry = CallEntry::Failure {
            name: "Jo Smith".into(),
            reason: "portal not opened".into(),
            failed_date: date(2024, 2, 9),
            reminded: 3,
        };
        assert_eq!(entry.detail(), "Portal not opened on 02/09, reminded 3 times");
    }

    #[test]
    fn default_summary_is_empty() {
        let mut summary = AdminSummary::default();
        assert!(summary.is_empty());
        summary.add_error("boom");
        assert!(!summary.is_empty());
    }
}
