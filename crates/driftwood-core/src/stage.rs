use serde::{Deserialize, Serialize};

/// Where a tracked questionnaire or failure sits in the reminder lifecycle.
///
/// ```text
/// New ─▶ Reminded1 ─▶ Reminded2 ─▶ Escalated
///  └──────────┴────────────┴───────────┴──▶ Resolved (external signal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStage {
    New,
    Reminded1,
    Reminded2,
    Escalated,
    Resolved,
}

impl ReminderStage {
    pub fn from_counter(reminded: u32, resolved: bool) -> Self {
        if resolved {
            return Self::Resolved;
        }
        match reminded {
            0 => Self::New,
            1 => Self::Reminded1,
            2 => Self::Reminded2,
            _ => Self::Escalated,
        }
    }

    /// The stage reached after one more delivered reminder. Escalated and
    /// resolved items do not move on their own.
    pub fn after_delivery(self) -> Self {
        match self {
            Self::New => Self::Reminded1,
            Self::Reminded1 => Self::Reminded2,
            Self::Reminded2 => Self::Escalated,
            other => other,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Self::Resolved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reminded1 => "reminded_1",
            Self::Reminded2 => "reminded_2",
            Self::Escalated => "escalated",
            Self::Resolved => "resolved",
        }
    }
}
