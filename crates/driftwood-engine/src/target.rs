use driftwood_core::cadence::{ReminderAction, days_between, next_action};
use driftwood_core::compose::{
    FailureContext, ReminderContext, build_failure_message, build_reminder_message,
};
use driftwood_core::models::{Client, Contact, Failure, Language, Questionnaire};
use driftwood_core::stage::ReminderStage;
use driftwood_summary::CallEntry;
use jiff::civil::Date;

use crate::run::RunSettings;

/// The tracked item that drives a client's reminder this run.
#[derive(Debug, Clone, Copy)]
pub enum ReminderTarget<'a> {
    /// The most recent not-done questionnaire, with the number still open.
    Questionnaire {
        client: &'a Client,
        questionnaire: &'a Questionnaire,
        pending: usize,
    },
    Failure {
        client: &'a Client,
        failure: &'a Failure,
    },
}

impl<'a> ReminderTarget<'a> {
    pub fn client(&self) -> &'a Client {
        match *self {
            Self::Questionnaire { client, .. } | Self::Failure { client, .. } => client,
        }
    }

    pub fn reminded(&self) -> u32 {
        match self {
            Self::Questionnaire { questionnaire, .. } => questionnaire.reminded,
            Self::Failure { failure, .. } => failure.reminded,
        }
    }

    pub fn stage(&self) -> ReminderStage {
        let resolved = match self {
            Self::Questionnaire { .. } => false,
            Self::Failure { failure, .. } => failure.resolved,
        };
        ReminderStage::from_counter(self.reminded(), resolved)
    }

    fn cadence_anchor(&self) -> Option<Date> {
        match self {
            Self::Questionnaire { questionnaire, .. } => questionnaire.cadence_anchor(),
            Self::Failure { failure, .. } => Some(failure.cadence_anchor()),
        }
    }

    /// What to do with this item today. A questionnaire with no send date
    /// has nothing to measure from and waits.
    pub fn action(&self, today: Date) -> ReminderAction {
        let Some(anchor) = self.cadence_anchor() else {
            return ReminderAction::Wait;
        };
        next_action(
            self.reminded(),
            days_between(anchor, today),
            !self.stage().is_active(),
        )
    }

    /// Compose the text, or `None` if this item has no client-facing copy.
    pub fn compose(&self, settings: &RunSettings, today: Date) -> Option<String> {
        let client = self.client();
        let language = if settings.spanish_enabled {
            client.language
        } else {
            Language::English
        };
        match *self {
            Self::Questionnaire {
                questionnaire,
                pending,
                ..
            } => build_reminder_message(&ReminderContext {
                clinic: &settings.clinic,
                sender_name: &settings.sender_name,
                client_name: &client.full_name,
                pending_count: pending,
                language,
                sent: questionnaire.sent,
                today,
                reminder_count: questionnaire.reminded,
                post_eval: questionnaire.is_post_eval(),
            }),
            Self::Failure { failure, .. } => build_failure_message(&FailureContext {
                clinic: &settings.clinic,
                sender_name: &settings.sender_name,
                client_name: &client.full_name,
                reason: &failure.reason,
                failed_date: failure.failed_date,
                language,
            }),
        }
    }

    pub fn call_entry(&self) -> CallEntry {
        match self {
            Self::Questionnaire {
                client,
                questionnaire,
                ..
            } => CallEntry::Questionnaire {
                name: client.full_name.clone(),
                sent: questionnaire.sent,
                reminded: Some(questionnaire.reminded),
            },
            Self::Failure { client, failure } => CallEntry::Failure {
                name: client.full_name.clone(),
                reason: failure.reason.to_string(),
                failed_date: failure.failed_date,
                reminded: failure.reminded,
            },
        }
    }
}

impl Contact for ReminderTarget<'_> {
    fn full_name(&self) -> &str {
        &self.client().full_name
    }

    fn phone_number(&self) -> Option<&str> {
        self.client().phone_number()
    }
}
