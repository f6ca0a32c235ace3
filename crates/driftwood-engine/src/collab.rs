use std::future::Future;
use std::pin::Pin;

use driftwood_core::models::{Client, Failure, Questionnaire};
use driftwood_openphone::{DeliveryError, OpenPhoneClient, SentMessage};

use crate::error::EngineError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outbound text messaging.
pub trait Messenger: Send + Sync {
    fn send_text<'a>(
        &'a self,
        message: &'a str,
        to_number: &'a str,
    ) -> BoxFuture<'a, Result<SentMessage, DeliveryError>>;

    /// Wait for a terminal status. `false` covers both "not delivered" and
    /// "could not find out".
    fn check_text_delivered<'a>(&'a self, message_id: &'a str) -> BoxFuture<'a, bool>;
}

impl Messenger for OpenPhoneClient {
    fn send_text<'a>(
        &'a self,
        message: &'a str,
        to_number: &'a str,
    ) -> BoxFuture<'a, Result<SentMessage, DeliveryError>> {
        Box::pin(OpenPhoneClient::send_text(self, message, to_number, None, None))
    }

    fn check_text_delivered<'a>(&'a self, message_id: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(OpenPhoneClient::check_text_delivered(self, message_id))
    }
}

/// External checks for progress the clinic cannot see in its own database,
/// such as a portal reporting a questionnaire complete.
///
/// Return `Ok(false)` for "not yet"; errors are for checks that could not
/// run at all.
pub trait StatusChecker: Send + Sync {
    fn questionnaire_completed<'a>(
        &'a self,
        client: &'a Client,
        questionnaire: &'a Questionnaire,
    ) -> BoxFuture<'a, Result<bool, EngineError>>;

    fn failure_resolved<'a>(
        &'a self,
        client: &'a Client,
        failure: &'a Failure,
    ) -> BoxFuture<'a, Result<bool, EngineError>>;
}
