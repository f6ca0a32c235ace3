use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::DeliveryError;
use crate::phone::normalize_phone_number;
use crate::retry::Backoff;
use crate::types::{Envelope, MessageStatus, SendRequest, SentMessage};

pub const DEFAULT_BASE_URL: &str = "https://api.openphone.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPhoneConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Number texts are sent from unless the caller overrides it.
    pub from_number: String,
    /// OpenPhone user the message is attributed to.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_calls_per_second")]
    pub calls_per_second: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_calls_per_second() -> u32 {
    10
}

pub struct OpenPhoneClient {
    http: reqwest::Client,
    config: OpenPhoneConfig,
    limiter: DefaultDirectRateLimiter,
    request_backoff: Backoff,
    poll_backoff: Backoff,
}

impl OpenPhoneClient {
    pub fn new(config: OpenPhoneConfig) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let per_second = NonZeroU32::new(config.calls_per_second).unwrap_or(NonZeroU32::MIN);
        Ok(Self {
            http,
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
            config,
            request_backoff: Backoff::request(),
            poll_backoff: Backoff::delivery_poll(),
        })
    }

    /// Override the retry policies (tests use immediate retries).
    pub fn with_backoff(mut self, request: Backoff, poll: Backoff) -> Self {
        self.request_backoff = request;
        self.poll_backoff = poll;
        self
    }

    pub fn config(&self) -> &OpenPhoneConfig {
        &self.config
    }

    /// Send a text. `from_number` and `sender_id` fall back to the
    /// configured defaults.
    ///
    /// Invalid numbers and insufficient credits fail immediately; transient
    /// errors are retried under the request backoff.
    pub async fn send_text(
        &self,
        message: &str,
        to_number: &str,
        from_number: Option<&str>,
        sender_id: Option<&str>,
    ) -> Result<SentMessage, DeliveryError> {
        let to = normalize_phone_number(to_number)?;
        let request = SendRequest {
            content: message,
            from: from_number.unwrap_or(&self.config.from_number),
            to: [to.clone()],
            user_id: sender_id.or(self.config.user_id.as_deref()),
        };

        info!(to = %to, chars = message.len(), "sending text");
        let sent = self
            .with_retry("send_text", self.request_backoff, || self.post_message(&request))
            .await?;
        debug!(message_id = %sent.id, to = %to, "text accepted");
        Ok(sent)
    }

    /// Look up a message by id.
    pub async fn get_message(&self, message_id: &str) -> Result<SentMessage, DeliveryError> {
        self.with_retry("get_message", self.request_backoff, || {
            self.fetch_message(message_id)
        })
        .await
    }

    /// Poll until the message reaches a terminal status.
    ///
    /// Never fails: lookup errors and polls that run out while the message
    /// is still queued both come back as `false`.
    pub async fn check_text_delivered(&self, message_id: &str) -> bool {
        let policy = self.poll_backoff;
        for attempt in 1..=policy.max_tries {
            let message = match self.get_message(message_id).await {
                Ok(message) => message,
                Err(e) => {
                    error!(message_id, error = %e, "failed to check delivery status");
                    return false;
                }
            };

            match message.status() {
                MessageStatus::Delivered => return true,
                status if status.is_pending() => {
                    if attempt < policy.max_tries {
                        let wait = policy.delay(attempt);
                        debug!(
                            message_id,
                            attempt,
                            ?status,
                            wait_ms = wait.as_millis() as u64,
                            "message not yet delivered"
                        );
                        tokio::time::sleep(wait).await;
                    }
                }
                status => {
                    warn!(message_id, ?status, "message reached a non-delivered status");
                    return false;
                }
            }
        }

        warn!(message_id, attempts = policy.max_tries, "message not delivered within timeout");
        false
    }

    /// Send a text and wait for delivery confirmation.
    pub async fn send_text_and_ensure(
        &self,
        message: &str,
        to_number: &str,
    ) -> Result<bool, DeliveryError> {
        let sent = self.send_text(message, to_number, None, None).await?;
        let delivered = self.check_text_delivered(&sent.id).await;
        if delivered {
            info!(to = to_number, "text delivered");
        } else {
            error!(to = to_number, message_id = %sent.id, "text was not delivered");
        }
        Ok(delivered)
    }

    async fn post_message(&self, request: &SendRequest<'_>) -> Result<SentMessage, DeliveryError> {
        self.limiter.until_ready().await;
        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url()))
            .header(AUTHORIZATION, &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;
        Self::read_data(response).await
    }

    async fn fetch_message(&self, message_id: &str) -> Result<SentMessage, DeliveryError> {
        self.limiter.until_ready().await;
        let response = self
            .http
            .get(format!("{}/v1/messages/{message_id}", self.base_url()))
            .header(AUTHORIZATION, &self.config.api_key)
            .send()
            .await?;
        Self::read_data(response).await
    }

    async fn read_data(response: reqwest::Response) -> Result<SentMessage, DeliveryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::from_status(status.as_u16(), body));
        }
        let envelope: Envelope<SentMessage> = response.json().await?;
        envelope.data.ok_or(DeliveryError::MissingData)
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn with_retry<T, F, Fut>(
        &self,
        operation: &str,
        policy: Backoff,
        mut call: F,
    ) -> Result<T, DeliveryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DeliveryError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < policy.max_tries => {
                    let wait = policy.delay(attempt);
                    debug!(
                        operation,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        error!(operation, attempts = attempt, error = %e, "giving up");
                    }
                    return Err(e);
                }
            }
        }
    }
}
