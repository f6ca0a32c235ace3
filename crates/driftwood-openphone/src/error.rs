use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// HTTP 402. No further texts can go out until credits are topped up.
    #[error("the organization does not have enough prepaid credits to send the message")]
    NotEnoughCredits,

    #[error("request rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("messaging API returned HTTP {status}")]
    Http { status: u16 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging API response had no data")]
    MissingData,
}

/// Statuses that fail at once: the request itself is wrong.
const NON_RETRYABLE_STATUSES: [u16; 5] = [400, 401, 403, 404, 422];

impl DeliveryError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 402 {
            Self::NotEnoughCredits
        } else if NON_RETRYABLE_STATUSES.contains(&status) {
            Self::Rejected { status, body }
        } else {
            Self::Http { status }
        }
    }

    /// Connection failures, rate limiting and server errors are worth
    /// another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Transport(e) => !e.is_decode() && !e.is_builder(),
            _ => false,
        }
    }

    /// Whether the whole batch must stop, not just this message.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, Self::NotEnoughCredits)
    }
}
