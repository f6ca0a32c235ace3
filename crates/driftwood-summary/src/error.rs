use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("invalid email address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("no summary recipients configured")]
    NoRecipients,

    #[error("failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<tera::Error> for SummaryError {
    fn from(e: tera::Error) -> Self {
        SummaryError::TemplateRender(e.to_string())
    }
}
