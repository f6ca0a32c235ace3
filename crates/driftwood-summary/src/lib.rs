//! driftwood-summary
//!
//! The admin report produced after every reminder run: what completed, who
//! needs a phone call, which texts failed. Rendered to text and HTML with
//! Tera and delivered by SMTP.

pub mod error;
pub mod mail;
pub mod render;
pub mod summary;

pub use error::SummaryError;
pub use mail::{SmtpConfig, SmtpMailer, SummarySink, subject_for};
pub use render::{RenderedSummary, render_summary};
pub use summary::{AdminSummary, CallEntry, FailedMessage};
