use jiff::civil::Date;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SummaryError;
use crate::render::render_summary;
use crate::summary::AdminSummary;

/// Where the run summary goes.
pub trait SummarySink {
    fn deliver(&self, summary: &AdminSummary, run_date: Date) -> Result<(), SummaryError>;
}

/// Subject line for the summary of a run on `run_date`.
pub fn subject_for(run_date: Date) -> String {
    format!("Receive Run for {}", run_date.strftime("%a, %b %-d"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
    pub to: Vec<String>,
}

fn default_port() -> u16 {
    587
}

/// Sends the summary as a multipart plain/HTML email over STARTTLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, SummaryError> {
        if config.to.is_empty() {
            return Err(SummaryError::NoRecipients);
        }
        let from = parse_mailbox(&config.from)?;
        let to = config
            .to
            .iter()
            .map(|addr| parse_mailbox(addr))
            .collect::<Result<Vec<_>, _>>()?;

        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => SmtpTransport::starttls_relay(&config.host)?
                .port(config.port)
                .credentials(Credentials::new(user.clone(), pass.clone()))
                .build(),
            _ => SmtpTransport::builder_dangerous(&config.host)
                .port(config.port)
                .build(),
        };

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// Build the email without sending it.
    pub fn build_message(
        &self,
        summary: &AdminSummary,
        run_date: Date,
    ) -> Result<Message, SummaryError> {
        let rendered = render_summary(summary)?;
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject_for(run_date));
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        Ok(builder.multipart(MultiPart::alternative_plain_html(
            rendered.text,
            rendered.html,
        ))?)
    }
}

impl SummarySink for SmtpMailer {
    fn deliver(&self, summary: &AdminSummary, run_date: Date) -> Result<(), SummaryError> {
        if summary.is_empty() {
            debug!("summary is empty, not sending");
            return Ok(());
        }
        let message = self.build_message(summary, run_date)?;
        self.transport.send(&message)?;
        info!(recipients = self.to.len(), "sent run summary");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SummaryError> {
    address.parse().map_err(|e: lettre::address::AddressError| SummaryError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".into(),
            port: 2525,
            username: None,
            password: None,
            from: "Front Desk <desk@clinic.example>".into(),
            to: vec!["admin@clinic.example".into()],
        }
    }

    #[test]
    fn subject_uses_short_weekday_and_month() {
        assert_eq!(subject_for(date(2024, 3, 8)), "Receive Run for Fri, Mar 8");
    }

    #[test]
    fn bad_address_is_rejected() {
        let mut config = config();
        config.to = vec!["not an address".into()];
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(SummaryError::Address { .. })
        ));
    }

    #[test]
    fn missing_recipients_is_rejected() {
        let mut config = config();
        config.to.clear();
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(SummaryError::NoRecipients)
        ));
    }

    #[test]
    fn message_carries_both_bodies() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let mut summary = AdminSummary::default();
        summary.completed.push("Jo Smith".into());

        let message = mailer.build_message(&summary, date(2024, 3, 8)).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Receive Run for Fri, Mar 8"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("Jo Smith"));
    }

    #[test]
    fn empty_summary_is_not_sent() {
        // No SMTP server is listening; an attempted send would error.
        let mailer = SmtpMailer::new(&config()).unwrap();
        mailer
            .deliver(&AdminSummary::default(), date(2024, 3, 8))
            .unwrap();
    }
}
