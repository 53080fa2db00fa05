//! Notifier
//!
//! Best-effort security alerts for newly stored reports. Nothing here ever
//! returns an error to the caller: every failure becomes
//! [`NotificationOutcome::NotDelivered`] with a reason fit for logs and UI.

use std::fmt;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use nuisance_config::NotifierConfig;
use tracing::{debug, info, warn};

use crate::error::DeliveryError;
use crate::report::Report;

const ATTRIBUTION: &str = "Powered by AI Transform";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotDeliveredReason {
    /// Sender, credential or recipient is blank; no connection was attempted.
    NotConfigured { missing: Vec<&'static str> },
    /// Composing or transmitting the message failed.
    Transport(String),
}

impl fmt::Display for NotDeliveredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotDeliveredReason::NotConfigured { missing } => {
                write!(f, "alert delivery not configured (missing {})", missing.join(", "))
            }
            NotDeliveredReason::Transport(msg) => write!(f, "alert delivery failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered,
    NotDelivered(NotDeliveredReason),
}

impl NotificationOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationOutcome::Delivered)
    }
}

pub trait Notifier {
    /// Attempts to deliver one alert for `report`. Blocks until done.
    fn notify(&self, report: &Report) -> NotificationOutcome;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, report: &Report) -> NotificationOutcome {
        (**self).notify(report)
    }
}

/// Used when alerts are switched off entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn notify(&self, _report: &Report) -> NotificationOutcome {
        NotificationOutcome::NotDelivered(NotDeliveredReason::NotConfigured {
            missing: vec!["sender_email", "sender_password", "security_email"],
        })
    }
}

/// Sends one e-mail per report through an authenticated STARTTLS relay.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: NotifierConfig,
}

impl SmtpNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self { config }
    }

    /// Builds the alert e-mail without sending it.
    pub fn compose(&self, report: &Report) -> Result<Message, DeliveryError> {
        let message = Message::builder()
            .from(self.config.sender_email.trim().parse()?)
            .to(self.config.security_email.trim().parse()?)
            .subject(alert_subject(report))
            .header(ContentType::TEXT_PLAIN)
            .body(alert_body(&self.config.property_name, report))?;
        Ok(message)
    }

    // Without connection pooling each send connects, upgrades, authenticates,
    // transmits and quits.
    fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        let credentials = Credentials::new(
            self.config.sender_email.trim().to_string(),
            self.config.sender_password.clone(),
        );
        let mailer = SmtpTransport::starttls_relay(self.config.smtp_server.trim())?
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build();
        mailer.send(message)?;
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, report: &Report) -> NotificationOutcome {
        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            debug!(?missing, "skipping security alert");
            return NotificationOutcome::NotDelivered(NotDeliveredReason::NotConfigured { missing });
        }

        match self.compose(report).and_then(|message| self.send(&message)) {
            Ok(()) => {
                info!(
                    relay = %self.config.smtp_server,
                    issue_type = %report.issue_type,
                    "security alert delivered"
                );
                NotificationOutcome::Delivered
            }
            Err(e) => {
                warn!(relay = %self.config.smtp_server, error = %e, "failed to send security alert");
                NotificationOutcome::NotDelivered(NotDeliveredReason::Transport(e.to_string()))
            }
        }
    }
}

pub fn alert_subject(report: &Report) -> String {
    format!("🚨 Nuisance Report: {}", report.issue_type)
}

pub fn alert_body(property_name: &str, report: &Report) -> String {
    format!(
        "A new nuisance report has been submitted at {property}.\n\
         \n\
         Issue Type: {issue}\n\
         Location: {location}\n\
         Time: {time}\n\
         \n\
         Description:\n\
         {description}\n\
         \n\
         Please address this issue promptly.\n\
         \n\
         ---\n\
         This alert was generated automatically by the {property} Nuisance Reporting System.\n\
         {attribution}\n",
        property = property_name,
        issue = report.issue_type,
        location = report.location,
        time = report.formatted_timestamp(),
        description = report.description,
        attribution = ATTRIBUTION,
    )
}
