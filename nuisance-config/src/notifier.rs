//! Outbound alert configuration.
//!
//! The three delivery values (sender, credential, recipient) default to empty.
//! Empty means "alerts not configured", which is a valid state.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// SMTP relay and addressing for security alerts.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Relay host name.
    #[validate(custom(function = validation::validate_host))]
    #[serde(default = "default_server")]
    pub smtp_server: String,

    /// Relay submission port (STARTTLS).
    #[validate(range(min = 1, max = 65535))]
    #[serde(default = "default_port")]
    pub smtp_port: u16,

    /// Sender identity, also used as the login name.
    #[validate(custom(function = validation::validate_optional_email))]
    #[serde(default)]
    pub sender_email: String,

    /// Sender credential.
    #[serde(default)]
    pub sender_password: String,

    /// Recipient of every alert.
    #[validate(custom(function = validation::validate_optional_email))]
    #[serde(default)]
    pub security_email: String,

    /// Property named in the alert body.
    #[validate(length(min = 1))]
    #[serde(default = "default_property_name")]
    pub property_name: String,
}

fn default_server() -> String {
    "smtp.gmail.com".into()
}

fn default_port() -> u16 {
    587
}

fn default_property_name() -> String {
    "Cherrywood Apartments".into()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            smtp_server: default_server(),
            smtp_port: default_port(),
            sender_email: String::new(),
            sender_password: String::new(),
            security_email: String::new(),
            property_name: default_property_name(),
        }
    }
}

impl NotifierConfig {
    /// Names of the delivery values that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("sender_email", &self.sender_email),
            ("sender_password", &self.sender_password),
            ("security_email", &self.security_email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether all three delivery values are present.
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn valid_default_notifier_config() {
        let config = NotifierConfig::default();
        config.validate().expect("Default config should be valid");
        assert!(!config.is_configured());
        assert_eq!(
            config.missing_fields(),
            vec!["sender_email", "sender_password", "security_email"]
        );
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = NotifierConfig {
            sender_email: "alerts@cherrywood.example".into(),
            sender_password: "   ".into(),
            security_email: "security@cherrywood.example".into(),
            ..NotifierConfig::default()
        };
        assert_eq!(config.missing_fields(), vec!["sender_password"]);
    }

    #[test]
    fn invalid_port_and_address() {
        let mut config = NotifierConfig::default();
        config.smtp_port = 0;
        assert!(config.validate().is_err());

        let mut config = NotifierConfig::default();
        config.security_email = "security".into();
        assert!(config.validate().is_err());
    }
}
