//! Custom validation functions for configuration.

use validator::{ValidateEmail, ValidationError};

/// Validate that a relay host name is non-empty and made of host-name characters.
pub fn validate_host(host: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9\-\.]*[A-Za-z0-9])?$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;

    if host.len() <= 253 && re.is_match(host) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_host"))
    }
}

/// Validate an address that may be left empty to mean "not configured".
pub fn validate_optional_email(address: &str) -> Result<(), ValidationError> {
    let address = address.trim();
    if address.is_empty() || address.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Validate that a filesystem path setting is not blank.
pub fn validate_path(path: &std::path::Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        Err(ValidationError::new("empty_path"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts() {
        assert!(validate_host("smtp.gmail.com").is_ok());
        assert!(validate_host("localhost").is_ok());
        assert!(validate_host("").is_err());
        assert!(validate_host("smtp gmail.com").is_err());
        assert!(validate_host(".smtp.example.com").is_err());
    }

    #[test]
    fn optional_email() {
        assert!(validate_optional_email("").is_ok());
        assert!(validate_optional_email("   ").is_ok());
        assert!(validate_optional_email("security@cherrywood.example").is_ok());
        assert!(validate_optional_email("not-an-address").is_err());
    }
}
