//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found error.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration validation error.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Figment parsing error.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),

    /// I/O error.
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (section, nested) in errors.errors() {
        match nested {
            validator::ValidationErrorsKind::Struct(inner) => {
                for (field, field_errors) in inner.field_errors() {
                    write_field(&mut output, &format!("{section}.{field}"), field_errors);
                }
            }
            validator::ValidationErrorsKind::Field(field_errors) => {
                write_field(&mut output, section, field_errors);
            }
            validator::ValidationErrorsKind::List(_) => {
                let _ = writeln!(output, "Field '{}': invalid entries", section);
            }
        }
    }
    output
}

fn write_field(output: &mut String, field: &str, errors: &[validator::ValidationError]) {
    use std::fmt::Write;

    let _ = writeln!(output, "Field '{}':", field);
    for error in errors {
        let message = match &error.message {
            Some(msg) => msg.to_string(),
            None => error.code.to_string(),
        };
        let _ = writeln!(output, "  - {}", message);
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
