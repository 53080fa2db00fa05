use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Rejected submission input. Nothing is persisted when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown issue type '{0}' (expected Car Alarm, Noise Complaint or Other)")]
    UnknownIssueType(String),

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("location must not be empty")]
    EmptyLocation,
}

/// Storage medium failure. CSV decoding problems arrive as `InvalidData`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to initialise report store {}: {source}", .path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report store {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read report store {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Anything that stops an alert from leaving: bad addresses, message assembly, SMTP.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
