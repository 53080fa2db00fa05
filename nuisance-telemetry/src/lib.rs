//! # Nuisance Telemetry
//!
//! Crate for logging and submission metrics.

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsRecorder, NotificationLabel, SubmissionLabel};
