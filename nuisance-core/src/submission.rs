//! Submission Orchestrator
//!
//! Validate, persist, then notify. A report that fails to persist aborts the
//! submission; an alert that fails to leave only degrades it.

use nuisance_telemetry::{MetricsRecorder, NotificationLabel, SubmissionLabel};
use tracing::{error, info, instrument, warn};

use crate::error::{StoreError, ValidationError};
use crate::notifier::{NotDeliveredReason, NotificationOutcome, Notifier};
use crate::report::{NewReport, Report};
use crate::store::RecordStore;

/// Exactly one of these is produced per submission.
#[derive(Debug)]
pub enum SubmissionOutcome {
    ValidationFailed(ValidationError),
    PersistenceFailed(StoreError),
    Submitted {
        report: Report,
        notification: NotificationOutcome,
    },
}

impl SubmissionOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted { .. })
    }
}

/// Entry point for the presentation layer.
pub struct ReportService<S, N> {
    store: S,
    notifier: N,
    metrics: MetricsRecorder,
}

impl<S: RecordStore, N: Notifier> ReportService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Prepares the store for use. Safe on every startup.
    pub fn initialize(&self) -> Result<(), StoreError> {
        self.store.initialize()
    }

    /// Full history for dashboards and exports, oldest first.
    pub fn history(&self) -> Result<Vec<Report>, StoreError> {
        self.store.read_all()
    }

    #[instrument(level = "info", name = "submit_report", skip(self, description, location))]
    pub fn submit_report(&self, issue_type: &str, description: &str, location: &str) -> SubmissionOutcome {
        let new = match NewReport::parse(issue_type, description, location) {
            Ok(new) => new,
            Err(e) => {
                warn!(reason = %e, "rejected report");
                self.metrics.record_submission(SubmissionLabel::ValidationFailed);
                return SubmissionOutcome::ValidationFailed(e);
            }
        };

        let report = match self.store.append(new) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "failed to persist report");
                self.metrics.record_submission(SubmissionLabel::PersistenceFailed);
                return SubmissionOutcome::PersistenceFailed(e);
            }
        };
        self.metrics.record_submission(SubmissionLabel::Submitted);
        info!(
            issue_type = %report.issue_type,
            timestamp = %report.formatted_timestamp(),
            "report stored"
        );

        let notification = self.notifier.notify(&report);
        self.metrics.record_notification(match &notification {
            NotificationOutcome::Delivered => NotificationLabel::Delivered,
            NotificationOutcome::NotDelivered(NotDeliveredReason::NotConfigured { .. }) => {
                NotificationLabel::NotConfigured
            }
            NotificationOutcome::NotDelivered(NotDeliveredReason::Transport(_)) => {
                NotificationLabel::TransportFailed
            }
        });

        SubmissionOutcome::Submitted {
            report,
            notification,
        }
    }
}
