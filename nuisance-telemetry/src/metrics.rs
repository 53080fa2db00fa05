//! Prometheus counters for report submissions and alert delivery.
//!
//! Each recorder owns its registry, so several recorders (one per test, for
//! instance) never collide on metric names.

use prometheus::{IntCounterVec, Opts, Registry};

/// Outcome label for `nuisance_submissions_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionLabel {
    Submitted,
    ValidationFailed,
    PersistenceFailed,
}

impl SubmissionLabel {
    fn as_str(self) -> &'static str {
        match self {
            SubmissionLabel::Submitted => "submitted",
            SubmissionLabel::ValidationFailed => "validation_failed",
            SubmissionLabel::PersistenceFailed => "persistence_failed",
        }
    }
}

/// Outcome label for `nuisance_notifications_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLabel {
    Delivered,
    NotConfigured,
    TransportFailed,
}

impl NotificationLabel {
    fn as_str(self) -> &'static str {
        match self {
            NotificationLabel::Delivered => "delivered",
            NotificationLabel::NotConfigured => "not_configured",
            NotificationLabel::TransportFailed => "transport_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    submissions: IntCounterVec,
    notifications: IntCounterVec,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let submissions = IntCounterVec::new(
            Opts::new("nuisance_submissions_total", "Report submissions by outcome"),
            &["outcome"],
        )
        .expect("static metric definition");
        let notifications = IntCounterVec::new(
            Opts::new("nuisance_notifications_total", "Alert deliveries by outcome"),
            &["outcome"],
        )
        .expect("static metric definition");

        registry
            .register(Box::new(submissions.clone()))
            .expect("fresh registry");
        registry
            .register(Box::new(notifications.clone()))
            .expect("fresh registry");

        Self {
            registry,
            submissions,
            notifications,
        }
    }

    pub fn record_submission(&self, label: SubmissionLabel) {
        self.submissions.with_label_values(&[label.as_str()]).inc();
    }

    pub fn record_notification(&self, label: NotificationLabel) {
        self.notifications.with_label_values(&[label.as_str()]).inc();
    }

    pub fn submissions(&self, label: SubmissionLabel) -> u64 {
        self.submissions.with_label_values(&[label.as_str()]).get()
    }

    pub fn notifications(&self, label: NotificationLabel) -> u64 {
        self.notifications.with_label_values(&[label.as_str()]).get()
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_rendered() {
        let metrics = MetricsRecorder::new();
        metrics.record_submission(SubmissionLabel::Submitted);
        metrics.record_submission(SubmissionLabel::Submitted);
        metrics.record_notification(NotificationLabel::NotConfigured);

        assert_eq!(metrics.submissions(SubmissionLabel::Submitted), 2);
        assert_eq!(metrics.notifications(NotificationLabel::Delivered), 0);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("nuisance_submissions_total{outcome=\"submitted\"} 2"));
        assert!(text.contains("nuisance_notifications_total{outcome=\"not_configured\"} 1"));
    }

    #[test]
    fn recorders_do_not_share_state() {
        let a = MetricsRecorder::new();
        let b = MetricsRecorder::new();
        a.record_submission(SubmissionLabel::ValidationFailed);
        assert_eq!(b.submissions(SubmissionLabel::ValidationFailed), 0);
    }
}
