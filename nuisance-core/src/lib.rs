//! # nuisance-core
//!
//! Report submission pipeline for tenant nuisance reports: validation,
//! durable append-only storage and best-effort security alerts.
//!
//! ### Key Submodules:
//! - `report`: the `Report` model and input validation
//! - `store`: `RecordStore` trait with CSV and in-memory implementations
//! - `notifier`: `Notifier` trait with the SMTP implementation
//! - `submission`: `ReportService`, the single entry point for callers

pub mod error;
pub mod notifier;
pub mod report;
pub mod store;
pub mod submission;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::notifier::*;
    pub use crate::report::*;
    pub use crate::store::*;
    pub use crate::submission::*;
}

pub use error::{StoreError, ValidationError};
pub use submission::{ReportService, SubmissionOutcome};
