//! Record store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Location of the CSV record store.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path to the reports file. A sibling `<path>.lock` file is used for locking.
    #[validate(custom(function = validation::validate_path))]
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("reports.csv")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
