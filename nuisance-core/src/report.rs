//! Report data model.
//!
//! A [`NewReport`] is validated input waiting for the store; a [`Report`] is
//! what the store hands back once it has stamped and persisted it.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Second-precision timestamp layout used on disk and in alerts.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names of the persisted store, in order.
pub const CSV_HEADER: [&str; 5] = ["Timestamp", "Issue Type", "Description", "Location", "Status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueType {
    CarAlarm,
    NoiseComplaint,
    Other,
}

impl IssueType {
    /// Human label, also the persisted form.
    pub fn label(self) -> &'static str {
        match self {
            IssueType::CarAlarm => "Car Alarm",
            IssueType::NoiseComplaint => "Noise Complaint",
            IssueType::Other => "Other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts `CarAlarm`, `Car Alarm`, `car_alarm`, `car-alarm` and so on.
impl FromStr for IssueType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "caralarm" => Ok(IssueType::CarAlarm),
            "noisecomplaint" => Ok(IssueType::NoiseComplaint),
            "other" => Ok(IssueType::Other),
            _ => Err(ValidationError::UnknownIssueType(s.to_string())),
        }
    }
}

impl Serialize for IssueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for IssueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Lifecycle tag. The core only ever writes `Pending`; other tags written by
/// external tooling are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    Pending,
    Other(String),
}

impl From<String> for ReportStatus {
    fn from(raw: String) -> Self {
        if raw == "Pending" {
            ReportStatus::Pending
        } else {
            ReportStatus::Other(raw)
        }
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        match status {
            ReportStatus::Pending => "Pending".to_string(),
            ReportStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Pending => f.write_str("Pending"),
            ReportStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Validated submission, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    issue_type: IssueType,
    description: String,
    location: String,
}

impl NewReport {
    /// Trims both text fields and rejects them if nothing is left.
    pub fn new(
        issue_type: IssueType,
        description: &str,
        location: &str,
    ) -> Result<Self, ValidationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let location = location.trim();
        if location.is_empty() {
            return Err(ValidationError::EmptyLocation);
        }
        Ok(Self {
            issue_type,
            description: description.to_string(),
            location: location.to_string(),
        })
    }

    /// Validates raw caller strings, issue type first.
    pub fn parse(issue_type: &str, description: &str, location: &str) -> Result<Self, ValidationError> {
        Self::new(issue_type.parse()?, description, location)
    }

    pub fn issue_type(&self) -> IssueType {
        self.issue_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// One persisted nuisance complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "Timestamp", with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Issue Type")]
    pub issue_type: IssueType,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Status")]
    pub status: ReportStatus,
}

impl Report {
    /// Materialises a submission as a `Pending` report created at `timestamp`.
    pub fn stamp(new: NewReport, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            issue_type: new.issue_type,
            description: new.description,
            location: new.location,
            status: ReportStatus::Pending,
        }
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Current local wall-clock time at second precision.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}
