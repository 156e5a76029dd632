//! Records exchanged with asynchronous server-side jobs: configuration
//! export/import and account aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::jobs::JobState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobKind {
    Export,
    Import,
    Aggregation,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export => f.write_str("export"),
            Self::Import => f.write_str("import"),
            Self::Aggregation => f.write_str("aggregation"),
        }
    }
}

/// Opaque server job id plus its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub kind: JobKind,
}

impl JobHandle {
    pub fn new(id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} job {}", self.kind, self.id)
    }
}

/// Status of an export or import job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigJobStatus {
    pub job_id: String,
    pub status: JobState,
    /// Server-provided detail, surfaced verbatim when the job fails
    pub message: Option<String>,
    pub description: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub completed: Option<DateTime<Utc>>,
}

/// Per-type narrowing of an export or import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub description: Option<String>,
    /// Object types to export, e.g. `SOURCE`, `ROLE`, `TRANSFORM`
    pub include_types: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub object_options: BTreeMap<String, ObjectFilter>,
}

impl ExportOptions {
    pub fn new(include_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            include_types: include_types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_filter(mut self, object_type: impl Into<String>, filter: ObjectFilter) -> Self {
        self.object_options.insert(object_type.into(), filter);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_types: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub object_options: BTreeMap<String, ObjectFilter>,
    #[serde(default)]
    pub exclude_backup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigObject {
    pub version: Option<i64>,
    #[serde(rename = "self")]
    pub self_ref: ObjectRef,
    pub object: serde_json::Value,
}

/// Downloaded export; also the payload submitted to an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub version: Option<i64>,
    pub timestamp: Option<String>,
    pub tenant: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub objects: Vec<ConfigObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMessage {
    pub key: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTypeResult {
    #[serde(default)]
    pub infos: Vec<ImportMessage>,
    #[serde(default)]
    pub warnings: Vec<ImportMessage>,
    #[serde(default)]
    pub errors: Vec<ImportMessage>,
    #[serde(default)]
    pub imported_objects: Vec<ObjectRef>,
}

/// Downloaded import result, keyed by object type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub results: BTreeMap<String, ImportTypeResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Success,
    Warning,
    Error,
    Terminated,
    TempError,
}

impl CompletionStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error | Self::Terminated | Self::TempError)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub locale: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMessage {
    #[serde(rename = "type")]
    pub level: Option<String>,
    pub key: Option<String>,
    pub localized_text: Option<LocalizedText>,
}

impl TaskMessage {
    pub fn text(&self) -> &str {
        self.localized_text
            .as_ref()
            .map(|t| t.message.as_str())
            .or(self.key.as_deref())
            .unwrap_or("")
    }
}

/// Status of a background task such as an account aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub id: String,
    pub unique_name: Option<String>,
    pub completed: Option<DateTime<Utc>>,
    pub completion_status: Option<CompletionStatus>,
    #[serde(default)]
    pub messages: Vec<TaskMessage>,
}

impl TaskStatus {
    pub fn is_pending(&self) -> bool {
        self.completed.is_none() && self.completion_status.is_none()
    }
}
