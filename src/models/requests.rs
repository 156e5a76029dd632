//! Typed request records, one per bulk API operation.
//!
//! Each record carries exactly one batch; the coordinator builds one per
//! batch handed out by the executor.

use serde::{Deserialize, Serialize};

use super::certification::Decision;
use super::item::TargetKey;

/// Uniform decision over a batch of review items in one certification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub certification_id: String,
    pub item_ids: Vec<String>,
    pub decision: Decision,
    pub comment: String,
}

/// Move a batch of review items inside one certification to a new reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReassignRequest {
    pub certification_id: String,
    pub item_ids: Vec<String>,
    pub reassign_to: TargetKey,
    pub reason: String,
}

/// Move a batch of whole certifications of a campaign to a new reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationReassignRequest {
    pub campaign_id: String,
    pub certification_ids: Vec<String>,
    pub reassign_to: TargetKey,
    pub reason: String,
}

/// Notify the reviewers of a batch of certifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRequest {
    pub campaign_id: String,
    pub certification_ids: Vec<String>,
}
