//! Campaign, certification and review-item records.
//!
//! Field names follow the governance service's camelCase JSON so the HTTP
//! adapter can decode responses directly. The engine only ever works with the
//! [`ItemReference`] projections built here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::item::{AccessKind, AccessRef, ItemReference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Pending,
    Staged,
    Canceling,
    Activating,
    Active,
    Completing,
    Completed,
    Error,
    Archived,
}

impl CampaignStatus {
    /// No further decisions or reassignments are accepted
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completing | Self::Completed | Self::Archived)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Staged => "STAGED",
            Self::Canceling => "CANCELING",
            Self::Activating => "ACTIVATING",
            Self::Active => "ACTIVE",
            Self::Completing => "COMPLETING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Archived => "ARCHIVED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub decisions_made: u32,
    #[serde(default)]
    pub decisions_total: u32,
    pub reviewer: Reviewer,
}

impl Certification {
    /// Reference used when the certification itself is the unit of work,
    /// carrying its reviewer as display fields and assignee
    pub fn to_reference(&self) -> ItemReference {
        let mut reference = ItemReference::new(&self.id)
            .with_name(self.reviewer.name.as_deref().unwrap_or(&self.name))
            .with_assignee(self.reviewer.id.as_str());
        if let Some(email) = &self.reviewer.email {
            reference = reference.with_email(email);
        }
        reference
    }
}

/// Decision applied uniformly to a batch of review items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Revoke,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => f.write_str("APPROVE"),
            Self::Revoke => f.write_str("REVOKE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub identity_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDescriptor {
    #[serde(rename = "type")]
    pub kind: AccessKind,
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSummary {
    pub source_id: Option<String>,
    pub owner: Option<OwnerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedSummary {
    pub owner: Option<OwnerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessSummary {
    pub access: AccessDescriptor,
    pub entitlement: Option<EntitlementSummary>,
    pub access_profile: Option<OwnedSummary>,
    pub role: Option<OwnedSummary>,
}

impl AccessSummary {
    /// Owner denormalized onto whichever summary matches the access kind
    pub fn owner_id(&self) -> Option<&str> {
        let owner = match self.access.kind {
            AccessKind::Entitlement => self.entitlement.as_ref().and_then(|e| e.owner.as_ref()),
            AccessKind::AccessProfile => {
                self.access_profile.as_ref().and_then(|p| p.owner.as_ref())
            }
            AccessKind::Role => self.role.as_ref().and_then(|r| r.owner.as_ref()),
        };
        owner.map(|o| o.id.as_str())
    }

    pub fn source_id(&self) -> Option<&str> {
        self.entitlement
            .as_ref()
            .and_then(|e| e.source_id.as_deref())
    }
}

/// One access decision pending inside a certification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub id: String,
    #[serde(default)]
    pub completed: bool,
    pub identity_summary: IdentitySummary,
    pub access_summary: AccessSummary,
}

impl ReviewItem {
    /// Project into an item reference held by `reviewer_id`
    pub fn to_reference(&self, reviewer_id: &str) -> ItemReference {
        let summary = &self.access_summary;
        let mut access = AccessRef::new(summary.access.kind, &summary.access.id);
        if let Some(name) = &summary.access.name {
            access = access.with_name(name);
        }
        if let Some(source_id) = summary.source_id() {
            access = access.with_source(source_id);
        }
        if let Some(owner_id) = summary.owner_id() {
            access = access.with_owner(owner_id);
        }

        let display = match (&self.identity_summary.name, &summary.access.name) {
            (Some(identity), Some(access_name)) => format!("{identity}: {access_name}"),
            (Some(identity), None) => identity.clone(),
            (None, Some(access_name)) => access_name.clone(),
            (None, None) => self.id.clone(),
        };

        ItemReference::new(&self.id)
            .with_name(display)
            .with_assignee(reviewer_id)
            .with_identity(&self.identity_summary.identity_id)
            .with_access(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_campaign_terminal_states() {
        assert!(CampaignStatus::Completed.is_terminal());
        assert!(CampaignStatus::Completing.is_terminal());
        assert!(CampaignStatus::Archived.is_terminal());
        assert!(!CampaignStatus::Active.is_terminal());
        assert!(!CampaignStatus::Staged.is_terminal());
    }

    #[test]
    fn test_review_item_reference_projection() {
        let item: ReviewItem = serde_json::from_value(json!({
            "id": "ri-1",
            "completed": false,
            "identitySummary": { "identityId": "id-alice", "name": "Alice" },
            "accessSummary": {
                "access": { "type": "ENTITLEMENT", "id": "ent-1", "name": "Admins" },
                "entitlement": {
                    "sourceId": "src-ad",
                    "owner": { "id": "owner-1", "name": "Bob" }
                }
            }
        }))
        .unwrap();

        let reference = item.to_reference("rev-1");
        assert_eq!(reference.id, "ri-1");
        assert_eq!(reference.display_name(), "Alice: Admins");
        assert_eq!(reference.identity_id.as_deref(), Some("id-alice"));
        assert_eq!(reference.assignee.as_ref().map(|a| a.as_str()), Some("rev-1"));

        let access = reference.access.unwrap();
        assert_eq!(access.kind, AccessKind::Entitlement);
        assert_eq!(access.source_id.as_deref(), Some("src-ad"));
        assert_eq!(access.owner_id.as_deref(), Some("owner-1"));
    }

    #[test]
    fn test_role_owner_comes_from_role_summary() {
        let summary: AccessSummary = serde_json::from_value(json!({
            "access": { "type": "ROLE", "id": "role-1" },
            "role": { "owner": { "id": "role-owner" } },
            "entitlement": { "owner": { "id": "wrong-owner" } }
        }))
        .unwrap();

        assert_eq!(summary.owner_id(), Some("role-owner"));
        assert_eq!(summary.source_id(), None);
    }

    #[test]
    fn test_certification_reference_uses_reviewer() {
        let cert: Certification = serde_json::from_value(json!({
            "id": "cert-1",
            "name": "Manager review",
            "completed": false,
            "decisionsMade": 2,
            "decisionsTotal": 10,
            "reviewer": { "id": "rev-1", "name": "Carol", "email": "carol@example.com" }
        }))
        .unwrap();

        let reference = cert.to_reference();
        assert_eq!(reference.display_name(), "Carol");
        assert_eq!(reference.email.as_deref(), Some("carol@example.com"));
        assert_eq!(reference.assignee, Some("rev-1".into()));
    }
}
