use serde_json::json;

use bulkops_core::models::{
    Campaign, CampaignStatus, Certification, ItemReference, Reviewer, ReviewItem,
};

pub fn campaign(id: &str, status: CampaignStatus) -> Campaign {
    Campaign {
        id: id.to_string(),
        name: format!("Campaign {id}"),
        status,
    }
}

pub fn certification(id: &str, reviewer_id: &str) -> Certification {
    Certification {
        id: id.to_string(),
        name: format!("Certification {id}"),
        completed: false,
        decisions_made: 0,
        decisions_total: 0,
        reviewer: Reviewer {
            id: reviewer_id.to_string(),
            name: Some(format!("Reviewer {reviewer_id}")),
            email: None,
        },
    }
}

/// Entitlement review item; `owner` is the denormalized entitlement owner
pub fn entitlement_item(id: &str, source_id: &str, owner: Option<&str>) -> ReviewItem {
    serde_json::from_value(json!({
        "id": id,
        "completed": false,
        "identitySummary": { "identityId": format!("identity-{id}"), "name": format!("Identity {id}") },
        "accessSummary": {
            "access": { "type": "ENTITLEMENT", "id": format!("ent-{id}"), "name": format!("Entitlement {id}") },
            "entitlement": {
                "sourceId": source_id,
                "owner": owner.map(|o| json!({ "id": o, "name": null }))
            }
        }
    }))
    .expect("valid review item")
}

pub fn role_item(id: &str, role_id: &str, owner: &str) -> ReviewItem {
    serde_json::from_value(json!({
        "id": id,
        "completed": false,
        "identitySummary": { "identityId": format!("identity-{id}"), "name": null },
        "accessSummary": {
            "access": { "type": "ROLE", "id": role_id, "name": format!("Role {role_id}") },
            "role": { "owner": { "id": owner, "name": null } }
        }
    }))
    .expect("valid review item")
}

/// `count` entitlement items sharing one owner
pub fn owned_items(prefix: &str, count: usize, owner: &str) -> Vec<ReviewItem> {
    (0..count)
        .map(|i| entitlement_item(&format!("{prefix}-{i}"), "src-1", Some(owner)))
        .collect()
}

pub fn references(count: usize) -> Vec<ItemReference> {
    (0..count)
        .map(|i| ItemReference::new(format!("item-{i}")))
        .collect()
}
