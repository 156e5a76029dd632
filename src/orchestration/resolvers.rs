//! # Target Resolvers
//!
//! The three reassignment strategies:
//!
//! - [`ManagerResolver`]: escalate a certification to its reviewer's manager
//! - [`OwnerResolver`]: send a review item to the owner of the access it grants
//! - [`CustomRuleResolver`]: apply operator-supplied rules in order

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cache::LookupCache;
use super::planner::TargetResolver;
use crate::api::{ApiResult, DirectoryApi};
use crate::models::{AccessKind, ItemReference, TargetKey};

/// Resolves an item's current reviewer to that reviewer's manager
pub struct ManagerResolver<'a, D: DirectoryApi + ?Sized> {
    directory: &'a D,
    managers: LookupCache<String, Option<String>>,
}

impl<'a, D: DirectoryApi + ?Sized> ManagerResolver<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        let mut managers = LookupCache::new("managers");
        managers.init();
        Self {
            directory,
            managers,
        }
    }

    /// Drop cached lookups at the end of a run
    pub fn flush(&mut self) -> usize {
        self.managers.flush()
    }
}

#[async_trait]
impl<'a, D: DirectoryApi + ?Sized> TargetResolver<ItemReference> for ManagerResolver<'a, D> {
    async fn resolve(&mut self, item: &ItemReference) -> ApiResult<Option<TargetKey>> {
        let Some(reviewer) = &item.assignee else {
            return Ok(None);
        };
        let reviewer_id = reviewer.as_str().to_string();

        if let Some(cached) = self.managers.get(&reviewer_id) {
            return Ok(cached.as_deref().map(TargetKey::from));
        }

        let manager = self.directory.get_manager_id(&reviewer_id).await?;
        debug!(reviewer_id = %reviewer_id, manager = ?manager, "👤 Manager looked up");
        let target = manager.as_deref().map(TargetKey::from);
        self.managers.insert(reviewer_id, manager);
        Ok(target)
    }
}

/// Resolves a review item to the owner of its access
///
/// The owner denormalized onto the item wins. Without one, the owner of the
/// item's source is looked up once per source and cached for the run.
pub struct OwnerResolver<'a, D: DirectoryApi + ?Sized> {
    directory: &'a D,
    source_owners: LookupCache<String, Option<String>>,
}

impl<'a, D: DirectoryApi + ?Sized> OwnerResolver<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        let mut source_owners = LookupCache::new("source_owners");
        source_owners.init();
        Self {
            directory,
            source_owners,
        }
    }

    pub fn flush(&mut self) -> usize {
        self.source_owners.flush()
    }

    async fn source_owner(&mut self, source_id: &str) -> ApiResult<Option<String>> {
        let key = source_id.to_string();
        if let Some(cached) = self.source_owners.get(&key) {
            return Ok(cached.clone());
        }

        let owner = self.directory.get_source_owner_id(source_id).await?;
        debug!(source_id = %source_id, owner = ?owner, "🏷️ Source owner looked up");
        self.source_owners.insert(key, owner.clone());
        Ok(owner)
    }
}

#[async_trait]
impl<'a, D: DirectoryApi + ?Sized> TargetResolver<ItemReference> for OwnerResolver<'a, D> {
    async fn resolve(&mut self, item: &ItemReference) -> ApiResult<Option<TargetKey>> {
        let Some(access) = &item.access else {
            return Ok(None);
        };
        if let Some(owner_id) = &access.owner_id {
            return Ok(Some(TargetKey::from(owner_id.as_str())));
        }
        match &access.source_id {
            Some(source_id) => Ok(self
                .source_owner(source_id)
                .await?
                .map(TargetKey::from)),
            None => Ok(None),
        }
    }
}

/// What a custom rule matches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleScope {
    /// Every item, regardless of type
    AllItems,
    /// The identity under review
    Identity,
    Entitlement,
    AccessProfile,
    Role,
}

impl RuleScope {
    fn access_kind(self) -> Option<AccessKind> {
        match self {
            Self::Entitlement => Some(AccessKind::Entitlement),
            Self::AccessProfile => Some(AccessKind::AccessProfile),
            Self::Role => Some(AccessKind::Role),
            Self::AllItems | Self::Identity => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentRule {
    pub scope: RuleScope,
    /// Allow-list of identity or access ids; empty matches any id
    #[serde(default)]
    pub ids: Vec<String>,
    pub reviewer: TargetKey,
}

impl ReassignmentRule {
    pub fn new(scope: RuleScope, reviewer: impl Into<TargetKey>) -> Self {
        Self {
            scope,
            ids: Vec::new(),
            reviewer: reviewer.into(),
        }
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    fn allows(&self, id: &str) -> bool {
        self.ids.is_empty() || self.ids.iter().any(|allowed| allowed == id)
    }

    /// `None` when the rule's type does not apply to the item; otherwise
    /// whether the allow-list accepts it
    fn applies(&self, item: &ItemReference) -> Option<bool> {
        match self.scope {
            RuleScope::AllItems => Some(true),
            RuleScope::Identity => item.identity_id.as_deref().map(|id| self.allows(id)),
            scope => {
                let access = item.access.as_ref()?;
                (scope.access_kind() == Some(access.kind)).then(|| self.allows(&access.id))
            }
        }
    }
}

/// Applies rules in order; the first rule whose type applies to the item
/// decides it
///
/// NOTE: a typed rule whose allow-list rejects the item still ends the
/// search, so later rules (wildcards included) are never consulted for it.
pub struct CustomRuleResolver {
    rules: Vec<ReassignmentRule>,
}

impl CustomRuleResolver {
    pub fn new(rules: Vec<ReassignmentRule>) -> Self {
        Self { rules }
    }

    pub fn select(&self, item: &ItemReference) -> Option<TargetKey> {
        self.rules
            .iter()
            .find_map(|rule| rule.applies(item).map(|allowed| (rule, allowed)))
            .and_then(|(rule, allowed)| allowed.then(|| rule.reviewer.clone()))
    }
}

#[async_trait]
impl TargetResolver<ItemReference> for CustomRuleResolver {
    async fn resolve(&mut self, item: &ItemReference) -> ApiResult<Option<TargetKey>> {
        Ok(self.select(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccessRef;

    fn role_item(role_id: &str) -> ItemReference {
        ItemReference::new(format!("item-{role_id}"))
            .with_access(AccessRef::new(AccessKind::Role, role_id))
    }

    fn entitlement_item(id: &str) -> ItemReference {
        ItemReference::new(format!("item-{id}"))
            .with_access(AccessRef::new(AccessKind::Entitlement, id))
    }

    #[test]
    fn test_wildcard_in_middle_shadows_later_rules() {
        let resolver = CustomRuleResolver::new(vec![
            ReassignmentRule::new(RuleScope::Role, "role-admin").with_ids(["r1"]),
            ReassignmentRule::new(RuleScope::AllItems, "catch-all"),
            ReassignmentRule::new(RuleScope::Entitlement, "ent-owner"),
        ]);

        assert_eq!(
            resolver.select(&role_item("r1")),
            Some(TargetKey::from("role-admin"))
        );
        assert_eq!(
            resolver.select(&entitlement_item("e1")),
            Some(TargetKey::from("catch-all"))
        );
    }

    #[test]
    fn test_first_type_match_decides_even_when_rejected() {
        let resolver = CustomRuleResolver::new(vec![
            ReassignmentRule::new(RuleScope::Role, "role-admin").with_ids(["r1"]),
            ReassignmentRule::new(RuleScope::AllItems, "catch-all"),
        ]);

        assert_eq!(resolver.select(&role_item("r2")), None);
    }

    #[test]
    fn test_identity_rule() {
        let resolver = CustomRuleResolver::new(vec![ReassignmentRule::new(
            RuleScope::Identity,
            "hr-lead",
        )
        .with_ids(["id-7"])]);

        let item = entitlement_item("e1").with_identity("id-7");
        assert_eq!(resolver.select(&item), Some(TargetKey::from("hr-lead")));
        assert_eq!(resolver.select(&entitlement_item("e2")), None);
    }

    #[test]
    fn test_rule_wire_shape() {
        let rule: ReassignmentRule = serde_json::from_str(
            r#"{ "scope": "ACCESS_PROFILE", "ids": ["ap-1"], "reviewer": "owner-9" }"#,
        )
        .unwrap();
        assert_eq!(rule.scope, RuleScope::AccessProfile);
        assert_eq!(rule.reviewer, TargetKey::from("owner-9"));
    }
}
