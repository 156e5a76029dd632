//! # Reassignment Planner
//!
//! Groups items by the target a [`TargetResolver`] picks for each of them.
//! Items are resolved one at a time, in input order. An item the resolver
//! cannot place, or would hand back to its current assignee, is left out of
//! the plan and reported as unresolved.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::api::ApiResult;
use crate::models::{Assignable, TargetKey};

/// Strategy mapping an item to the entity that should receive it
///
/// `Ok(None)` means no target exists; `Err` means the lookup itself failed.
#[async_trait]
pub trait TargetResolver<T: Sync>: Send {
    async fn resolve(&mut self, item: &T) -> ApiResult<Option<TargetKey>>;
}

/// Target → items, iterated in the order targets were first seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentPlan<T> {
    groups: Vec<(TargetKey, Vec<T>)>,
    positions: HashMap<TargetKey, usize>,
}

impl<T> Default for ReassignmentPlan<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T> ReassignmentPlan<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` under `target`, creating the group on first sight
    pub fn add(&mut self, target: TargetKey, item: T) {
        match self.positions.get(&target) {
            Some(&position) => self.groups[position].1.push(item),
            None => {
                self.positions.insert(target.clone(), self.groups.len());
                self.groups.push((target, vec![item]));
            }
        }
    }

    pub fn get(&self, target: &TargetKey) -> Option<&[T]> {
        self.positions
            .get(target)
            .map(|&position| self.groups[position].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TargetKey, &[T])> {
        self.groups
            .iter()
            .map(|(target, items)| (target, items.as_slice()))
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetKey> {
        self.groups.iter().map(|(target, _)| target)
    }

    pub fn target_count(&self) -> usize {
        self.groups.len()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<(TargetKey, Vec<T>)> {
        self.groups
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The resolver found nobody to hand the item to
    NoTarget,
    /// The resolved target already holds the item
    SelfAssignment,
    LookupFailed(String),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTarget => f.write_str("no reassignment target found"),
            Self::SelfAssignment => f.write_str("target is already the current reviewer"),
            Self::LookupFailed(error) => write!(f, "target lookup failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedItem {
    pub item_id: String,
    pub name: String,
    pub reason: UnresolvedReason,
}

impl fmt::Display for UnresolvedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.item_id {
            write!(f, "{}: {}", self.item_id, self.reason)
        } else {
            write!(f, "{} ({}): {}", self.name, self.item_id, self.reason)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningResult<T> {
    pub plan: ReassignmentPlan<T>,
    pub unresolved: Vec<UnresolvedItem>,
}

impl<T> PlanningResult<T> {
    /// Planned plus unresolved; equals the number of input items
    pub fn total(&self) -> usize {
        self.plan.item_count() + self.unresolved.len()
    }
}

pub struct ReassignmentPlanner;

impl ReassignmentPlanner {
    /// Resolve every item and partition into plan and unresolved
    ///
    /// Resolution failures never abort planning.
    pub async fn plan<T, R>(items: Vec<T>, resolver: &mut R) -> PlanningResult<T>
    where
        T: Assignable + Sync,
        R: TargetResolver<T> + ?Sized,
    {
        let mut plan = ReassignmentPlan::new();
        let mut unresolved = Vec::new();

        for item in items {
            let reason = match resolver.resolve(&item).await {
                Ok(Some(target)) if item.current_assignee() == Some(&target) => {
                    UnresolvedReason::SelfAssignment
                }
                Ok(Some(target)) => {
                    debug!(item_id = %item.item_id(), target = %target, "🎯 Item planned");
                    plan.add(target, item);
                    continue;
                }
                Ok(None) => UnresolvedReason::NoTarget,
                Err(error) => UnresolvedReason::LookupFailed(error.to_string()),
            };

            warn!(item_id = %item.item_id(), reason = %reason, "⚠️ Item left unresolved");
            unresolved.push(UnresolvedItem {
                item_id: item.item_id().to_string(),
                name: item.display_name().to_string(),
                reason,
            });
        }

        debug!(
            targets = plan.target_count(),
            planned = plan.item_count(),
            unresolved = unresolved.len(),
            "📋 Reassignment plan built"
        );
        PlanningResult { plan, unresolved }
    }
}
