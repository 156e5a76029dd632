mod common;

use async_trait::async_trait;
use common::strategies::*;
use proptest::prelude::*;
use tokio_test::block_on;

use bulkops_core::api::ApiResult;
use bulkops_core::context::TokenContext;
use bulkops_core::models::{ItemReference, TargetKey};
use bulkops_core::orchestration::{
    split, RateLimitedExecutor, ReassignmentPlanner, TargetResolver, UnresolvedReason,
};

/// Resolver answering from a script indexed by item position
struct ScriptedResolver {
    answers: Vec<Option<String>>,
}

#[async_trait]
impl TargetResolver<ItemReference> for ScriptedResolver {
    async fn resolve(&mut self, item: &ItemReference) -> ApiResult<Option<TargetKey>> {
        let position: usize = item.id.parse().unwrap_or_default();
        Ok(self.answers[position].clone().map(TargetKey::from))
    }
}

proptest! {
    /// Property: batches reconstruct the input in order and respect the limit
    #[test]
    fn batches_reconstruct_input(count in item_count_strategy(), limit in batch_limit_strategy()) {
        let items: Vec<usize> = (0..count).collect();
        let batches = split(items.clone(), limit).unwrap();

        let rebuilt: Vec<usize> = batches.iter().flat_map(|b| b.items.clone()).collect();
        prop_assert_eq!(rebuilt, items);
        prop_assert_eq!(batches.len(), count.div_ceil(limit));

        for (position, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.index, position + 1);
            prop_assert_eq!(batch.count, batches.len());
            prop_assert!(!batch.is_empty() && batch.len() <= limit);
            if !batch.is_last() {
                prop_assert_eq!(batch.len(), limit);
            }
        }
    }

    /// Property: without cancellation every item is either a success or an error
    #[test]
    fn executor_accounts_for_every_item(outcomes in batch_outcomes_strategy(), limit in 1usize..7) {
        let total = outcomes.len() * limit;
        let batches = split(vec![(); total], limit).unwrap();
        let ctx = TokenContext::new();
        let executor = RateLimitedExecutor::new("prop", &ctx);

        let report = block_on(executor.run(batches, |batch| {
            let ok = outcomes[batch.index - 1];
            async move { if ok { Ok(()) } else { Err("rejected") } }
        }));

        let failed_batches = outcomes.iter().filter(|ok| !**ok).count();
        prop_assert_eq!(report.success_count + report.error_count, total);
        prop_assert_eq!(report.error_count, failed_batches * limit);
        prop_assert_eq!(report.error_messages.len(), failed_batches);
        prop_assert!(!report.cancelled);
    }

    /// Property: planned and unresolved items partition the input, and no item
    /// is planned back to its own reviewer
    #[test]
    fn planner_partitions_items(answers in resolution_strategy()) {
        let items: Vec<ItemReference> = (0..answers.len())
            .map(|i| ItemReference::new(i.to_string()).with_assignee("reviewer"))
            .collect();
        let mut resolver = ScriptedResolver { answers: answers.clone() };

        let result = block_on(ReassignmentPlanner::plan(items, &mut resolver));

        prop_assert_eq!(result.total(), answers.len());
        let reviewer = TargetKey::from("reviewer");
        prop_assert!(result.plan.get(&reviewer).is_none());

        let self_assigned = answers.iter().filter(|a| a.as_deref() == Some("reviewer")).count();
        let no_target = answers.iter().filter(|a| a.is_none()).count();
        prop_assert_eq!(
            result.unresolved.iter().filter(|u| u.reason == UnresolvedReason::SelfAssignment).count(),
            self_assigned
        );
        prop_assert_eq!(
            result.unresolved.iter().filter(|u| u.reason == UnresolvedReason::NoTarget).count(),
            no_target
        );

        for (target, group) in result.plan.iter() {
            let mut previous: Option<usize> = None;
            for item in group {
                let position: usize = item.id.parse().unwrap();
                prop_assert_eq!(answers[position].as_deref(), Some(target.as_str()));
                prop_assert!(previous.map_or(true, |p| p < position));
                previous = Some(position);
            }
        }
    }
}
