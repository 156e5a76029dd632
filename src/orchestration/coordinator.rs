//! # Bulk Operation Coordinator
//!
//! One method per campaign use case. Each run has two phases:
//!
//! 1. **Setup**: read the campaign and everything pending in it. Nothing has
//!    been written yet, so failures here propagate as errors and an empty
//!    result ends the run with [`BulkOutcome::NothingToDo`].
//! 2. **Execution**: plan (for reassignments), split, and hand the batches to
//!    a [`RateLimitedExecutor`]. Batch failures and unresolved items land in
//!    the report instead of aborting the run.
//!
//! Cancellation is checked before every parent (certification or target)
//! and, through the executor, before every batch.

use tracing::{debug, info, warn};

use super::batcher::{split, Batch};
use super::executor::{ProgressCallback, RateLimitedExecutor};
use super::planner::{PlanningResult, ReassignmentPlanner, TargetResolver};
use super::resolvers::{CustomRuleResolver, ManagerResolver, OwnerResolver, ReassignmentRule};
use crate::api::{CertificationApi, DirectoryApi};
use crate::config::BatchingConfig;
use crate::context::OperationContext;
use crate::error::{BulkOpsError, BulkOpsResult};
use crate::logging::log_bulk_operation;
use crate::models::{
    BulkOperationReport, BulkOutcome, Certification, CertificationReassignRequest, Decision,
    DecisionRequest, ItemReassignRequest, ItemReference, NothingToDo, ReminderRequest, TargetKey,
};

/// Setup either yields work or explains why there is none
type Setup<T> = Result<T, NothingToDo>;

pub struct BulkOperationCoordinator<'a, A: CertificationApi + DirectoryApi + ?Sized> {
    api: &'a A,
    batching: BatchingConfig,
    ctx: &'a dyn OperationContext,
    on_progress: Option<ProgressCallback>,
}

impl<'a, A: CertificationApi + DirectoryApi + ?Sized> BulkOperationCoordinator<'a, A> {
    pub fn new(api: &'a A, batching: BatchingConfig, ctx: &'a dyn OperationContext) -> Self {
        Self {
            api,
            batching,
            ctx,
            on_progress: None,
        }
    }

    /// Receive a [`BatchProgress`](super::executor::BatchProgress) after
    /// every batch of every run
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    // =========================================================================
    // Direct family
    // =========================================================================

    /// Apply one decision to every pending review item of the campaign
    pub async fn decide_campaign(
        &self,
        campaign_id: &str,
        decision: Decision,
        comment: &str,
    ) -> BulkOpsResult<BulkOutcome> {
        if comment.trim().is_empty() {
            return Err(BulkOpsError::invalid_input(
                "a comment is required when deciding review items",
            ));
        }
        info!(campaign_id = %campaign_id, decision = %decision, "🚀 Starting bulk decision");

        let certifications = match self.pending_certifications(campaign_id).await? {
            Ok(certifications) => certifications,
            Err(idle) => return Ok(self.nothing_to_do(idle)),
        };
        let work = match self.pending_review_items(campaign_id, certifications).await? {
            Ok(work) => work,
            Err(idle) => return Ok(self.nothing_to_do(idle)),
        };
        let Some(work) = work else {
            return Ok(self.cancelled_during_setup("decide_campaign", campaign_id));
        };

        let work = work
            .into_iter()
            .map(|(certification, items)| {
                let ids: Vec<String> = items.into_iter().map(|item| item.id).collect();
                let batches = split(ids, self.batching.decision_limit)?;
                Ok::<_, BulkOpsError>((certification, batches))
            })
            .collect::<BulkOpsResult<Vec<_>>>()?;
        let run_batches: usize = work.iter().map(|(_, batches)| batches.len()).sum();

        let mut report = BulkOperationReport::new();
        for (certification, batches) in work {
            if self.stop_requested(&mut report) {
                break;
            }
            let label = format!("{decision} for {}", certification.name);

            let api = self.api;
            let certification_id = certification.id.as_str();
            let run = self
                .executor(label, run_batches)
                .run(batches, move |batch: Batch<String>| async move {
                    api.decide(&DecisionRequest {
                        certification_id: certification_id.to_string(),
                        item_ids: batch.items,
                        decision,
                        comment: comment.to_string(),
                    })
                    .await
                })
                .await;
            report.merge(run);
        }

        Ok(self.finish("decide_campaign", campaign_id, report))
    }

    /// Remind the reviewers of every pending certification
    pub async fn send_reminders(&self, campaign_id: &str) -> BulkOpsResult<BulkOutcome> {
        info!(campaign_id = %campaign_id, "🚀 Starting reminder run");

        let certifications = match self.pending_certifications(campaign_id).await? {
            Ok(certifications) => certifications,
            Err(idle) => return Ok(self.nothing_to_do(idle)),
        };

        let ids: Vec<String> = certifications.into_iter().map(|c| c.id).collect();
        let batches = split(ids, self.batching.reminder_limit)?;
        let run_batches = batches.len();

        let api = self.api;
        let report = self
            .executor("Reminders".to_string(), run_batches)
            .run(batches, move |batch: Batch<String>| async move {
                api.send_reminders(&ReminderRequest {
                    campaign_id: campaign_id.to_string(),
                    certification_ids: batch.items,
                })
                .await
            })
            .await;

        Ok(self.finish("send_reminders", campaign_id, report))
    }

    // =========================================================================
    // Reassignment family
    // =========================================================================

    /// Move every pending certification to its reviewer's manager
    pub async fn escalate_to_managers(
        &self,
        campaign_id: &str,
        reason: &str,
    ) -> BulkOpsResult<BulkOutcome> {
        require_reason(reason)?;
        info!(campaign_id = %campaign_id, "🚀 Starting escalation to managers");

        let certifications = match self.pending_certifications(campaign_id).await? {
            Ok(certifications) => certifications,
            Err(idle) => return Ok(self.nothing_to_do(idle)),
        };
        let references: Vec<ItemReference> =
            certifications.iter().map(Certification::to_reference).collect();

        let mut resolver = ManagerResolver::new(self.api);
        let planning = ReassignmentPlanner::plan(references, &mut resolver).await;
        resolver.flush();

        let mut report = unresolved_report(&planning);
        let groups = self.split_groups(planning)?;
        let run_batches: usize = groups.iter().map(|(_, batches)| batches.len()).sum();

        for (target, batches) in groups {
            if self.stop_requested(&mut report) {
                break;
            }
            let api = self.api;
            let target_ref = &target;
            let run = self
                .executor(format!("Escalation to {target}"), run_batches)
                .run(batches, move |batch: Batch<String>| async move {
                    api.reassign_certifications(&CertificationReassignRequest {
                        campaign_id: campaign_id.to_string(),
                        certification_ids: batch.items,
                        reassign_to: target_ref.clone(),
                        reason: reason.to_string(),
                    })
                    .await
                })
                .await;
            report.merge(run);
        }

        Ok(self.finish("escalate_to_managers", campaign_id, report))
    }

    /// Send every pending review item to the owner of its access
    pub async fn reassign_to_owners(
        &self,
        campaign_id: &str,
        reason: &str,
    ) -> BulkOpsResult<BulkOutcome> {
        require_reason(reason)?;
        info!(campaign_id = %campaign_id, "🚀 Starting reassignment to access owners");

        let mut resolver = OwnerResolver::new(self.api);
        let outcome = self
            .reassign_review_items("reassign_to_owners", campaign_id, reason, &mut resolver)
            .await;
        resolver.flush();
        outcome
    }

    /// Send every pending review item to the reviewer its first applicable
    /// rule names
    pub async fn reassign_with_rules(
        &self,
        campaign_id: &str,
        rules: Vec<ReassignmentRule>,
        reason: &str,
    ) -> BulkOpsResult<BulkOutcome> {
        require_reason(reason)?;
        if rules.is_empty() {
            return Err(BulkOpsError::invalid_input(
                "at least one reassignment rule is required",
            ));
        }
        info!(campaign_id = %campaign_id, rules = rules.len(), "🚀 Starting rule-based reassignment");

        let mut resolver = CustomRuleResolver::new(rules);
        self.reassign_review_items("reassign_with_rules", campaign_id, reason, &mut resolver)
            .await
    }

    async fn reassign_review_items<R>(
        &self,
        operation: &str,
        campaign_id: &str,
        reason: &str,
        resolver: &mut R,
    ) -> BulkOpsResult<BulkOutcome>
    where
        R: TargetResolver<ItemReference> + ?Sized,
    {
        let certifications = match self.pending_certifications(campaign_id).await? {
            Ok(certifications) => certifications,
            Err(idle) => return Ok(self.nothing_to_do(idle)),
        };
        let work = match self.pending_review_items(campaign_id, certifications).await? {
            Ok(work) => work,
            Err(idle) => return Ok(self.nothing_to_do(idle)),
        };
        let Some(work) = work else {
            return Ok(self.cancelled_during_setup(operation, campaign_id));
        };

        // Plan every certification before the first write so progress
        // increments are shares of the whole run
        let mut report = BulkOperationReport::new();
        let mut planned = Vec::with_capacity(work.len());
        for (certification, items) in work {
            if self.stop_requested(&mut report) {
                break;
            }
            let planning = ReassignmentPlanner::plan(items, &mut *resolver).await;
            report.merge(unresolved_report(&planning));
            planned.push((certification, self.split_groups(planning)?));
        }
        let run_batches: usize = planned
            .iter()
            .flat_map(|(_, groups)| groups)
            .map(|(_, batches)| batches.len())
            .sum();

        'certifications: for (certification, groups) in planned {
            for (target, batches) in groups {
                if self.stop_requested(&mut report) {
                    break 'certifications;
                }
                let api = self.api;
                let certification_id = certification.id.as_str();
                let target_ref = &target;
                let run = self
                    .executor(
                        format!("Reassignment of {} to {target}", certification.name),
                        run_batches,
                    )
                    .run(batches, move |batch: Batch<String>| async move {
                        api.reassign_items(&ItemReassignRequest {
                            certification_id: certification_id.to_string(),
                            item_ids: batch.items,
                            reassign_to: target_ref.clone(),
                            reason: reason.to_string(),
                        })
                        .await
                    })
                    .await;
                let cancelled = run.cancelled;
                report.merge(run);
                if cancelled {
                    break 'certifications;
                }
            }
        }

        Ok(self.finish(operation, campaign_id, report))
    }

    // =========================================================================
    // Setup
    // =========================================================================

    async fn pending_certifications(
        &self,
        campaign_id: &str,
    ) -> BulkOpsResult<Setup<Vec<Certification>>> {
        let campaign = self.api.get_campaign(campaign_id).await?;
        if campaign.status.is_terminal() {
            return Ok(Err(NothingToDo::CampaignClosed {
                campaign_id: campaign_id.to_string(),
                status: campaign.status.to_string(),
            }));
        }

        let certifications = self.api.list_pending_certifications(campaign_id).await?;
        if certifications.is_empty() {
            return Ok(Err(NothingToDo::NoPendingCertifications {
                campaign_id: campaign_id.to_string(),
            }));
        }

        debug!(
            campaign_id = %campaign_id,
            certifications = certifications.len(),
            "📋 Pending certifications loaded"
        );
        Ok(Ok(certifications))
    }

    /// Pending review items per certification, projected to references
    /// held by the certification's reviewer
    ///
    /// `Ok(Ok(None))` means cancellation was observed while loading.
    #[allow(clippy::type_complexity)]
    async fn pending_review_items(
        &self,
        campaign_id: &str,
        certifications: Vec<Certification>,
    ) -> BulkOpsResult<Setup<Option<Vec<(Certification, Vec<ItemReference>)>>>> {
        let mut work = Vec::with_capacity(certifications.len());
        let mut total = 0;

        for certification in certifications {
            if self.ctx.is_cancelled() {
                return Ok(Ok(None));
            }
            let items: Vec<ItemReference> = self
                .api
                .list_pending_review_items(&certification.id)
                .await?
                .iter()
                .filter(|item| !item.completed)
                .map(|item| item.to_reference(&certification.reviewer.id))
                .collect();
            if items.is_empty() {
                continue;
            }
            total += items.len();
            work.push((certification, items));
        }

        if total == 0 {
            return Ok(Err(NothingToDo::NoPendingItems {
                campaign_id: campaign_id.to_string(),
            }));
        }
        debug!(campaign_id = %campaign_id, items = total, "📋 Pending review items loaded");
        Ok(Ok(Some(work)))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn executor(&self, label: String, run_batches: usize) -> RateLimitedExecutor<'a> {
        RateLimitedExecutor::new(label, self.ctx)
            .with_progress(self.on_progress.clone())
            .with_run_batch_count(run_batches)
    }

    /// Split each planned target's items by the reassignment limit
    fn split_groups(
        &self,
        planning: PlanningResult<ItemReference>,
    ) -> BulkOpsResult<Vec<(TargetKey, Vec<Batch<String>>)>> {
        planning
            .plan
            .into_groups()
            .into_iter()
            .map(|(target, items)| {
                let ids: Vec<String> = items.into_iter().map(|item| item.id).collect();
                let batches = split(ids, self.batching.reassignment_limit)?;
                Ok::<_, BulkOpsError>((target, batches))
            })
            .collect()
    }

    /// Check cancellation between parents, marking the report when set
    fn stop_requested(&self, report: &mut BulkOperationReport) -> bool {
        if report.cancelled || self.ctx.is_cancelled() {
            report.cancelled = true;
            return true;
        }
        false
    }

    fn nothing_to_do(&self, reason: NothingToDo) -> BulkOutcome {
        info!(reason = %reason, "💤 Nothing to do");
        BulkOutcome::NothingToDo(reason)
    }

    fn cancelled_during_setup(&self, operation: &str, campaign_id: &str) -> BulkOutcome {
        let report = BulkOperationReport {
            cancelled: true,
            ..BulkOperationReport::default()
        };
        self.finish(operation, campaign_id, report)
    }

    fn finish(&self, operation: &str, campaign_id: &str, report: BulkOperationReport) -> BulkOutcome {
        log_bulk_operation(operation, campaign_id, &report);
        if !report.error_messages.is_empty() {
            warn!(
                operation = %operation,
                errors = report.error_messages.len(),
                "⚠️ {}",
                report.summary()
            );
        } else {
            info!(operation = %operation, "✅ {}", report.summary());
        }
        BulkOutcome::from_report(report)
    }
}

fn require_reason(reason: &str) -> BulkOpsResult<()> {
    if reason.trim().is_empty() {
        return Err(BulkOpsError::invalid_input(
            "a reason is required when reassigning",
        ));
    }
    Ok(())
}

/// Each unresolved item counts as one error
fn unresolved_report<T>(planning: &PlanningResult<T>) -> BulkOperationReport {
    let mut report = BulkOperationReport::new();
    for unresolved in &planning.unresolved {
        report.record_failure(1, unresolved.to_string());
    }
    report
}
