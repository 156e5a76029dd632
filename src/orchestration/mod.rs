//! # Bulk Orchestration Engine
//!
//! Turns "apply this to every pending item of a campaign" into a sequence of
//! size-limited API calls.
//!
//! ## Core Components
//!
//! - **Batcher**: splits ordered items into contiguous batches under a limit
//! - **RateLimitedExecutor**: runs batches one at a time, tallying a report
//! - **ReassignmentPlanner**: groups items by resolved target
//! - **Resolvers**: manager, access-owner and custom-rule strategies
//! - **LookupCache**: per-run memo of directory lookups
//! - **BulkOperationCoordinator**: the campaign-level use cases
//!
//! Everything runs serially on the caller's task; the only concurrency is
//! the caller's ability to cancel through its [`OperationContext`].
//!
//! [`OperationContext`]: crate::context::OperationContext

pub mod batcher;
pub mod cache;
pub mod coordinator;
pub mod executor;
pub mod planner;
pub mod resolvers;

pub use batcher::{split, Batch};
pub use cache::LookupCache;
pub use coordinator::BulkOperationCoordinator;
pub use executor::{BatchProgress, ProgressCallback, RateLimitedExecutor};
pub use planner::{
    PlanningResult, ReassignmentPlan, ReassignmentPlanner, TargetResolver, UnresolvedItem,
    UnresolvedReason,
};
pub use resolvers::{
    CustomRuleResolver, ManagerResolver, OwnerResolver, ReassignmentRule, RuleScope,
};
