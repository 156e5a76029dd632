use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bulkops_core::api::{
    AggregationApi, ApiError, ApiResult, CertificationApi, ConfigJobApi, DirectoryApi,
};
use bulkops_core::context::TokenContext;
use bulkops_core::jobs::JobState;
use bulkops_core::models::{
    Campaign, Certification, CertificationReassignRequest, ConfigJobStatus, DecisionRequest,
    ExportOptions, ExportPayload, ImportOptions, ImportResult, ItemReassignRequest,
    ReminderRequest, ReviewItem, TaskStatus,
};

/// A write call recorded by [`FakeGovernance`], in submission order
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCall {
    Decide(DecisionRequest),
    ReassignItems(ItemReassignRequest),
    ReassignCertifications(CertificationReassignRequest),
    Reminders(ReminderRequest),
}

impl WriteCall {
    pub fn size(&self) -> usize {
        match self {
            Self::Decide(r) => r.item_ids.len(),
            Self::ReassignItems(r) => r.item_ids.len(),
            Self::ReassignCertifications(r) => r.certification_ids.len(),
            Self::Reminders(r) => r.certification_ids.len(),
        }
    }
}

#[derive(Default)]
struct State {
    campaigns: HashMap<String, Campaign>,
    certifications: HashMap<String, Vec<Certification>>,
    review_items: HashMap<String, Vec<ReviewItem>>,
    managers: HashMap<String, String>,
    source_owners: HashMap<String, String>,
    failing_lookups: HashSet<String>,
    failing_writes: HashSet<usize>,
    cancel_after_write: Option<(usize, TokenContext)>,
    writes: Vec<WriteCall>,
    directory_lookups: Vec<String>,
    export_states: VecDeque<ConfigJobStatus>,
    import_states: VecDeque<ConfigJobStatus>,
    export_payload: ExportPayload,
    import_result: ImportResult,
    task_states: VecDeque<TaskStatus>,
    status_fetches: usize,
}

/// In-memory governance service implementing every capability trait
///
/// Write calls take a short pause so overlapping submissions would be
/// observable through [`FakeGovernance::max_in_flight`].
#[derive(Default)]
pub struct FakeGovernance {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeGovernance {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- seeding -----

    pub fn with_campaign(self, campaign: Campaign) -> Self {
        self.state
            .lock()
            .campaigns
            .insert(campaign.id.clone(), campaign);
        self
    }

    pub fn with_certifications(self, campaign_id: &str, certifications: Vec<Certification>) -> Self {
        self.state
            .lock()
            .certifications
            .insert(campaign_id.to_string(), certifications);
        self
    }

    pub fn with_review_items(self, certification_id: &str, items: Vec<ReviewItem>) -> Self {
        self.state
            .lock()
            .review_items
            .insert(certification_id.to_string(), items);
        self
    }

    pub fn with_manager(self, identity_id: &str, manager_id: &str) -> Self {
        self.state
            .lock()
            .managers
            .insert(identity_id.to_string(), manager_id.to_string());
        self
    }

    pub fn with_source_owner(self, source_id: &str, owner_id: &str) -> Self {
        self.state
            .lock()
            .source_owners
            .insert(source_id.to_string(), owner_id.to_string());
        self
    }

    /// Directory lookups for `id` fail with HTTP 503
    pub fn with_failing_lookup(self, id: &str) -> Self {
        self.state.lock().failing_lookups.insert(id.to_string());
        self
    }

    /// The `call_number`-th write call (1-based) fails with HTTP 500
    pub fn with_failing_write(self, call_number: usize) -> Self {
        self.state.lock().failing_writes.insert(call_number);
        self
    }

    /// Cancel `ctx` as soon as the `call_number`-th write call completes
    pub fn cancel_after_write(self, call_number: usize, ctx: TokenContext) -> Self {
        self.state.lock().cancel_after_write = Some((call_number, ctx));
        self
    }

    pub fn with_export(self, states: Vec<ConfigJobStatus>, payload: ExportPayload) -> Self {
        {
            let mut state = self.state.lock();
            state.export_states = states.into();
            state.export_payload = payload;
        }
        self
    }

    pub fn with_import(self, states: Vec<ConfigJobStatus>, result: ImportResult) -> Self {
        {
            let mut state = self.state.lock();
            state.import_states = states.into();
            state.import_result = result;
        }
        self
    }

    pub fn with_task(self, states: Vec<TaskStatus>) -> Self {
        self.state.lock().task_states = states.into();
        self
    }

    // ----- inspection -----

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().writes.clone()
    }

    pub fn write_sizes(&self) -> Vec<usize> {
        self.state.lock().writes.iter().map(WriteCall::size).collect()
    }

    pub fn directory_lookups(&self) -> Vec<String> {
        self.state.lock().directory_lookups.clone()
    }

    pub fn status_fetches(&self) -> usize {
        self.state.lock().status_fetches
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    // ----- internals -----

    async fn record_write(&self, call: WriteCall) -> ApiResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        state.writes.push(call);
        let call_number = state.writes.len();

        if let Some((after, ctx)) = &state.cancel_after_write {
            if *after == call_number {
                ctx.cancel();
            }
        }

        if state.failing_writes.contains(&call_number) {
            return Err(ApiError::status(500, "Internal Server Error"));
        }
        Ok(())
    }

    fn lookup(&self, id: &str, table: fn(&State) -> &HashMap<String, String>) -> ApiResult<Option<String>> {
        let mut state = self.state.lock();
        state.directory_lookups.push(id.to_string());
        if state.failing_lookups.contains(id) {
            return Err(ApiError::status(503, "Service Unavailable"));
        }
        Ok(table(&state).get(id).cloned())
    }

    fn next_status<T: Clone>(queue: &mut VecDeque<T>) -> ApiResult<T> {
        match queue.len() {
            0 => Err(ApiError::not_found("Job status", "unscripted")),
            1 => Ok(queue[0].clone()),
            _ => queue
                .pop_front()
                .ok_or_else(|| ApiError::not_found("Job status", "unscripted")),
        }
    }
}

#[async_trait]
impl CertificationApi for FakeGovernance {
    async fn get_campaign(&self, campaign_id: &str) -> ApiResult<Campaign> {
        self.state
            .lock()
            .campaigns
            .get(campaign_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Campaign", campaign_id))
    }

    async fn list_pending_certifications(
        &self,
        campaign_id: &str,
    ) -> ApiResult<Vec<Certification>> {
        Ok(self
            .state
            .lock()
            .certifications
            .get(campaign_id)
            .map(|certs| certs.iter().filter(|c| !c.completed).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_pending_review_items(
        &self,
        certification_id: &str,
    ) -> ApiResult<Vec<ReviewItem>> {
        Ok(self
            .state
            .lock()
            .review_items
            .get(certification_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn decide(&self, request: &DecisionRequest) -> ApiResult<()> {
        self.record_write(WriteCall::Decide(request.clone())).await
    }

    async fn reassign_items(&self, request: &ItemReassignRequest) -> ApiResult<()> {
        self.record_write(WriteCall::ReassignItems(request.clone()))
            .await
    }

    async fn reassign_certifications(
        &self,
        request: &CertificationReassignRequest,
    ) -> ApiResult<()> {
        self.record_write(WriteCall::ReassignCertifications(request.clone()))
            .await
    }

    async fn send_reminders(&self, request: &ReminderRequest) -> ApiResult<()> {
        self.record_write(WriteCall::Reminders(request.clone()))
            .await
    }
}

#[async_trait]
impl DirectoryApi for FakeGovernance {
    async fn get_manager_id(&self, identity_id: &str) -> ApiResult<Option<String>> {
        self.lookup(identity_id, |s| &s.managers)
    }

    async fn get_source_owner_id(&self, source_id: &str) -> ApiResult<Option<String>> {
        self.lookup(source_id, |s| &s.source_owners)
    }
}

#[async_trait]
impl ConfigJobApi for FakeGovernance {
    async fn submit_export(&self, _options: &ExportOptions) -> ApiResult<ConfigJobStatus> {
        let state = self.state.lock();
        state
            .export_states
            .front()
            .cloned()
            .ok_or_else(|| ApiError::not_found("Export job", "unscripted"))
    }

    async fn get_export_status(&self, _job_id: &str) -> ApiResult<ConfigJobStatus> {
        let mut state = self.state.lock();
        state.status_fetches += 1;
        Self::next_status(&mut state.export_states)
    }

    async fn download_export(&self, _job_id: &str) -> ApiResult<ExportPayload> {
        Ok(self.state.lock().export_payload.clone())
    }

    async fn submit_import(
        &self,
        _payload: &ExportPayload,
        _options: &ImportOptions,
    ) -> ApiResult<ConfigJobStatus> {
        let state = self.state.lock();
        state
            .import_states
            .front()
            .cloned()
            .ok_or_else(|| ApiError::not_found("Import job", "unscripted"))
    }

    async fn get_import_status(&self, _job_id: &str) -> ApiResult<ConfigJobStatus> {
        let mut state = self.state.lock();
        state.status_fetches += 1;
        Self::next_status(&mut state.import_states)
    }

    async fn download_import(&self, _job_id: &str) -> ApiResult<ImportResult> {
        Ok(self.state.lock().import_result.clone())
    }
}

#[async_trait]
impl AggregationApi for FakeGovernance {
    async fn start_account_aggregation(&self, _source_id: &str) -> ApiResult<TaskStatus> {
        let state = self.state.lock();
        state
            .task_states
            .front()
            .cloned()
            .ok_or_else(|| ApiError::not_found("Aggregation task", "unscripted"))
    }

    async fn get_task_status(&self, _task_id: &str) -> ApiResult<TaskStatus> {
        let mut state = self.state.lock();
        state.status_fetches += 1;
        Self::next_status(&mut state.task_states)
    }
}

/// Job status for `job_id` in `state`, optionally with a message
pub fn job_status(job_id: &str, state: JobState, message: Option<&str>) -> ConfigJobStatus {
    ConfigJobStatus {
        job_id: job_id.to_string(),
        status: state,
        message: message.map(str::to_string),
        description: None,
        created: None,
        completed: None,
    }
}
