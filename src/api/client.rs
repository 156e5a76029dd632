//! # Governance API Client
//!
//! HTTP implementation of the capability traits against the
//! identity-governance REST API (v3 and beta endpoints).
//!
//! Requests rejected with HTTP 429 were never processed by the service, so
//! they are re-sent after the server's `Retry-After` delay, at most
//! `max_retries` times. Every other failure is returned as-is; batch-level
//! error accounting belongs to the executor.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::{ApiError, ApiResult};
use super::{AggregationApi, CertificationApi, ConfigJobApi, DirectoryApi};
use crate::config::ApiEndpointConfig;
use crate::constants::{http, limits};
use crate::models::{
    Campaign, Certification, CertificationReassignRequest, ConfigJobStatus, DecisionRequest,
    ExportOptions, ExportPayload, ImportOptions, ImportResult, ItemReassignRequest,
    ReminderRequest, ReviewItem, TaskStatus,
};

// ===================================================================================
// WIRE BODIES
// ===================================================================================

#[derive(Debug, Serialize)]
struct DecideItem<'a> {
    id: &'a str,
    decision: String,
    bulk: bool,
    comments: &'a str,
}

#[derive(Debug, Serialize)]
struct ReassignReference<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemReassignBody<'a> {
    reassign: Vec<ReassignReference<'a>>,
    reassign_to: &'a str,
    reason: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignReassignBody<'a> {
    certification_ids: &'a [String],
    reassign_to: ReassignReference<'a>,
    reason: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReminderBody<'a> {
    certification_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct Reference {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    manager_ref: Option<Reference>,
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    owner: Option<Reference>,
}

#[derive(Debug, Deserialize)]
struct LoadAccountsResponse {
    task: TaskStatus,
}

fn decide_body(request: &DecisionRequest) -> Vec<DecideItem<'_>> {
    request
        .item_ids
        .iter()
        .map(|id| DecideItem {
            id,
            decision: request.decision.to_string(),
            bulk: true,
            comments: &request.comment,
        })
        .collect()
}

fn item_reassign_body(request: &ItemReassignRequest) -> ItemReassignBody<'_> {
    ItemReassignBody {
        reassign: request
            .item_ids
            .iter()
            .map(|id| ReassignReference { id, kind: "ITEM" })
            .collect(),
        reassign_to: request.reassign_to.as_str(),
        reason: &request.reason,
    }
}

fn campaign_reassign_body(request: &CertificationReassignRequest) -> CampaignReassignBody<'_> {
    CampaignReassignBody {
        certification_ids: &request.certification_ids,
        reassign_to: ReassignReference {
            id: request.reassign_to.as_str(),
            kind: "IDENTITY",
        },
        reason: &request.reason,
    }
}

// ===================================================================================
// CLIENT
// ===================================================================================

/// HTTP client for the identity-governance service
#[derive(Clone)]
pub struct GovernanceApiClient {
    client: Client,
    config: ApiEndpointConfig,
    base_url: Url,
}

impl std::fmt::Debug for GovernanceApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("max_retries", &self.config.max_retries)
            .field("auth_enabled", &self.config.access_token.is_some())
            .finish()
    }
}

impl GovernanceApiClient {
    /// Create a client; fails on a malformed base URL or token
    pub fn new(config: ApiEndpointConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("bulkops-core/{}", env!("CARGO_PKG_VERSION")));

        if let Some(token) = &config.access_token {
            let mut headers = HeaderMap::new();
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Configuration(format!("Invalid access token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
            builder = builder.default_headers(headers);
            debug!("Configured Bearer token authentication");
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            auth_enabled = config.access_token.is_some(),
            "Created governance API client"
        );

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Send a request, re-sending it while the service answers 429
    async fn send<F>(&self, operation: &str, build: F) -> ApiResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        loop {
            let response = build().send().await?;
            let status = response.status();

            if status.is_success() {
                debug!(operation, status = %status, "Request succeeded");
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS && retries < self.config.max_retries {
                let wait = retry_after(&response);
                retries += 1;
                warn!(
                    operation,
                    retry = retries,
                    max_retries = self.config.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    "Rate limited, waiting before re-sending"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(operation, status = %status, error = %error_text, "Request failed");
            return Err(ApiError::status(status.as_u16(), error_text));
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: Url) -> ApiResult<T> {
        let response = self
            .send(operation, || self.client.get(url.clone()))
            .await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        url: Url,
        body: &B,
    ) -> ApiResult<Response> {
        self.send(operation, || self.client.post(url.clone()).json(body))
            .await
    }

    /// Collect every page of a `limit`/`offset` listing
    async fn list_paged<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: Url,
        filters: &str,
    ) -> ApiResult<Vec<T>> {
        let page_size = limits::LIST_PAGE_SIZE;
        let mut offset = 0;
        let mut items = Vec::new();

        loop {
            let query = [
                ("limit", page_size.to_string()),
                ("offset", offset.to_string()),
                ("filters", filters.to_string()),
            ];
            let response = self
                .send(operation, || self.client.get(url.clone()).query(&query))
                .await?;
            let page: Vec<T> = Self::decode(response).await?;
            let fetched = page.len();
            items.extend(page);

            if fetched < page_size {
                break;
            }
            offset += fetched;
        }

        debug!(operation, count = items.len(), "Listed all pages");
        Ok(items)
    }
}

fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(http::DEFAULT_RETRY_AFTER_SECS))
}

// ===================================================================================
// CERTIFICATION OPERATIONS
// ===================================================================================

#[async_trait]
impl CertificationApi for GovernanceApiClient {
    async fn get_campaign(&self, campaign_id: &str) -> ApiResult<Campaign> {
        let url = self.endpoint(&["v3", "campaigns", campaign_id])?;
        self.get_json("get_campaign", url).await
    }

    async fn list_pending_certifications(
        &self,
        campaign_id: &str,
    ) -> ApiResult<Vec<Certification>> {
        let url = self.endpoint(&["v3", "certifications"])?;
        let filters = format!("campaign.id eq \"{campaign_id}\" and completed eq false");
        self.list_paged("list_pending_certifications", url, &filters)
            .await
    }

    async fn list_pending_review_items(
        &self,
        certification_id: &str,
    ) -> ApiResult<Vec<ReviewItem>> {
        let url = self.endpoint(&[
            "v3",
            "certifications",
            certification_id,
            "access-review-items",
        ])?;
        self.list_paged("list_pending_review_items", url, "completed eq false")
            .await
    }

    async fn decide(&self, request: &DecisionRequest) -> ApiResult<()> {
        let url = self.endpoint(&["v3", "certifications", &request.certification_id, "decide"])?;
        self.post_json("decide", url, &decide_body(request)).await?;
        Ok(())
    }

    async fn reassign_items(&self, request: &ItemReassignRequest) -> ApiResult<()> {
        let url = self.endpoint(&[
            "v3",
            "certifications",
            &request.certification_id,
            "reassign",
        ])?;
        self.post_json("reassign_items", url, &item_reassign_body(request))
            .await?;
        Ok(())
    }

    async fn reassign_certifications(
        &self,
        request: &CertificationReassignRequest,
    ) -> ApiResult<()> {
        let url = self.endpoint(&["v3", "campaigns", &request.campaign_id, "reassign"])?;
        self.post_json(
            "reassign_certifications",
            url,
            &campaign_reassign_body(request),
        )
        .await?;
        Ok(())
    }

    async fn send_reminders(&self, request: &ReminderRequest) -> ApiResult<()> {
        let url = self.endpoint(&["beta", "campaigns", &request.campaign_id, "reminders"])?;
        let body = ReminderBody {
            certification_ids: &request.certification_ids,
        };
        self.post_json("send_reminders", url, &body).await?;
        Ok(())
    }
}

// ===================================================================================
// DIRECTORY LOOKUPS
// ===================================================================================

#[async_trait]
impl DirectoryApi for GovernanceApiClient {
    async fn get_manager_id(&self, identity_id: &str) -> ApiResult<Option<String>> {
        let url = self.endpoint(&["beta", "identities", identity_id])?;
        let identity: IdentityRecord = self.get_json("get_manager_id", url).await?;
        Ok(identity.manager_ref.map(|m| m.id))
    }

    async fn get_source_owner_id(&self, source_id: &str) -> ApiResult<Option<String>> {
        let url = self.endpoint(&["v3", "sources", source_id])?;
        let source: SourceRecord = self.get_json("get_source_owner_id", url).await?;
        Ok(source.owner.map(|o| o.id))
    }
}

// ===================================================================================
// CONFIGURATION JOBS
// ===================================================================================

#[async_trait]
impl ConfigJobApi for GovernanceApiClient {
    async fn submit_export(&self, options: &ExportOptions) -> ApiResult<ConfigJobStatus> {
        let url = self.endpoint(&["beta", "sp-config", "export"])?;
        let response = self.post_json("submit_export", url, options).await?;
        Self::decode(response).await
    }

    async fn get_export_status(&self, job_id: &str) -> ApiResult<ConfigJobStatus> {
        let url = self.endpoint(&["beta", "sp-config", "export", job_id])?;
        self.get_json("get_export_status", url).await
    }

    async fn download_export(&self, job_id: &str) -> ApiResult<ExportPayload> {
        let url = self.endpoint(&["beta", "sp-config", "export", job_id, "download"])?;
        self.get_json("download_export", url).await
    }

    async fn submit_import(
        &self,
        payload: &ExportPayload,
        options: &ImportOptions,
    ) -> ApiResult<ConfigJobStatus> {
        let url = self.endpoint(&["beta", "sp-config", "import"])?;
        let data = serde_json::to_vec(payload)?;
        let options = serde_json::to_string(options)?;

        let response = self
            .send("submit_import", || {
                let form = Form::new()
                    .part("data", Part::bytes(data.clone()).file_name("import.json"))
                    .text("options", options.clone());
                self.client.post(url.clone()).multipart(form)
            })
            .await?;
        Self::decode(response).await
    }

    async fn get_import_status(&self, job_id: &str) -> ApiResult<ConfigJobStatus> {
        let url = self.endpoint(&["beta", "sp-config", "import", job_id])?;
        self.get_json("get_import_status", url).await
    }

    async fn download_import(&self, job_id: &str) -> ApiResult<ImportResult> {
        let url = self.endpoint(&["beta", "sp-config", "import", job_id, "download"])?;
        self.get_json("download_import", url).await
    }
}

// ===================================================================================
// AGGREGATION TASKS
// ===================================================================================

#[async_trait]
impl AggregationApi for GovernanceApiClient {
    async fn start_account_aggregation(&self, source_id: &str) -> ApiResult<TaskStatus> {
        let url = self.endpoint(&["v3", "sources", source_id, "load-accounts"])?;
        let response = self
            .send("start_account_aggregation", || self.client.post(url.clone()))
            .await?;
        let started: LoadAccountsResponse = Self::decode(response).await?;
        Ok(started.task)
    }

    async fn get_task_status(&self, task_id: &str) -> ApiResult<TaskStatus> {
        let url = self.endpoint(&["beta", "task-status", task_id])?;
        self.get_json("get_task_status", url).await
    }
}
