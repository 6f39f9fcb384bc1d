//! HTTP adapter for a deployed coordination server.

use async_trait::async_trait;
use serde::Deserialize;

use crate::authority::{AcquireOutcome, DEFAULT_WAIT_HINT_MS, LeaseAuthority, LeaseRequest};
use crate::error::{BenchError, Result};

/// Talks to the lease authority over its JSON API:
/// `POST /agents`, `POST /leases`, `DELETE /leases/{id}`.
pub struct HttpLeaseClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct AcquireResponse {
    success: bool,
    #[serde(default)]
    data: Option<GrantData>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    wait_time: Option<u64>,
}

#[derive(Deserialize)]
struct GrantData {
    lease_id: String,
}

impl HttpLeaseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attach a bearer token; the server rejects unauthenticated requests
    /// when it is configured with an API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl LeaseAuthority for HttpLeaseClient {
    async fn register(&self, agent_id: &str, priority: u64) -> Result<()> {
        let response = self
            .authorize(self.http.post(format!("{}/agents", self.base_url)))
            .json(&serde_json::json!({
                "agent_id": agent_id,
                "priority": priority,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BenchError::Authority(format!(
                "registration of '{}' failed with status {}",
                agent_id,
                response.status()
            )))
        }
    }

    async fn acquire(&self, request: &LeaseRequest) -> Result<AcquireOutcome> {
        let response: AcquireResponse = self
            .authorize(self.http.post(format!("{}/leases", self.base_url)))
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        if response.success {
            let data = response.data.ok_or_else(|| {
                BenchError::MalformedResponse("grant without a lease_id payload".to_string())
            })?;
            return Ok(AcquireOutcome::Granted {
                lease_id: data.lease_id,
            });
        }

        let wait_ms = response.wait_time.unwrap_or(DEFAULT_WAIT_HINT_MS);
        match response.reason.as_deref() {
            Some("WAIT") => Ok(AcquireOutcome::Wait { wait_ms }),
            Some("DIE") => Ok(AcquireOutcome::Die { wait_ms }),
            other => Err(BenchError::MalformedResponse(format!(
                "unexpected denial reason: {:?}",
                other
            ))),
        }
    }

    async fn release(&self, lease_id: &str) -> Result<()> {
        // Release is idempotent server-side; a 404 just means the lease
        // already expired or was never ours.
        self.authorize(
            self.http
                .delete(format!("{}/leases/{}", self.base_url, lease_id)),
        )
        .send()
        .await?;
        Ok(())
    }
}
