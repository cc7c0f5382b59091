use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::info;
use url::Url;

/// Upstream status for one polled attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptStatusUpdate {
    pub attempt_code: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct BulkStartResponse {
    started: Vec<String>,
}

/// The exam platform that is authoritative for attempt start/stop/poll/review.
/// Methods surface the upstream HTTP status verbatim; retry policy belongs to
/// the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn start_exam(&self, exam_code: &str) -> Result<u16>;

    async fn stop_exam(&self, exam_code: &str, action: &str, user_id: &str) -> Result<u16>;

    async fn poll_statuses(&self, exam_codes: &[String]) -> Result<Vec<AttemptStatusUpdate>>;

    async fn send_review(&self, payload: &JsonValue) -> Result<u16>;

    /// One bulk call; returns the exam codes the platform actually started.
    async fn bulk_start(&self, exam_codes: &[String]) -> Result<Vec<String>>;

    async fn proctored_exams(&self) -> Result<JsonValue>;
}

#[derive(Clone)]
pub struct HttpPlatformClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpPlatformClient {
    pub fn new(base_url: &str, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid PLATFORM_API_URL: {}", e)))?;
        info!("Exam platform client configured for {}", base_url);
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Internal(format!("Bad platform endpoint {}: {}", path, e)))
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn start_exam(&self, exam_code: &str) -> Result<u16> {
        let url = self.endpoint(&format!("api/exams/{}/start", exam_code))?;
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn stop_exam(&self, exam_code: &str, action: &str, user_id: &str) -> Result<u16> {
        let url = self.endpoint(&format!("api/exams/{}/stop", exam_code))?;
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&json!({ "action": action, "user_id": user_id }))
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn poll_statuses(&self, exam_codes: &[String]) -> Result<Vec<AttemptStatusUpdate>> {
        let url = self.endpoint("api/exams/status")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "list": exam_codes }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "platform status poll failed".to_string(),
            });
        }
        Ok(response.json::<Vec<AttemptStatusUpdate>>().await?)
    }

    async fn send_review(&self, payload: &JsonValue) -> Result<u16> {
        let url = self.endpoint("api/reviews")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn bulk_start(&self, exam_codes: &[String]) -> Result<Vec<String>> {
        let url = self.endpoint("api/exams/bulk_start")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "list": exam_codes }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "platform bulk start failed".to_string(),
            });
        }
        let body = response.json::<BulkStartResponse>().await?;
        Ok(body.started)
    }

    async fn proctored_exams(&self) -> Result<JsonValue> {
        let url = self.endpoint("api/exams/proctored")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "platform catalogue fetch failed".to_string(),
            });
        }
        Ok(response.json::<JsonValue>().await?)
    }
}
