use std::time::Duration;

use dashboard_logging::{dash_debug, dash_warn};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::types::{BatchContentReply, ChapterContentReply, LaunchBody, LaunchReply};
use crate::{
    ApiError, BatchRecord, ChapterRecord, ContentDocument, FailureKind, LaunchSpec,
    ProgressReport, UnitId,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// No per-request deadline when `None`.
    pub request_timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// The translation server's HTTP surface.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// Starts a job and returns its task id.
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, ApiError>;

    async fn progress(&self, task_id: &str) -> Result<ProgressReport, ApiError>;

    async fn batches(&self, novel_id: i64) -> Result<Vec<BatchRecord>, ApiError>;

    async fn chapters(&self, novel_id: i64) -> Result<Vec<ChapterRecord>, ApiError>;

    async fn batch_content(&self, batch_id: UnitId) -> Result<ContentDocument, ApiError>;

    async fn chapter_content(&self, chapter_id: UnitId) -> Result<ContentDocument, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base(&settings.base_url)?;
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        dash_debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl DashboardApi for ReqwestApi {
    async fn launch(&self, spec: &LaunchSpec) -> Result<String, ApiError> {
        let body = LaunchBody::for_spec(spec);
        let url = self.endpoint(body.path())?;
        let payload = serde_json::to_vec(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        dash_debug!("POST {url} with {} unit(s)", spec.unit_ids.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let reply: LaunchReply = decode(read_json(response).await?)?;
        reply
            .task_id
            .map(String::from)
            .ok_or_else(|| ApiError::new(FailureKind::Unexpected, "response carried no task_id"))
    }

    async fn progress(&self, task_id: &str) -> Result<ProgressReport, ApiError> {
        let url = self.endpoint(&["api", "translation_progress", task_id])?;
        decode(self.get_json(url).await?)
    }

    async fn batches(&self, novel_id: i64) -> Result<Vec<BatchRecord>, ApiError> {
        let url = self.endpoint(&["api", "get_batches", &novel_id.to_string()])?;
        decode_list(self.get_json(url).await?)
    }

    async fn chapters(&self, novel_id: i64) -> Result<Vec<ChapterRecord>, ApiError> {
        let url = self.endpoint(&["api", "get_chapters", &novel_id.to_string()])?;
        decode_list(self.get_json(url).await?)
    }

    async fn batch_content(&self, batch_id: UnitId) -> Result<ContentDocument, ApiError> {
        let url = self.endpoint(&["api", "get_batch_content", &batch_id.to_string()])?;
        let reply: BatchContentReply = decode(self.get_json(url).await?)?;
        match reply.content {
            Some(content) if !content.is_empty() => Ok(ContentDocument {
                title: format!(
                    "Batch {} (Chapters {}-{})",
                    reply.batch_number, reply.chapter_start, reply.chapter_end
                ),
                original: content,
                translated: None,
            }),
            _ => Err(ApiError::new(
                FailureKind::Unexpected,
                "Could not load batch content",
            )),
        }
    }

    async fn chapter_content(&self, chapter_id: UnitId) -> Result<ContentDocument, ApiError> {
        let url = self.endpoint(&["api", "get_chapter_content", &chapter_id.to_string()])?;
        let reply: ChapterContentReply = decode(self.get_json(url).await?)?;
        let title = match (reply.title, reply.chapter_number) {
            (Some(title), _) if !title.is_empty() => title,
            (_, Some(number)) => format!("Chapter {number}"),
            _ => format!("Chapter {chapter_id}"),
        };
        match reply.content {
            Some(content) if !content.is_empty() => Ok(ContentDocument {
                title,
                original: content,
                translated: reply.translated_content,
            }),
            _ => Err(ApiError::new(
                FailureKind::Unexpected,
                "Could not load chapter content",
            )),
        }
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut text = raw.trim().to_string();
    if !text.ends_with('/') {
        text.push('/');
    }
    let url = Url::parse(&text)
        .map_err(|err| ApiError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::new(FailureKind::InvalidUrl, raw.to_string()));
    }
    Ok(url)
}

/// Reads the body as JSON and surfaces `{error}` answers before the status.
async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(map_reqwest_error)?;

    let value: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ))
        }
        Err(err) => return Err(ApiError::new(FailureKind::Decode, err.to_string())),
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        dash_warn!("server answered {status} with error: {message}");
        return Err(ApiError::new(FailureKind::Application, message));
    }
    if !status.is_success() {
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|err| ApiError::new(FailureKind::Unexpected, err.to_string()))
}

fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    if !value.is_array() {
        return Err(ApiError::new(
            FailureKind::Unexpected,
            "expected a list of units",
        ));
    }
    decode(value)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
