use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;

use crate::error::ApiError;
use crate::upload::UploadResult;

pub const CHAT_PATH: &str = "/api/chatbotHandler";
pub const UPLOAD_PATH: &str = "/api/fileuploadhandler";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// HTTP client for the flight plan backend. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct FlightPlanClient {
    client: Client,
    base_url: String,
}

impl FlightPlanClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat message and return the raw reply body.
    pub async fn chat(&self, message: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, CHAT_PATH);
        tracing::debug!(%url, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(response.text().await?)
    }

    /// Upload a document as multipart field `file` and parse the reply.
    pub async fn upload_document(&self, path: &Path) -> Result<UploadResult, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let url = format!("{}{}", self.base_url, UPLOAD_PATH);
        tracing::debug!(%url, file = %file_name, size = bytes.len(), "uploading document");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = self.client.post(&url).multipart(form).send().await?;
        let response = ensure_success(response).await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let body = response.text().await?;
        Ok(UploadResult::from_body(&body, is_json))
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}
