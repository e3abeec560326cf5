//! Upload session: one document transfer at a time, handing its parsed reply
//! to whoever asked for it.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::api::FlightPlanClient;
use crate::error::ApiError;

/// Parsed body of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    Json(Value),
    Text(String),
}

impl UploadResult {
    /// Interpret a response body. JSON that fails to parse is kept as text.
    pub fn from_body(body: &str, declared_json: bool) -> Self {
        if !declared_json {
            return UploadResult::Text(body.to_string());
        }
        match serde_json::from_str(body) {
            Ok(value) => UploadResult::Json(value),
            Err(err) => {
                tracing::warn!(error = %err, "upload reply declared JSON but did not parse");
                UploadResult::Text(body.to_string())
            }
        }
    }

    /// The `flight_plan` field, when the reply is a JSON object carrying one
    pub fn flight_plan(&self) -> Option<&Value> {
        match self {
            UploadResult::Json(value) => value.get("flight_plan"),
            UploadResult::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub in_progress: bool,
    pub error_message: Option<String>,
}

/// An upload that has been started but not yet sent. Owns everything the
/// request needs so it can be moved into a spawned task.
#[derive(Debug)]
pub struct PendingUpload {
    client: FlightPlanClient,
    path: PathBuf,
}

impl PendingUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn send(self) -> Result<UploadResult, ApiError> {
        self.client.upload_document(&self.path).await
    }
}

pub struct UploadSession {
    client: FlightPlanClient,
    state: UploadState,
}

impl UploadSession {
    pub fn new(client: FlightPlanClient) -> Self {
        Self {
            client,
            state: UploadState::default(),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn in_progress(&self) -> bool {
        self.state.in_progress
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    /// Mark the session busy and hand back the request to run.
    ///
    /// Returns `None` without touching state when no file was selected or an
    /// upload is already running.
    pub fn begin_upload(&mut self, file: Option<&Path>) -> Option<PendingUpload> {
        let path = file.filter(|p| !p.as_os_str().is_empty())?;

        if self.state.in_progress {
            tracing::debug!(path = %path.display(), "upload rejected, another one is in flight");
            return None;
        }

        self.state.in_progress = true;
        self.state.error_message = None;
        tracing::info!(path = %path.display(), "upload started");

        Some(PendingUpload {
            client: self.client.clone(),
            path: path.to_path_buf(),
        })
    }

    /// Fold the outcome into state and release the in-flight flag.
    ///
    /// Returns the parsed result on success so the caller can fire its
    /// completion callback; failures only set the error message.
    pub fn finish_upload(
        &mut self,
        outcome: Result<UploadResult, ApiError>,
    ) -> Option<UploadResult> {
        self.state.in_progress = false;

        match outcome {
            Ok(result) => {
                tracing::info!("upload finished");
                Some(result)
            }
            Err(err) => {
                tracing::warn!(error = %err, status = ?err.status(), "upload failed");
                self.state.error_message = Some(format!("Upload failed: {}", err));
                None
            }
        }
    }

    /// Upload `file` and invoke `on_complete` once with the parsed reply.
    ///
    /// Returns `false` when the call was a no-op.
    pub async fn upload<F>(&mut self, file: Option<&Path>, on_complete: F) -> bool
    where
        F: FnOnce(UploadResult),
    {
        let Some(request) = self.begin_upload(file) else {
            return false;
        };
        let outcome = request.send().await;
        if let Some(result) = self.finish_upload(outcome) {
            on_complete(result);
        }
        true
    }
}
