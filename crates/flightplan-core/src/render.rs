use serde_json::Value;

use crate::upload::UploadResult;

pub const EXTRACTED_PLAN_HEADER: &str = "📄 Extracted flight plan from uploaded document:";

/// Bot message text for a finished upload.
///
/// Prefers the `flight_plan` field; anything else is shown as-is.
pub fn upload_result_message(result: &UploadResult) -> String {
    let body = match result {
        UploadResult::Json(value) => pretty(result.flight_plan().unwrap_or(value)),
        UploadResult::Text(text) => text.clone(),
    };
    format!("{}\n{}", EXTRACTED_PLAN_HEADER, body)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
