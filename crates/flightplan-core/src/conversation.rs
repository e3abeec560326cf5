//! Conversation session: the transcript, the draft being typed, and the one
//! chat request allowed in flight at a time.

use crate::api::FlightPlanClient;
use crate::error::ApiError;
use crate::render::upload_result_message;
use crate::state::{Message, Role};
use crate::upload::UploadResult;

pub const GREETING: &str = "👋 Hi! I can help you with flight plans. Try asking \"When is Go Live?\"";

/// Bot reply shown when the chat backend cannot be reached or answers with an error
pub const BACKEND_ERROR_MARKER: &str = "❌ Error talking to backend.";

/// Starter prompts offered until the user says something
pub const SUGGESTIONS: [&str; 4] = [
    "Generate flight plan for NYC to LAX",
    "Upload flight documents",
    "Help with flight regulations",
    "Show me last flight plan",
];

/// A chat request that has been started but not yet sent
#[derive(Debug)]
pub struct PendingChat {
    client: FlightPlanClient,
    message: String,
}

impl PendingChat {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub async fn send(self) -> Result<String, ApiError> {
        self.client.chat(&self.message).await
    }
}

pub struct ConversationSession {
    client: FlightPlanClient,
    transcript: Vec<Message>,
    draft_input: String,
    draft_cursor: usize, // char index into draft_input
    pending: bool,
}

impl ConversationSession {
    pub fn new(client: FlightPlanClient) -> Self {
        Self {
            client,
            transcript: vec![Message::bot(GREETING)],
            draft_input: String::new(),
            draft_cursor: 0,
            pending: false,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    /// Suggestions are offered only until the first user message
    pub fn show_suggestions(&self) -> bool {
        !self.transcript.iter().any(|m| m.role == Role::User)
    }

    /// Append the user's message, clear the draft and mark the session pending.
    ///
    /// Returns `None` without touching state for blank text or while another
    /// request is still in flight.
    pub fn begin_submit(&mut self, text: &str) -> Option<PendingChat> {
        if text.trim().is_empty() {
            return None;
        }
        if self.pending {
            tracing::debug!("chat send rejected, a request is already pending");
            return None;
        }

        self.transcript.push(Message::user(text));
        self.clear_draft();
        self.pending = true;
        tracing::info!(chars = text.chars().count(), "chat message sent");

        Some(PendingChat {
            client: self.client.clone(),
            message: text.to_string(),
        })
    }

    /// Record the bot's reply (or the error marker) and release `pending`.
    pub fn finish_submit(&mut self, outcome: Result<String, ApiError>) {
        let text = match outcome {
            Ok(reply) => {
                tracing::info!(chars = reply.chars().count(), "chat reply received");
                reply
            }
            Err(err) => {
                tracing::warn!(error = %err, status = ?err.status(), "chat request failed");
                BACKEND_ERROR_MARKER.to_string()
            }
        };
        self.transcript.push(Message::bot(text));
        self.pending = false;
    }

    /// Send `text` and wait for the reply. Returns `false` when the call was a no-op.
    pub async fn submit(&mut self, text: &str) -> bool {
        let Some(request) = self.begin_submit(text) else {
            return false;
        };
        let outcome = request.send().await;
        self.finish_submit(outcome);
        true
    }

    pub fn begin_suggestion(&mut self, text: &str) -> Option<PendingChat> {
        self.begin_submit(text)
    }

    pub async fn suggestion_clicked(&mut self, text: &str) -> bool {
        self.submit(text).await
    }

    /// Submit whatever is in the draft
    pub fn begin_submit_draft(&mut self) -> Option<PendingChat> {
        let text = self.draft_input.clone();
        self.begin_submit(&text)
    }

    pub fn ingest_upload_result(&mut self, result: &UploadResult) {
        self.transcript.push(Message::bot(upload_result_message(result)));
    }

    // Draft editing

    pub fn draft_input(&self) -> &str {
        &self.draft_input
    }

    pub fn draft_cursor(&self) -> usize {
        self.draft_cursor
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft_input, self.draft_cursor);
        self.draft_input.insert(byte_pos, c);
        self.draft_cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.draft_cursor > 0 {
            self.draft_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft_input, self.draft_cursor);
            self.draft_input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.draft_cursor < self.draft_input.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft_input, self.draft_cursor);
            self.draft_input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.draft_cursor = self.draft_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.draft_input.chars().count();
        self.draft_cursor = (self.draft_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.draft_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.draft_cursor = self.draft_input.chars().count();
    }

    fn clear_draft(&mut self) {
        self.draft_input.clear();
        self.draft_cursor = 0;
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn session() -> ConversationSession {
        ConversationSession::new(FlightPlanClient::new("http://127.0.0.1:9"))
    }

    #[test]
    fn new_session_starts_with_greeting() {
        let chat = session();
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.transcript()[0].role, Role::Bot);
        assert_eq!(chat.transcript()[0].text, GREETING);
        assert!(!chat.pending());
        assert!(chat.show_suggestions());
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = session();
        assert!(chat.begin_submit("").is_none());
        assert!(chat.begin_submit("   \t\n").is_none());
        assert_eq!(chat.transcript().len(), 1);
        assert!(!chat.pending());
    }

    #[test]
    fn begin_appends_user_message_and_sets_pending() {
        let mut chat = session();
        for c in "hello".chars() {
            chat.insert_char(c);
        }
        let pending = chat.begin_submit_draft().unwrap();
        assert_eq!(pending.message(), "hello");
        assert!(chat.pending());
        assert_eq!(chat.draft_input(), "");
        assert_eq!(chat.draft_cursor(), 0);

        let last = chat.transcript().last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.text, "hello");
    }

    #[test]
    fn text_is_sent_untrimmed() {
        let mut chat = session();
        let pending = chat.begin_submit("  spaced  ").unwrap();
        assert_eq!(pending.message(), "  spaced  ");
        assert_eq!(chat.transcript()[1].text, "  spaced  ");
    }

    #[test]
    fn second_send_rejected_while_pending() {
        let mut chat = session();
        let _first = chat.begin_submit("first").unwrap();
        assert!(chat.begin_submit("second").is_none());
        assert_eq!(chat.transcript().len(), 2);
    }

    #[test]
    fn finish_success_appends_reply_and_releases() {
        let mut chat = session();
        chat.begin_submit("Generate flight plan for NYC to LAX");
        chat.finish_submit(Ok("Here is your plan...".to_string()));

        assert!(!chat.pending());
        assert_eq!(chat.transcript().len(), 3);
        let last = chat.transcript().last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert_eq!(last.text, "Here is your plan...");
    }

    #[test]
    fn finish_failure_appends_marker_and_releases() {
        let mut chat = session();
        chat.begin_submit("hi");
        chat.finish_submit(Err(ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }));

        assert!(!chat.pending());
        assert_eq!(chat.transcript().last().unwrap().text, BACKEND_ERROR_MARKER);
        assert!(chat.begin_submit("again").is_some());
    }

    #[test]
    fn suggestions_hidden_after_first_user_message() {
        let mut chat = session();
        chat.begin_suggestion(SUGGESTIONS[0]);
        assert!(!chat.show_suggestions());
        chat.finish_submit(Err(ApiError::TaskFailed("gone".to_string())));
        assert!(!chat.show_suggestions());
    }

    #[test]
    fn upload_results_do_not_hide_suggestions() {
        let mut chat = session();
        chat.ingest_upload_result(&UploadResult::Json(json!({"flight_plan": {"origin": "NYC"}})));
        assert!(chat.show_suggestions());
        let last = chat.transcript().last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert!(last.text.contains("\"origin\": \"NYC\""));
    }

    #[test]
    fn utf8_draft_editing_is_safe() {
        let mut chat = session();
        chat.insert_char('a');
        chat.insert_char('✈');
        chat.insert_char('é');
        assert_eq!(chat.draft_input(), "a✈é");
        assert_eq!(chat.draft_cursor(), 3);

        chat.cursor_left();
        chat.backspace();
        assert_eq!(chat.draft_input(), "aé");
        assert_eq!(chat.draft_cursor(), 1);

        chat.cursor_home();
        chat.delete();
        assert_eq!(chat.draft_input(), "é");

        chat.cursor_end();
        chat.cursor_right();
        assert_eq!(chat.draft_cursor(), 1);
        chat.backspace();
        chat.backspace();
        assert_eq!(chat.draft_input(), "");
    }
}
