use std::path::Path;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use flightplan_core::{
    ApiError, Config, ConversationSession, FlightPlanClient, UploadResult, UploadSession,
    SUGGESTIONS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    UploadPath,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub api_base: String,

    // Sessions
    pub conversation: ConversationSession,
    pub upload: UploadSession,
    pub chat_task: Option<JoinHandle<Result<String, ApiError>>>,
    pub upload_task: Option<JoinHandle<Result<UploadResult, ApiError>>>,

    // Upload prompt
    pub upload_path_input: String,

    // Transcript view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript pane
    pub chat_width: u16,  // inner width, for wrap estimates

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing dots

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub suggestion_areas: Vec<Rect>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = FlightPlanClient::new(&config.api_base());
        let api_base = client.base_url().to_string();

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            api_base,

            conversation: ConversationSession::new(client.clone()),
            upload: UploadSession::new(client),
            chat_task: None,
            upload_task: None,

            upload_path_input: String::new(),

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            chat_area: None,
            suggestion_areas: Vec::new(),
        }
    }

    /// Send the draft in the background. Ignored while a reply is pending.
    pub fn send_draft(&mut self) {
        if let Some(request) = self.conversation.begin_submit_draft() {
            tracing::debug!(chars = request.message().chars().count(), "chat request spawned");
            self.chat_task = Some(tokio::spawn(request.send()));
            self.scroll_chat_to_bottom();
        }
    }

    pub fn click_suggestion(&mut self, idx: usize) {
        if !self.conversation.show_suggestions() {
            return;
        }
        let Some(text) = SUGGESTIONS.get(idx) else {
            return;
        };
        if let Some(request) = self.conversation.begin_suggestion(text) {
            self.chat_task = Some(tokio::spawn(request.send()));
            self.scroll_chat_to_bottom();
        }
    }

    /// Upload whatever path was typed into the prompt. A blank path does nothing.
    pub fn start_upload(&mut self) {
        let path = self.upload_path_input.trim().to_string();
        let file = (!path.is_empty()).then(|| Path::new(&path));

        if let Some(request) = self.upload.begin_upload(file) {
            tracing::debug!(path = %request.path().display(), "upload request spawned");
            self.upload_task = Some(tokio::spawn(request.send()));
        }
        self.upload_path_input.clear();
    }

    /// Fold finished background requests back into the sessions.
    pub async fn poll_tasks(&mut self) {
        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                let outcome = task
                    .await
                    .unwrap_or_else(|e| Err(ApiError::TaskFailed(e.to_string())));
                self.conversation.finish_submit(outcome);
                self.scroll_chat_to_bottom();
            }
        }

        if self.upload_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.upload_task.take() {
                let outcome = task
                    .await
                    .unwrap_or_else(|e| Err(ApiError::TaskFailed(e.to_string())));
                if let Some(result) = self.upload.finish_upload(outcome) {
                    self.conversation.ingest_upload_result(&result);
                    self.scroll_chat_to_bottom();
                }
            }
        }
    }

    pub fn tick_animation(&mut self) {
        if self.conversation.pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll so the newest message (or the typing indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        // Same paragraph the renderer draws, so wrapping matches exactly
        let total_lines = crate::ui::chat_paragraph(self).line_count(wrap_width);
        u16::try_from(total_lines)
            .unwrap_or(u16::MAX)
            .saturating_sub(visible_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use flightplan_core::{Role, BACKEND_ERROR_MARKER};

    fn unreachable_app() -> App {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        App::new(&Config {
            api_base: Some(format!("http://{}", addr)),
        })
    }

    async fn settle(app: &mut App) {
        for _ in 0..500 {
            app.poll_tasks().await;
            if app.chat_task.is_none() && app.upload_task.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("background task did not finish");
    }

    #[tokio::test]
    async fn failed_send_releases_pending() {
        let mut app = unreachable_app();
        for c in "hello".chars() {
            app.conversation.insert_char(c);
        }
        app.send_draft();
        assert!(app.conversation.pending());
        assert!(app.chat_task.is_some());

        settle(&mut app).await;
        assert!(!app.conversation.pending());
        let last = app.conversation.transcript().last().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert_eq!(last.text, BACKEND_ERROR_MARKER);
    }

    #[tokio::test]
    async fn blank_draft_spawns_nothing() {
        let mut app = unreachable_app();
        app.send_draft();
        assert!(app.chat_task.is_none());
        assert_eq!(app.conversation.transcript().len(), 1);
    }

    #[tokio::test]
    async fn suggestion_click_only_while_welcome_visible() {
        let mut app = unreachable_app();
        app.click_suggestion(0);
        assert_eq!(app.conversation.transcript()[1].text, SUGGESTIONS[0]);
        settle(&mut app).await;

        let len = app.conversation.transcript().len();
        app.click_suggestion(1);
        assert!(app.chat_task.is_none());
        assert_eq!(app.conversation.transcript().len(), len);
    }

    #[tokio::test]
    async fn out_of_range_suggestion_is_ignored() {
        let mut app = unreachable_app();
        app.click_suggestion(SUGGESTIONS.len());
        assert!(app.chat_task.is_none());
    }

    #[tokio::test]
    async fn blank_upload_path_is_a_noop() {
        let mut app = unreachable_app();
        app.upload_path_input = "   ".to_string();
        app.start_upload();
        assert!(app.upload_task.is_none());
        assert!(!app.upload.in_progress());
    }

    #[tokio::test]
    async fn missing_upload_file_shows_error() {
        let mut app = unreachable_app();
        app.upload_path_input = "/no/such/flight-plan.pdf".to_string();
        app.start_upload();
        assert!(app.upload.in_progress());
        assert!(app.upload_path_input.is_empty());

        settle(&mut app).await;
        assert!(!app.upload.in_progress());
        assert!(app.upload.error_message().unwrap().contains("flight-plan.pdf"));
        assert_eq!(app.conversation.transcript().len(), 1);
    }

    #[tokio::test]
    async fn upload_to_unreachable_backend_shows_error() {
        use std::io::Write;

        let mut doc = tempfile::Builder::new()
            .prefix("plan")
            .suffix(".txt")
            .tempfile()
            .unwrap();
        writeln!(doc, "KJFK DCT KLAX").unwrap();

        let mut app = unreachable_app();
        app.upload_path_input = doc.path().display().to_string();
        app.start_upload();
        assert!(app.upload.in_progress());

        settle(&mut app).await;
        assert!(!app.upload.in_progress());
        let err = app.upload.error_message().unwrap();
        assert!(err.starts_with("Upload failed: request failed"));
        assert_eq!(app.conversation.transcript().len(), 1);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut app = unreachable_app();
        app.chat_height = 1;
        app.chat_width = 10;
        app.scroll_down(1000);
        let max = app.chat_scroll;
        assert!(max > 0);
        app.scroll_up(1000);
        assert_eq!(app.chat_scroll, 0);
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, max);
    }
}
