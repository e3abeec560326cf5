use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::UploadPath => handle_upload_path_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,

        // Welcome suggestions, numbered from 1
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            app.click_suggestion(idx);
        }

        // Transcript scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up((app.chat_height / 2).max(1));
        }
        KeyCode::Char('u') => {
            if !app.upload.in_progress() {
                app.upload_path_input.clear();
                app.input_mode = InputMode::UploadPath;
            }
        }

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::Char('g') => app.scroll_top(),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    // Input is locked until the pending reply lands
    if app.conversation.pending() {
        return;
    }

    if key.code == KeyCode::Enter {
        app.send_draft();
        return;
    }

    let chat = &mut app.conversation;
    match key.code {
        KeyCode::Backspace => chat.backspace(),
        KeyCode::Delete => chat.delete(),
        KeyCode::Left => chat.cursor_left(),
        KeyCode::Right => chat.cursor_right(),
        KeyCode::Home => chat.cursor_home(),
        KeyCode::End => chat.cursor_end(),
        KeyCode::Char(c) => chat.insert_char(c),
        _ => {}
    }
}

fn handle_upload_path_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.upload_path_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.start_upload();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.upload_path_input.pop();
        }
        KeyCode::Char(c) => app.upload_path_input.push(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked = app
                .suggestion_areas
                .iter()
                .position(|r| point_in_rect(x, y, *r));
            if let Some(idx) = clicked {
                app.click_suggestion(idx);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightplan_core::Config;

    fn app() -> App {
        App::new(&Config {
            api_base: Some("http://127.0.0.1:9".to_string()),
        })
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = app();
        app.input_mode = InputMode::Editing;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn typing_edits_the_draft() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);

        for c in "KJFK".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.conversation.draft_input(), "KJF");

        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.conversation.draft_input(), "KJF");
    }

    #[test]
    fn upload_prompt_cancel_clears_path() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('u')));
        assert_eq!(app.input_mode, InputMode::UploadPath);

        handle_key(&mut app, press(KeyCode::Char('a')));
        assert_eq!(app.upload_path_input, "a");
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.upload_path_input.is_empty());
    }

    #[test]
    fn empty_upload_prompt_does_nothing() {
        let mut app = app();
        handle_key(&mut app, press(KeyCode::Char('u')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.upload_task.is_none());
        assert!(!app.upload.in_progress());
    }

    #[test]
    fn point_in_rect_edges() {
        let r = Rect::new(2, 3, 4, 1);
        assert!(point_in_rect(2, 3, r));
        assert!(point_in_rect(5, 3, r));
        assert!(!point_in_rect(6, 3, r));
        assert!(!point_in_rect(2, 4, r));
    }
}
