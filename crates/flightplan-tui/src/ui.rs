use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use flightplan_core::{Message, Role, SUGGESTIONS};
use crate::app::{App, InputMode};

const BOT_AVATAR: &str = "🤖";
const USER_AVATAR: &str = "🧑";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let welcome_height = if app.conversation.show_suggestions() {
        (SUGGESTIONS.len() + 2) as u16 // +2 for borders
    } else {
        0
    };
    let upload_height = if app.upload.in_progress() || app.upload.error_message().is_some() {
        1
    } else {
        0
    };

    let [header_area, welcome_area, upload_area, chat_area, input_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(welcome_height),
            Constraint::Length(upload_height),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(frame, header_area);

    app.suggestion_areas.clear();
    if welcome_height > 0 {
        render_welcome(app, frame, welcome_area);
    }
    if upload_height > 0 {
        render_upload_status(app, frame, upload_area);
    }

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 🛫 Flight Plan Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Indexed(105)))
        .title(" Try one of these: ");

    let inner = block.inner(area);
    let lines: Vec<Line> = SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::Black).bg(Color::Indexed(147))),
                Span::raw(" "),
                Span::styled(*text, Style::default().fg(Color::Indexed(189))),
            ])
        })
        .collect();

    // One clickable row per suggestion
    for i in 0..SUGGESTIONS.len() as u16 {
        if i < inner.height {
            app.suggestion_areas.push(Rect::new(inner.x, inner.y + i, inner.width, 1));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_upload_status(app: &App, frame: &mut Frame, area: Rect) {
    let line = if app.upload.in_progress() {
        Line::from(Span::styled(
            " Uploading and processing...",
            Style::default().fg(Color::Blue),
        ))
    } else if let Some(err) = app.upload.error_message() {
        Line::from(Span::styled(format!(" Error: {}", err), Style::default().fg(Color::Red)))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let (header, style, alignment) = match msg.role {
        Role::User => (
            format!("{} {} You", msg.time_label(), USER_AVATAR),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Alignment::Right,
        ),
        Role::Bot => (
            format!("{} Bot {}", BOT_AVATAR, msg.time_label()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Alignment::Left,
        ),
    };

    let mut lines = vec![Line::from(Span::styled(header, style)).alignment(alignment)];
    for text in msg.text.lines() {
        lines.push(Line::from(text.to_string()).alignment(alignment));
    }
    lines.push(Line::default());
    lines
}

/// Transcript plus typing indicator, wrapped the way the chat pane draws it
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = app
        .conversation
        .transcript()
        .iter()
        .flat_map(message_lines)
        .collect();

    if app.conversation.pending() {
        lines.push(Line::from(Span::styled(
            format!("{} Bot", BOT_AVATAR),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Typing indicator, one to three dots
        let dots = "•".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            dots,
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store for mouse hit-testing and scroll calculations (inner size minus borders)
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", app.api_base));

    let chat = chat_paragraph(app)
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.conversation.pending();

    let (title, text, cursor) = match app.input_mode {
        InputMode::UploadPath => (
            " Upload flight document: path (Enter to upload, Esc to cancel) ".to_string(),
            app.upload_path_input.clone(),
            app.upload_path_input.chars().count(),
        ),
        _ if pending => (
            " ... ".to_string(),
            app.conversation.draft_input().to_string(),
            app.conversation.draft_cursor(),
        ),
        _ => (
            " Ask a question... (Enter to send) ".to_string(),
            app.conversation.draft_input().to_string(),
            app.conversation.draft_cursor(),
        ),
    };

    let active = match app.input_mode {
        InputMode::UploadPath => true,
        InputMode::Editing => !pending,
        InputMode::Normal => false,
    };
    let border_color = if active { Color::Yellow } else { Color::DarkGray };
    let text_color = if pending && app.input_mode != InputMode::UploadPath {
        Color::DarkGray
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll so the cursor stays in view (inner width minus borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || cursor < inner_width {
        0
    } else {
        cursor - inner_width + 1
    };

    let visible_text: String = text.chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(block);
    frame.render_widget(input, area);

    if active {
        let cursor_x = (cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::UploadPath => (" UPLOAD ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    let hints = match app.input_mode {
        InputMode::Normal => {
            if app.conversation.show_suggestions() {
                " i:type  1-4:suggestion  u:upload  j/k:scroll  q:quit"
            } else {
                " i:type  u:upload  j/k:scroll  g/G:top/bottom  q:quit"
            }
        }
        InputMode::Editing => " Enter:send  Esc:normal",
        InputMode::UploadPath => " Enter:upload  Esc:cancel",
    };

    let footer = Line::from(vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
