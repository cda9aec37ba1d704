use parley_core::{LoadingState, Message, Role};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::app::ChatApp;
use super::markdown::render_markdown;

const INPUT_PLACEHOLDER: &str = "Type a message...";

pub fn render(frame: &mut Frame, app: &mut ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_messages(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let header = Paragraph::new(app.title.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(header, area);
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, style) = match message.role {
        Role::User => ("You", Style::default().fg(Color::Green)),
        Role::Assistant => ("Assistant", Style::default().fg(Color::Blue)),
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{label}:"),
        style.add_modifier(Modifier::BOLD),
    ))];

    match message.role {
        // What the user typed is shown as typed.
        Role::User => {
            for line in message.content.lines() {
                lines.push(Line::from(format!("  {line}")));
            }
        }
        Role::Assistant => {
            for mut line in render_markdown(&message.content) {
                line.spans.insert(0, Span::raw("  "));
                lines.push(line);
            }
        }
    }

    lines
}

fn typing_indicator(tick: u64) -> Line<'static> {
    let dots = (tick / 5 % 3 + 1) as usize;
    Line::from(Span::styled(
        format!("{:<3}", "●".repeat(dots)),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    ))
}

fn render_messages(frame: &mut Frame, app: &mut ChatApp, area: Rect) {
    let state = app.store.state();
    let mut lines: Vec<Line> = Vec::new();

    for message in state.visible_messages() {
        lines.extend(message_lines(message));
        lines.push(Line::from("")); // Empty line between messages
    }

    // The indicator sits where the next reply will appear.
    if state.loading_state() == LoadingState::AwaitingReply {
        lines.push(typing_indicator(app.tick));
    }

    let messages_block = Block::default().borders(Borders::ALL).title("Messages");

    // Scrolling counts wrapped rows, not logical lines.
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let inner_width = area.width.saturating_sub(2); // Account for borders
    let visible_height = area.height.saturating_sub(2) as usize;
    let total_rows = paragraph.line_count(inner_width);
    let scroll = app.scroll.top_line(total_rows, visible_height);

    let paragraph = paragraph.block(messages_block).scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Horizontal scroll and cursor column inside an input box `inner_width` wide.
///
/// The text scrolls just enough to keep the cursor on its last column.
fn input_viewport(cursor_column: usize, inner_width: u16) -> (u16, u16) {
    let last_column = usize::from(inner_width.saturating_sub(1));
    let offset = cursor_column.saturating_sub(last_column);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let column = u16::try_from(cursor_column.min(last_column)).unwrap_or(u16::MAX);
    (offset, column)
}

fn render_input(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let input_block = Block::default().borders(Borders::ALL).title("Input");
    let input = app.store.pending_input();

    let (display_text, style) = if input.is_empty() {
        (INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        (input.text(), Style::default())
    };

    let (offset, column) = input_viewport(input.cursor_column(), area.width.saturating_sub(2));

    let input_paragraph = Paragraph::new(display_text)
        .style(style)
        .block(input_block)
        .scroll((0, offset));

    frame.render_widget(input_paragraph, area);

    let cursor_x = area
        .x
        .saturating_add(1)
        .saturating_add(column)
        .min(area.right().saturating_sub(2));
    frame.set_cursor_position((cursor_x, area.y.saturating_add(1)));
}

fn render_status_bar(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let status = match app.store.loading_state() {
        LoadingState::Idle => "Enter: Send  Ctrl+↑/↓ PgUp/PgDn: Scroll  Esc: Quit",
        LoadingState::AwaitingReply => "Waiting for reply...  Esc: Quit",
    };

    let status_bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(status_bar, area);
}
