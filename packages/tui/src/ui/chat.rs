//! The chat overlay drawn on top of the dashboard.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use crate::app::App;
use crate::chat::ChatSender;

pub fn render_overlay(frame: &mut Frame, app: &App) {
    let Some(chat) = &app.chat else {
        return;
    };
    let area = overlay_area(frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Transcript
            Constraint::Length(3), // Input
        ])
        .split(area);

    let items: Vec<ListItem> = chat
        .messages
        .iter()
        .map(|message| {
            let style = match message.sender {
                ChatSender::User => Style::default().fg(Color::White),
                ChatSender::Bot => Style::default().fg(Color::Cyan),
            };
            let line = Line::from(vec![
                Span::styled(
                    format!("{}: ", message.sender_label()),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(message.text.clone(), style),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = if chat.waiting {
        "Support chat (…)"
    } else {
        "Support chat"
    };
    let transcript = List::new(items).block(
        Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Cyan))
            .borders(Borders::ALL),
    );
    frame.render_widget(transcript, chunks[0]);

    let input = Paragraph::new(chat.input.value()).block(
        Block::default()
            .title("Message (Enter send • Esc close)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(input, chunks[1]);
    frame.set_cursor_position((
        chunks[1].x + 1 + chat.input.visual_cursor() as u16,
        chunks[1].y + 1,
    ));
}

/// Centered overlay covering most of the terminal.
fn overlay_area(area: Rect) -> Rect {
    let width = (area.width * 4 / 5).max(20).min(area.width);
    let height = (area.height * 4 / 5).max(8).min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
