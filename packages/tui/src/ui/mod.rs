pub mod auth;
pub mod chat;
pub mod dashboard;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::state::Screen;

/// Main UI rendering function
pub fn render(frame: &mut Frame, app: &App) {
    // Create layout with status bar at bottom
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Main content area (flexible)
            Constraint::Length(1), // Status bar (fixed height)
        ])
        .split(frame.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let session = app.session.read();
    match app.state.screen(&session) {
        Screen::SignIn => auth::render_sign_in(frame, app, main_area),
        Screen::SignUp => auth::render_sign_up(frame, app, main_area),
        Screen::Dashboard => dashboard::render_with_area(frame, app, main_area),
    }

    render_status_bar(frame, app, status_area);

    // Chat renders on top of whatever screen is underneath.
    if app.chat.is_some() {
        chat::render_overlay(frame, app);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(error) = &app.state.error_message {
        (error.clone(), Style::default().fg(Color::Red))
    } else if let Some(notice) = &app.state.notice {
        (notice.clone(), Style::default().fg(Color::Green))
    } else if app.state.is_loading {
        ("Loading...".to_string(), Style::default().fg(Color::Yellow))
    } else {
        let session = app.session.read();
        let who = match session.user() {
            Some(user) => format!("{} ({})", user.username, user.role),
            None => "not signed in".to_string(),
        };
        (format!("Telcome — {who}"), Style::default().fg(Color::Gray))
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}
