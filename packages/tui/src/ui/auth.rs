//! Sign-in and sign-up screens.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tui_input::Input;

use crate::app::App;
use crate::forms::{SignInField, SignUpField};

pub fn render_sign_in(frame: &mut Frame, app: &App, area: Rect) {
    let form_area = centered_form(area, 5);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(2), // Hints
        ])
        .split(form_area);

    let outer = Block::default()
        .title("Telcome — Sign in")
        .title_style(Style::default().fg(Color::Cyan))
        .borders(Borders::ALL);
    frame.render_widget(outer, pad(form_area));

    render_field(
        frame,
        chunks[0],
        "Email",
        &app.signin.email,
        app.signin.focus == SignInField::Email,
        false,
    );
    render_field(
        frame,
        chunks[1],
        "Password",
        &app.signin.password,
        app.signin.focus == SignInField::Password,
        true,
    );

    let hints = Paragraph::new("Tab switch field • Enter sign in • F2 create account • Esc quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[2]);
}

pub fn render_sign_up(frame: &mut Frame, app: &App, area: Rect) {
    let form_area = centered_form(area, 6);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Username
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(2), // Hints
        ])
        .split(form_area);

    let outer = Block::default()
        .title("Telcome — Create account")
        .title_style(Style::default().fg(Color::Cyan))
        .borders(Borders::ALL);
    frame.render_widget(outer, pad(form_area));

    render_field(
        frame,
        chunks[0],
        "Username",
        &app.signup.username,
        app.signup.focus == SignUpField::Username,
        false,
    );
    render_field(
        frame,
        chunks[1],
        "Email",
        &app.signup.email,
        app.signup.focus == SignUpField::Email,
        false,
    );
    render_field(
        frame,
        chunks[2],
        "Password",
        &app.signup.password,
        app.signup.focus == SignUpField::Password,
        true,
    );

    let hints = Paragraph::new("Tab switch field • Enter register • Esc back to sign in")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, chunks[3]);
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &Input,
    focused: bool,
    masked: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let value = if masked {
        "*".repeat(input.value().chars().count())
    } else {
        input.value().to_string()
    };

    let widget = Paragraph::new(value).block(
        Block::default()
            .title(label)
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(widget, area);

    if focused {
        // Cursor sits after the typed text, inside the field border.
        let x = area.x + 1 + input.visual_cursor() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Center a form of `rows` three-line fields horizontally and vertically.
fn centered_form(area: Rect, rows: u16) -> Rect {
    let height = rows * 3;
    let width = 48.min(area.width);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height.min(area.height))
}

/// The outer titled block draws one cell around the field stack.
fn pad(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_sub(1),
        area.y.saturating_sub(1),
        area.width + 2,
        area.height + 2,
    )
}
