//! The dashboard: tab bar plus a paged table of the selected list.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState, Tabs};

use crate::app::{App, Draft};
use crate::state::{page_slice, DashboardTab};

const TABS: [DashboardTab; 4] = [
    DashboardTab::Tickets,
    DashboardTab::Users,
    DashboardTab::Bills,
    DashboardTab::BotReview,
];

/// Render the dashboard screen with specific area
pub fn render_with_area(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Hints
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);

    let hints = if let Some(draft) = app.draft {
        match draft {
            Draft::NewTicket => "Describe the issue • Enter submit • Esc cancel",
            Draft::CannedReply => "Type the canned reply • Enter save • Esc cancel",
        }
    } else {
        match app.state.tab {
            DashboardTab::Tickets => {
                "1-4 tabs • ↑↓ select • n/p page • o new • x close • d delete • r refresh • c chat • l logout • q quit"
            }
            DashboardTab::Users => {
                "1-4 tabs • ↑↓ select • n/p page • g toggle role • d delete • r refresh • c chat • l logout • q quit"
            }
            DashboardTab::Bills => {
                "1-4 tabs • ↑↓ select • n/p page • m mark paid • d delete • r refresh • c chat • l logout • q quit"
            }
            DashboardTab::BotReview => {
                "1-4 tabs • ↑↓ select • n/p page • a answer • r refresh • c chat • l logout • q quit"
            }
        }
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TABS.iter().map(|tab| Line::from(tab.title())).collect();
    let selected = TABS.iter().position(|tab| *tab == app.state.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().title("Telcome").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.state;
    let title = format!(
        "{} ({}) — page {}/{}",
        state.tab.title(),
        state.current_len(),
        if state.total_pages() == 0 { 0 } else { state.page + 1 },
        state.total_pages()
    );
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL);

    let (header, widths, rows): (Vec<&str>, Vec<Constraint>, Vec<Row>) = match state.tab {
        DashboardTab::Tickets => (
            vec!["Ticket", "User", "Status", "Description"],
            vec![
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(20),
            ],
            page_slice(&state.tickets, state.page, state.page_size)
                .iter()
                .map(|t| {
                    Row::new(vec![
                        t.ticket_id.clone().unwrap_or_else(|| "-".to_string()),
                        t.user.clone(),
                        t.status.clone(),
                        t.description.clone(),
                    ])
                })
                .collect(),
        ),
        DashboardTab::Users => (
            vec!["Username", "Email", "Role"],
            vec![
                Constraint::Length(16),
                Constraint::Min(24),
                Constraint::Length(8),
            ],
            page_slice(&state.users, state.page, state.page_size)
                .iter()
                .map(|u| Row::new(vec![u.username.clone(), u.email.clone(), u.role.to_string()]))
                .collect(),
        ),
        DashboardTab::Bills => (
            vec!["Amount", "Status", "Address", "Description"],
            vec![
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Min(16),
                Constraint::Min(16),
            ],
            page_slice(&state.bills, state.page, state.page_size)
                .iter()
                .map(|b| {
                    Row::new(vec![
                        b.amount.clone(),
                        b.status.clone(),
                        b.billing_address.clone(),
                        b.description.clone(),
                    ])
                })
                .collect(),
        ),
        DashboardTab::BotReview => (
            vec!["Unanswered message"],
            vec![Constraint::Min(20)],
            page_slice(&state.unknown_messages, state.page, state.page_size)
                .iter()
                .map(|m| Row::new(vec![m.message.clone()]))
                .collect(),
        ),
    };

    if rows.is_empty() {
        let empty = Paragraph::new("Nothing here yet. Press 'r' to refresh.")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let table = Table::new(rows, widths)
        .header(
            Row::new(header).style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected_row));
    frame.render_stateful_widget(table, area, &mut table_state);

    if let Some(draft) = app.draft {
        render_draft_editor(frame, app, draft, area);
    }
}

/// Inline editor over the table while a ticket description or canned reply
/// is being typed.
fn render_draft_editor(frame: &mut Frame, app: &App, draft: Draft, area: Rect) {
    let height = 3;
    let editor_area = Rect::new(
        area.x + 2,
        area.bottom().saturating_sub(height + 1),
        area.width.saturating_sub(4),
        height,
    );
    frame.render_widget(ratatui::widgets::Clear, editor_area);

    let widget = Paragraph::new(app.draft_input.value()).block(
        Block::default()
            .title(draft.title())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(widget, editor_area);
    frame.set_cursor_position((
        editor_area.x + 1 + app.draft_input.visual_cursor() as u16,
        editor_area.y + 1,
    ));
}
