//! Rendering: a pure function of `AppState` to a frame.

pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    render_header(f, root[0], app);
    users::render_users_table(f, root[1], app);
    components::render_status_bar(f, root[2], app);

    let area = f.area();
    match app.modal.clone() {
        Some(ModalState::Edit(form)) => users::render_edit_form(f, area, app, &form),
        Some(ModalState::DeleteConfirm { id, name, selected }) => {
            users::render_delete_confirm(f, area, app, id, &name, selected)
        }
        None => {}
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines = vec![Line::from(match app.input_mode {
        InputMode::Search => format!("Search: {}", app.search_query),
        _ => "User Table".to_string(),
    })];
    if app.snapshot.loading {
        lines.push(Line::from(Span::styled("Loading...", Style::default().fg(app.theme.muted))));
    }
    if let Some(err) = &app.snapshot.error {
        lines.push(Line::from(Span::styled(format!("Error: {err}"), Style::default().fg(app.theme.error_fg))));
    }
    let p = Paragraph::new(lines)
        .block(
            Block::default()
                .title("userdesk")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}
