use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::app::AppState;
use crate::app::form::{EditForm, FORM_FIELDS};
use crate::model::UserId;
use crate::ui::components::centered_rect;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(app.users.len());
    let slice = app.users.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let absolute_index = start + i;
        let style = if absolute_index == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else if absolute_index % 2 == 0 {
            Style::default().fg(app.theme.text).bg(app.theme.even_row_bg)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.id.to_string()),
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.phone.clone()),
            Cell::from(u.city_with_zip()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(22),
        Constraint::Percentage(28),
        Constraint::Percentage(22),
        Constraint::Percentage(28),
    ];
    let header = Row::new(vec!["ID", "NAME", "EMAIL", "PHONE", "CITY WITH ZIP CODE"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!("Users ({})", app.users.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

pub fn render_edit_form(f: &mut Frame, area: Rect, app: &AppState, form: &EditForm) {
    let rect = centered_rect(56, (FORM_FIELDS.len() as u16) + 5, area);
    let mut body = String::new();
    for (idx, label) in FORM_FIELDS.iter().enumerate() {
        let marker = if idx == form.focused { "▶" } else { " " };
        body.push_str(&format!("{marker} {:<9} {}\n", format!("{label}:"), form.value(idx)));
    }
    body.push_str("\nEnter: update   Esc: cancel");
    let p = Paragraph::new(body).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title(format!("Update User #{}", form.id))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_delete_confirm(f: &mut Frame, area: Rect, app: &AppState, id: UserId, name: &str, selected: usize) {
    let rect = centered_rect(50, 7, area);
    let yes = if selected == 0 { "[Yes]" } else { " Yes " };
    let no = if selected == 1 { "[No]" } else { " No " };
    let body = format!("Are you sure you want to delete this user?\n{name} (id {id})\n\n  {yes}    {no}");
    let p = Paragraph::new(body).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Confirm delete")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
