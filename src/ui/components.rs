//! Shared UI pieces (status bar, modal geometry).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Paragraph;

use crate::app::{AppState, InputMode, KeyAction};

/// Bottom status bar with mode, counts and the main key hints.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let hint = |label: &str, action: KeyAction| format!("{}: {}", app.keymap.keys_for(action).join("/"), label);
    let hints = [
        hint("update", KeyAction::EditSelection),
        hint("delete", KeyAction::DeleteSelection),
        hint("refresh", KeyAction::Refresh),
        hint("search", KeyAction::StartSearch),
        hint("quit", KeyAction::Quit),
    ];
    let msg = format!(
        "mode: {mode}  users:{}/{}  {}",
        app.users.len(),
        app.snapshot.users.len(),
        hints.join("  ")
    );
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
