//! userdesk binary entry point.
//!
//! Parses options, builds the store over the HTTP service, runs the TUI
//! event loop and restores the terminal state on exit.
//!
use std::sync::Arc;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use userdesk::api::HttpUsersApi;
use userdesk::app::{self, AppState, Keymap, Theme};
use userdesk::cli::{Cli, init_logging};
use userdesk::error::{Context, Result};
use userdesk::store::UserStore;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let api = HttpUsersApi::new(cli.api_config())?;
    info!(base_url = api.base_url(), "starting userdesk");
    let store = Arc::new(UserStore::new(Arc::new(api)));
    let theme = Theme::load_or_init(&cli.theme);
    let keymap = Keymap::load_or_init(&cli.keybinds);

    let runtime = tokio::runtime::Runtime::new().with_ctx(|| "start async runtime".to_string())?;

    let mut terminal = init_terminal()?;
    let res = app::run(&mut terminal, AppState::new(store, theme, keymap), runtime.handle());

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        eprintln!("application error: {err}");
    }
    // In-flight requests are abandoned, not awaited.
    runtime.shutdown_background();
    Ok(())
}
