use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::runtime::Handle;
use tracing::debug;

use crate::app::{AppState, EditForm, InputMode, KeyAction, ModalState, StoreCommand};
use crate::store::UserStore;
use crate::ui;

/// Keep looping or leave the event loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drive the screen until the operator quits.
///
/// Store operations are spawned on `rt` and never awaited here; the loop
/// just re-reads the store every frame. Tasks still running when the loop
/// exits are dropped with the runtime.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: AppState, rt: &Handle) -> Result<()> {
    app.start();

    loop {
        let cmds = app.take_pending();
        dispatch(&app.store, cmds, rt);
        app.refresh();
        terminal.draw(|f| ui::render(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, key) == Flow::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Spawn queued store work. Results land in the store state; failures are
/// already logged and recorded there.
pub fn dispatch(store: &Arc<UserStore>, cmds: Vec<StoreCommand>, rt: &Handle) {
    for cmd in cmds {
        let store = Arc::clone(store);
        match cmd {
            StoreCommand::Fetch => {
                rt.spawn(async move {
                    if let Err(e) = store.fetch().await {
                        debug!(error = %e, "fetch settled with error");
                    }
                });
            }
            StoreCommand::Update(patch) => {
                rt.spawn(async move {
                    if let Err(e) = store.update(patch).await {
                        debug!(error = %e, "update settled with error");
                    }
                });
            }
        }
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Flow {
    match app.input_mode {
        InputMode::Normal => return handle_normal_key(app, key),
        InputMode::Search => match key.code {
            KeyCode::Enter => app.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                app.search_query.clear();
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                app.search_query.pop();
                app.selected_user_index = 0;
            }
            KeyCode::Char(c) if is_text_input(&key) => {
                app.search_query.push(c);
                app.selected_user_index = 0;
            }
            _ => {}
        },
        InputMode::Modal => handle_modal_key(app, key),
    }
    app.refresh();
    Flow::Continue
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Flow {
    let Some(action) = app.keymap.resolve(&key) else {
        return Flow::Continue;
    };
    let rpp = app.rows_per_page.max(1);
    let last = app.users.len().saturating_sub(1);
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::Ignore => {}
        KeyAction::Refresh => app.request(StoreCommand::Fetch),
        KeyAction::StartSearch => {
            app.search_query.clear();
            app.input_mode = InputMode::Search;
        }
        KeyAction::EditSelection => {
            if let Some(user) = app.selected_user() {
                let form = EditForm::from_user(user);
                app.open_modal(ModalState::Edit(form));
            }
        }
        KeyAction::DeleteSelection => {
            if let Some(user) = app.selected_user() {
                let modal = ModalState::DeleteConfirm { id: user.id, name: user.name.clone(), selected: 1 };
                app.open_modal(modal);
            }
        }
        KeyAction::MoveUp => app.selected_user_index = app.selected_user_index.saturating_sub(1),
        KeyAction::MoveDown => app.selected_user_index = (app.selected_user_index + 1).min(last),
        KeyAction::PageUp => app.selected_user_index = app.selected_user_index.saturating_sub(rpp),
        KeyAction::PageDown => app.selected_user_index = app.selected_user_index.saturating_add(rpp).min(last),
    }
    Flow::Continue
}

/// Plain or shifted characters are text; anything chorded with Ctrl/Alt is not.
fn is_text_input(key: &KeyEvent) -> bool {
    key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT
}

fn handle_modal_key(app: &mut AppState, key: KeyEvent) {
    let code = key.code;
    match &mut app.modal {
        Some(ModalState::Edit(form)) => match code {
            KeyCode::Esc => app.close_modal(),
            KeyCode::Up | KeyCode::BackTab => form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => form.focus_next(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) if is_text_input(&key) => form.push_char(c),
            KeyCode::Enter => {
                let patch = form.to_patch();
                app.close_modal();
                app.request(StoreCommand::Update(patch));
            }
            _ => {}
        },
        Some(ModalState::DeleteConfirm { id, selected, .. }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *selected = 1 - *selected;
            }
            KeyCode::Char('y') => {
                let id = *id;
                app.store.delete_local(id);
                app.close_modal();
            }
            KeyCode::Enter => {
                let (id, yes) = (*id, *selected == 0);
                if yes {
                    app.store.delete_local(id);
                }
                app.close_modal();
            }
            _ => {}
        },
        None => app.close_modal(),
    }
}
