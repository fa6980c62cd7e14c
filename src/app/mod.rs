//! Application state for the users screen.
//!
//! `AppState` is what the renderer reads and the key handler mutates. It
//! never talks to the network: store operations that need I/O are queued as
//! [`StoreCommand`]s and spawned by the event loop.

pub mod form;
pub mod keymap;
pub mod theme;
pub mod update;

use std::sync::Arc;

use crate::model::{User, UserId, UserPatch};
use crate::search::apply_search;
use crate::store::{StoreState, UserStore};

pub use form::EditForm;
pub use keymap::{KeyAction, Keymap};
pub use theme::Theme;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalState {
    /// Edit form seeded from the selected user.
    Edit(EditForm),
    /// Yes/No before removing a row. `selected`: 0 = Yes, 1 = No.
    DeleteConfirm { id: UserId, name: String, selected: usize },
}

/// Store work the key handler asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCommand {
    Fetch,
    Update(UserPatch),
}

pub struct AppState {
    pub store: Arc<UserStore>,
    /// Last state observed from the store.
    pub snapshot: StoreState,
    /// Rows currently shown (snapshot filtered by the search query).
    pub users: Vec<User>,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub search_query: String,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub pending: Vec<StoreCommand>,
    started: bool,
}

impl AppState {
    pub fn new(store: Arc<UserStore>, theme: Theme, keymap: Keymap) -> Self {
        let mut app = Self {
            snapshot: store.snapshot(),
            store,
            users: Vec::new(),
            selected_user_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            theme,
            keymap,
            modal: None,
            pending: Vec::new(),
            started: false,
        };
        apply_search(&mut app);
        app
    }

    /// Re-read the store and rebuild the visible rows.
    pub fn refresh(&mut self) {
        self.snapshot = self.store.snapshot();
        apply_search(self);
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected_user_index)
    }

    /// Queue the initial fetch. Later calls do nothing.
    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.request(StoreCommand::Fetch);
        }
    }

    pub fn request(&mut self, cmd: StoreCommand) {
        self.pending.push(cmd);
    }

    pub fn take_pending(&mut self) -> Vec<StoreCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
