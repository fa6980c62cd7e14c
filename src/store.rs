//! Client-side user store.
//!
//! Holds the user collection plus the status of the two network operations
//! that touch it. The store is owned explicitly (usually behind an `Arc`) and
//! observed through a `watch` channel; there is no global instance.
//!
//! Operations may overlap. Nothing sequences them: each one applies its
//! start transition when called and its settle transition when its request
//! completes, so whichever request settles last decides the final
//! `loading`/`error`/`users` values. An earlier call can therefore overwrite
//! the result of a later one. There is no cancellation either; a request
//! whose caller went away still settles into the state.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::UsersApi;
use crate::model::{User, UserId, UserPatch};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    FetchFailed(String),
    #[error("{0}")]
    UpdateFailed(String),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            Self::FetchFailed(m) | Self::UpdateFailed(m) => m,
        }
    }
}

/// Observable store state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreState {
    /// In server response order.
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreState {
    pub fn with_users(users: Vec<User>) -> Self {
        Self { users, ..Self::default() }
    }

    /// Start of a fetch or update.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn settle_fetch(&mut self, outcome: Result<Vec<User>, String>) {
        self.loading = false;
        match outcome {
            Ok(users) => self.users = users,
            Err(message) => self.error = Some(message),
        }
    }

    /// Merges the echoed record into the entry with the same id; an unknown
    /// id leaves the collection as it is.
    pub fn settle_update(&mut self, outcome: Result<UserPatch, String>) {
        self.loading = false;
        match outcome {
            Ok(reply) => {
                if let Some(user) = self.users.iter_mut().find(|u| u.id == reply.id) {
                    user.merge(reply);
                }
            }
            Err(message) => self.error = Some(message),
        }
    }

    /// Drops every entry with `id`. Returns how many were removed.
    pub fn remove(&mut self, id: UserId) -> usize {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        before - self.users.len()
    }
}

pub struct UserStore {
    api: Arc<dyn UsersApi>,
    state: watch::Sender<StoreState>,
}

impl UserStore {
    pub fn new(api: Arc<dyn UsersApi>) -> Self {
        Self::with_state(api, StoreState::default())
    }

    pub fn with_state(api: Arc<dyn UsersApi>, initial: StoreState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { api, state }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every transition.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Replaces the collection with the service's list.
    ///
    /// On failure the collection is left as it was and the error slot is set.
    pub async fn fetch(&self) -> Result<(), StoreError> {
        self.state.send_modify(StoreState::begin);
        debug!("fetching users");

        // Last settled wins: a fetch that completes after a newer update
        // replaces that update's merged entry with the listed one.
        match self.api.list_users().await {
            Ok(users) => {
                info!(count = users.len(), "users fetched");
                self.state.send_modify(|s| s.settle_fetch(Ok(users)));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "fetching users failed");
                self.state.send_modify(|s| s.settle_fetch(Err(message.clone())));
                Err(StoreError::FetchFailed(message))
            }
        }
    }

    /// Sends `patch` to the service and merges the echoed record.
    pub async fn update(&self, patch: UserPatch) -> Result<(), StoreError> {
        self.state.send_modify(StoreState::begin);
        debug!(id = patch.id, "updating user");

        match self.api.update_user(&patch).await {
            Ok(reply) => {
                info!(id = reply.id, "user updated");
                self.state.send_modify(|s| s.settle_update(Ok(reply)));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                warn!(id = patch.id, error = %message, "updating user failed");
                self.state.send_modify(|s| s.settle_update(Err(message.clone())));
                Err(StoreError::UpdateFailed(message))
            }
        }
    }

    /// Removes the user from the local collection only.
    ///
    /// The service is never told; the remote record stays in place.
    pub fn delete_local(&self, id: UserId) {
        let mut removed = 0;
        self.state.send_modify(|s| removed = s.remove(id));
        debug!(id, removed, "user removed locally");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: UserId, name: &str) -> User {
        User { id, name: name.into(), ..User::default() }
    }

    #[test]
    fn begin_clears_error_and_sets_loading() {
        let mut s = StoreState { error: Some("boom".into()), ..StoreState::default() };
        s.begin();
        assert!(s.loading);
        assert!(s.error.is_none());
    }

    #[test]
    fn failed_fetch_keeps_users() {
        let mut s = StoreState::with_users(vec![user(1, "a")]);
        s.begin();
        s.settle_fetch(Err("Network Error".into()));
        assert_eq!(s.users.len(), 1);
        assert!(!s.loading);
        assert_eq!(s.error.as_deref(), Some("Network Error"));
    }

    #[test]
    fn remove_counts_duplicates() {
        let mut s = StoreState::with_users(vec![user(1, "a"), user(2, "b"), user(1, "c")]);
        assert_eq!(s.remove(1), 2);
        assert_eq!(s.remove(1), 0);
        assert_eq!(s.users, vec![user(2, "b")]);
    }

    #[test]
    fn update_for_unknown_id_adds_nothing() {
        let mut s = StoreState::with_users(vec![user(1, "a")]);
        s.begin();
        s.settle_update(Ok(UserPatch::new(999).name("ghost")));
        assert_eq!(s.users, vec![user(1, "a")]);
        assert!(!s.loading);
    }
}
