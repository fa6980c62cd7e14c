// Unit tests for userdesk
// Store transitions run against an in-process fake whose replies are released by hand.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::oneshot;
use userdesk::api::{ApiError, ApiResult, UsersApi};
use userdesk::model::{Address, User, UserPatch};

type ListGate = oneshot::Receiver<ApiResult<Vec<User>>>;
type UpdateGate = oneshot::Receiver<ApiResult<UserPatch>>;

/// Each call takes the next gate and waits until the test sends its outcome.
#[derive(Default)]
struct GatedApi {
    list: Mutex<VecDeque<ListGate>>,
    update: Mutex<VecDeque<UpdateGate>>,
    calls: AtomicUsize,
    sent: Mutex<Vec<UserPatch>>,
}

impl GatedApi {
    fn gate_list(&self) -> oneshot::Sender<ApiResult<Vec<User>>> {
        let (tx, rx) = oneshot::channel();
        self.list.lock().unwrap().push_back(rx);
        tx
    }

    fn gate_update(&self) -> oneshot::Sender<ApiResult<UserPatch>> {
        let (tx, rx) = oneshot::channel();
        self.update.lock().unwrap().push_back(rx);
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsersApi for GatedApi {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.list.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(ApiError::Decode("gate dropped".into()))),
            None => Err(ApiError::Decode("no list gate".into())),
        }
    }

    async fn update_user(&self, patch: &UserPatch) -> ApiResult<UserPatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(patch.clone());
        let gate = self.update.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(ApiError::Decode("gate dropped".into()))),
            None => Err(ApiError::Decode("no update gate".into())),
        }
    }
}

fn user(id: u64, name: &str, email: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: "555".to_string(),
        address: Address::new("Gwenborough", "92998"),
        ..User::default()
    }
}

fn server_error() -> ApiError {
    ApiError::Status { status: 500, message: "Internal Server Error".into() }
}

#[cfg(test)]
mod store_tests {
    use super::*;
    use userdesk::store::{StoreError, StoreState, UserStore};

    fn store_with(api: &Arc<GatedApi>, users: Vec<User>) -> UserStore {
        UserStore::with_state(api.clone(), StoreState::with_users(users))
    }

    #[tokio::test]
    async fn fetch_replaces_collection_wholesale() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, (10..15).map(|i| user(i, "old", "o@x")).collect());
        api.gate_list()
            .send(Ok(vec![user(1, "a", "a@x"), user(2, "b", "b@x"), user(3, "c", "c@x")]))
            .unwrap();

        store.fetch().await.unwrap();

        let s = store.snapshot();
        assert_eq!(s.users.len(), 3);
        assert_eq!(s.users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(!s.loading);
        assert!(s.error.is_none());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_users_and_records_error() {
        let api = Arc::new(GatedApi::default());
        let before = vec![user(1, "a", "a@x")];
        let store = store_with(&api, before.clone());
        api.gate_list().send(Err(server_error())).unwrap();

        let err = store.fetch().await.unwrap_err();

        assert!(matches!(err, StoreError::FetchFailed(_)));
        let s = store.snapshot();
        assert_eq!(s.users, before);
        assert!(!s.loading);
        assert!(!s.error.as_deref().unwrap_or_default().is_empty());
        assert_eq!(s.error.as_deref(), Some(err.message()));
    }

    #[tokio::test]
    async fn loading_is_set_while_request_is_in_flight() {
        let api = Arc::new(GatedApi::default());
        let store = Arc::new(UserStore::with_state(
            api.clone(),
            StoreState { error: Some("stale".into()), ..StoreState::default() },
        ));
        let tx = api.gate_list();
        let mut rx = store.subscribe();

        let s = store.clone();
        let task = tokio::spawn(async move { s.fetch().await });
        rx.changed().await.unwrap();
        {
            let seen = rx.borrow_and_update();
            assert!(seen.loading);
            assert!(seen.error.is_none());
        }

        tx.send(Ok(vec![])).unwrap();
        task.await.unwrap().unwrap();
        assert!(!store.snapshot().loading);
    }

    #[tokio::test]
    async fn update_merges_reply_into_existing_entry() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, vec![user(1, "A", "a@x")]);
        api.gate_update().send(Ok(UserPatch::new(1).name("B"))).unwrap();

        store.update(UserPatch::new(1).name("B")).await.unwrap();

        let s = store.snapshot();
        assert_eq!(s.users.len(), 1);
        assert_eq!(s.users[0].name, "B");
        assert_eq!(s.users[0].email, "a@x");
        assert_eq!(s.users[0].address.city, "Gwenborough");
    }

    #[tokio::test]
    async fn update_matches_on_reply_id() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, vec![user(1, "A", "a@x"), user(2, "Z", "z@x")]);
        api.gate_update().send(Ok(UserPatch::new(2).name("Echoed"))).unwrap();

        store.update(UserPatch::new(1).name("Sent")).await.unwrap();

        let s = store.snapshot();
        assert_eq!(s.users[0].name, "A");
        assert_eq!(s.users[1].name, "Echoed");
    }

    #[tokio::test]
    async fn update_for_unknown_id_does_not_add_entry() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, vec![user(1, "A", "a@x")]);
        api.gate_update().send(Ok(UserPatch::new(999).name("ghost"))).unwrap();

        store.update(UserPatch::new(999).name("ghost")).await.unwrap();

        assert_eq!(store.snapshot().users, vec![user(1, "A", "a@x")]);
    }

    #[tokio::test]
    async fn failed_update_leaves_users_untouched() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, vec![user(1, "A", "a@x")]);
        api.gate_update()
            .send(Err(ApiError::Status { status: 404, message: "Not Found".into() }))
            .unwrap();

        let err = store.update(UserPatch::new(1).name("B")).await.unwrap_err();

        assert!(matches!(err, StoreError::UpdateFailed(ref m) if m.contains("404")));
        let s = store.snapshot();
        assert_eq!(s.users[0].name, "A");
        assert!(!s.loading);
        assert!(s.error.is_some());
    }

    #[tokio::test]
    async fn next_start_clears_previous_error() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, vec![]);
        api.gate_list().send(Err(server_error())).unwrap();
        api.gate_list().send(Ok(vec![user(1, "A", "a@x")])).unwrap();

        assert!(store.fetch().await.is_err());
        assert!(store.snapshot().error.is_some());
        store.fetch().await.unwrap();
        assert!(store.snapshot().error.is_none());
    }

    #[test]
    fn delete_local_is_idempotent_and_never_calls_the_service() {
        let api = Arc::new(GatedApi::default());
        let store = store_with(&api, vec![user(1, "A", "a@x"), user(2, "B", "b@x")]);

        store.delete_local(1);
        let once = store.snapshot().users;
        store.delete_local(1);
        let twice = store.snapshot().users;

        assert_eq!(once, twice);
        assert_eq!(once, vec![user(2, "B", "b@x")]);
        store.delete_local(42);
        assert_eq!(store.snapshot().users.len(), 1);
        assert_eq!(api.calls(), 0);
    }

    async fn wait_for_calls(api: &GatedApi, n: usize) {
        while api.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn later_settling_update_wins_over_earlier_issued_fetch() {
        let api = Arc::new(GatedApi::default());
        let store = Arc::new(store_with(&api, vec![user(1, "A", "a@x")]));
        let fetch_tx = api.gate_list();
        let update_tx = api.gate_update();

        let s = store.clone();
        let fetch = tokio::spawn(async move { s.fetch().await });
        wait_for_calls(&api, 1).await;
        let s = store.clone();
        let update = tokio::spawn(async move { s.update(UserPatch::new(1).name("B")).await });
        wait_for_calls(&api, 2).await;

        fetch_tx
            .send(Ok(vec![user(1, "A", "a@x"), user(2, "C", "c@x"), user(3, "D", "d@x")]))
            .unwrap();
        fetch.await.unwrap().unwrap();
        // Overlap is not tracked: the first settlement already clears loading.
        assert!(!store.snapshot().loading);

        update_tx.send(Ok(UserPatch::new(1).name("B"))).unwrap();
        update.await.unwrap().unwrap();

        let s = store.snapshot();
        assert_eq!(s.users.len(), 3);
        assert_eq!(s.users[0].name, "B");
        assert!(!s.loading);
    }

    #[tokio::test]
    async fn later_settling_fetch_overwrites_merged_update() {
        let api = Arc::new(GatedApi::default());
        let store = Arc::new(store_with(&api, vec![user(1, "A", "a@x")]));
        let fetch_tx = api.gate_list();
        let update_tx = api.gate_update();

        let s = store.clone();
        let fetch = tokio::spawn(async move { s.fetch().await });
        let s = store.clone();
        let update = tokio::spawn(async move { s.update(UserPatch::new(1).name("B")).await });
        wait_for_calls(&api, 2).await;

        update_tx.send(Ok(UserPatch::new(1).name("B"))).unwrap();
        update.await.unwrap().unwrap();
        assert_eq!(store.snapshot().users[0].name, "B");

        fetch_tx.send(Ok(vec![user(1, "A", "a@x")])).unwrap();
        fetch.await.unwrap().unwrap();
        assert_eq!(store.snapshot().users[0].name, "A");
    }

    #[tokio::test]
    async fn update_error_after_successful_fetch_is_what_remains() {
        let api = Arc::new(GatedApi::default());
        let store = Arc::new(store_with(&api, vec![]));
        let fetch_tx = api.gate_list();
        let update_tx = api.gate_update();

        let s = store.clone();
        let fetch = tokio::spawn(async move { s.fetch().await });
        let s = store.clone();
        let update = tokio::spawn(async move { s.update(UserPatch::new(1).name("B")).await });
        wait_for_calls(&api, 2).await;

        fetch_tx.send(Ok(vec![user(1, "A", "a@x")])).unwrap();
        fetch.await.unwrap().unwrap();
        update_tx.send(Err(server_error())).unwrap();
        assert!(update.await.unwrap().is_err());

        let s = store.snapshot();
        assert_eq!(s.users, vec![user(1, "A", "a@x")]);
        assert!(s.error.is_some());
        assert!(!s.loading);
    }
}

#[cfg(test)]
mod app_tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::runtime::Handle;
    use userdesk::app::update::{Flow, dispatch, handle_key};
    use userdesk::app::{AppState, InputMode, Keymap, ModalState, StoreCommand, Theme};
    use userdesk::store::{StoreState, UserStore};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn create_test_app(users: Vec<User>) -> AppState {
        let api = Arc::new(GatedApi::default());
        let store = Arc::new(UserStore::with_state(api, StoreState::with_users(users)));
        AppState::new(store, Theme::mocha(), Keymap::default())
    }

    fn sample_users() -> Vec<User> {
        vec![user(1, "Leanne Graham", "Sincere@april.biz"), user(2, "Ervin Howell", "Shanna@melissa.tv"), user(3, "Clementine Bauch", "Nathan@yesenia.net")]
    }

    #[test]
    fn app_starts_with_store_snapshot() {
        let app = create_test_app(sample_users());
        assert_eq!(app.users.len(), 3);
        assert_eq!(app.selected_user_index, 0);
        assert!(app.pending.is_empty());
    }

    #[test]
    fn navigation_is_clamped() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Up));
        assert_eq!(app.selected_user_index, 0);
        for _ in 0..5 {
            handle_key(&mut app, key(KeyCode::Char('j')));
        }
        assert_eq!(app.selected_user_index, 2);
        handle_key(&mut app, key(KeyCode::PageUp));
        assert_eq!(app.selected_user_index, 0);
    }

    #[test]
    fn refresh_key_queues_fetch_and_quit_exits() {
        let mut app = create_test_app(sample_users());
        assert_eq!(handle_key(&mut app, key(KeyCode::Char('r'))), Flow::Continue);
        assert_eq!(app.take_pending(), vec![StoreCommand::Fetch]);
        assert_eq!(handle_key(&mut app, key(KeyCode::Char('q'))), Flow::Quit);
    }

    #[test]
    fn edit_form_submits_every_field() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char('u')));
        match &app.modal {
            Some(ModalState::Edit(form)) => {
                assert_eq!(form.id, 2);
                assert_eq!(form.name, "Ervin Howell");
                assert_eq!(form.city, "Gwenborough");
            }
            other => panic!("expected edit form, got {other:?}"),
        }
        assert_eq!(app.input_mode, InputMode::Modal);

        handle_key(&mut app, key(KeyCode::Char('!')));
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Backspace));
        handle_key(&mut app, key(KeyCode::Enter));

        assert!(app.modal.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        let expected = UserPatch::new(2)
            .name("Ervin Howell!")
            .email("Shanna@melissa.t")
            .phone("555")
            .address("Gwenborough", "92998");
        assert_eq!(app.take_pending(), vec![StoreCommand::Update(expected)]);
    }

    #[test]
    fn cancelled_edit_sends_nothing() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('x')));
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.modal.is_none());
        assert!(app.pending.is_empty());
        assert_eq!(app.users[0].name, "Leanne Graham");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Char('d')));
        assert!(matches!(app.modal, Some(ModalState::DeleteConfirm { id: 1, selected: 1, .. })));
        // Defaults to "No".
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.users.len(), 3);

        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.users.len(), 2);
        assert_eq!(app.store.snapshot().users.len(), 2);
        assert!(app.users.iter().all(|u| u.id != 1));
        assert!(app.pending.is_empty());
    }

    #[test]
    fn delete_last_row_clamps_selection() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Delete));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.users.len(), 2);
        assert_eq!(app.selected_user_index, 1);
    }

    #[test]
    fn search_filters_rows_and_escape_restores_them() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        for c in "melissa".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.users.len(), 1);
        assert_eq!(app.users[0].id, 2);

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.users.len(), 3);
    }

    #[test]
    fn actions_on_empty_table_do_nothing() {
        let mut app = create_test_app(vec![]);
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('d')));
        handle_key(&mut app, key(KeyCode::Down));
        assert!(app.modal.is_none());
        assert_eq!(app.selected_user_index, 0);
    }

    #[test]
    fn start_queues_a_single_initial_fetch() {
        let mut app = create_test_app(vec![]);
        app.start();
        app.start();
        assert_eq!(app.take_pending(), vec![StoreCommand::Fetch]);
        app.start();
        assert!(app.take_pending().is_empty());
    }

    #[tokio::test]
    async fn queued_commands_are_spawned_onto_the_store() {
        let api = Arc::new(GatedApi::default());
        let store = Arc::new(UserStore::with_state(api.clone(), StoreState::default()));
        let mut app = AppState::new(store, Theme::mocha(), Keymap::default());
        let fetch_tx = api.gate_list();
        let update_tx = api.gate_update();

        app.start();
        app.request(StoreCommand::Update(UserPatch::new(1).name("B")));
        let cmds = app.take_pending();
        dispatch(&app.store, cmds, &Handle::current());
        while api.calls() < 2 {
            tokio::task::yield_now().await;
        }

        fetch_tx.send(Ok(vec![user(1, "A", "a@x"), user(2, "Z", "z@x")])).unwrap();
        while app.store.snapshot().users.len() != 2 {
            tokio::task::yield_now().await;
        }
        update_tx.send(Ok(UserPatch::new(1).name("B"))).unwrap();
        while app.store.snapshot().users[0].name != "B" {
            tokio::task::yield_now().await;
        }

        app.refresh();
        assert_eq!(app.users.len(), 2);
        assert!(!app.snapshot.loading);
        assert_eq!(api.sent.lock().unwrap().clone(), vec![UserPatch::new(1).name("B")]);
    }

    #[test]
    fn chorded_keys_are_not_typed_into_text() {
        let mut app = create_test_app(sample_users());
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
        match &app.modal {
            Some(ModalState::Edit(form)) => assert_eq!(form.name, "Leanne GrahamX"),
            other => panic!("expected edit form, got {other:?}"),
        }
        handle_key(&mut app, key(KeyCode::Esc));

        handle_key(&mut app, key(KeyCode::Char('/')));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert!(app.search_query.is_empty());
        assert_eq!(app.users.len(), 3);
    }
}
