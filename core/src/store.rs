//! The todo controller: owns the collection and keeps it in step with the
//! server.
//!
//! # Design
//! - The server is the single source of truth. Every successful mutation is
//!   followed by a full `refresh()`; the collection is replaced wholesale and
//!   never patched locally.
//! - Load failures go to the persistent `error` banner. Mutation failures go
//!   to the transient notification only. The two channels are independent.
//! - State lives in a `watch` channel. Readers take snapshots through the
//!   accessors or subscribe to be told when anything changes.
//! - Each refresh takes a sequence number. A response is applied only if no
//!   newer refresh has started since, so an out-of-order reply cannot
//!   overwrite a fresher snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::config::StoreConfig;
use crate::confirm::Confirm;
use crate::error::{ApiError, StoreError};
use crate::notification::{Notification, Notifier};
use crate::transport::Transport;
use crate::types::{NewTodo, Todo, TodoId, UpdateTodo};
use crate::view::{Counts, Filter};

/// User-facing texts. Diagnostic detail is logged, never shown.
pub mod messages {
    pub const LOAD_FAILED: &str = "Failed to load todos. Please try again.";
    pub const DELETE_PROMPT: &str = "Are you sure you want to delete this todo?";
    pub const MARKED_COMPLETE: &str = "Todo marked complete!";
    pub const MARKED_INCOMPLETE: &str = "Todo marked incomplete!";
    pub const UPDATE_FAILED: &str = "Failed to update todo.";
    pub const DELETED: &str = "Todo deleted successfully!";
    pub const DELETE_FAILED: &str = "Failed to delete todo.";
    pub const ADDED: &str = "Todo added successfully!";
    pub const ADD_FAILED: &str = "Failed to add todo.";
}

/// Everything the store holds apart from the notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// The last collection the server returned.
    pub todos: Vec<Todo>,
    pub loading: bool,
    /// Load-failure banner; cleared when the next refresh starts.
    pub error: Option<String>,
    pub filter: Filter,
    /// Whether the creation dialog is showing.
    pub dialog_open: bool,
}

impl StoreState {
    pub fn filtered_todos(&self) -> Vec<Todo> {
        self.filter.apply(&self.todos).cloned().collect()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&self.todos)
    }
}

pub struct TodoStore<T> {
    client: TodoClient,
    transport: T,
    state: watch::Sender<StoreState>,
    notifier: Notifier,
    latest_refresh: AtomicU64,
}

impl<T: Transport> TodoStore<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self::with_notifier(client, transport, Notifier::default())
    }

    pub fn from_config(config: &StoreConfig, transport: T) -> Self {
        Self::with_notifier(
            TodoClient::new(&config.base_url),
            transport,
            Notifier::new(config.notification_ttl),
        )
    }

    fn with_notifier(client: TodoClient, transport: T, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            client,
            transport,
            state,
            notifier,
            latest_refresh: AtomicU64::new(0),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // --- reads ---

    pub fn state(&self) -> StoreState {
        self.state.borrow().clone()
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.state.borrow().todos.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn filter(&self) -> Filter {
        self.state.borrow().filter
    }

    pub fn is_dialog_open(&self) -> bool {
        self.state.borrow().dialog_open
    }

    pub fn filtered_todos(&self) -> Vec<Todo> {
        self.state.borrow().filtered_todos()
    }

    pub fn counts(&self) -> Counts {
        self.state.borrow().counts()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifier.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Option<Notification>> {
        self.notifier.subscribe()
    }

    // --- local view state ---

    pub fn set_filter(&self, filter: Filter) {
        self.state.send_if_modified(|state| {
            if state.filter == filter {
                return false;
            }
            state.filter = filter;
            true
        });
    }

    pub fn open_dialog(&self) {
        self.set_dialog_open(true);
    }

    pub fn close_dialog(&self) {
        self.set_dialog_open(false);
    }

    fn set_dialog_open(&self, open: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.dialog_open != open;
            state.dialog_open = open;
            changed
        });
    }

    pub fn dismiss_notification(&self) {
        self.notifier.dismiss();
    }

    // --- server round-trips ---

    /// Initial load when the view comes up.
    pub async fn mount(&self) -> Result<(), StoreError> {
        self.refresh().await
    }

    /// Replace the collection with the server's current list.
    ///
    /// On failure the previous collection is kept and the error banner is
    /// set. `loading` is cleared once the newest in-flight refresh settles
    /// or is dropped.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let seq = self.latest_refresh.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::acquire(&self.state, &self.latest_refresh, seq);
        debug!(seq, "refreshing todos");

        let result = self.fetch_todos().await;

        if self.latest_refresh.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding response of a superseded refresh");
            return result.map(drop).map_err(StoreError::from);
        }

        match result {
            Ok(todos) => {
                debug!(seq, count = todos.len(), "todos loaded");
                self.state.send_modify(|state| {
                    state.todos = todos;
                    state.loading = false;
                });
                Ok(())
            }
            Err(err) => {
                warn!(seq, error = %err, "failed to load todos");
                self.state.send_modify(|state| {
                    state.error = Some(messages::LOAD_FAILED.to_string());
                    state.loading = false;
                });
                Err(err.into())
            }
        }
    }

    /// Flip the completion flag of `id`, then reload.
    ///
    /// The new value is derived from the collection the store holds. Nothing
    /// is flipped locally; the reload shows the server's view.
    pub async fn toggle_complete(&self, id: &TodoId) -> Result<Todo, StoreError> {
        let current = self
            .state
            .borrow()
            .todos
            .iter()
            .find(|todo| &todo.id == id)
            .map(|todo| todo.is_complete);
        let Some(current) = current else {
            warn!(%id, "toggle requested for a todo outside the current collection");
            self.notifier.show(Notification::danger(messages::UPDATE_FAILED));
            return Err(StoreError::UnknownTodo(id.clone()));
        };

        let complete = !current;
        match self.send_update(id, &UpdateTodo::completion(complete)).await {
            Ok(updated) => {
                self.reload_after_mutation().await;
                let message = if complete {
                    messages::MARKED_COMPLETE
                } else {
                    messages::MARKED_INCOMPLETE
                };
                self.notifier.show(Notification::success(message));
                Ok(updated)
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to update todo");
                self.notifier.show(Notification::danger(messages::UPDATE_FAILED));
                Err(err.into())
            }
        }
    }

    /// Delete `id` after the user confirms.
    ///
    /// Returns `Ok(false)` without touching the network when the user
    /// declines.
    pub async fn delete_todo<C: Confirm>(&self, id: &TodoId, confirm: &C) -> Result<bool, StoreError> {
        if !confirm.confirm(messages::DELETE_PROMPT).await {
            debug!(%id, "deletion declined");
            return Ok(false);
        }

        match self.send_delete(id).await {
            Ok(()) => {
                self.reload_after_mutation().await;
                self.notifier.show(Notification::success(messages::DELETED));
                Ok(true)
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to delete todo");
                self.notifier.show(Notification::danger(messages::DELETE_FAILED));
                Err(err.into())
            }
        }
    }

    /// Create a todo, reload and close the creation dialog.
    ///
    /// On failure the dialog stays open and the error is returned so the
    /// form can keep what the user typed.
    pub async fn create_todo(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        match self.send_create(&todo).await {
            Ok(created) => {
                debug!(id = %created.id, "todo created");
                self.reload_after_mutation().await;
                self.close_dialog();
                self.notifier.show(Notification::success(messages::ADDED));
                Ok(created)
            }
            Err(err) => {
                warn!(title = %todo.title, error = %err, "failed to create todo");
                self.notifier.show(Notification::danger(messages::ADD_FAILED));
                Err(err.into())
            }
        }
    }

    async fn reload_after_mutation(&self) {
        // A failed reload is already on the error banner; the mutation stuck.
        let _ = self.refresh().await;
    }

    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn send_update(&self, id: &TodoId, update: &UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(id, update)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_todo(response)
    }

    async fn send_delete(&self, id: &TodoId) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }

    async fn send_create(&self, todo: &NewTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_create_todo(todo)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_todo(response)
    }
}

/// Holds `loading` for the newest refresh.
///
/// Dropping the guard clears the flag unless a newer refresh has started and
/// taken it over. This covers a refresh future dropped mid-request.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreState>,
    latest: &'a AtomicU64,
    seq: u64,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(state: &'a watch::Sender<StoreState>, latest: &'a AtomicU64, seq: u64) -> Self {
        state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        Self { state, latest, seq }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.latest.load(Ordering::SeqCst) != self.seq {
            return;
        }
        self.state.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }
}
