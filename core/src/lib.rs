//! Client-side synchronization core for the todo service.
//!
//! # Overview
//! `TodoStore` owns the todo collection shown to the user, issues CRUD calls
//! against the REST API and re-fetches the full collection after every
//! successful mutation. It also carries the view state around the collection:
//! the active filter, the loading flag, the load-error banner, the creation
//! dialog and a single auto-expiring notification. `TodoForm` validates a
//! new-todo draft and hands the payload to the store.
//!
//! # Design
//! - `TodoClient` is stateless: `build_*` produces a plain-data request and
//!   `parse_*` interprets the response, so wire handling needs no network.
//! - `Transport` executes requests. `UreqTransport` is the real one; tests
//!   script their own.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use todo_sync::{Filter, StoreConfig, TodoStore, UreqTransport};
//!
//! # async fn demo() -> Result<(), todo_sync::StoreError> {
//! let store = TodoStore::from_config(&StoreConfig::from_env(), UreqTransport::new());
//! store.mount().await?;
//! store.set_filter(Filter::Active);
//! for todo in store.filtered_todos() {
//!     println!("{} (due {})", todo.title, todo.due_date);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod confirm;
pub mod error;
pub mod form;
pub mod http;
pub mod notification;
pub mod store;
pub mod transport;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use config::StoreConfig;
pub use confirm::Confirm;
pub use error::{ApiError, StoreError};
pub use form::{Draft, Field, SubmitOutcome, TodoForm};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notification::{Notification, NotificationKind, Notifier};
pub use store::{messages, StoreState, TodoStore};
pub use transport::{Transport, UreqTransport};
pub use types::{NewTodo, Todo, TodoId, UpdateTodo};
pub use view::{Counts, Filter};
