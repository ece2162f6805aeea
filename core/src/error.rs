//! Error types for the todo client and store.
//!
//! # Design
//! `ApiError` describes what went wrong on the wire. `NotFound` gets a
//! dedicated variant so diagnostics can tell a vanished todo apart from a
//! server fault; every other non-2xx response lands in `HttpError` with the
//! raw status code and body. The store treats all of them uniformly as
//! "failed" and only logs the detail.
//!
//! `StoreError` wraps `ApiError` for the controller operations and adds the
//! failures that never reach the network.

use thiserror::Error;

use crate::types::TodoId;

/// Errors returned by `TodoClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, DNS, I/O).
    #[error("transport failed: {0}")]
    TransportError(String),
}

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The id is not part of the collection the store currently holds.
    #[error("todo {0} is not in the current collection")]
    UnknownTodo(TodoId),
}
