/*
 *  Copyright 2025 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Error types for the greeting pipeline.
//!
//! Errors are split per concern so each layer only surfaces the failures it
//! can actually produce. Dispatch-path errors abort the whole invocation (the
//! next periodic trigger retries from scratch, since dispatch mutates no
//! state). Delivery-path errors are isolated per task and reported back to the
//! channel as failed item identifiers rather than propagated.

use thiserror::Error;

/// Errors raised by the data access layer.
#[derive(Debug, Error)]
pub enum DalError {
    /// Failed to obtain a connection from the pool, or the interact closure
    /// was aborted.
    #[error("connection pool error: {0}")]
    ConnectionPool(String),

    /// A query or statement failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// A stored UUID column did not contain 16 bytes (SQLite BLOB storage).
    #[error("corrupt uuid column: {0}")]
    Uuid(#[from] uuid::Error),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was present but could not be parsed, or was
    /// outside its documented range.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Errors raised by the notification channel when enqueueing a task.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The underlying transport rejected the enqueue call.
    #[error("enqueue failed: {0}")]
    Enqueue(String),
}

/// Errors raised by the outbound greeting client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request could not be performed.
    #[error("greeting endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status or otherwise rejected
    /// the payload.
    #[error("greeting endpoint rejected payload: {0}")]
    Rejected(String),
}

/// Errors that abort a dispatch invocation.
///
/// Dispatch performs no database writes, so any of these is safe to surface
/// as fatal: the next trigger re-runs the same work.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Dal(#[from] DalError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("failed to serialize greeting task: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Per-task errors inside the delivery path.
///
/// These never cross the batch boundary; the greeter converts them into
/// failed item identifiers for the channel to redeliver (or dead-letter, for
/// payloads that will never parse).
#[derive(Debug, Error)]
pub enum GreeterError {
    /// The task body failed to parse or validate. Non-retryable.
    #[error("invalid greeting payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Dal(#[from] DalError),

    #[error(transparent)]
    Client(#[from] ClientError),
}
