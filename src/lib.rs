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

//! # Natalis
//!
//! Natalis is a Rust library for delivering exactly one birthday greeting per
//! user per year, in the user's own timezone, without flooding the outbound
//! notification endpoint.
//!
//! The pipeline has two halves joined by an opaque, durable, at-least-once
//! message channel:
//!
//! 1. **Dispatch** — a periodically triggered, stateless unit of work that
//!    finds the IANA timezones currently inside the configured local send
//!    window, loads the birthday records due today in those zones that have
//!    not been greeted this calendar year, and enqueues one delayed
//!    [`GreetingTask`](models::GreetingTask) per candidate. Delays target the
//!    local send time and stagger the batch across a spread window.
//! 2. **Delivery** — a consumer that processes task batches. For each task it
//!    performs a single conditional database update marking the recipient as
//!    greeted for the year; only when that update changes a row does it invoke
//!    the outbound client. Redelivered tasks therefore become no-ops, giving
//!    at-most-one outbound call per (user, year) under at-least-once
//!    transport semantics.
//!
//! The correctness boundary is the conditional update in
//! [`dal::BirthdayDAL::mark_greeted`] — not process completion, ordering, or
//! any application-level locking.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use natalis::{Database, DispatchService, GreetingConfig, IdempotentGreeter, DAL};
//! use natalis::client::HttpGreetingClient;
//!
//! let database = Database::new("postgres://localhost:5432", "natalis", 10);
//! database.run_migrations().await?;
//!
//! let config = GreetingConfig::from_env()?;
//! let dal = DAL::new(database);
//!
//! // Periodic trigger side:
//! let dispatch = DispatchService::new(dal.clone(), queue, &config);
//! let scheduled = dispatch.dispatch_due().await?;
//!
//! // Channel consumer side:
//! let client = Arc::new(HttpGreetingClient::new(endpoint));
//! let greeter = IdempotentGreeter::new(dal, client);
//! let outcome = greeter.process_batch(&records).await;
//! // outcome.failed_ids go back to the channel for redelivery
//! ```

pub mod client;
pub mod config;
pub mod dal;
pub mod database;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod greeter;
pub mod models;
pub mod queue;
pub mod timezone;

pub use client::{GreetingClient, HttpGreetingClient};
pub use config::{GreetingConfig, MAX_DELAY_SECONDS};
pub use dal::DAL;
pub use database::{BackendType, Database};
pub use delivery::DeliveryScheduler;
pub use dispatch::DispatchService;
pub use error::{ClientError, ConfigError, DalError, DispatchError, GreeterError, QueueError};
pub use greeter::{BatchOutcome, IdempotentGreeter};
pub use models::{BirthdayCandidate, GreetingPayload, GreetingTask};
pub use queue::{GreetingQueue, QueuedGreeting};
pub use timezone::TimezoneWindowMatcher;
