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

//! Greeting Message Models
//!
//! Wire-format types for the two external boundaries: the notification
//! channel (which carries [`GreetingTask`] bodies as JSON) and the outbound
//! notification endpoint (which receives [`GreetingPayload`] as JSON).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ephemeral message placed on the notification channel by the dispatch
/// service and consumed by the greeter.
///
/// The transport may redeliver a task any number of times; the conditional
/// `mark_greeted` write makes redelivery a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingTask {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// The calendar year this task intends to mark as greeted.
    pub year: i32,
}

impl GreetingTask {
    /// Validates the payload beyond what deserialization enforces.
    ///
    /// A task failing validation is permanently failed (dead-letter path),
    /// never retried.
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("firstName must be non-empty".to_string());
        }
        if self.last_name.trim().is_empty() {
            return Err("lastName must be non-empty".to_string());
        }
        if self.year <= 0 {
            return Err(format!("year must be a positive integer, got {}", self.year));
        }
        Ok(())
    }
}

/// The payload delivered to the outbound notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingPayload {
    pub message: String,
    pub user_id: Uuid,
    /// Serialized as an ISO-8601 / RFC3339 string.
    pub timestamp: DateTime<Utc>,
}
