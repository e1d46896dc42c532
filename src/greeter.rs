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

//! Idempotent Greeter
//!
//! The consumer half of the pipeline. Each queued task runs through a small
//! state machine:
//!
//! - parse + validate the payload; invalid bodies are permanent failures
//!   (reported to the channel for dead-lettering, never retried here);
//! - `mark_greeted` — the conditional write. A false return means the user
//!   was already greeted this year or no longer exists: terminal success with
//!   no outbound call;
//! - only after a successful mark, invoke the outbound client. On client
//!   failure the mark is reverted (`clear_greeted`) and the task reported
//!   failed, so redelivery retries safely.
//!
//! One task's failure never blocks or fails its siblings; the batch outcome
//! carries only the failed record identifiers back to the channel.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::client::GreetingClient;
use crate::dal::DAL;
use crate::database::universal_types::UniversalUuid;
use crate::error::GreeterError;
use crate::models::greeting::{GreetingPayload, GreetingTask};
use crate::queue::QueuedGreeting;

/// Result of processing one batch of queued greetings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Tasks that resulted in an outbound call.
    pub delivered: usize,
    /// Tasks skipped because the user was already greeted this year (or no
    /// longer exists). Terminal success.
    pub skipped: usize,
    /// Identifiers of tasks that must be redelivered (or dead-lettered).
    pub failed_ids: Vec<String>,
}

/// Consumes greeting tasks and guarantees at most one outbound call per
/// (user, year), regardless of redelivery.
pub struct IdempotentGreeter {
    dal: DAL,
    client: Arc<dyn GreetingClient>,
}

impl IdempotentGreeter {
    pub fn new(dal: DAL, client: Arc<dyn GreetingClient>) -> Self {
        Self { dal, client }
    }

    /// Processes a batch of queued records, isolating failures per record.
    pub async fn process_batch(&self, records: &[QueuedGreeting]) -> BatchOutcome {
        info!(count = records.len(), "Processing greeting batch");

        let mut outcome = BatchOutcome::default();
        for record in records {
            match self.process_record(record).await {
                Ok(TaskOutcome::Delivered) => outcome.delivered += 1,
                Ok(TaskOutcome::Skipped) => outcome.skipped += 1,
                Err(e) => {
                    error!(record_id = %record.id, error = %e, "Failed to process greeting");
                    outcome.failed_ids.push(record.id.clone());
                }
            }
        }

        info!(
            delivered = outcome.delivered,
            skipped = outcome.skipped,
            failed = outcome.failed_ids.len(),
            "Greeting batch complete"
        );
        outcome
    }

    async fn process_record(&self, record: &QueuedGreeting) -> Result<TaskOutcome, GreeterError> {
        let task: GreetingTask = serde_json::from_str(&record.body)
            .map_err(|e| GreeterError::InvalidPayload(e.to_string()))?;
        task.validate().map_err(GreeterError::InvalidPayload)?;

        let user_id = UniversalUuid(task.user_id);
        debug!(user_id = %user_id, year = task.year, "Processing greeting");

        let marked = self.dal.birthdays().mark_greeted(user_id, task.year).await?;
        if !marked {
            debug!(user_id = %user_id, year = task.year, "Already greeted this year, skipping");
            return Ok(TaskOutcome::Skipped);
        }

        let payload = GreetingPayload {
            message: format!(
                "Hey, {} {} it's your birthday!",
                task.first_name, task.last_name
            ),
            user_id: task.user_id,
            timestamp: Utc::now(),
        };

        if let Err(client_err) = self.client.send(&payload).await {
            // Revert the mark so redelivery can retry. If the revert itself
            // fails the task is still reported failed; the next delivery will
            // then skip, which is the documented residual risk of the
            // compensating-reset design.
            if let Err(reset_err) = self.dal.birthdays().clear_greeted(user_id, task.year).await {
                error!(
                    user_id = %user_id,
                    error = %reset_err,
                    "Failed to revert greeted mark after client failure"
                );
            }
            return Err(GreeterError::Client(client_err));
        }

        info!(user_id = %user_id, "Sent birthday greeting");
        Ok(TaskOutcome::Delivered)
    }
}

enum TaskOutcome {
    Delivered,
    Skipped,
}
