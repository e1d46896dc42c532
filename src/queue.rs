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

//! Notification Channel Seam
//!
//! The channel itself (enqueue/dequeue mechanics, visibility timeouts,
//! dead-lettering) is an external collaborator. The pipeline only needs two
//! things from it: a producer-side [`GreetingQueue`] to enqueue delayed task
//! bodies, and the consumer-side [`QueuedGreeting`] record shape handed to the
//! greeter. Delivery is durable and at-least-once; idempotence is enforced
//! downstream by the conditional database write, not by the transport.

use async_trait::async_trait;

use crate::error::QueueError;

/// Producer side of the notification channel.
#[async_trait]
pub trait GreetingQueue: Send + Sync {
    /// Enqueues one serialized [`GreetingTask`](crate::models::GreetingTask)
    /// body, to become visible to consumers after `delay_seconds`.
    ///
    /// `delay_seconds` never exceeds
    /// [`MAX_DELAY_SECONDS`](crate::config::MAX_DELAY_SECONDS).
    async fn enqueue(&self, body: String, delay_seconds: u32) -> Result<(), QueueError>;
}

/// One record delivered by the channel to the consumer side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedGreeting {
    /// Channel-assigned identifier, echoed back for failed records so the
    /// channel can redeliver them.
    pub id: String,
    /// The serialized task body as produced by the dispatch service.
    pub body: String,
}

impl QueuedGreeting {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}
