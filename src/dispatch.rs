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

//! Dispatch Service
//!
//! The periodically triggered half of the pipeline. Each invocation is a
//! stateless unit of work: match timezones against the send window, load the
//! due candidates, and enqueue one delayed greeting task per candidate. No
//! database writes happen here, so a failed invocation is safely retried from
//! scratch by the next trigger.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::config::GreetingConfig;
use crate::dal::DAL;
use crate::delivery::DeliveryScheduler;
use crate::error::DispatchError;
use crate::models::greeting::GreetingTask;
use crate::queue::GreetingQueue;
use crate::timezone::TimezoneWindowMatcher;

/// Orchestrates one dispatch cycle: window matching, candidate loading, delay
/// computation, and enqueueing.
pub struct DispatchService {
    dal: DAL,
    queue: Arc<dyn GreetingQueue>,
    matcher: TimezoneWindowMatcher,
    scheduler: DeliveryScheduler,
    catalog: Vec<Tz>,
}

impl DispatchService {
    /// Creates a dispatch service evaluating the full IANA timezone catalog.
    pub fn new(dal: DAL, queue: Arc<dyn GreetingQueue>, config: &GreetingConfig) -> Self {
        Self::with_catalog(dal, queue, config, chrono_tz::TZ_VARIANTS.to_vec())
    }

    /// Creates a dispatch service with an explicit timezone catalog.
    pub fn with_catalog(
        dal: DAL,
        queue: Arc<dyn GreetingQueue>,
        config: &GreetingConfig,
        catalog: Vec<Tz>,
    ) -> Self {
        Self {
            dal,
            queue,
            matcher: TimezoneWindowMatcher::new(config),
            scheduler: DeliveryScheduler::new(config),
            catalog,
        }
    }

    /// Runs one dispatch cycle against the current instant.
    ///
    /// Returns the number of candidates processed, which equals the number of
    /// tasks enqueued. An enqueue failure aborts the invocation; there is no
    /// partial-success bookkeeping at this layer.
    pub async fn dispatch_due(&self) -> Result<usize, DispatchError> {
        self.dispatch_due_at(Utc::now()).await
    }

    /// Runs one dispatch cycle against an explicit instant.
    pub async fn dispatch_due_at(&self, now: DateTime<Utc>) -> Result<usize, DispatchError> {
        let zones = self.matcher.find_matching(now, &self.catalog);
        if zones.is_empty() {
            debug!("No timezones inside the send window");
            return Ok(0);
        }

        // All matched zones sit in the same narrow local-time band, so the
        // first zone's calendar date stands in for the whole set.
        let (month, day) = match TimezoneWindowMatcher::current_date_in(&zones, now) {
            Some(date) => date,
            None => return Ok(0),
        };
        let year = now.year();

        let timezone_names: Vec<String> =
            zones.iter().map(|tz| tz.name().to_string()).collect();
        let candidates = self
            .dal
            .birthdays()
            .find_due_candidates(&timezone_names, month as i32, day as i32, year)
            .await?;

        if candidates.is_empty() {
            debug!(
                zones = zones.len(),
                month, day, "No users need birthday greetings at this time"
            );
            return Ok(0);
        }

        info!(
            count = candidates.len(),
            zones = zones.len(),
            month,
            day,
            "Found users needing birthday greetings"
        );

        let batch_size = candidates.len();
        for (index, candidate) in candidates.iter().enumerate() {
            let delay_seconds = match candidate.timezone.parse::<Tz>() {
                Ok(tz) => self.scheduler.delay_seconds(tz, index, batch_size, now),
                Err(_) => {
                    // Matching is done on catalog names, so this only fires
                    // for rows written with an identifier chrono-tz does not
                    // know. Deliver immediately rather than dropping the user.
                    warn!(
                        user_id = %candidate.user_id,
                        timezone = %candidate.timezone,
                        "Unknown timezone on birthday record; enqueueing without delay"
                    );
                    0
                }
            };

            let task = GreetingTask {
                user_id: candidate.user_id.as_uuid(),
                first_name: candidate.first_name.clone(),
                last_name: candidate.last_name.clone(),
                year,
            };
            let body = serde_json::to_string(&task)?;
            self.queue.enqueue(body, delay_seconds).await?;

            debug!(
                user_id = %candidate.user_id,
                delay_seconds,
                "Scheduled birthday greeting"
            );
        }

        info!(count = batch_size, "Scheduled birthday greetings");
        Ok(batch_size)
    }
}
