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

//! Delivery Delay Scheduling
//!
//! Computes the per-recipient enqueue delay. The delay aims the greeting at
//! the target local send time and staggers the batch linearly across the
//! spread window so recipients sharing a timezone are not all notified at the
//! same instant. The window matcher already restricts candidates to zones near
//! the target time, so the base delay is typically small; the clamp to
//! [`MAX_DELAY_SECONDS`] exists because the channel's native delay mechanism
//! has a hard ceiling.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::{GreetingConfig, MAX_DELAY_SECONDS};

/// Computes staggered, clamped delivery delays for a dispatch batch.
#[derive(Debug, Clone)]
pub struct DeliveryScheduler {
    target_hour: u32,
    target_minute: u32,
    spread_window_seconds: u32,
}

impl DeliveryScheduler {
    /// Creates a scheduler from the pipeline configuration.
    pub fn new(config: &GreetingConfig) -> Self {
        Self {
            target_hour: config.target_hour,
            target_minute: config.target_minute,
            spread_window_seconds: config.spread_window_seconds,
        }
    }

    /// Returns the delay in seconds for the candidate at `index` within a
    /// batch of `batch_size`, guaranteed to be in `0..=MAX_DELAY_SECONDS`.
    ///
    /// `base` is the signed distance from `now` to today's target local time
    /// in `tz` (negative once the target has passed); the stagger distributes
    /// the batch across the spread window before clamping.
    pub fn delay_seconds(
        &self,
        tz: Tz,
        index: usize,
        batch_size: usize,
        now: DateTime<Utc>,
    ) -> u32 {
        let base = self.seconds_until_target(tz, now);

        let stagger = if batch_size == 0 {
            0
        } else {
            ((index as f64 / batch_size as f64) * self.spread_window_seconds as f64).floor() as i64
        };

        (base + stagger).clamp(0, MAX_DELAY_SECONDS as i64) as u32
    }

    fn seconds_until_target(&self, tz: Tz, now: DateTime<Utc>) -> i64 {
        let local_now = now.with_timezone(&tz);
        let target_naive = match local_now
            .date_naive()
            .and_hms_opt(self.target_hour, self.target_minute, 0)
        {
            Some(naive) => naive,
            None => return 0,
        };

        // A DST transition can make the target wall-clock time ambiguous or
        // nonexistent; take the earliest interpretation and fall back to no
        // base delay when the time is skipped entirely.
        match tz.from_local_datetime(&target_naive).earliest() {
            Some(target) => (target.with_timezone(&Utc) - now).num_seconds(),
            None => 0,
        }
    }
}
