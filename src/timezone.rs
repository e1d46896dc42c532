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

//! Timezone Window Matching
//!
//! Pure functions that decide which IANA timezones are currently inside the
//! configured local-time send window. The timezone catalog is injected so
//! callers and tests control exactly which zones are evaluated; production
//! code passes [`chrono_tz::TZ_VARIANTS`].
//!
//! Known limitation: the window is computed in absolute minutes since local
//! midnight and does not wrap. A target time within half a window of 00:00
//! (e.g. 00:05 with a 20-minute window) will not match zones just before
//! midnight.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::GreetingConfig;

/// Matches timezones whose local wall-clock time falls inside the send window.
#[derive(Debug, Clone)]
pub struct TimezoneWindowMatcher {
    target_hour: u32,
    target_minute: u32,
    window_minutes: u32,
}

impl TimezoneWindowMatcher {
    /// Creates a matcher from the pipeline configuration.
    pub fn new(config: &GreetingConfig) -> Self {
        Self {
            target_hour: config.target_hour,
            target_minute: config.target_minute,
            window_minutes: config.window_minutes,
        }
    }

    /// Returns the zones from `catalog` whose local time at `now` lies inside
    /// `[target - floor(w/2), target + floor(w/2)]` minutes since local
    /// midnight, inclusive on both ends. May be empty. Order follows the
    /// catalog; no meaning is attached to it.
    pub fn find_matching(&self, now: DateTime<Utc>, catalog: &[Tz]) -> Vec<Tz> {
        let target_minutes = (self.target_hour * 60 + self.target_minute) as i64;
        let half_window = (self.window_minutes / 2) as i64;
        let window_start = target_minutes - half_window;
        let window_end = target_minutes + half_window;

        catalog
            .iter()
            .copied()
            .filter(|tz| {
                let local = now.with_timezone(tz);
                let local_minutes = (local.hour() * 60 + local.minute()) as i64;
                local_minutes >= window_start && local_minutes <= window_end
            })
            .collect()
    }

    /// Returns the `(month, day)` of "today" as observed in the first zone of
    /// a matching set, or `None` for an empty set.
    ///
    /// All matching zones are within the same narrow local-time band by
    /// construction, so they observe the same calendar date in the
    /// overwhelming majority of cases.
    pub fn current_date_in(zones: &[Tz], now: DateTime<Utc>) -> Option<(u32, u32)> {
        zones.first().map(|tz| {
            let local = now.with_timezone(tz);
            (local.month(), local.day())
        })
    }
}
