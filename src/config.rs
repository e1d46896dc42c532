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

//! Configuration for the greeting pipeline.
//!
//! All knobs are optional environment variables with stated defaults:
//!
//! | Variable                | Default | Meaning                                  |
//! |-------------------------|---------|------------------------------------------|
//! | `TARGET_HOUR`           | 9       | Local hour greetings should arrive at    |
//! | `TARGET_MINUTE`         | 0       | Local minute greetings should arrive at  |
//! | `WINDOW_MINUTES`        | 20      | Width of the timezone matching window    |
//! | `SPREAD_WINDOW_SECONDS` | 300     | Span a dispatch batch is staggered over  |
//!
//! The maximum per-task delay is not configurable: the channel's native delay
//! mechanism has a hard ceiling of 15 minutes.

use std::str::FromStr;

use crate::error::ConfigError;

/// Hard ceiling on a computed delivery delay, in seconds.
///
/// Imposed by the notification channel's native delay mechanism (15 minutes).
pub const MAX_DELAY_SECONDS: u32 = 900;

/// Tunable parameters for window matching and delivery staggering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingConfig {
    /// Target local send hour (0-23).
    pub target_hour: u32,
    /// Target local send minute (0-59).
    pub target_minute: u32,
    /// Width of the local-time matching window, in minutes.
    pub window_minutes: u32,
    /// Span over which a dispatch batch is staggered, in seconds.
    pub spread_window_seconds: u32,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            target_hour: 9,
            target_minute: 0,
            window_minutes: 20,
            spread_window_seconds: 300,
        }
    }
}

impl GreetingConfig {
    /// Loads configuration from the environment, falling back to defaults for
    /// anything unset. Reads a `.env` file first if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            target_hour: env_var("TARGET_HOUR", defaults.target_hour)?,
            target_minute: env_var("TARGET_MINUTE", defaults.target_minute)?,
            window_minutes: env_var("WINDOW_MINUTES", defaults.window_minutes)?,
            spread_window_seconds: env_var(
                "SPREAD_WINDOW_SECONDS",
                defaults.spread_window_seconds,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target_hour > 23 {
            return Err(ConfigError::InvalidValue {
                key: "TARGET_HOUR",
                value: self.target_hour.to_string(),
            });
        }
        if self.target_minute > 59 {
            return Err(ConfigError::InvalidValue {
                key: "TARGET_MINUTE",
                value: self.target_minute.to_string(),
            });
        }
        Ok(())
    }
}

fn env_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(default),
    }
}
