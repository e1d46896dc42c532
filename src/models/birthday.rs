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

//! Birthday Record Models
//!
//! Domain-side view of a user's recorded birth date and notification state.
//! The birthday rows themselves are owned by the persistence store; the
//! pipeline only reads them and performs the single conditional mutation of
//! `sent_year` through the DAL.

use crate::database::universal_types::UniversalUuid;

/// A birthday record due for greeting in the current dispatch cycle, joined
/// with the owning user's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayCandidate {
    /// Identifier of the user the greeting is addressed to.
    pub user_id: UniversalUuid,
    pub first_name: String,
    /// Empty string when the user has no recorded last name.
    pub last_name: String,
    /// IANA timezone identifier used to evaluate "now" in the user's local frame.
    pub timezone: String,
    /// Recurring birthday month (1-12).
    pub month: i32,
    /// Recurring birthday day (1-31).
    pub day: i32,
    /// Calendar year of the last successfully delivered greeting, if any.
    /// Monotonically non-decreasing; only ever advanced by the conditional
    /// `mark_greeted` write.
    pub sent_year: Option<i32>,
}

/// Fields for seeding a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Fields for seeding a new birthday row.
#[derive(Debug, Clone)]
pub struct NewBirthday {
    pub user_id: UniversalUuid,
    /// Recurring birthday day (1-31); enforced by a schema-level check.
    pub day: i32,
    /// Recurring birthday month (1-12); enforced by a schema-level check.
    pub month: i32,
    /// Birth year. Informational; not used for matching.
    pub year: i32,
    pub sent_year: Option<i32>,
    /// IANA timezone identifier.
    pub timezone: String,
}
