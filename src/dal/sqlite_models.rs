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

//! SQLite-specific row types and storage conversion helpers.
//!
//! SQLite stores UUIDs as 16-byte BLOBs and timestamps as RFC3339 TEXT.

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

/// Convert a UUID to its BLOB representation.
pub fn uuid_to_blob(id: &Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Current timestamp as an RFC3339 string for TEXT timestamp columns.
pub fn current_timestamp_string() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::sqlite::users)]
pub struct NewSqliteUser {
    pub id: Vec<u8>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::sqlite::user_birthdays)]
pub struct NewSqliteBirthday {
    pub id: Vec<u8>,
    pub user_id: Vec<u8>,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub sent_year: Option<i32>,
    pub timezone: String,
    pub created_at: String,
}
