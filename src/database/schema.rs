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

//! Diesel schema definitions for both backends.
//!
//! PostgreSQL stores UUIDs natively and timestamps as `TIMESTAMP`; SQLite
//! stores UUIDs as 16-byte BLOBs and timestamps as RFC3339 TEXT. The DAL
//! converts between these representations and the universal domain types at
//! its boundary.

/// PostgreSQL schema.
pub mod postgres {
    diesel::table! {
        users (id) {
            id -> Uuid,
            first_name -> Text,
            last_name -> Nullable<Text>,
            created_at -> Timestamp,
        }
    }

    diesel::table! {
        user_birthdays (id) {
            id -> Uuid,
            user_id -> Uuid,
            day -> Int4,
            month -> Int4,
            year -> Int4,
            sent_year -> Nullable<Int4>,
            timezone -> Text,
            created_at -> Timestamp,
        }
    }

    diesel::joinable!(user_birthdays -> users (user_id));
    diesel::allow_tables_to_appear_in_same_query!(users, user_birthdays);
}

/// SQLite schema.
pub mod sqlite {
    diesel::table! {
        users (id) {
            id -> Binary,
            first_name -> Text,
            last_name -> Nullable<Text>,
            created_at -> Text,
        }
    }

    diesel::table! {
        user_birthdays (id) {
            id -> Binary,
            user_id -> Binary,
            day -> Integer,
            month -> Integer,
            year -> Integer,
            sent_year -> Nullable<Integer>,
            timezone -> Text,
            created_at -> Text,
        }
    }

    diesel::joinable!(user_birthdays -> users (user_id));
    diesel::allow_tables_to_appear_in_same_query!(users, user_birthdays);
}
