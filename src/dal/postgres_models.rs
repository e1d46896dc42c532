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

//! PostgreSQL-specific row types.

use diesel::prelude::*;
use uuid::Uuid;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::postgres::users)]
pub struct NewPgUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::postgres::user_birthdays)]
pub struct NewPgBirthday {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub sent_year: Option<i32>,
    pub timezone: String,
}
