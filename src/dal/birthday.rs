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

//! Birthday DAL with runtime backend selection
//!
//! Read side: `find_due_candidates` joins users with their birthday rows and
//! filters to the matched timezones, today's (month, day), and records not yet
//! greeted this year.
//!
//! Write side: `mark_greeted` is the sole mutation path for `sent_year` and
//! the correctness boundary of the whole pipeline. It is a single conditional
//! UPDATE — never read-then-write in application code — so concurrent or
//! redelivered tasks for the same user collapse to exactly one changed row.
//! `clear_greeted` is the compensating reset used when the outbound call fails
//! after a successful mark.

use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::universal_types::UniversalUuid;
use crate::database::BackendType;
use crate::error::DalError;
use crate::models::birthday::{BirthdayCandidate, NewBirthday, NewUser};

/// Row shape returned by the candidate join, before UUID conversion.
type PgCandidateRow = (Uuid, String, Option<String>, String, i32, i32, Option<i32>);
type SqliteCandidateRow = (
    Vec<u8>,
    String,
    Option<String>,
    String,
    i32,
    i32,
    Option<i32>,
);

/// Data access layer for birthday records.
#[derive(Clone)]
pub struct BirthdayDAL<'a> {
    dal: &'a DAL,
}

impl<'a> BirthdayDAL<'a> {
    /// Creates a new BirthdayDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Returns every birthday record whose timezone is in `timezones`, whose
    /// recurring date equals `(month, day)`, and whose `sent_year` is NULL or
    /// strictly less than `year`.
    ///
    /// An empty timezone set yields an empty result without touching the pool.
    /// No ordering is guaranteed.
    pub async fn find_due_candidates(
        &self,
        timezones: &[String],
        month: i32,
        day: i32,
        year: i32,
    ) -> Result<Vec<BirthdayCandidate>, DalError> {
        if timezones.is_empty() {
            return Ok(Vec::new());
        }

        match self.dal.backend() {
            BackendType::Postgres => self.find_due_candidates_postgres(timezones, month, day, year).await,
            BackendType::Sqlite => self.find_due_candidates_sqlite(timezones, month, day, year).await,
        }
    }

    async fn find_due_candidates_postgres(
        &self,
        timezones: &[String],
        month: i32,
        day: i32,
        year: i32,
    ) -> Result<Vec<BirthdayCandidate>, DalError> {
        use crate::database::schema::postgres::{user_birthdays, users};

        let conn = self
            .dal
            .database
            .get_postgres_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let tz_filter = timezones.to_vec();
        let rows: Vec<PgCandidateRow> = conn
            .interact(move |conn| {
                user_birthdays::table
                    .inner_join(users::table)
                    .filter(user_birthdays::timezone.eq_any(tz_filter))
                    .filter(user_birthdays::month.eq(month))
                    .filter(user_birthdays::day.eq(day))
                    .filter(
                        user_birthdays::sent_year
                            .is_null()
                            .or(user_birthdays::sent_year.lt(year)),
                    )
                    .select((
                        users::id,
                        users::first_name,
                        users::last_name,
                        user_birthdays::timezone,
                        user_birthdays::month,
                        user_birthdays::day,
                        user_birthdays::sent_year,
                    ))
                    .load(conn)
            })
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(rows
            .into_iter()
            .map(
                |(user_id, first_name, last_name, timezone, month, day, sent_year)| {
                    BirthdayCandidate {
                        user_id: UniversalUuid(user_id),
                        first_name,
                        last_name: last_name.unwrap_or_default(),
                        timezone,
                        month,
                        day,
                        sent_year,
                    }
                },
            )
            .collect())
    }

    async fn find_due_candidates_sqlite(
        &self,
        timezones: &[String],
        month: i32,
        day: i32,
        year: i32,
    ) -> Result<Vec<BirthdayCandidate>, DalError> {
        use crate::database::schema::sqlite::{user_birthdays, users};

        let conn = self
            .dal
            .database
            .get_sqlite_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let tz_filter = timezones.to_vec();
        let rows: Vec<SqliteCandidateRow> = conn
            .interact(move |conn| {
                user_birthdays::table
                    .inner_join(users::table)
                    .filter(user_birthdays::timezone.eq_any(tz_filter))
                    .filter(user_birthdays::month.eq(month))
                    .filter(user_birthdays::day.eq(day))
                    .filter(
                        user_birthdays::sent_year
                            .is_null()
                            .or(user_birthdays::sent_year.lt(year)),
                    )
                    .select((
                        users::id,
                        users::first_name,
                        users::last_name,
                        user_birthdays::timezone,
                        user_birthdays::month,
                        user_birthdays::day,
                        user_birthdays::sent_year,
                    ))
                    .load(conn)
            })
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        rows.into_iter()
            .map(
                |(id_blob, first_name, last_name, timezone, month, day, sent_year)| {
                    Ok(BirthdayCandidate {
                        user_id: UniversalUuid::from_bytes(&id_blob)?,
                        first_name,
                        last_name: last_name.unwrap_or_default(),
                        timezone,
                        month,
                        day,
                        sent_year,
                    })
                },
            )
            .collect()
    }

    /// Conditionally marks a user as greeted for `year`.
    ///
    /// Sets `sent_year = year` only if the stored value is NULL or less than
    /// `year`, as one atomic UPDATE. Returns true iff a row actually changed;
    /// false means the user does not exist or was already greeted for `year`
    /// or later.
    pub async fn mark_greeted(&self, user_id: UniversalUuid, year: i32) -> Result<bool, DalError> {
        match self.dal.backend() {
            BackendType::Postgres => self.mark_greeted_postgres(user_id, year).await,
            BackendType::Sqlite => self.mark_greeted_sqlite(user_id, year).await,
        }
    }

    async fn mark_greeted_postgres(
        &self,
        user_id: UniversalUuid,
        year: i32,
    ) -> Result<bool, DalError> {
        use crate::database::schema::postgres::user_birthdays;

        let conn = self
            .dal
            .database
            .get_postgres_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let uid = user_id.as_uuid();
        let updated_rows = conn
            .interact(move |conn| {
                diesel::update(user_birthdays::table)
                    .filter(user_birthdays::user_id.eq(uid))
                    .filter(
                        user_birthdays::sent_year
                            .is_null()
                            .or(user_birthdays::sent_year.lt(year)),
                    )
                    .set(user_birthdays::sent_year.eq(Some(year)))
                    .execute(conn)
            })
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(updated_rows > 0)
    }

    async fn mark_greeted_sqlite(
        &self,
        user_id: UniversalUuid,
        year: i32,
    ) -> Result<bool, DalError> {
        use super::sqlite_models::uuid_to_blob;
        use crate::database::schema::sqlite::user_birthdays;

        let conn = self
            .dal
            .database
            .get_sqlite_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let uid_blob = uuid_to_blob(&user_id.as_uuid());
        let updated_rows = conn
            .interact(move |conn| {
                diesel::update(user_birthdays::table)
                    .filter(user_birthdays::user_id.eq(uid_blob))
                    .filter(
                        user_birthdays::sent_year
                            .is_null()
                            .or(user_birthdays::sent_year.lt(year)),
                    )
                    .set(user_birthdays::sent_year.eq(Some(year)))
                    .execute(conn)
            })
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(updated_rows > 0)
    }

    /// Compensating reset for a failed outbound call: reverts `sent_year`
    /// back to NULL, but only where it still equals the `year` just written.
    ///
    /// Returns true iff a row was reverted.
    pub async fn clear_greeted(&self, user_id: UniversalUuid, year: i32) -> Result<bool, DalError> {
        match self.dal.backend() {
            BackendType::Postgres => self.clear_greeted_postgres(user_id, year).await,
            BackendType::Sqlite => self.clear_greeted_sqlite(user_id, year).await,
        }
    }

    async fn clear_greeted_postgres(
        &self,
        user_id: UniversalUuid,
        year: i32,
    ) -> Result<bool, DalError> {
        use crate::database::schema::postgres::user_birthdays;

        let conn = self
            .dal
            .database
            .get_postgres_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let uid = user_id.as_uuid();
        let updated_rows = conn
            .interact(move |conn| {
                diesel::update(user_birthdays::table)
                    .filter(user_birthdays::user_id.eq(uid))
                    .filter(user_birthdays::sent_year.eq(Some(year)))
                    .set(user_birthdays::sent_year.eq(None::<i32>))
                    .execute(conn)
            })
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(updated_rows > 0)
    }

    async fn clear_greeted_sqlite(
        &self,
        user_id: UniversalUuid,
        year: i32,
    ) -> Result<bool, DalError> {
        use super::sqlite_models::uuid_to_blob;
        use crate::database::schema::sqlite::user_birthdays;

        let conn = self
            .dal
            .database
            .get_sqlite_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let uid_blob = uuid_to_blob(&user_id.as_uuid());
        let updated_rows = conn
            .interact(move |conn| {
                diesel::update(user_birthdays::table)
                    .filter(user_birthdays::user_id.eq(uid_blob))
                    .filter(user_birthdays::sent_year.eq(Some(year)))
                    .set(user_birthdays::sent_year.eq(None::<i32>))
                    .execute(conn)
            })
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(updated_rows > 0)
    }

    /// Inserts a user row and returns its generated identifier.
    pub async fn create_user(&self, new_user: NewUser) -> Result<UniversalUuid, DalError> {
        match self.dal.backend() {
            BackendType::Postgres => self.create_user_postgres(new_user).await,
            BackendType::Sqlite => self.create_user_sqlite(new_user).await,
        }
    }

    async fn create_user_postgres(&self, new_user: NewUser) -> Result<UniversalUuid, DalError> {
        use super::postgres_models::NewPgUser;
        use crate::database::schema::postgres::users;

        let conn = self
            .dal
            .database
            .get_postgres_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let id = UniversalUuid::new_v4();
        let pg_new = NewPgUser {
            id: id.as_uuid(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
        };

        conn.interact(move |conn| {
            diesel::insert_into(users::table)
                .values(&pg_new)
                .execute(conn)
        })
        .await
        .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(id)
    }

    async fn create_user_sqlite(&self, new_user: NewUser) -> Result<UniversalUuid, DalError> {
        use super::sqlite_models::{current_timestamp_string, uuid_to_blob, NewSqliteUser};
        use crate::database::schema::sqlite::users;

        let conn = self
            .dal
            .database
            .get_sqlite_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let id = UniversalUuid::new_v4();
        let sqlite_new = NewSqliteUser {
            id: uuid_to_blob(&id.as_uuid()),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            created_at: current_timestamp_string(),
        };

        conn.interact(move |conn| {
            diesel::insert_into(users::table)
                .values(&sqlite_new)
                .execute(conn)
        })
        .await
        .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(id)
    }

    /// Inserts a birthday row and returns its generated identifier.
    pub async fn create_birthday(
        &self,
        new_birthday: NewBirthday,
    ) -> Result<UniversalUuid, DalError> {
        match self.dal.backend() {
            BackendType::Postgres => self.create_birthday_postgres(new_birthday).await,
            BackendType::Sqlite => self.create_birthday_sqlite(new_birthday).await,
        }
    }

    async fn create_birthday_postgres(
        &self,
        new_birthday: NewBirthday,
    ) -> Result<UniversalUuid, DalError> {
        use super::postgres_models::NewPgBirthday;
        use crate::database::schema::postgres::user_birthdays;

        let conn = self
            .dal
            .database
            .get_postgres_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let id = UniversalUuid::new_v4();
        let pg_new = NewPgBirthday {
            id: id.as_uuid(),
            user_id: new_birthday.user_id.as_uuid(),
            day: new_birthday.day,
            month: new_birthday.month,
            year: new_birthday.year,
            sent_year: new_birthday.sent_year,
            timezone: new_birthday.timezone,
        };

        conn.interact(move |conn| {
            diesel::insert_into(user_birthdays::table)
                .values(&pg_new)
                .execute(conn)
        })
        .await
        .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(id)
    }

    async fn create_birthday_sqlite(
        &self,
        new_birthday: NewBirthday,
    ) -> Result<UniversalUuid, DalError> {
        use super::sqlite_models::{current_timestamp_string, uuid_to_blob, NewSqliteBirthday};
        use crate::database::schema::sqlite::user_birthdays;

        let conn = self
            .dal
            .database
            .get_sqlite_connection()
            .await
            .map_err(|e| DalError::ConnectionPool(e.to_string()))?;

        let id = UniversalUuid::new_v4();
        let sqlite_new = NewSqliteBirthday {
            id: uuid_to_blob(&id.as_uuid()),
            user_id: uuid_to_blob(&new_birthday.user_id.as_uuid()),
            day: new_birthday.day,
            month: new_birthday.month,
            year: new_birthday.year,
            sent_year: new_birthday.sent_year,
            timezone: new_birthday.timezone,
            created_at: current_timestamp_string(),
        };

        conn.interact(move |conn| {
            diesel::insert_into(user_birthdays::table)
                .values(&sqlite_new)
                .execute(conn)
        })
        .await
        .map_err(|e| DalError::ConnectionPool(e.to_string()))??;

        Ok(id)
    }
}
