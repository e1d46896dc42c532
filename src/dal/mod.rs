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

//! Data Access Layer with runtime backend selection
//!
//! Every operation dispatches to a PostgreSQL or SQLite implementation based
//! on the database connection type detected at pool creation. Backend-specific
//! row types live in `postgres_models` / `sqlite_models`; domain code only
//! sees the universal models.

pub mod birthday;
mod postgres_models;
mod sqlite_models;

pub use birthday::BirthdayDAL;

use crate::database::{AnyPool, BackendType, Database};

/// The Data Access Layer entry point.
///
/// # Thread Safety
///
/// The `DAL` struct is `Clone` and can be safely shared between threads.
/// Each clone references the same underlying database connection pool.
#[derive(Clone, Debug)]
pub struct DAL {
    /// The database instance with connection pool
    pub database: Database,
}

impl DAL {
    /// Creates a new DAL instance.
    pub fn new(database: Database) -> Self {
        DAL { database }
    }

    /// Returns the backend type for this DAL instance.
    pub fn backend(&self) -> BackendType {
        self.database.backend()
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> AnyPool {
        self.database.pool()
    }

    /// Returns a birthday DAL for candidate queries and greeting-state writes.
    pub fn birthdays(&self) -> BirthdayDAL {
        BirthdayDAL::new(self)
    }
}
