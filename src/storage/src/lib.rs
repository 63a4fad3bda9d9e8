// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Embedded storage for Bigtable-style tables.
//!
//! Cells of each `{table}/{family}` live in their own keyspace under keys
//! of the form `/tables/{table}/{row}/{qualifier}/{timestamp}`. A default
//! keyspace keeps the table manifest and the per-table schemas.

mod engine;
pub mod error;
pub mod keys;
pub mod schema;
mod snapshot;
mod table_store;

pub use engine::Storage;
pub use schema::{ColumnFamily, TableSchema};
