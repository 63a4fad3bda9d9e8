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

//! The contract between the row client and the table stores it talks to.

pub mod row;
pub mod table_store;

pub use row::{
    Cell, MutateRowOutcome, Mutation, RowData, TableName, TimeRange, MAX_MUTATIONS,
    SERVER_ASSIGNED_TIMESTAMP,
};
pub use table_store::{TableStore, TableStoreRef};
