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

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use common_error::ext::BoxedError;

use crate::row::{MutateRowOutcome, Mutation, RowData, TableName};

pub type TableStoreRef = Arc<dyn TableStore>;

/// A store holding Bigtable-style tables, local or behind the wire.
///
/// Failures come back as [BoxedError] so that callers can surface the
/// store's own error and status code unchanged.
#[async_trait]
pub trait TableStore: Send + Sync {
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// Applies `mutations` to the row atomically and in order: either all of
    /// them take effect or none does.
    async fn mutate_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        mutations: &[Mutation],
    ) -> Result<MutateRowOutcome, BoxedError>;

    /// Reads one row, restricted to `family` when given. `None` when the row
    /// has no (matching) cells.
    async fn read_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        family: Option<&str>,
    ) -> Result<Option<RowData>, BoxedError>;

    /// Releases whatever the store holds. Must be safe to call once on
    /// every exit path.
    async fn close(&self) -> Result<(), BoxedError> {
        Ok(())
    }
}
