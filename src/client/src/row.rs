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

use std::fmt;

use common_telemetry::debug;
use snafu::{ensure, ResultExt};
use store_api::{
    Mutation, TableName, TableStoreRef, TimeRange, MAX_MUTATIONS, SERVER_ASSIGNED_TIMESTAMP,
};

use crate::error::{RequestFailedSnafu, Result, TooManyMutationsSnafu};

/// Which columns of a family a deletion covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Columns {
    All,
    Some(Vec<Vec<u8>>),
}

/// What a successful commit reports back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitResponse {
    pub table: String,
    pub row_key: String,
    pub applied: usize,
}

/// Mutations buffered for one row, sent as a single atomic request by
/// [Row::commit].
pub struct Row {
    store: TableStoreRef,
    table: TableName,
    key: Vec<u8>,
    mutations: Vec<Mutation>,
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("table", &self.table.path())
            .field("key", &String::from_utf8_lossy(&self.key))
            .field("mutations", &self.mutations)
            .finish()
    }
}

impl Row {
    pub(crate) fn new(store: TableStoreRef, table: TableName, key: Vec<u8>) -> Self {
        Self {
            store,
            table,
            key,
            mutations: vec![],
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Mutations staged and not yet committed.
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    fn stage(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> &[Mutation] {
        let start = self.mutations.len();
        self.mutations.extend(mutations);
        &self.mutations[start..]
    }

    /// Stages a cell write. The store assigns the timestamp when
    /// `timestamp_micros` is `None`.
    pub fn set_cell(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        timestamp_micros: Option<i64>,
    ) -> &[Mutation] {
        self.stage([Mutation::SetCell {
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp_micros: timestamp_micros.unwrap_or(SERVER_ASSIGNED_TIMESTAMP),
            value: value.into(),
        }])
    }

    /// Stages the deletion of one column, limited to `time_range` if given.
    pub fn delete_cell(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<Vec<u8>>,
        time_range: Option<TimeRange>,
    ) -> &[Mutation] {
        self.stage([Mutation::DeleteFromColumn {
            family: family.into(),
            qualifier: qualifier.into(),
            time_range,
        }])
    }

    /// Stages the deletion of cells in `family`. [Columns::All] empties the
    /// whole family for this row whatever columns it holds.
    ///
    /// Returns the mutations just staged. Neither the family nor the row is
    /// checked here, the store does that on commit.
    pub fn delete_cells(&mut self, family: impl Into<String>, columns: Columns) -> &[Mutation] {
        let family = family.into();
        match columns {
            Columns::All => self.stage([Mutation::DeleteFromFamily { family }]),
            Columns::Some(qualifiers) => self.stage(qualifiers.into_iter().map(|qualifier| {
                Mutation::DeleteFromColumn {
                    family: family.clone(),
                    qualifier,
                    time_range: None,
                }
            })),
        }
    }

    /// Stages the deletion of the entire row.
    pub fn delete(&mut self) -> &[Mutation] {
        self.stage([Mutation::DeleteFromRow])
    }

    /// Drops every staged mutation.
    pub fn clear(&mut self) {
        self.mutations.clear();
    }

    /// Sends the staged mutations as one atomic request. The buffer is
    /// emptied whether or not the request succeeds, a failed commit is not
    /// retried.
    pub async fn commit(&mut self) -> Result<CommitResponse> {
        let mutations = std::mem::take(&mut self.mutations);
        ensure!(
            mutations.len() <= MAX_MUTATIONS,
            TooManyMutationsSnafu {
                count: mutations.len(),
                limit: MAX_MUTATIONS,
            }
        );

        let applied = if mutations.is_empty() {
            0
        } else {
            debug!(
                "Committing {} mutations to row {} of {}",
                mutations.len(),
                String::from_utf8_lossy(&self.key),
                self.table
            );
            self.store
                .mutate_row(&self.table, &self.key, &mutations)
                .await
                .context(RequestFailedSnafu {
                    operation: "MutateRow",
                })?
                .applied
        };

        Ok(CommitResponse {
            table: self.table.path(),
            row_key: String::from_utf8_lossy(&self.key).into_owned(),
            applied,
        })
    }
}
