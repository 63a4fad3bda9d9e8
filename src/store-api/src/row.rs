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

use serde::{Deserialize, Serialize};

/// Upper bound of mutations a single row commit may carry.
pub const MAX_MUTATIONS: usize = 100_000;

/// Timestamp asking the store to stamp a cell with its own clock.
pub const SERVER_ASSIGNED_TIMESTAMP: i64 = -1;

/// Locates one table of one instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub project: String,
    pub instance: String,
    pub table: String,
}

impl TableName {
    pub fn new(
        project: impl Into<String>,
        instance: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            instance: instance.into(),
            table: table.into(),
        }
    }

    /// Full resource name, `projects/{project}/instances/{instance}/tables/{table}`.
    pub fn path(&self) -> String {
        format!(
            "projects/{}/instances/{}/tables/{}",
            self.project, self.instance, self.table
        )
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Half-open `[start_micros, end_micros)` timestamp range, `end_micros == 0`
/// leaves it unbounded above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_micros: i64,
    pub end_micros: i64,
}

impl TimeRange {
    pub fn contains(&self, timestamp_micros: i64) -> bool {
        timestamp_micros >= self.start_micros
            && (self.end_micros == 0 || timestamp_micros < self.end_micros)
    }
}

/// A buffered change to one row, not applied until the row is committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    SetCell {
        family: String,
        qualifier: Vec<u8>,
        /// [SERVER_ASSIGNED_TIMESTAMP] lets the store pick the timestamp.
        timestamp_micros: i64,
        value: Vec<u8>,
    },
    DeleteFromColumn {
        family: String,
        qualifier: Vec<u8>,
        time_range: Option<TimeRange>,
    },
    /// Deletes every cell of `family` in the row.
    DeleteFromFamily { family: String },
    DeleteFromRow,
}

impl Mutation {
    /// The column family this mutation touches, `None` for whole row deletes.
    pub fn family(&self) -> Option<&str> {
        match self {
            Mutation::SetCell { family, .. }
            | Mutation::DeleteFromColumn { family, .. }
            | Mutation::DeleteFromFamily { family } => Some(family),
            Mutation::DeleteFromRow => None,
        }
    }
}

/// A single (row, column, timestamp) value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub family: String,
    pub qualifier: Vec<u8>,
    pub timestamp_micros: i64,
    pub value: Vec<u8>,
    pub labels: Vec<String>,
}

/// The cells of one row, ordered by family, qualifier and newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    pub key: Vec<u8>,
    pub cells: Vec<Cell>,
}

impl RowData {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            cells: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells_in_family<'a, 'b>(
        &'a self,
        family: &'b str,
    ) -> impl Iterator<Item = &'a Cell> + 'b
    where
        'a: 'b,
    {
        self.cells.iter().filter(move |c| c.family == family)
    }

    /// Newest value of the column.
    pub fn latest(&self, family: &str, qualifier: &[u8]) -> Option<&[u8]> {
        self.cells
            .iter()
            .filter(|c| c.family == family && c.qualifier == qualifier)
            .max_by_key(|c| c.timestamp_micros)
            .map(|c| c.value.as_slice())
    }

    /// Orders cells by family, qualifier, then newest first.
    pub fn sort(&mut self) {
        self.cells.sort_by(|a, b| {
            a.family
                .cmp(&b.family)
                .then_with(|| a.qualifier.cmp(&b.qualifier))
                .then_with(|| b.timestamp_micros.cmp(&a.timestamp_micros))
        });
    }
}

/// What the store reports back for a committed row mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateRowOutcome {
    /// Number of mutations the store applied.
    pub applied: usize,
}
