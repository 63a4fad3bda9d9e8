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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Garbage collection settings of a column family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFamily {
    /// Keep at most this many versions of each column.
    pub max_versions: Option<u32>,
}

/// Persisted schema of a table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// Full resource name of the table.
    pub name: String,
    /// Column families by id.
    pub column_families: BTreeMap<String, ColumnFamily>,
    pub deletion_protection: bool,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        let _ = self
            .column_families
            .insert(family.into(), ColumnFamily::default());
        self
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.column_families.contains_key(family)
    }

    /// Family ids may come prefixed with the table name, `{table}/{family}`.
    /// Strips that prefix so that ids are always bare.
    pub fn normalize_family_ids(&mut self) {
        let prefix = format!("{}/", self.name);
        let families = std::mem::take(&mut self.column_families);
        self.column_families = families
            .into_iter()
            .map(|(id, family)| match id.strip_prefix(&prefix) {
                Some(bare) => (bare.to_string(), family),
                None => (id, family),
            })
            .collect();
    }
}
