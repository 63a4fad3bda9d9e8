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

//! Reassembles rows from the cell chunks of a `ReadRows` stream.

use api::v2::read_rows_response::cell_chunk::RowStatus;
use api::v2::read_rows_response::CellChunk;
use snafu::{ensure, OptionExt};
use store_api::{Cell, RowData};

use crate::error::{InvalidChunkSnafu, Result};

#[derive(Debug, Default)]
pub struct RowMerger {
    rows: Vec<RowData>,
    row: Option<RowData>,
    family: Option<String>,
    qualifier: Option<Vec<u8>>,
    /// A cell whose value is split across chunks.
    partial: Option<Cell>,
}

impl RowMerger {
    pub fn push(&mut self, chunk: CellChunk) -> Result<()> {
        let CellChunk {
            row_key,
            family_name,
            qualifier,
            timestamp_micros,
            labels,
            value,
            value_size,
            row_status,
        } = chunk;

        if row_status == Some(RowStatus::ResetRow(true)) {
            self.reset();
            return Ok(());
        }

        if !row_key.is_empty() {
            match &self.row {
                Some(row) => ensure!(
                    row.key == row_key,
                    InvalidChunkSnafu {
                        reason: "new row started before the previous one was committed",
                    }
                ),
                None => self.row = Some(RowData::new(row_key)),
            }
        }
        let row = self.row.as_mut().context(InvalidChunkSnafu {
            reason: "chunk without row key",
        })?;

        if let Some(family) = family_name {
            ensure!(
                qualifier.is_some(),
                InvalidChunkSnafu {
                    reason: "new family without qualifier",
                }
            );
            self.family = Some(family);
        }
        if qualifier.is_some() {
            self.qualifier = qualifier;
        }

        let cell = match self.partial.take() {
            Some(mut cell) => {
                cell.value.extend(value);
                cell
            }
            None => Cell {
                family: self.family.clone().context(InvalidChunkSnafu {
                    reason: "cell without family",
                })?,
                qualifier: self.qualifier.clone().context(InvalidChunkSnafu {
                    reason: "cell without qualifier",
                })?,
                timestamp_micros,
                value,
                labels,
            },
        };
        if value_size > 0 {
            self.partial = Some(cell);
        } else {
            row.cells.push(cell);
        }

        if row_status == Some(RowStatus::CommitRow(true)) {
            ensure!(
                self.partial.is_none(),
                InvalidChunkSnafu {
                    reason: "row committed in the middle of a split cell",
                }
            );
            if let Some(mut row) = self.row.take() {
                row.sort();
                self.rows.push(row);
            }
            self.family = None;
            self.qualifier = None;
        }
        Ok(())
    }

    /// Returns the committed rows, failing if the stream ended inside a row.
    pub fn finish(self) -> Result<Vec<RowData>> {
        ensure!(
            self.row.is_none(),
            InvalidChunkSnafu {
                reason: "stream ended before the last row was committed",
            }
        );
        Ok(self.rows)
    }

    fn reset(&mut self) {
        self.row = None;
        self.family = None;
        self.qualifier = None;
        self.partial = None;
    }
}
