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

use super::mutation::{DeleteFromColumn, DeleteFromFamily, DeleteFromRow, SetCell};
use super::row_filter::Filter;
use super::{mutation, Mutation, RowFilter, RowSet, TimestampRange};

/// Metadata header that routes a request to the table it addresses.
pub const REQUEST_PARAMS_HEADER: &str = "x-goog-request-params";

/// Value of [REQUEST_PARAMS_HEADER] for requests against `table_name`.
pub fn request_params(table_name: &str, app_profile_id: &str) -> String {
    if app_profile_id.is_empty() {
        format!("table_name={table_name}")
    } else {
        format!("table_name={table_name}&app_profile_id={app_profile_id}")
    }
}

impl Mutation {
    #[inline]
    pub fn set_cell(
        family_name: impl Into<String>,
        column_qualifier: impl Into<Vec<u8>>,
        timestamp_micros: i64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self::from(mutation::Mutation::SetCell(SetCell {
            family_name: family_name.into(),
            column_qualifier: column_qualifier.into(),
            timestamp_micros,
            value: value.into(),
        }))
    }

    #[inline]
    pub fn delete_from_column(
        family_name: impl Into<String>,
        column_qualifier: impl Into<Vec<u8>>,
        time_range: Option<TimestampRange>,
    ) -> Self {
        Self::from(mutation::Mutation::DeleteFromColumn(DeleteFromColumn {
            family_name: family_name.into(),
            column_qualifier: column_qualifier.into(),
            time_range,
        }))
    }

    /// Deletes every cell of the family in the row.
    #[inline]
    pub fn delete_from_family(family_name: impl Into<String>) -> Self {
        Self::from(mutation::Mutation::DeleteFromFamily(DeleteFromFamily {
            family_name: family_name.into(),
        }))
    }

    #[inline]
    pub fn delete_from_row() -> Self {
        Self::from(mutation::Mutation::DeleteFromRow(DeleteFromRow {}))
    }
}

impl From<mutation::Mutation> for Mutation {
    fn from(mutation: mutation::Mutation) -> Self {
        Self {
            mutation: Some(mutation),
        }
    }
}

impl RowSet {
    pub fn single(row_key: impl Into<Vec<u8>>) -> Self {
        Self {
            row_keys: vec![row_key.into()],
        }
    }
}

impl From<Filter> for RowFilter {
    fn from(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
        }
    }
}

impl RowFilter {
    /// Keeps only the cells of exactly `family`.
    pub fn family(family: &str) -> Self {
        Filter::FamilyNameRegexFilter(regex::escape(family)).into()
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::v2::read_rows_response::cell_chunk::RowStatus;
    use crate::v2::read_rows_response::CellChunk;
    use crate::v2::{MutateRowRequest, ReadRowsResponse};

    #[test]
    fn test_request_params() {
        assert_eq!(
            "table_name=projects/p/instances/i/tables/cars",
            request_params("projects/p/instances/i/tables/cars", "")
        );
        assert_eq!(
            "table_name=t&app_profile_id=batch",
            request_params("t", "batch")
        );
    }

    #[test]
    fn test_delete_from_family_wire_format() {
        // field 3 (DeleteFromFamily), length 7, field 1 (family_name), length 5
        let expected = [0x1a, 0x07, 0x0a, 0x05, b'i', b'd', b'd', b'u', b'p'];
        assert_eq!(
            expected.to_vec(),
            Mutation::delete_from_family("iddup").encode_to_vec()
        );
    }

    #[test]
    fn test_mutate_row_request_wire_format() {
        let req = MutateRowRequest {
            table_name: "t".to_string(),
            row_key: b"car-1".to_vec(),
            mutations: vec![Mutation::delete_from_row()],
            ..Default::default()
        };
        let expected = [
            0x0a, 0x01, b't', // table_name
            0x12, 0x05, b'c', b'a', b'r', b'-', b'1', // row_key
            0x1a, 0x02, 0x22, 0x00, // mutations[0] = DeleteFromRow
        ];
        assert_eq!(expected.to_vec(), req.encode_to_vec());
    }

    #[test]
    fn test_family_filter_escapes_name() {
        assert_eq!(
            Some(Filter::FamilyNameRegexFilter("cf\\.1".to_string())),
            RowFilter::family("cf.1").filter
        );
    }

    #[test]
    fn test_decode_cell_chunk_with_wrappers() {
        let resp = ReadRowsResponse {
            chunks: vec![CellChunk {
                row_key: b"car-1".to_vec(),
                family_name: Some("other".to_string()),
                qualifier: Some(b"mileage".to_vec()),
                timestamp_micros: 1_000,
                value: b"500".to_vec(),
                row_status: Some(RowStatus::CommitRow(true)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let decoded = ReadRowsResponse::decode(resp.encode_to_vec().as_slice()).unwrap();
        assert_eq!(resp, decoded);
        assert_eq!(Some("other"), decoded.chunks[0].family_name.as_deref());
    }
}
