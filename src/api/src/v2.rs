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

//! Messages and the client stub of the `google.bigtable.v2.Bigtable` service,
//! limited to what row mutation and single row reads need.

pub mod bigtable_client;
#[cfg(any(test, feature = "testing"))]
pub mod bigtable_server;
pub mod helper;

/// Request message for Bigtable.MutateRow.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutateRowRequest {
    /// `projects/<project>/instances/<instance>/tables/<table>`.
    #[prost(string, tag = "1")]
    pub table_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub app_profile_id: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub row_key: ::prost::alloc::vec::Vec<u8>,
    /// Applied atomically and in order.
    #[prost(message, repeated, tag = "3")]
    pub mutations: ::prost::alloc::vec::Vec<Mutation>,
}

/// Response message for Bigtable.MutateRow.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct MutateRowResponse {}

/// A change to be made to a single row.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Mutation {
    #[prost(oneof = "mutation::Mutation", tags = "1, 2, 3, 4")]
    pub mutation: ::core::option::Option<mutation::Mutation>,
}

pub mod mutation {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SetCell {
        #[prost(string, tag = "1")]
        pub family_name: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "2")]
        pub column_qualifier: ::prost::alloc::vec::Vec<u8>,
        /// `-1` asks the server to use its own clock.
        #[prost(int64, tag = "3")]
        pub timestamp_micros: i64,
        #[prost(bytes = "vec", tag = "4")]
        pub value: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteFromColumn {
        #[prost(string, tag = "1")]
        pub family_name: ::prost::alloc::string::String,
        #[prost(bytes = "vec", tag = "2")]
        pub column_qualifier: ::prost::alloc::vec::Vec<u8>,
        #[prost(message, optional, tag = "3")]
        pub time_range: ::core::option::Option<super::TimestampRange>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeleteFromFamily {
        #[prost(string, tag = "1")]
        pub family_name: ::prost::alloc::string::String,
    }

    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct DeleteFromRow {}

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Mutation {
        #[prost(message, tag = "1")]
        SetCell(SetCell),
        #[prost(message, tag = "2")]
        DeleteFromColumn(DeleteFromColumn),
        #[prost(message, tag = "3")]
        DeleteFromFamily(DeleteFromFamily),
        #[prost(message, tag = "4")]
        DeleteFromRow(DeleteFromRow),
    }
}

/// Half-open `[start, end)` range of timestamps, `0` means unbounded.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct TimestampRange {
    #[prost(int64, tag = "1")]
    pub start_timestamp_micros: i64,
    #[prost(int64, tag = "2")]
    pub end_timestamp_micros: i64,
}

/// Request message for Bigtable.ReadRows.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRowsRequest {
    #[prost(string, tag = "1")]
    pub table_name: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub app_profile_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub rows: ::core::option::Option<RowSet>,
    #[prost(message, optional, tag = "3")]
    pub filter: ::core::option::Option<RowFilter>,
    #[prost(int64, tag = "4")]
    pub rows_limit: i64,
    #[prost(bool, tag = "7")]
    pub reversed: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowSet {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub row_keys: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowFilter {
    #[prost(oneof = "row_filter::Filter", tags = "1, 17, 18, 5, 6, 12")]
    pub filter: ::core::option::Option<row_filter::Filter>,
}

pub mod row_filter {
    /// Applies the filters in order, each one sees the output of the previous.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Chain {
        #[prost(message, repeated, tag = "1")]
        pub filters: ::prost::alloc::vec::Vec<super::RowFilter>,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Filter {
        #[prost(message, tag = "1")]
        Chain(Chain),
        #[prost(bool, tag = "17")]
        PassAllFilter(bool),
        #[prost(bool, tag = "18")]
        BlockAllFilter(bool),
        /// RE2 pattern that must match the whole family name.
        #[prost(string, tag = "5")]
        FamilyNameRegexFilter(::prost::alloc::string::String),
        #[prost(bytes = "vec", tag = "6")]
        ColumnQualifierRegexFilter(::prost::alloc::vec::Vec<u8>),
        #[prost(int32, tag = "12")]
        CellsPerColumnLimitFilter(i32),
    }
}

/// Response message for Bigtable.ReadRows.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRowsResponse {
    #[prost(message, repeated, tag = "1")]
    pub chunks: ::prost::alloc::vec::Vec<read_rows_response::CellChunk>,
    #[prost(bytes = "vec", tag = "2")]
    pub last_scanned_row_key: ::prost::alloc::vec::Vec<u8>,
}

pub mod read_rows_response {
    /// A piece of a row. Fields left unset repeat the value of the
    /// previous chunk of the same row.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CellChunk {
        #[prost(bytes = "vec", tag = "1")]
        pub row_key: ::prost::alloc::vec::Vec<u8>,
        #[prost(message, optional, tag = "2")]
        pub family_name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(message, optional, tag = "3")]
        pub qualifier: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(int64, tag = "4")]
        pub timestamp_micros: i64,
        #[prost(string, repeated, tag = "5")]
        pub labels: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(bytes = "vec", tag = "6")]
        pub value: ::prost::alloc::vec::Vec<u8>,
        /// Non-zero when the value is split across chunks, it is the full size.
        #[prost(int32, tag = "7")]
        pub value_size: i32,
        #[prost(oneof = "cell_chunk::RowStatus", tags = "8, 9")]
        pub row_status: ::core::option::Option<cell_chunk::RowStatus>,
    }

    pub mod cell_chunk {
        #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
        pub enum RowStatus {
            #[prost(bool, tag = "8")]
            ResetRow(bool),
            #[prost(bool, tag = "9")]
            CommitRow(bool),
        }
    }
}
