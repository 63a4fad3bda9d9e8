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
use std::io::Error as IoError;

use common_error::ext::ErrorExt;
use common_error::status_code::StatusCode;
use serde_json::error::Error as JsonError;
use snafu::{Location, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Table not found: {}", table))]
    TableNotFound {
        table: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Column family {} not found in table {}", family, table))]
    FamilyNotFound {
        table: String,
        family: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Table {} is protected from deletion", table))]
    DeletionProtected {
        table: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid table name: '{}'", table))]
    InvalidTableName {
        table: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to decode schema of table {}", table))]
    DecodeSchema {
        table: String,
        #[snafu(source)]
        error: JsonError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to encode schema of table {}", table))]
    EncodeSchema {
        table: String,
        #[snafu(source)]
        error: JsonError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to read snapshot from path: {}", path))]
    ReadSnapshot {
        path: String,
        #[snafu(source)]
        error: IoError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to write snapshot into path: {}", path))]
    WriteSnapshot {
        path: String,
        #[snafu(source)]
        error: IoError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to decode snapshot from path: {}", path))]
    DecodeSnapshot {
        path: String,
        #[snafu(source)]
        error: JsonError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to encode snapshot"))]
    EncodeSnapshot {
        #[snafu(source)]
        error: JsonError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to destroy storage directory: {}", path))]
    DestroyStorage {
        path: String,
        #[snafu(source)]
        error: IoError,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl ErrorExt for Error {
    fn status_code(&self) -> StatusCode {
        use Error::*;

        match self {
            TableNotFound { .. } => StatusCode::TableNotFound,
            FamilyNotFound { .. } => StatusCode::TableColumnNotFound,
            DeletionProtected { .. } => StatusCode::PermissionDenied,
            InvalidTableName { .. } => StatusCode::InvalidArguments,
            DecodeSchema { .. } | DecodeSnapshot { .. } => StatusCode::Unexpected,
            EncodeSchema { .. } | EncodeSnapshot { .. } => StatusCode::Internal,
            ReadSnapshot { .. } | WriteSnapshot { .. } | DestroyStorage { .. } => {
                StatusCode::StorageUnavailable
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
