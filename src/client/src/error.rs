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

use common_error::ext::{BoxedError, ErrorExt};
use common_error::status_code::StatusCode;
use common_grpc::status::status_code_from_tonic;
use snafu::{Location, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid endpoint: {}", reason))]
    InvalidEndpoint {
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to create channel to {}", addr))]
    CreateChannel {
        addr: String,
        #[snafu(implicit)]
        location: Location,
        source: common_grpc::Error,
    },

    #[snafu(display("{} request failed", operation))]
    RequestFailed {
        operation: String,
        #[snafu(implicit)]
        location: Location,
        source: BoxedError,
    },

    #[snafu(display("Too many mutations for one row: {}, limit: {}", count, limit))]
    TooManyMutations {
        count: usize,
        limit: usize,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{} rejected by server, code: {}", operation, error.code()))]
    Tonic {
        operation: String,
        #[snafu(source)]
        error: tonic::Status,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid chunk in ReadRows response: {}", reason))]
    InvalidChunk {
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to close table store {}", store))]
    CloseStore {
        store: String,
        #[snafu(implicit)]
        location: Location,
        source: BoxedError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl ErrorExt for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidEndpoint { .. } | Error::TooManyMutations { .. } => {
                StatusCode::InvalidArguments
            }
            Error::CreateChannel { source, .. } => source.status_code(),
            Error::RequestFailed { source, .. } | Error::CloseStore { source, .. } => {
                source.status_code()
            }
            Error::Tonic { error, .. } => status_code_from_tonic(error.code()),
            Error::InvalidChunk { .. } => StatusCode::Unexpected,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
