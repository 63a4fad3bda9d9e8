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

use common_error::ext::ErrorExt;
use common_error::status_code::StatusCode;
use snafu::{Location, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to load layered options"))]
    LoadLayeredConfig {
        #[snafu(implicit)]
        location: Location,
        source: common_config::error::Error,
    },

    #[snafu(display("Invalid options: {}", msg))]
    InvalidOptions {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to open client"))]
    OpenClient {
        #[snafu(implicit)]
        location: Location,
        source: client::Error,
    },

    #[snafu(display("Failed to open storage at {}", dir))]
    OpenStorage {
        dir: String,
        #[snafu(implicit)]
        location: Location,
        source: storage::error::Error,
    },

    #[snafu(display("Failed to destroy storage at {}", dir))]
    DestroyStorage {
        dir: String,
        #[snafu(implicit)]
        location: Location,
        source: storage::error::Error,
    },

    #[snafu(display("Failed to commit row {}", row_key))]
    CommitRow {
        row_key: String,
        #[snafu(implicit)]
        location: Location,
        source: client::Error,
    },

    #[snafu(display("Failed to close client"))]
    CloseClient {
        #[snafu(implicit)]
        location: Location,
        source: client::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl ErrorExt for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::LoadLayeredConfig { source, .. } => source.status_code(),
            Error::InvalidOptions { .. } => StatusCode::InvalidArguments,
            Error::OpenClient { source, .. }
            | Error::CommitRow { source, .. }
            | Error::CloseClient { source, .. } => source.status_code(),
            Error::OpenStorage { source, .. } | Error::DestroyStorage { source, .. } => {
                source.status_code()
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
