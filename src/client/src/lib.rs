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

//! Row client for Bigtable-style tables.
//!
//! ```ignore
//! let client = Client::connect(&opts)?;
//! let mut row = client.instance("my-instance").table("cars").row("car-1");
//! let staged = row.delete_cells("iddup", Columns::All).to_vec();
//! let response = row.commit().await?;
//! client.close().await?;
//! ```

mod client;
pub mod error;
pub mod grpc;
pub mod merge;
pub mod options;
mod row;

pub use self::client::{Client, Instance, Table};
pub use self::error::{Error, Result};
pub use self::grpc::GrpcTableStore;
pub use self::options::{ClientOptions, EndpointOptions};
pub use self::row::{Columns, CommitResponse, Row};
