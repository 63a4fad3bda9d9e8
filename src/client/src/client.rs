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
use std::sync::Arc;

use common_telemetry::info;
use snafu::{OptionExt, ResultExt};
use store_api::{RowData, TableName, TableStoreRef};

use crate::error::{CloseStoreSnafu, InvalidEndpointSnafu, RequestFailedSnafu, Result};
use crate::grpc::GrpcTableStore;
use crate::options::ClientOptions;
use crate::row::Row;

/// Handle to the table store of one project.
///
/// The handle is acquired once, cloned cheaply into the tables and rows
/// derived from it, and released with [Client::close].
#[derive(Clone)]
pub struct Client {
    project: String,
    store: TableStoreRef,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("project", &self.project)
            .field("store", &self.store.name())
            .finish()
    }
}

impl Client {
    /// Connects to the emulator named in `opts`. The channel is established
    /// lazily by the first request.
    pub fn connect(opts: &ClientOptions) -> Result<Self> {
        opts.endpoint.validate()?;
        let addr = opts
            .endpoint
            .emulator_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .context(InvalidEndpointSnafu {
                reason: "emulator host is not set",
            })?;

        info!(
            "Connecting to emulator at {}, project: {}",
            addr, opts.endpoint.project
        );
        let store = GrpcTableStore::new(addr, opts.grpc.clone(), &opts.app_profile_id);
        Ok(Self::with_store(&opts.endpoint.project, Arc::new(store)))
    }

    pub fn with_store(project: impl Into<String>, store: TableStoreRef) -> Self {
        Self {
            project: project.into(),
            store,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn store(&self) -> &TableStoreRef {
        &self.store
    }

    pub fn instance(&self, instance_id: impl Into<String>) -> Instance {
        Instance {
            client: self.clone(),
            instance_id: instance_id.into(),
        }
    }

    /// Releases the underlying store.
    pub async fn close(self) -> Result<()> {
        self.store.close().await.context(CloseStoreSnafu {
            store: self.store.name(),
        })?;
        info!("Closed {} table store", self.store.name());
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Instance {
    client: Client,
    instance_id: String,
}

impl Instance {
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn table(&self, table_id: impl Into<String>) -> Table {
        Table {
            store: self.client.store.clone(),
            name: TableName::new(&self.client.project, &self.instance_id, table_id),
        }
    }
}

#[derive(Clone)]
pub struct Table {
    store: TableStoreRef,
    name: TableName,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name.path())
            .finish()
    }
}

impl Table {
    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// A row buffer for `row_key`. Nothing is sent until the row is
    /// committed.
    pub fn row(&self, row_key: impl Into<Vec<u8>>) -> Row {
        Row::new(self.store.clone(), self.name.clone(), row_key.into())
    }

    pub async fn read_row(&self, row_key: &[u8], family: Option<&str>) -> Result<Option<RowData>> {
        self.store
            .read_row(&self.name, row_key, family)
            .await
            .context(RequestFailedSnafu {
                operation: "ReadRows",
            })
    }
}
