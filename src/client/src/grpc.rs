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

use api::v2::bigtable_client::BigtableClient;
use api::v2::helper::{request_params, REQUEST_PARAMS_HEADER};
use api::v2::{self, MutateRowRequest, ReadRowsRequest, RowFilter, RowSet, TimestampRange};
use async_trait::async_trait;
use common_error::ext::BoxedError;
use common_grpc::channel_manager::{ChannelConfig, ChannelManager};
use common_telemetry::debug;
use snafu::{OptionExt, ResultExt};
use store_api::{MutateRowOutcome, Mutation, RowData, TableName, TableStore};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;

use crate::error::{CreateChannelSnafu, InvalidEndpointSnafu, Result, TonicSnafu};
use crate::merge::RowMerger;

/// Upper bound of a decoded `ReadRows` message.
const MAX_DECODING_MESSAGE_SIZE: usize = 256 * 1024 * 1024;

/// A [TableStore] behind the Bigtable v2 gRPC API.
#[derive(Debug)]
pub struct GrpcTableStore {
    addr: String,
    app_profile_id: String,
    channel_manager: ChannelManager,
}

impl GrpcTableStore {
    pub fn new(
        addr: impl Into<String>,
        config: ChannelConfig,
        app_profile_id: impl Into<String>,
    ) -> Self {
        Self {
            addr: addr.into(),
            app_profile_id: app_profile_id.into(),
            channel_manager: ChannelManager::with_config(config),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn client(&self) -> Result<BigtableClient<Channel>> {
        let channel = self
            .channel_manager
            .get(&self.addr)
            .context(CreateChannelSnafu { addr: &self.addr })?;
        Ok(BigtableClient::new(channel).max_decoding_message_size(MAX_DECODING_MESSAGE_SIZE))
    }

    /// Wraps `message` into a request routed to `table_name`.
    fn request<T>(&self, table_name: &str, message: T) -> Result<tonic::Request<T>> {
        let params = request_params(table_name, &self.app_profile_id);
        let value: MetadataValue<Ascii> = params
            .parse()
            .ok()
            .with_context(|| InvalidEndpointSnafu {
                reason: format!("'{params}' is not a valid request header"),
            })?;

        let mut request = tonic::Request::new(message);
        let _ = request.metadata_mut().insert(REQUEST_PARAMS_HEADER, value);
        Ok(request)
    }

    async fn do_mutate_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        mutations: &[Mutation],
    ) -> Result<MutateRowOutcome> {
        let table_name = table.path();
        let message = MutateRowRequest {
            table_name: table_name.clone(),
            app_profile_id: self.app_profile_id.clone(),
            row_key: row_key.to_vec(),
            mutations: mutations.iter().map(to_proto).collect(),
        };
        let request = self.request(&table_name, message)?;

        debug!(
            "MutateRow on {}, row: {}, mutations: {}",
            table_name,
            String::from_utf8_lossy(row_key),
            mutations.len()
        );
        let _ = self
            .client()?
            .mutate_row(request)
            .await
            .context(TonicSnafu {
                operation: "MutateRow",
            })?;

        Ok(MutateRowOutcome {
            applied: mutations.len(),
        })
    }

    async fn do_read_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        family: Option<&str>,
    ) -> Result<Option<RowData>> {
        let table_name = table.path();
        let message = ReadRowsRequest {
            table_name: table_name.clone(),
            app_profile_id: self.app_profile_id.clone(),
            rows: Some(RowSet::single(row_key)),
            filter: family.map(RowFilter::family),
            rows_limit: 1,
            reversed: false,
        };
        let request = self.request(&table_name, message)?;

        let mut stream = self
            .client()?
            .read_rows(request)
            .await
            .context(TonicSnafu {
                operation: "ReadRows",
            })?
            .into_inner();

        let mut merger = RowMerger::default();
        while let Some(response) = stream.message().await.context(TonicSnafu {
            operation: "ReadRows",
        })? {
            for chunk in response.chunks {
                merger.push(chunk)?;
            }
        }

        Ok(merger
            .finish()?
            .into_iter()
            .find(|row| row.key == row_key))
    }
}

fn to_proto(mutation: &Mutation) -> v2::Mutation {
    match mutation {
        Mutation::SetCell {
            family,
            qualifier,
            timestamp_micros,
            value,
        } => v2::Mutation::set_cell(
            family.clone(),
            qualifier.clone(),
            *timestamp_micros,
            value.clone(),
        ),
        Mutation::DeleteFromColumn {
            family,
            qualifier,
            time_range,
        } => v2::Mutation::delete_from_column(
            family.clone(),
            qualifier.clone(),
            time_range.map(|range| TimestampRange {
                start_timestamp_micros: range.start_micros,
                end_timestamp_micros: range.end_micros,
            }),
        ),
        Mutation::DeleteFromFamily { family } => v2::Mutation::delete_from_family(family.clone()),
        Mutation::DeleteFromRow => v2::Mutation::delete_from_row(),
    }
}

#[async_trait]
impl TableStore for GrpcTableStore {
    fn name(&self) -> &str {
        "grpc"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn mutate_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        mutations: &[Mutation],
    ) -> std::result::Result<MutateRowOutcome, BoxedError> {
        self.do_mutate_row(table, row_key, mutations)
            .await
            .map_err(BoxedError::new)
    }

    async fn read_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        family: Option<&str>,
    ) -> std::result::Result<Option<RowData>, BoxedError> {
        self.do_read_row(table, row_key, family)
            .await
            .map_err(BoxedError::new)
    }

    async fn close(&self) -> std::result::Result<(), BoxedError> {
        self.channel_manager.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use api::v2::mutation;
    use common_error::ext::ErrorExt;
    use common_error::status_code::StatusCode;
    use store_api::TimeRange;

    use super::*;

    #[test]
    fn test_to_proto() {
        let proto = to_proto(&Mutation::DeleteFromFamily {
            family: "iddup".to_string(),
        });
        assert_eq!(v2::Mutation::delete_from_family("iddup"), proto);

        let proto = to_proto(&Mutation::DeleteFromColumn {
            family: "iddup".to_string(),
            qualifier: b"color".to_vec(),
            time_range: Some(TimeRange {
                start_micros: 1_000,
                end_micros: 0,
            }),
        });
        let Some(mutation::Mutation::DeleteFromColumn(delete)) = proto.mutation else {
            panic!("expected a DeleteFromColumn mutation");
        };
        assert_eq!(b"color".to_vec(), delete.column_qualifier);
        assert_eq!(1_000, delete.time_range.unwrap().start_timestamp_micros);
    }

    #[test]
    fn test_request_carries_routing_header() {
        let store = GrpcTableStore::new("localhost:8086", ChannelConfig::default(), "");
        let request = store
            .request("projects/p/instances/i/tables/cars", ())
            .unwrap();
        assert_eq!(
            "table_name=projects/p/instances/i/tables/cars",
            request
                .metadata()
                .get(REQUEST_PARAMS_HEADER)
                .unwrap()
                .to_str()
                .unwrap()
        );

        assert!(store.request("bad\ntable", ()).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_emulator() {
        let config = ChannelConfig::new()
            .connect_timeout(Duration::from_millis(200))
            .timeout(Duration::from_millis(500));
        // Nothing listens on the discard port.
        let store = GrpcTableStore::new("127.0.0.1:9", config, "");
        let err = store
            .mutate_row(
                &TableName::new("p", "i", "cars"),
                b"car-1",
                &[Mutation::DeleteFromFamily {
                    family: "iddup".to_string(),
                }],
            )
            .await
            .unwrap_err();
        assert_ne!(StatusCode::Success, err.status_code());
        store.close().await.unwrap();
    }
}
