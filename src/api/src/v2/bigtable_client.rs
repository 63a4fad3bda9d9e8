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

//! Client stub of `google.bigtable.v2.Bigtable`, in the shape `tonic-build`
//! generates it.

use tonic::codegen::{http, Body, Bytes, StdError};
use tonic::GrpcMethod;

use super::{MutateRowRequest, MutateRowResponse, ReadRowsRequest, ReadRowsResponse};

pub const SERVICE_NAME: &str = "google.bigtable.v2.Bigtable";

#[derive(Debug, Clone)]
pub struct BigtableClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> BigtableClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
{
    pub fn new(inner: T) -> Self {
        let inner = tonic::client::Grpc::new(inner);
        Self { inner }
    }

    /// Limits the maximum size of a decoded message.
    ///
    /// Default: `4MB`
    #[must_use]
    pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
        self.inner = self.inner.max_decoding_message_size(limit);
        self
    }

    /// Mutates a row atomically. Cells already present in the row are left
    /// unchanged unless explicitly changed by a mutation.
    pub async fn mutate_row(
        &mut self,
        request: impl tonic::IntoRequest<MutateRowRequest>,
    ) -> std::result::Result<tonic::Response<MutateRowResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/google.bigtable.v2.Bigtable/MutateRow");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE_NAME, "MutateRow"));
        self.inner.unary(req, path, codec).await
    }

    /// Streams back the contents of the requested rows, chunked.
    pub async fn read_rows(
        &mut self,
        request: impl tonic::IntoRequest<ReadRowsRequest>,
    ) -> std::result::Result<
        tonic::Response<tonic::codec::Streaming<ReadRowsResponse>>,
        tonic::Status,
    > {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/google.bigtable.v2.Bigtable/ReadRows");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new(SERVICE_NAME, "ReadRows"));
        self.inner.server_streaming(req, path, codec).await
    }
}
