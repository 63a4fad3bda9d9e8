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

//! Server stub of `google.bigtable.v2.Bigtable`, in the shape `tonic-build`
//! generates it. Used to serve the API from in-process test emulators.

use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::codegen::{empty_body, http, tokio_stream, Body, BoxFuture, Service, StdError};

use super::bigtable_client::SERVICE_NAME;
use super::{MutateRowRequest, MutateRowResponse, ReadRowsRequest, ReadRowsResponse};

#[async_trait::async_trait]
pub trait Bigtable: Send + Sync + 'static {
    type ReadRowsStream: tokio_stream::Stream<Item = std::result::Result<ReadRowsResponse, tonic::Status>>
        + Send
        + 'static;

    async fn mutate_row(
        &self,
        request: tonic::Request<MutateRowRequest>,
    ) -> std::result::Result<tonic::Response<MutateRowResponse>, tonic::Status>;

    async fn read_rows(
        &self,
        request: tonic::Request<ReadRowsRequest>,
    ) -> std::result::Result<tonic::Response<Self::ReadRowsStream>, tonic::Status>;
}

#[derive(Debug)]
pub struct BigtableServer<T> {
    inner: Arc<T>,
}

impl<T: Bigtable> BigtableServer<T> {
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for BigtableServer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Bigtable> tonic::server::NamedService for BigtableServer<T> {
    const NAME: &'static str = SERVICE_NAME;
}

impl<T, B> Service<http::Request<B>> for BigtableServer<T>
where
    T: Bigtable,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        match req.uri().path() {
            "/google.bigtable.v2.Bigtable/MutateRow" => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.unary(MutateRowSvc(inner), req).await)
            }),
            "/google.bigtable.v2.Bigtable/ReadRows" => Box::pin(async move {
                let mut grpc = tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
                Ok(grpc.server_streaming(ReadRowsSvc(inner), req).await)
            }),
            _ => Box::pin(async move {
                let mut response = http::Response::new(empty_body());
                let headers = response.headers_mut();
                let _ = headers.insert(
                    tonic::Status::GRPC_STATUS,
                    (tonic::Code::Unimplemented as i32).into(),
                );
                let _ = headers.insert(
                    http::header::CONTENT_TYPE,
                    tonic::metadata::GRPC_CONTENT_TYPE,
                );
                Ok(response)
            }),
        }
    }
}

struct MutateRowSvc<T>(Arc<T>);

impl<T: Bigtable> tonic::server::UnaryService<MutateRowRequest> for MutateRowSvc<T> {
    type Response = MutateRowResponse;
    type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;

    fn call(&mut self, request: tonic::Request<MutateRowRequest>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.mutate_row(request).await })
    }
}

struct ReadRowsSvc<T>(Arc<T>);

impl<T: Bigtable> tonic::server::ServerStreamingService<ReadRowsRequest> for ReadRowsSvc<T> {
    type Response = ReadRowsResponse;
    type ResponseStream = T::ReadRowsStream;
    type Future = BoxFuture<tonic::Response<Self::ResponseStream>, tonic::Status>;

    fn call(&mut self, request: tonic::Request<ReadRowsRequest>) -> Self::Future {
        let inner = self.0.clone();
        Box::pin(async move { inner.read_rows(request).await })
    }
}
