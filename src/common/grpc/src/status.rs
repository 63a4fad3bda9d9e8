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

use common_error::status_code::StatusCode;
use tonic::Code;

/// Maps a gRPC status code returned by a remote service to [StatusCode].
pub fn status_code_from_tonic(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::Success,
        Code::Cancelled => StatusCode::Cancelled,
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
            StatusCode::InvalidArguments
        }
        Code::DeadlineExceeded => StatusCode::DeadlineExceeded,
        Code::NotFound => StatusCode::TableNotFound,
        Code::AlreadyExists => StatusCode::TableAlreadyExists,
        Code::PermissionDenied => StatusCode::PermissionDenied,
        Code::Unauthenticated => StatusCode::AccessDenied,
        Code::ResourceExhausted => StatusCode::RateLimited,
        Code::Unimplemented => StatusCode::Unsupported,
        Code::Unavailable | Code::Aborted => StatusCode::StorageUnavailable,
        Code::Internal | Code::DataLoss => StatusCode::Internal,
        Code::Unknown => StatusCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_from_tonic() {
        assert_eq!(StatusCode::Success, status_code_from_tonic(Code::Ok));
        assert_eq!(
            StatusCode::TableNotFound,
            status_code_from_tonic(Code::NotFound)
        );
        assert_eq!(
            StatusCode::StorageUnavailable,
            status_code_from_tonic(Code::Unavailable)
        );
        assert_eq!(
            StatusCode::AccessDenied,
            status_code_from_tonic(Code::Unauthenticated)
        );
        assert!(status_code_from_tonic(Code::Unavailable).is_retryable());
    }
}
