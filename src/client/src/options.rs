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

use common_grpc::channel_manager::ChannelConfig;
use serde::{Deserialize, Serialize};
use snafu::ensure;
use store_api::TableName;

use crate::error::{InvalidEndpointSnafu, Result};

/// Where the table lives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointOptions {
    pub project: String,
    pub instance: String,
    pub table: String,
    /// `host:port` of the emulator serving the table.
    pub emulator_host: Option<String>,
}

impl EndpointOptions {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("project", &self.project),
            ("instance", &self.instance),
            ("table", &self.table),
        ] {
            ensure!(
                !value.is_empty() && !value.contains('/'),
                InvalidEndpointSnafu {
                    reason: format!("{name} must be a non-empty id without '/', got '{value}'"),
                }
            );
        }
        Ok(())
    }

    pub fn table_name(&self) -> TableName {
        TableName::new(&self.project, &self.instance, &self.table)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub endpoint: EndpointOptions,
    pub grpc: ChannelConfig,
    /// Routes requests to an app profile, the default profile when empty.
    pub app_profile_id: String,
}
