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

use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use client::{Client, ClientOptions, Columns, CommitResponse, EndpointOptions};
use common_config::Configurable;
use common_error::ext::ErrorExt;
use common_grpc::channel_manager::ChannelConfig;
use common_telemetry::logging::LoggingOptions;
use common_telemetry::{info, warn};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use storage::Storage;

use crate::cli::{Instance, Tool, APP_NAME};
use crate::error::{
    CloseClientSnafu, CommitRowSnafu, InvalidOptionsSnafu, LoadLayeredConfigSnafu,
    OpenClientSnafu, OpenStorageSnafu, Result,
};
use crate::options::{default_logging_options, GlobalOptions};

/// Options of `delete-family`, layered from defaults, environment, config
/// file and command line flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteFamilyOptions {
    pub endpoint: EndpointOptions,
    pub grpc: ChannelConfig,
    pub app_profile_id: String,
    pub row_key: String,
    pub family: String,
    /// Embedded storage to operate on instead of an emulator.
    pub data_dir: Option<String>,
    pub logging: LoggingOptions,
}

impl Default for DeleteFamilyOptions {
    fn default() -> Self {
        Self {
            endpoint: EndpointOptions::default(),
            grpc: ChannelConfig::default(),
            app_profile_id: String::new(),
            row_key: String::new(),
            family: String::new(),
            data_dir: None,
            logging: default_logging_options(),
        }
    }
}

impl Configurable for DeleteFamilyOptions {
    fn validate_sanitize(&mut self) -> common_config::error::Result<()> {
        if self.data_dir.as_deref().is_some_and(str::is_empty) {
            self.data_dir = None;
        }
        if self.endpoint.emulator_host.as_deref().is_some_and(str::is_empty) {
            self.endpoint.emulator_host = None;
        }
        Ok(())
    }
}

impl DeleteFamilyOptions {
    /// Checks the options once every source is merged.
    pub fn validate(&self) -> Result<()> {
        self.endpoint
            .validate()
            .map_err(|e| InvalidOptionsSnafu { msg: e.output_msg() }.build())?;
        ensure!(
            !self.row_key.is_empty(),
            InvalidOptionsSnafu {
                msg: "row key must not be empty",
            }
        );
        ensure!(
            !self.family.is_empty(),
            InvalidOptionsSnafu {
                msg: "column family must not be empty",
            }
        );
        ensure!(
            self.data_dir.is_some() || self.endpoint.emulator_host.is_some(),
            InvalidOptionsSnafu {
                msg: "either an emulator host or a data dir is required",
            }
        );
        Ok(())
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: self.endpoint.clone(),
            grpc: self.grpc.clone(),
            app_profile_id: self.app_profile_id.clone(),
        }
    }
}

#[derive(Debug, Default, Parser)]
pub struct DeleteFamilyCommand {
    #[clap(long)]
    pub(crate) project: Option<String>,
    #[clap(long)]
    pub(crate) instance: Option<String>,
    #[clap(long)]
    pub(crate) table: Option<String>,
    #[clap(long)]
    pub(crate) row_key: Option<String>,
    #[clap(long)]
    pub(crate) family: Option<String>,
    /// `host:port` of the emulator.
    #[clap(long, env = "BIGTABLE_EMULATOR_HOST")]
    pub(crate) emulator_host: Option<String>,
    #[clap(long)]
    pub(crate) app_profile_id: Option<String>,
    /// Operate on the embedded storage under this directory.
    #[clap(long)]
    pub(crate) data_dir: Option<String>,
    #[clap(short, long)]
    pub(crate) config_file: Option<String>,
    #[clap(long, default_value = "BIGTABLE_CLI")]
    pub(crate) env_prefix: String,
}

impl DeleteFamilyCommand {
    pub fn load_options(&self, global_options: &GlobalOptions) -> Result<DeleteFamilyOptions> {
        let mut opts = DeleteFamilyOptions::load_layered_options(
            self.config_file.as_deref(),
            self.env_prefix.as_ref(),
        )
        .context(LoadLayeredConfigSnafu)?;

        self.merge_with_cli_options(global_options, &mut opts);
        opts.validate()?;

        Ok(opts)
    }

    // The precedence order is: cli > config file > environment variables > default values.
    fn merge_with_cli_options(&self, global_options: &GlobalOptions, opts: &mut DeleteFamilyOptions) {
        global_options.merge_logging(&mut opts.logging);

        if let Some(project) = &self.project {
            opts.endpoint.project.clone_from(project);
        }
        if let Some(instance) = &self.instance {
            opts.endpoint.instance.clone_from(instance);
        }
        if let Some(table) = &self.table {
            opts.endpoint.table.clone_from(table);
        }
        if let Some(host) = self.emulator_host.as_ref().filter(|h| !h.is_empty()) {
            opts.endpoint.emulator_host = Some(host.clone());
        }
        if let Some(app_profile_id) = &self.app_profile_id {
            opts.app_profile_id.clone_from(app_profile_id);
        }
        if let Some(row_key) = &self.row_key {
            opts.row_key.clone_from(row_key);
        }
        if let Some(family) = &self.family {
            opts.family.clone_from(family);
        }
        if let Some(dir) = self.data_dir.as_ref().filter(|d| !d.is_empty()) {
            opts.data_dir = Some(dir.clone());
        }
    }

    pub fn build(&self, opts: DeleteFamilyOptions) -> Instance {
        let guard = common_telemetry::init_global_logging(APP_NAME, &opts.logging);
        Instance::new(Box::new(DeleteFamily { opts }), guard)
    }
}

pub struct DeleteFamily {
    opts: DeleteFamilyOptions,
}

impl DeleteFamily {
    pub fn new(opts: DeleteFamilyOptions) -> Self {
        Self { opts }
    }

    fn open_client(&self) -> Result<Client> {
        match &self.opts.data_dir {
            Some(dir) => {
                let storage = Storage::open(dir).context(OpenStorageSnafu { dir })?;
                Ok(Client::with_store(
                    &self.opts.endpoint.project,
                    Arc::new(storage),
                ))
            }
            None => Client::connect(&self.opts.client_options()).context(OpenClientSnafu),
        }
    }

    /// Stages the family deletion and commits it, printing the staged
    /// mutations and the commit response as they come.
    #[allow(clippy::print_stdout)]
    async fn delete_family(&self, client: &Client) -> Result<CommitResponse> {
        let endpoint = &self.opts.endpoint;
        let mut row = client
            .instance(&endpoint.instance)
            .table(&endpoint.table)
            .row(self.opts.row_key.as_bytes());

        let staged = row.delete_cells(&self.opts.family, Columns::All);
        println!("{staged:?}");

        let response = row.commit().await.context(CommitRowSnafu {
            row_key: &self.opts.row_key,
        })?;
        println!("{response:?}");

        Ok(response)
    }
}

#[async_trait]
impl Tool for DeleteFamily {
    async fn do_work(&self) -> Result<()> {
        let client = self.open_client()?;
        info!(
            "Deleting family {} of row {} in {}",
            self.opts.family,
            self.opts.row_key,
            self.opts.endpoint.table_name()
        );

        let result = self.delete_family(&client).await;
        let closed = client.close().await.context(CloseClientSnafu);
        if let (Err(_), Err(e)) = (&result, &closed) {
            warn!("Failed to close client after a failed commit: {}", e.output_msg());
        }

        result.and(closed)
    }
}
