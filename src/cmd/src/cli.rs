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

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use common_error::ext::ErrorExt;
use common_telemetry::tracing_appender::non_blocking::WorkerGuard;
use common_telemetry::{debug, error};

use crate::clear_db::ClearDbCommand;
use crate::delete_family::DeleteFamilyCommand;
use crate::error::{Error, Result};
use crate::options::GlobalOptions;

pub const APP_NAME: &str = "bigtable-cli";

#[async_trait]
pub trait Tool: Send + Sync {
    async fn do_work(&self) -> Result<()>;
}

pub struct Instance {
    tool: Box<dyn Tool>,

    // Keep the logging guard to prevent the worker from being dropped.
    _guard: Vec<WorkerGuard>,
}

impl Instance {
    pub(crate) fn new(tool: Box<dyn Tool>, guard: Vec<WorkerGuard>) -> Self {
        Self {
            tool,
            _guard: guard,
        }
    }

    /// Runs the tool. Failures are logged here, while the log guards are
    /// still alive.
    pub async fn start(&self) -> Result<()> {
        self.tool.do_work().await.inspect_err(log_error)
    }
}

fn log_error(e: &Error) {
    if e.status_code().should_log_error() {
        let root_error = e.root_cause().unwrap_or(e);
        error!("Failed to run {}, error: {}", APP_NAME, root_error);
    } else {
        debug!("Failed to run {}, error: {:?}", APP_NAME, e);
    }
}

#[derive(Parser)]
#[clap(name = APP_NAME, version, about = "Administrative operations on Bigtable-style tables")]
pub struct Command {
    #[clap(flatten)]
    pub global_options: GlobalOptions,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

impl Command {
    pub fn build(&self) -> Result<Instance> {
        match &self.subcmd {
            SubCommand::DeleteFamily(cmd) => {
                let opts = cmd.load_options(&self.global_options)?;
                Ok(cmd.build(opts))
            }
            SubCommand::ClearDb(cmd) => Ok(cmd.build(&self.global_options)),
        }
    }
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Deletes every cell of one column family in one row.
    DeleteFamily(DeleteFamilyCommand),
    /// Destroys a local storage directory.
    ClearDb(ClearDbCommand),
}
