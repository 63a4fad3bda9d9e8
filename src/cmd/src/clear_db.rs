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

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Parser;
use snafu::ResultExt;
use storage::Storage;

use crate::cli::{Instance, Tool, APP_NAME};
use crate::error::{DestroyStorageSnafu, Result};
use crate::options::{default_logging_options, GlobalOptions};

#[derive(Debug, Default, Parser)]
pub struct ClearDbCommand {
    /// Directory of the embedded storage to destroy.
    #[clap(long, default_value = "test_db")]
    pub(crate) data_dir: String,
}

impl ClearDbCommand {
    pub fn build(&self, global_options: &GlobalOptions) -> Instance {
        let mut logging = default_logging_options();
        global_options.merge_logging(&mut logging);
        let guard = common_telemetry::init_global_logging(APP_NAME, &logging);

        Instance::new(
            Box::new(ClearDb {
                data_dir: PathBuf::from(&self.data_dir),
            }),
            guard,
        )
    }
}

pub struct ClearDb {
    data_dir: PathBuf,
}

#[async_trait]
impl Tool for ClearDb {
    #[allow(clippy::print_stdout)]
    async fn do_work(&self) -> Result<()> {
        let destroyed = Storage::destroy(&self.data_dir).context(DestroyStorageSnafu {
            dir: self.data_dir.display().to_string(),
        })?;
        println!(
            "Destroyed storage at {}: {}",
            self.data_dir.display(),
            destroyed
        );
        Ok(())
    }
}
