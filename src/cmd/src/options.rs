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

use clap::Parser;
use common_telemetry::logging::{ConsoleWriter, LoggingOptions};

/// Logging defaults of the tools. Console logs go to stderr, stdout only
/// carries what the tool prints.
pub fn default_logging_options() -> LoggingOptions {
    LoggingOptions {
        console_writer: ConsoleWriter::Stderr,
        ..Default::default()
    }
}

#[derive(Parser, Default, Debug, Clone)]
pub struct GlobalOptions {
    #[clap(long, value_name = "LOG_DIR")]
    #[arg(global = true)]
    pub log_dir: Option<String>,

    #[clap(long, value_name = "LOG_LEVEL")]
    #[arg(global = true)]
    pub log_level: Option<String>,
}

impl GlobalOptions {
    /// Applies the global flags on top of `logging`.
    pub fn merge_logging(&self, logging: &mut LoggingOptions) {
        if let Some(dir) = &self.log_dir {
            logging.dir.clone_from(dir);
        }

        if self.log_level.is_some() {
            logging.level.clone_from(&self.log_level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_options() {
        let logging = default_logging_options();
        assert_eq!(ConsoleWriter::Stderr, logging.console_writer);
        assert!(logging.append_stdout);
    }

    #[test]
    fn test_merge_logging() {
        let mut logging = LoggingOptions {
            level: Some("warn".to_string()),
            ..Default::default()
        };
        GlobalOptions::default().merge_logging(&mut logging);
        assert_eq!("", logging.dir);
        assert_eq!(Some("warn"), logging.level.as_deref());

        GlobalOptions {
            log_dir: Some("/tmp/bigtable-cli/logs".to_string()),
            log_level: Some("debug".to_string()),
        }
        .merge_logging(&mut logging);
        assert_eq!("/tmp/bigtable-cli/logs", logging.dir);
        assert_eq!(Some("debug"), logging.level.as_deref());
    }
}
