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

//! logging stuffs, inspired by databend
use std::env;
use std::io::IsTerminal;
use std::sync::{Arc, Mutex, Once};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_log::LogTracer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

/// The default logs directory.
pub const DEFAULT_LOGGING_DIR: &str = "logs";

const DEFAULT_LOG_TARGETS: &str = "info";

/// The logging options that used to initialize the logger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingOptions {
    /// The directory to store log files. If not set, logs will be written to stdout.
    pub dir: String,

    /// The log level that can be one of "trace", "debug", "info", "warn", "error". Default is "info".
    pub level: Option<String>,

    /// The log format that can be one of "json" or "text". Default is "text".
    pub log_format: LogFormat,

    /// The maximum number of log files set by default.
    pub max_log_files: usize,

    /// Whether to append logs to stdout. Default is true.
    pub append_stdout: bool,

    /// The console stream that the stdout layer writes to. Default is "stdout".
    pub console_writer: ConsoleWriter,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleWriter {
    #[default]
    Stdout,
    /// Keeps stdout free for the output of command line tools.
    Stderr,
}

impl ConsoleWriter {
    fn writer(&self) -> Box<dyn std::io::Write + Send> {
        match self {
            ConsoleWriter::Stdout => Box::new(std::io::stdout()),
            ConsoleWriter::Stderr => Box::new(std::io::stderr()),
        }
    }

    fn is_terminal(&self) -> bool {
        match self {
            ConsoleWriter::Stdout => std::io::stdout().is_terminal(),
            ConsoleWriter::Stderr => std::io::stderr().is_terminal(),
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    #[default]
    Text,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            dir: "".to_string(),
            level: None,
            log_format: LogFormat::Text,
            append_stdout: true,
            console_writer: ConsoleWriter::Stdout,
            // Rotation hourly, 24 files per day, keeps info log files of 30 days
            max_log_files: 720,
        }
    }
}

/// Init tracing for unittest.
/// Write logs to file `unittest`.
pub fn init_default_ut_logging() {
    static START: Once = Once::new();

    START.call_once(|| {
        let mut g = GLOBAL_UT_LOG_GUARD.as_ref().lock().unwrap();

        // When running in CI, env "UNITTEST_LOG_DIR" is set to a directory other
        // than "/tmp".
        let dir =
            env::var("UNITTEST_LOG_DIR").unwrap_or_else(|_| "/tmp/__unittest_logs".to_string());

        let level = env::var("UNITTEST_LOG_LEVEL")
            .unwrap_or_else(|_| "debug,hyper=warn,tower=warn,h2=info".to_string());
        let opts = LoggingOptions {
            dir: dir.clone(),
            level: Some(level),
            ..Default::default()
        };
        *g = Some(init_global_logging("unittest", &opts));

        crate::info!("logs dir = {}", dir);
    });
}

static GLOBAL_UT_LOG_GUARD: Lazy<Arc<Mutex<Option<Vec<WorkerGuard>>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

/// Parses the target directives, the explicit level wins over `RUST_LOG`.
fn log_targets(level: Option<&str>) -> Targets {
    let directives = level
        .map(str::to_string)
        .or_else(|| env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_else(|| DEFAULT_LOG_TARGETS.to_string());

    directives
        .parse::<Targets>()
        .unwrap_or_else(|_| Targets::new().with_default(LevelFilter::INFO))
}

fn rolling_appender(app_name: &str, opts: &LoggingOptions, suffix: &str) -> RollingFileAppender {
    RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_prefix(format!("{app_name}{suffix}"))
        .max_log_files(opts.max_log_files)
        .build(&opts.dir)
        .unwrap_or_else(|e| {
            panic!(
                "initializing rolling file appender at {} failed: {}",
                &opts.dir, e
            )
        })
}

/// Installs the global subscriber once and returns the guards of the
/// non-blocking writers. Logs are lost when the guards are dropped.
pub fn init_global_logging(app_name: &str, opts: &LoggingOptions) -> Vec<WorkerGuard> {
    static START: Once = Once::new();
    let mut guards = vec![];

    START.call_once(|| {
        // Enable log compatible layer to convert log record to tracing span.
        let _ = LogTracer::init();

        // Configure the stdout logging layer.
        let stdout_logging_layer = if opts.append_stdout {
            let (writer, guard) = tracing_appender::non_blocking(opts.console_writer.writer());
            guards.push(guard);
            let ansi = opts.console_writer.is_terminal();

            if opts.log_format == LogFormat::Json {
                Some(
                    Layer::new()
                        .json()
                        .with_writer(writer)
                        .with_ansi(ansi)
                        .boxed(),
                )
            } else {
                Some(
                    Layer::new()
                        .with_writer(writer)
                        .with_ansi(ansi)
                        .boxed(),
                )
            }
        } else {
            None
        };

        // Configure the file logging layer with rolling policy.
        let file_logging_layer = if !opts.dir.is_empty() {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(app_name, opts, ""));
            guards.push(guard);

            if opts.log_format == LogFormat::Json {
                Some(Layer::new().json().with_writer(writer).with_ansi(false).boxed())
            } else {
                Some(Layer::new().with_writer(writer).with_ansi(false).boxed())
            }
        } else {
            None
        };

        // Configure the error file logging layer with rolling policy.
        let err_file_logging_layer = if !opts.dir.is_empty() {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(app_name, opts, "-err"));
            guards.push(guard);

            Some(
                Layer::new()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(LevelFilter::ERROR)
                    .boxed(),
            )
        } else {
            None
        };

        let subscriber = Registry::default()
            .with(log_targets(opts.level.as_deref()))
            .with(stdout_logging_layer)
            .with(file_logging_layer)
            .with(err_file_logging_layer);

        let _ = tracing::subscriber::set_global_default(subscriber);
    });

    guards
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn test_logging_options_deserialize_with_defaults() {
        let opts: LoggingOptions =
            serde_json::from_str(r#"{"dir": "/tmp/logs", "log_format": "json"}"#).unwrap();
        assert_eq!("/tmp/logs", opts.dir);
        assert_eq!(LogFormat::Json, opts.log_format);
        assert_eq!(720, opts.max_log_files);
        assert!(opts.append_stdout);
        assert_eq!(ConsoleWriter::Stdout, opts.console_writer);
        assert!(opts.level.is_none());

        let opts: LoggingOptions = serde_json::from_str(r#"{"console_writer": "stderr"}"#).unwrap();
        assert_eq!(ConsoleWriter::Stderr, opts.console_writer);
    }

    #[test]
    fn test_log_targets_from_level() {
        let targets = log_targets(Some("warn,client=debug"));
        assert!(targets.would_enable("client", &Level::DEBUG));
        assert!(!targets.would_enable("storage", &Level::INFO));
        assert!(targets.would_enable("storage", &Level::WARN));
    }

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        let targets = log_targets(Some("client=loud"));
        assert!(targets.would_enable("client", &Level::INFO));
        assert!(!targets.would_enable("client", &Level::DEBUG));
    }

    #[test]
    fn test_init_default_ut_logging_twice() {
        init_default_ut_logging();
        init_default_ut_logging();
        crate::info!("still alive");
    }
}
