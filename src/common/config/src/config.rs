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

use config::{Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

use crate::error::{LoadLayeredConfigSnafu, Result, SerdeJsonSnafu, TomlFormatSnafu};

/// Separator for environment variables. For example, `BIGTABLE_CLI__ENDPOINT__PROJECT`.
pub const ENV_VAR_SEP: &str = "__";

/// Separator for list values in environment variables.
pub const ENV_LIST_SEP: &str = ",";

/// Configuration trait defines the common interface for configuration that can be loaded from multiple sources and serialized to TOML.
pub trait Configurable: Serialize + DeserializeOwned + Default + Sized {
    /// Load the configuration from multiple sources and merge them.
    /// The precedence order is: config file > environment variables > default values.
    /// `env_prefix` is the prefix of environment variables, e.g. "BIGTABLE_CLI__xxx".
    /// The function will use dunder(double underscore) `__` as the separator for environment variables, for example:
    /// `BIGTABLE_CLI__ENDPOINT__TABLE` will be mapped to the `endpoint.table` field in the configuration.
    fn load_layered_options(config_file: Option<&str>, env_prefix: &str) -> Result<Self> {
        let default_opts = Self::default();

        let env_source = {
            let mut env = Environment::default();

            if !env_prefix.is_empty() {
                env = env.prefix(env_prefix);
            }

            if let Some(list_keys) = Self::env_list_keys() {
                env = env.list_separator(ENV_LIST_SEP);
                for key in list_keys {
                    env = env.with_list_parse_key(key);
                }
            }

            env.try_parsing(true)
                .separator(ENV_VAR_SEP)
                .ignore_empty(true)
        };

        // Serialize the defaults through JSON, `Config::try_from` cannot handle
        // empty structs nested in the options.
        let json_str = serde_json::to_string(&default_opts).context(SerdeJsonSnafu)?;
        let default_config = File::from_str(&json_str, FileFormat::Json);

        let mut layered_config = config::Config::builder()
            .add_source(default_config)
            .add_source(env_source);

        if let Some(config_file) = config_file {
            layered_config = layered_config.add_source(File::new(config_file, FileFormat::Toml));
        }

        let mut opts: Self = layered_config
            .build()
            .and_then(|x| x.try_deserialize())
            .context(LoadLayeredConfigSnafu)?;

        opts.validate_sanitize()?;

        Ok(opts)
    }

    /// Validate(and possibly sanitize) the configuration.
    fn validate_sanitize(&mut self) -> Result<()> {
        Ok(())
    }

    /// List of toml keys that should be parsed as a list.
    fn env_list_keys() -> Option<&'static [&'static str]> {
        None
    }

    /// Serialize the configuration to a TOML string.
    fn to_toml(&self) -> Result<String> {
        toml::to_string(&self).context(TomlFormatSnafu)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use common_telemetry::logging::LoggingOptions;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::error::{Error, InvalidConfigSnafu};

    #[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
    #[serde(default)]
    struct TestEndpoint {
        project: String,
        instance: String,
        table: String,
    }

    #[derive(Debug, Serialize, Deserialize, Default)]
    #[serde(default)]
    struct TestToolConfig {
        hosts: Vec<String>,
        endpoint: TestEndpoint,
        logging: LoggingOptions,
    }

    impl Configurable for TestToolConfig {
        fn env_list_keys() -> Option<&'static [&'static str]> {
            Some(&["hosts"])
        }

        fn validate_sanitize(&mut self) -> Result<()> {
            self.endpoint.table = self.endpoint.table.trim().to_string();
            if self.endpoint.project == "forbidden" {
                return InvalidConfigSnafu {
                    msg: "forbidden project",
                }
                .fail();
            }
            Ok(())
        }
    }

    fn env_key(prefix: &str, keys: &[&str]) -> String {
        std::iter::once(prefix.to_string())
            .chain(keys.iter().map(|k| k.to_uppercase()))
            .collect::<Vec<_>>()
            .join(ENV_VAR_SEP)
    }

    #[test]
    fn test_load_layered_options() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let toml_str = r#"
            [endpoint]
            project = "p"
            table = "  cars  "

            [logging]
            level = "debug"
            dir = "/tmp/bigtable-cli/logs"
        "#;
        write!(file, "{}", toml_str).unwrap();

        let env_prefix = "CONFIG_UT";
        temp_env::with_vars(
            [
                // endpoint.instance = i
                (env_key(env_prefix, &["endpoint", "instance"]), Some("i")),
                // endpoint.project is overridden by the config file
                (env_key(env_prefix, &["endpoint", "project"]), Some("env-p")),
                (env_key(env_prefix, &["hosts"]), Some("localhost:8086,localhost:8087")),
            ],
            || {
                let opts = TestToolConfig::load_layered_options(
                    Some(file.path().to_str().unwrap()),
                    env_prefix,
                )
                .unwrap();

                assert_eq!(
                    TestEndpoint {
                        project: "p".to_string(),
                        instance: "i".to_string(),
                        table: "cars".to_string(),
                    },
                    opts.endpoint
                );
                assert_eq!(
                    vec!["localhost:8086".to_string(), "localhost:8087".to_string()],
                    opts.hosts
                );
                assert_eq!(Some("debug".to_string()), opts.logging.level);
                assert_eq!("/tmp/bigtable-cli/logs", opts.logging.dir);
                assert!(opts.logging.append_stdout);
            },
        );
    }

    #[test]
    fn test_load_defaults_without_sources() {
        let opts = TestToolConfig::load_layered_options(None, "CONFIG_UT_EMPTY").unwrap();
        assert_eq!(TestEndpoint::default(), opts.endpoint);
        assert!(opts.hosts.is_empty());
        assert_eq!(LoggingOptions::default(), opts.logging);
    }

    #[test]
    fn test_validate_sanitize_rejects() {
        let env_prefix = "CONFIG_UT_INVALID";
        temp_env::with_var(
            env_key(env_prefix, &["endpoint", "project"]),
            Some("forbidden"),
            || {
                let err = TestToolConfig::load_layered_options(None, env_prefix).unwrap_err();
                assert!(matches!(err, Error::InvalidConfig { .. }));
            },
        );
    }

    #[test]
    fn test_to_toml() {
        let opts = TestToolConfig {
            endpoint: TestEndpoint {
                project: "p".to_string(),
                instance: "i".to_string(),
                table: "cars".to_string(),
            },
            ..Default::default()
        };
        let toml_str = opts.to_toml().unwrap();
        assert!(toml_str.contains("[endpoint]"));
        assert!(toml_str.contains("table = \"cars\""));
    }
}
