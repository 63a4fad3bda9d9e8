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

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common_telemetry::debug;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use tonic::transport::{Channel as InnerChannel, Endpoint};

use crate::error::{CreateChannelSnafu, InvalidAddressSnafu, Result};

pub const DEFAULT_GRPC_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_GRPC_CONNECT_TIMEOUT_SECS: u64 = 1;

lazy_static! {
    static ref ID: AtomicU64 = AtomicU64::new(0);
}

/// Hands out lazily connected channels, one per address.
#[derive(Clone, Debug)]
pub struct ChannelManager {
    id: u64,
    config: ChannelConfig,
    pool: Arc<Pool>,
}

impl Default for ChannelManager {
    fn default() -> Self {
        ChannelManager::with_config(ChannelConfig::default())
    }
}

impl ChannelManager {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(config: ChannelConfig) -> Self {
        let id = ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            config,
            pool: Arc::new(Pool::default()),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Returns the channel of `addr`, creating it on first use. The
    /// connection itself is established by the first request.
    pub fn get(&self, addr: impl AsRef<str>) -> Result<InnerChannel> {
        let addr = addr.as_ref();
        // It will acquire the read lock.
        if let Some(inner_ch) = self.pool.get(addr) {
            return Ok(inner_ch);
        }

        // It will acquire the write lock.
        let entry = match self.pool.channels.entry(addr.to_string()) {
            Entry::Occupied(entry) => {
                entry.get().increase_access();
                entry.into_ref()
            }
            Entry::Vacant(entry) => {
                let endpoint = self.build_endpoint(addr)?;
                let inner_channel = endpoint.connect_lazy();
                debug!(
                    "ChannelManager: {}, created channel to {}",
                    self.id,
                    endpoint.uri()
                );

                entry.insert(Channel {
                    channel: inner_channel,
                    access: AtomicUsize::new(1),
                })
            }
        };
        Ok(entry.channel.clone())
    }

    /// Drops the pooled channel of `addr`. The connection closes once the
    /// last clone handed out by [ChannelManager::get] is dropped.
    pub fn remove(&self, addr: impl AsRef<str>) -> bool {
        self.pool.channels.remove(addr.as_ref()).is_some()
    }

    /// Drops every pooled channel.
    pub fn clear(&self) {
        self.pool.channels.clear();
    }

    pub fn channel_count(&self) -> usize {
        self.pool.channels.len()
    }

    fn build_endpoint(&self, addr: &str) -> Result<Endpoint> {
        let uri = normalize_addr(addr)?;
        let mut endpoint = Endpoint::new(uri).context(CreateChannelSnafu { addr })?;

        if let Some(dur) = self.config.timeout {
            endpoint = endpoint.timeout(dur);
        }
        if let Some(dur) = self.config.connect_timeout {
            endpoint = endpoint.connect_timeout(dur);
        }
        if let Some(dur) = self.config.http2_keep_alive_interval {
            endpoint = endpoint.http2_keep_alive_interval(dur);
        }
        if let Some(dur) = self.config.http2_keep_alive_timeout {
            endpoint = endpoint.keep_alive_timeout(dur);
        }

        Ok(endpoint.tcp_nodelay(self.config.tcp_nodelay))
    }
}

/// Prefixes `http://` to a bare `host:port` address.
fn normalize_addr(addr: &str) -> Result<String> {
    let addr = addr.trim();
    ensure!(!addr.is_empty(), InvalidAddressSnafu { addr });

    if addr.starts_with("http://") || addr.starts_with("https://") {
        Ok(addr.to_string())
    } else {
        Ok(format!("http://{addr}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub http2_keep_alive_interval: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub http2_keep_alive_timeout: Option<Duration>,
    pub tcp_nodelay: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_GRPC_REQUEST_TIMEOUT_SECS)),
            connect_timeout: Some(Duration::from_secs(DEFAULT_GRPC_CONNECT_TIMEOUT_SECS)),
            http2_keep_alive_interval: Some(Duration::from_secs(30)),
            http2_keep_alive_timeout: None,
            tcp_nodelay: true,
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// A timeout to each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// A timeout to connecting to the uri.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set http2 KEEP_ALIVE_INTERVAL. Uses hyper’s default otherwise.
    pub fn http2_keep_alive_interval(mut self, duration: Duration) -> Self {
        self.http2_keep_alive_interval = Some(duration);
        self
    }

    /// Set http2 KEEP_ALIVE_TIMEOUT. Uses hyper’s default otherwise.
    pub fn http2_keep_alive_timeout(mut self, duration: Duration) -> Self {
        self.http2_keep_alive_timeout = Some(duration);
        self
    }

    /// Set the value of TCP_NODELAY option for accepted connections.
    ///
    /// Enabled by default.
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}

#[derive(Debug)]
pub struct Channel {
    channel: InnerChannel,
    access: AtomicUsize,
}

impl Channel {
    #[inline]
    pub fn access(&self) -> usize {
        self.access.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn increase_access(&self) {
        let _ = self.access.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct Pool {
    channels: DashMap<String, Channel>,
}

impl Pool {
    fn get(&self, addr: &str) -> Option<InnerChannel> {
        let channel = self.channels.get(addr);
        channel.map(|ch| {
            ch.increase_access();
            ch.channel.clone()
        })
    }

    #[cfg(test)]
    fn access(&self, addr: &str) -> Option<usize> {
        self.channels.get(addr).map(|ch| ch.access())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_access_count() {
        let mgr = Arc::new(ChannelManager::new());
        let addr = "test_uri";

        let mut joins = Vec::with_capacity(10);
        for _ in 0..10 {
            let mgr_clone = mgr.clone();
            let join = tokio::spawn(async move {
                for _ in 0..100 {
                    let _ = mgr_clone.get(addr).unwrap();
                }
            });
            joins.push(join);
        }
        for join in joins {
            join.await.unwrap();
        }

        assert_eq!(Some(1000), mgr.pool.access(addr));
        assert_eq!(1, mgr.channel_count());
        assert!(mgr.remove(addr));
        assert!(!mgr.remove(addr));
        assert_eq!(0, mgr.channel_count());
    }

    #[tokio::test]
    async fn test_get_same_channel_for_same_addr() {
        let mgr = ChannelManager::new();
        let _ = mgr.get("localhost:8086").unwrap();
        let _ = mgr.get("localhost:8086").unwrap();
        let _ = mgr.get("localhost:8087").unwrap();

        assert_eq!(2, mgr.channel_count());
        assert_eq!(Some(2), mgr.pool.access("localhost:8086"));

        mgr.clear();
        assert_eq!(0, mgr.channel_count());
    }

    #[tokio::test]
    async fn test_get_empty_addr() {
        let mgr = ChannelManager::new();
        let err = mgr.get("  ").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
        assert_eq!(0, mgr.channel_count());
    }

    #[test]
    fn test_normalize_addr() {
        assert_eq!("http://localhost:8086", normalize_addr("localhost:8086").unwrap());
        assert_eq!(
            "https://bigtable.example.com",
            normalize_addr("https://bigtable.example.com").unwrap()
        );
        assert_eq!("http://127.0.0.1:1", normalize_addr(" http://127.0.0.1:1 ").unwrap());
    }

    #[test]
    fn test_config() {
        let default_cfg = ChannelConfig::new();
        assert_eq!(
            ChannelConfig {
                timeout: Some(Duration::from_secs(DEFAULT_GRPC_REQUEST_TIMEOUT_SECS)),
                connect_timeout: Some(Duration::from_secs(DEFAULT_GRPC_CONNECT_TIMEOUT_SECS)),
                http2_keep_alive_interval: Some(Duration::from_secs(30)),
                http2_keep_alive_timeout: None,
                tcp_nodelay: true,
            },
            default_cfg
        );

        let cfg = default_cfg
            .timeout(Duration::from_secs(3))
            .connect_timeout(Duration::from_millis(500))
            .http2_keep_alive_timeout(Duration::from_secs(2))
            .tcp_nodelay(false);
        assert_eq!(Some(Duration::from_secs(3)), cfg.timeout);
        assert_eq!(Some(Duration::from_millis(500)), cfg.connect_timeout);
        assert_eq!(Some(Duration::from_secs(2)), cfg.http2_keep_alive_timeout);
        assert!(!cfg.tcp_nodelay);
    }

    #[test]
    fn test_config_deserialize() {
        let cfg: ChannelConfig = toml::from_str(
            r#"
            timeout = "3s"
            connect_timeout = "250ms"
        "#,
        )
        .unwrap();
        assert_eq!(Some(Duration::from_secs(3)), cfg.timeout);
        assert_eq!(Some(Duration::from_millis(250)), cfg.connect_timeout);
        assert!(cfg.tcp_nodelay);
    }
}
