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

//! On-disk snapshot of a storage, one JSON file per storage directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::engine::{Inner, Keyspace};
use crate::error::{
    DecodeSnapshotSnafu, EncodeSnapshotSnafu, ReadSnapshotSnafu, Result, WriteSnapshotSnafu,
};

pub(crate) const SNAPSHOT_FILE: &str = "storage.json";

type Entries = Vec<(Vec<u8>, Vec<u8>)>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    default: Entries,
    families: BTreeMap<String, Entries>,
}

fn entries(keyspace: &Keyspace) -> Entries {
    keyspace
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

impl From<&Inner> for Snapshot {
    fn from(inner: &Inner) -> Self {
        Self {
            default: entries(&inner.default),
            families: inner
                .families
                .iter()
                .map(|(name, keyspace)| (name.clone(), entries(keyspace)))
                .collect(),
        }
    }
}

impl From<Snapshot> for Inner {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            default: snapshot.default.into_iter().collect(),
            families: snapshot
                .families
                .into_iter()
                .map(|(name, entries)| (name, entries.into_iter().collect()))
                .collect(),
        }
    }
}

/// Loads the snapshot under `dir`, `None` if nothing was flushed yet.
pub(crate) fn load(dir: &Path) -> Result<Option<Inner>> {
    let path = dir.join(SNAPSHOT_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read(&path).context(ReadSnapshotSnafu {
        path: path.display().to_string(),
    })?;
    let snapshot: Snapshot = serde_json::from_slice(&raw).context(DecodeSnapshotSnafu {
        path: path.display().to_string(),
    })?;
    Ok(Some(snapshot.into()))
}

/// Writes the snapshot next to the final file first and renames it over, so
/// a crash never leaves a torn snapshot behind.
pub(crate) fn save(dir: &Path, inner: &Inner) -> Result<()> {
    let raw = serde_json::to_vec(&Snapshot::from(inner)).context(EncodeSnapshotSnafu)?;
    let path = dir.join(SNAPSHOT_FILE);
    let tmp = dir.join(format!("{SNAPSHOT_FILE}.tmp"));

    fs::write(&tmp, raw).context(WriteSnapshotSnafu {
        path: tmp.display().to_string(),
    })?;
    fs::rename(&tmp, &path).context(WriteSnapshotSnafu {
        path: path.display().to_string(),
    })
}
