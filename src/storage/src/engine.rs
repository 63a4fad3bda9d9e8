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

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use common_telemetry::{debug, info};
use parking_lot::RwLock;
use snafu::{ensure, OptionExt, ResultExt};
use store_api::{Cell, Mutation, RowData, TimeRange, SERVER_ASSIGNED_TIMESTAMP};

use crate::error::{
    DecodeSchemaSnafu, DeletionProtectedSnafu, DestroyStorageSnafu, EncodeSchemaSnafu,
    FamilyNotFoundSnafu, InvalidTableNameSnafu, Result, TableNotFoundSnafu, WriteSnapshotSnafu,
};
use crate::keys::{
    cell_key, column_prefix, prefix_end, prefixed_family, row_prefix, schema_key,
    split_cell_key, trim_newlines, MANIFEST_KEY, TABLES_PREFIX,
};
use crate::schema::{ColumnFamily, TableSchema};
use crate::snapshot;

pub(crate) type Keyspace = BTreeMap<Vec<u8>, Vec<u8>>;

/// The keyspaces of a storage. `default` holds the manifest and the table
/// schemas, `families` holds one keyspace of cells per `{table}/{family}`.
#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) default: Keyspace,
    pub(crate) families: BTreeMap<String, Keyspace>,
}

fn key_range<'a>(start: &'a [u8], end: &'a [u8]) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    (Bound::Included(start), Bound::Excluded(end))
}

fn has_prefix(keyspace: &Keyspace, prefix: &[u8]) -> bool {
    let end = prefix_end(prefix);
    keyspace
        .range::<[u8], _>(key_range(prefix, &end))
        .next()
        .is_some()
}

/// Removes every key under `prefix` accepted by `filter`, returning how many
/// keys were removed.
fn remove_prefix(keyspace: &mut Keyspace, prefix: &[u8], filter: impl Fn(&[u8]) -> bool) -> usize {
    let end = prefix_end(prefix);
    let keys = keyspace
        .range::<[u8], _>(key_range(prefix, &end))
        .map(|(k, _)| k)
        .filter(|k| filter(k))
        .cloned()
        .collect::<Vec<_>>();
    for key in &keys {
        let _ = keyspace.remove(key);
    }
    keys.len()
}

fn cell_timestamp(column_prefix: &[u8], key: &[u8]) -> Option<i64> {
    let rest = key.strip_prefix(column_prefix)?;
    std::str::from_utf8(rest).ok()?.parse().ok()
}

/// Current time in microseconds, truncated to milliseconds like the server
/// side clock of a table store.
fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64 * 1000)
        .unwrap_or_default()
}

impl Inner {
    fn family(&self, table: &str, family: &str) -> Option<&Keyspace> {
        self.families.get(&prefixed_family(table, family))
    }

    fn family_mut(&mut self, table: &str, family: &str) -> Option<&mut Keyspace> {
        self.families.get_mut(&prefixed_family(table, family))
    }

    fn table_families<'a>(
        &'a self,
        table: &str,
    ) -> impl Iterator<Item = (&'a str, &'a Keyspace)> + 'a {
        let prefix = format!("{table}/");
        self.families
            .iter()
            .filter_map(move |(name, keyspace)| {
                name.strip_prefix(&prefix).map(|family| (family, keyspace))
            })
    }

    fn manifest(&self) -> Vec<String> {
        self.default
            .get(MANIFEST_KEY.as_bytes())
            .map(|raw| {
                String::from_utf8_lossy(raw)
                    .lines()
                    .map(trim_newlines)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn put_manifest(&mut self, entries: &[String]) {
        let mut raw = String::new();
        for entry in entries {
            raw.push_str(entry);
            raw.push('\n');
        }
        let _ = self
            .default
            .insert(MANIFEST_KEY.as_bytes().to_vec(), raw.into_bytes());
    }

    pub(crate) fn table_schema(&self, table: &str) -> Result<Option<TableSchema>> {
        self.default
            .get(schema_key(table).as_bytes())
            .map(|raw| serde_json::from_slice(raw).context(DecodeSchemaSnafu { table }))
            .transpose()
    }

    fn put_schema(&mut self, schema: &TableSchema) -> Result<()> {
        let raw = serde_json::to_vec(schema).context(EncodeSchemaSnafu {
            table: &schema.name,
        })?;
        let _ = self
            .default
            .insert(schema_key(&schema.name).into_bytes(), raw);
        Ok(())
    }

    fn put_cell(
        &mut self,
        table: &str,
        row_key: &[u8],
        family: &str,
        qualifier: &[u8],
        timestamp_micros: i64,
        value: &[u8],
    ) {
        let key = cell_key(table, row_key, qualifier, timestamp_micros);
        debug!(
            "Put cell {} into column family {}/{}",
            String::from_utf8_lossy(&key),
            table,
            family
        );
        let _ = self
            .families
            .entry(prefixed_family(table, family))
            .or_default()
            .insert(key, value.to_vec());
    }

    fn row_exists(&self, table: &str, row_key: &[u8]) -> bool {
        let prefix = row_prefix(table, row_key);
        self.table_families(table)
            .any(|(_, keyspace)| has_prefix(keyspace, &prefix))
    }

    fn row_exists_in_cf(&self, table: &str, row_key: &[u8], family: &str) -> bool {
        let prefix = row_prefix(table, row_key);
        self.family(table, family)
            .is_some_and(|keyspace| has_prefix(keyspace, &prefix))
    }

    fn delete_column(
        &mut self,
        table: &str,
        row_key: &[u8],
        family: &str,
        qualifier: &[u8],
        time_range: Option<TimeRange>,
    ) -> usize {
        let prefix = column_prefix(table, row_key, qualifier);
        let Some(keyspace) = self.family_mut(table, family) else {
            return 0;
        };
        remove_prefix(keyspace, &prefix, |key| match time_range {
            None => true,
            Some(range) => cell_timestamp(&prefix, key).is_some_and(|ts| range.contains(ts)),
        })
    }

    fn delete_cf_row(&mut self, table: &str, row_key: &[u8], family: &str) -> bool {
        let prefix = row_prefix(table, row_key);
        let Some(keyspace) = self.family_mut(table, family) else {
            return false;
        };
        let removed = remove_prefix(keyspace, &prefix, |_| true);
        debug!(
            "Deleted {} cells of row {} in column family {}/{}",
            removed,
            String::from_utf8_lossy(row_key),
            table,
            family
        );
        true
    }

    fn delete_row(&mut self, table: &str, row_key: &[u8]) -> usize {
        let prefix = row_prefix(table, row_key);
        let family_prefix = format!("{table}/");
        self.families
            .iter_mut()
            .filter(|(name, _)| name.starts_with(&family_prefix))
            .map(|(_, keyspace)| remove_prefix(keyspace, &prefix, |_| true))
            .sum()
    }

    fn delete_column_families_for_table(&mut self, table: &str) -> usize {
        let family_prefix = format!("{table}/");
        let before = self.families.len();
        self.families
            .retain(|name, _| !name.starts_with(&family_prefix));
        before - self.families.len()
    }

    /// Keeps only the newest `max_versions` cells of one column.
    fn gc_column(
        &mut self,
        table: &str,
        row_key: &[u8],
        family: &str,
        qualifier: &[u8],
        max_versions: u32,
    ) {
        let prefix = column_prefix(table, row_key, qualifier);
        let Some(keyspace) = self.family_mut(table, family) else {
            return;
        };
        let end = prefix_end(&prefix);
        let mut timestamps = keyspace
            .range::<[u8], _>(key_range(&prefix, &end))
            .filter_map(|(k, _)| cell_timestamp(&prefix, k))
            .collect::<Vec<_>>();
        if timestamps.len() <= max_versions as usize {
            return;
        }
        timestamps.sort_unstable_by(|a, b| b.cmp(a));
        for ts in timestamps.split_off(max_versions as usize) {
            let _ = keyspace.remove(&cell_key(table, row_key, qualifier, ts));
        }
    }

    fn apply(&mut self, schema: &TableSchema, row_key: &[u8], mutation: &Mutation, now: i64) {
        let table = schema.name.as_str();
        match mutation {
            Mutation::SetCell {
                family,
                qualifier,
                timestamp_micros,
                value,
            } => {
                let ts = if *timestamp_micros == SERVER_ASSIGNED_TIMESTAMP {
                    now
                } else {
                    *timestamp_micros
                };
                self.put_cell(table, row_key, family, qualifier, ts, value);
                if let Some(max_versions) = schema
                    .column_families
                    .get(family)
                    .and_then(|cf| cf.max_versions)
                {
                    self.gc_column(table, row_key, family, qualifier, max_versions);
                }
            }
            Mutation::DeleteFromColumn {
                family,
                qualifier,
                time_range,
            } => {
                let _ = self.delete_column(table, row_key, family, qualifier, *time_range);
            }
            Mutation::DeleteFromFamily { family } => {
                let _ = self.delete_cf_row(table, row_key, family);
            }
            Mutation::DeleteFromRow => {
                let _ = self.delete_row(table, row_key);
            }
        }
    }

    /// Validates the table and every family first so that a rejected request
    /// leaves the row untouched.
    pub(crate) fn mutate_row(
        &mut self,
        table: &str,
        row_key: &[u8],
        mutations: &[Mutation],
    ) -> Result<usize> {
        let schema = self
            .table_schema(table)?
            .context(TableNotFoundSnafu { table })?;
        for family in mutations.iter().filter_map(Mutation::family) {
            ensure!(
                schema.has_family(family),
                FamilyNotFoundSnafu { table, family }
            );
        }

        let now = now_micros();
        for mutation in mutations {
            self.apply(&schema, row_key, mutation, now);
        }
        Ok(mutations.len())
    }

    pub(crate) fn read_row(
        &self,
        table: &str,
        row_key: &[u8],
        family: Option<&str>,
    ) -> Option<RowData> {
        let prefix = row_prefix(table, row_key);
        let end = prefix_end(&prefix);
        let mut row = RowData::new(row_key);
        for (name, keyspace) in self.table_families(table) {
            if family.is_some_and(|f| f != name) {
                continue;
            }
            for (key, value) in keyspace.range::<[u8], _>(key_range(&prefix, &end)) {
                if let Some((qualifier, timestamp_micros)) = split_cell_key(&prefix, key) {
                    row.cells.push(Cell {
                        family: name.to_string(),
                        qualifier,
                        timestamp_micros,
                        value: value.clone(),
                        labels: vec![],
                    });
                }
            }
        }

        if row.is_empty() {
            None
        } else {
            row.sort();
            Some(row)
        }
    }

    fn create_table(&mut self, mut schema: TableSchema) -> Result<TableSchema> {
        ensure!(
            !schema.name.is_empty() && !schema.name.contains(['\n', '\r']),
            InvalidTableNameSnafu { table: &schema.name }
        );
        schema.normalize_family_ids();
        self.put_schema(&schema)?;

        let entry = schema_key(&schema.name);
        let mut manifest = self.manifest();
        if !manifest.contains(&entry) {
            manifest.push(entry);
            self.put_manifest(&manifest);
        }
        for family in schema.column_families.keys() {
            let _ = self
                .families
                .entry(prefixed_family(&schema.name, family))
                .or_default();
        }
        Ok(schema)
    }

    fn modify_column_families(
        &mut self,
        table: &str,
        create: &[String],
        drop: &[String],
    ) -> Result<TableSchema> {
        let mut schema = self
            .table_schema(table)?
            .context(TableNotFoundSnafu { table })?;
        for family in drop {
            ensure!(
                schema.has_family(family),
                FamilyNotFoundSnafu { table, family }
            );
        }

        for family in create {
            let _ = schema
                .column_families
                .entry(family.clone())
                .or_insert_with(ColumnFamily::default);
            let _ = self
                .families
                .entry(prefixed_family(table, family))
                .or_default();
        }
        for family in drop {
            let _ = schema.column_families.remove(family);
            let _ = self.families.remove(&prefixed_family(table, family));
        }
        self.put_schema(&schema)?;
        Ok(schema)
    }

    fn delete_table(&mut self, table: &str) -> Result<bool> {
        if let Some(schema) = self.table_schema(table)? {
            ensure!(
                !schema.deletion_protection,
                DeletionProtectedSnafu { table }
            );
        }

        let entry = schema_key(table);
        let mut manifest = self.manifest();
        let before = manifest.len();
        manifest.retain(|line| line != &entry);
        if manifest.len() == before {
            return Ok(false);
        }

        self.put_manifest(&manifest);
        let _ = self.default.remove(entry.as_bytes());
        let dropped = self.delete_column_families_for_table(table);
        info!("Deleted table {}, dropped {} column families", table, dropped);
        Ok(true)
    }
}

/// An embedded Bigtable-style table store.
///
/// Data lives in memory and is written to a JSON snapshot under the storage
/// directory on [Storage::flush]. A storage created with
/// [Storage::in_memory] never touches the disk.
pub struct Storage {
    inner: RwLock<Inner>,
    dir: Option<PathBuf>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Storage")
            .field("dir", &self.dir)
            .field("default_keys", &inner.default.len())
            .field("column_families", &inner.families.len())
            .finish()
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Storage {
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            dir: None,
        }
    }

    /// Opens the storage under `dir`, creating the directory when missing
    /// and loading the last flushed snapshot when there is one.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).context(WriteSnapshotSnafu {
            path: dir.display().to_string(),
        })?;
        let inner = snapshot::load(dir)?.unwrap_or_default();
        info!(
            "Opened storage at {}, column families: {}",
            dir.display(),
            inner.families.len()
        );

        Ok(Self {
            inner: RwLock::new(inner),
            dir: Some(dir.to_path_buf()),
        })
    }

    /// Removes the storage directory. Returns `false` when there was nothing
    /// to remove.
    pub fn destroy(dir: impl AsRef<Path>) -> Result<bool> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(dir).context(DestroyStorageSnafu {
            path: dir.display().to_string(),
        })?;
        info!("Destroyed storage at {}", dir.display());
        Ok(true)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn flush(&self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let inner = self.inner.read();
        snapshot::save(dir, &inner)
    }

    pub fn put_row(&self, key: &[u8], value: &[u8]) {
        let _ = self.inner.write().default.insert(key.to_vec(), value.to_vec());
    }

    pub fn get_row(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().default.get(key).cloned()
    }

    pub fn delete_meta_row(&self, key: &[u8]) -> bool {
        self.inner.write().default.remove(key).is_some()
    }

    pub fn put_batch(&self, kvs: Vec<(Vec<u8>, Vec<u8>)>) {
        self.inner.write().default.extend(kvs);
    }

    pub fn put_cell(
        &self,
        table: &str,
        row_key: &[u8],
        family: &str,
        qualifier: &[u8],
        timestamp_micros: i64,
        value: &[u8],
    ) {
        self.inner
            .write()
            .put_cell(table, row_key, family, qualifier, timestamp_micros, value)
    }

    pub fn cf_exists(&self, table: &str, family: &str) -> bool {
        self.inner.read().family(table, family).is_some()
    }

    pub fn row_exists(&self, table: &str, row_key: &[u8]) -> bool {
        self.inner.read().row_exists(table, row_key)
    }

    pub fn row_exists_in_cf(&self, table: &str, row_key: &[u8], family: &str) -> bool {
        self.inner.read().row_exists_in_cf(table, row_key, family)
    }

    /// Deletes the cells of one column, optionally only those inside
    /// `time_range`. Returns the number of cells removed.
    pub fn delete_column(
        &self,
        table: &str,
        row_key: &[u8],
        family: &str,
        qualifier: &[u8],
        time_range: Option<TimeRange>,
    ) -> usize {
        self.inner
            .write()
            .delete_column(table, row_key, family, qualifier, time_range)
    }

    /// Deletes every cell of the row in one column family. Returns `false`
    /// when the family does not exist.
    pub fn delete_cf_row(&self, table: &str, row_key: &[u8], family: &str) -> bool {
        self.inner.write().delete_cf_row(table, row_key, family)
    }

    pub fn delete_row(&self, table: &str, row_key: &[u8]) -> usize {
        self.inner.write().delete_row(table, row_key)
    }

    pub fn delete_column_families_for_table(&self, table: &str) -> usize {
        self.inner.write().delete_column_families_for_table(table)
    }

    /// Creates the table or overwrites its schema. The manifest gets one
    /// entry per table no matter how often it is created.
    pub fn create_table(&self, schema: TableSchema) -> Result<TableSchema> {
        self.inner.write().create_table(schema)
    }

    pub fn table_schema(&self, table: &str) -> Result<Option<TableSchema>> {
        self.inner.read().table_schema(table)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.inner
            .read()
            .manifest()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix(TABLES_PREFIX).map(str::to_string))
            .collect()
    }

    pub fn modify_column_families(
        &self,
        table: &str,
        create: &[String],
        drop: &[String],
    ) -> Result<TableSchema> {
        self.inner
            .write()
            .modify_column_families(table, create, drop)
    }

    pub fn set_deletion_protection(&self, table: &str, protected: bool) -> Result<()> {
        let mut inner = self.inner.write();
        let mut schema = inner
            .table_schema(table)?
            .context(TableNotFoundSnafu { table })?;
        schema.deletion_protection = protected;
        inner.put_schema(&schema)
    }

    /// Drops the table's manifest entry, schema and column families.
    /// Returns `false` when the table is not in the manifest.
    pub fn delete_table(&self, table: &str) -> Result<bool> {
        self.inner.write().delete_table(table)
    }

    pub fn read_row(&self, table: &str, row_key: &[u8], family: Option<&str>) -> Option<RowData> {
        self.inner.read().read_row(table, row_key, family)
    }

    /// Applies mutations to one row atomically.
    pub fn apply_mutations(
        &self,
        table: &str,
        row_key: &[u8],
        mutations: &[Mutation],
    ) -> Result<usize> {
        self.inner.write().mutate_row(table, row_key, mutations)
    }

    /// Every key of every keyspace as `(keyspace, key, value)`, the default
    /// keyspace first.
    pub fn scan(&self) -> Vec<(String, Vec<u8>, Vec<u8>)> {
        let inner = self.inner.read();
        let default = inner
            .default
            .iter()
            .map(|(k, v)| ("default".to_string(), k.clone(), v.clone()));
        let families = inner.families.iter().flat_map(|(name, keyspace)| {
            keyspace
                .iter()
                .map(move |(k, v)| (name.clone(), k.clone(), v.clone()))
        });
        default.chain(families).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const T1: &str = "projects/p/instances/i/tables/t1";
    const T2: &str = "projects/p/instances/i/tables/t2";

    fn count_keys_with_prefix(storage: &Storage, table: &str, family: &str, prefix: &[u8]) -> usize {
        let inner = storage.inner.read();
        inner
            .family(table, family)
            .map(|keyspace| {
                keyspace
                    .keys()
                    .filter(|k| k.starts_with(prefix))
                    .count()
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_put_get_delete_meta_row() {
        let storage = Storage::in_memory();
        storage.put_row(b"meta-key", b"meta-value");
        assert_eq!(Some(b"meta-value".to_vec()), storage.get_row(b"meta-key"));

        assert!(storage.delete_meta_row(b"meta-key"));
        assert_eq!(None, storage.get_row(b"meta-key"));
        assert!(!storage.delete_meta_row(b"meta-key"));
    }

    #[test]
    fn test_put_batch() {
        let storage = Storage::in_memory();
        storage.put_batch(vec![
            (b"k1".to_vec(), b"v1".to_vec()),
            (b"k2".to_vec(), b"v2".to_vec()),
            (b"k3".to_vec(), b"v3".to_vec()),
        ]);
        assert_eq!(Some(b"v1".to_vec()), storage.get_row(b"k1"));
        assert_eq!(Some(b"v2".to_vec()), storage.get_row(b"k2"));
        assert_eq!(Some(b"v3".to_vec()), storage.get_row(b"k3"));
    }

    #[test]
    fn test_put_cell_creates_family() {
        let storage = Storage::in_memory();
        assert!(!storage.cf_exists(T1, "cf1"));

        storage.put_cell(T1, b"row-1", "cf1", b"col", 1_000, b"value-1");
        assert!(storage.cf_exists(T1, "cf1"));
        assert!(storage.row_exists(T1, b"row-1"));
        assert!(storage.row_exists_in_cf(T1, b"row-1", "cf1"));
        assert!(!storage.row_exists(T2, b"row-1"));
        assert_eq!(
            1,
            count_keys_with_prefix(&storage, T1, "cf1", &column_prefix(T1, b"row-1", b"col"))
        );
    }

    #[test]
    fn test_delete_column_only_target_qualifier() {
        let storage = Storage::in_memory();
        storage.put_cell(T1, b"row", "cf", b"c1", 1, b"a");
        storage.put_cell(T1, b"row", "cf", b"c1", 2, b"b");
        storage.put_cell(T1, b"row", "cf", b"c2", 1, b"c");

        let c1 = column_prefix(T1, b"row", b"c1");
        let c2 = column_prefix(T1, b"row", b"c2");
        assert_eq!(2, count_keys_with_prefix(&storage, T1, "cf", &c1));
        assert_eq!(1, count_keys_with_prefix(&storage, T1, "cf", &c2));

        assert_eq!(2, storage.delete_column(T1, b"row", "cf", b"c1", None));
        assert_eq!(0, count_keys_with_prefix(&storage, T1, "cf", &c1));
        assert_eq!(1, count_keys_with_prefix(&storage, T1, "cf", &c2));
        assert!(storage.row_exists_in_cf(T1, b"row", "cf"));
    }

    #[test]
    fn test_delete_column_in_time_range() {
        let storage = Storage::in_memory();
        for ts in [1_000, 2_000, 3_000] {
            storage.put_cell(T1, b"row", "cf", b"c", ts, b"v");
        }

        let range = TimeRange {
            start_micros: 2_000,
            end_micros: 3_000,
        };
        assert_eq!(1, storage.delete_column(T1, b"row", "cf", b"c", Some(range)));
        let row = storage.read_row(T1, b"row", None).unwrap();
        let timestamps = row
            .cells
            .iter()
            .map(|c| c.timestamp_micros)
            .collect::<Vec<_>>();
        assert_eq!(vec![3_000, 1_000], timestamps);
    }

    #[test]
    fn test_delete_cf_row_only_selected_family() {
        let storage = Storage::in_memory();
        storage.put_cell(T1, b"row", "cf1", b"c", 1, b"a");
        storage.put_cell(T1, b"row", "cf2", b"c", 1, b"b");

        assert!(storage.delete_cf_row(T1, b"row", "cf1"));
        assert!(!storage.row_exists_in_cf(T1, b"row", "cf1"));
        assert!(storage.row_exists_in_cf(T1, b"row", "cf2"));
        assert!(storage.row_exists(T1, b"row"));

        assert!(!storage.delete_cf_row(T1, b"row", "missing"));
    }

    #[test]
    fn test_delete_row_across_families() {
        let storage = Storage::in_memory();
        storage.put_cell(T1, b"row1", "cf1", b"c", 1, b"a");
        storage.put_cell(T1, b"row1", "cf2", b"c", 1, b"b");
        storage.put_cell(T1, b"row2", "cf2", b"c", 1, b"c");
        storage.put_cell(T2, b"row1", "cf1", b"c", 1, b"d");

        assert_eq!(2, storage.delete_row(T1, b"row1"));
        assert!(!storage.row_exists(T1, b"row1"));
        assert!(storage.row_exists(T1, b"row2"));
        assert!(storage.row_exists_in_cf(T1, b"row2", "cf2"));
        assert!(storage.row_exists(T2, b"row1"));
    }

    #[test]
    fn test_row_keys_do_not_collide() {
        let storage = Storage::in_memory();
        storage.put_cell(T1, b"car", "cf", b"c", 1, b"a");
        storage.put_cell(T1, b"car/1", "cf", b"c", 1, b"b");
        storage.put_cell(T1, b"car-1", "cf", b"c", 1, b"c");

        assert!(storage.delete_cf_row(T1, b"car", "cf"));
        assert!(storage.row_exists(T1, b"car/1"));
        assert!(storage.row_exists(T1, b"car-1"));
        assert_eq!(
            Some(&b"b"[..]),
            storage.read_row(T1, b"car/1", None).unwrap().latest("cf", b"c")
        );
    }

    #[test]
    fn test_delete_table_drops_only_its_families() {
        let storage = Storage::in_memory();
        let _ = storage
            .create_table(TableSchema::new(T1).with_family("cf1"))
            .unwrap();
        let _ = storage
            .create_table(TableSchema::new(T2).with_family("cf2"))
            .unwrap();
        storage.put_cell(T1, b"row", "cf1", b"c", 1, b"a");
        storage.put_cell(T2, b"row", "cf2", b"c", 1, b"b");

        assert!(storage.delete_table(T1).unwrap());
        assert!(!storage.cf_exists(T1, "cf1"));
        assert!(storage.cf_exists(T2, "cf2"));
        assert!(storage.table_schema(T1).unwrap().is_none());
        assert!(storage.table_schema(T2).unwrap().is_some());
        assert_eq!(
            Some(format!("{TABLES_PREFIX}{T2}\n").into_bytes()),
            storage.get_row(MANIFEST_KEY.as_bytes())
        );
        assert!(storage.row_exists_in_cf(T2, b"row", "cf2"));

        assert!(!storage.delete_table(T1).unwrap());
    }

    #[test]
    fn test_delete_protected_table() {
        let storage = Storage::in_memory();
        let _ = storage
            .create_table(TableSchema::new(T1).with_family("cf1"))
            .unwrap();
        storage.set_deletion_protection(T1, true).unwrap();

        let err = storage.delete_table(T1).unwrap_err();
        assert!(matches!(err, Error::DeletionProtected { .. }));
        assert_eq!(vec![T1.to_string()], storage.list_tables());

        storage.set_deletion_protection(T1, false).unwrap();
        assert!(storage.delete_table(T1).unwrap());
        assert!(storage.list_tables().is_empty());
    }

    #[test]
    fn test_delete_column_families_for_table() {
        let storage = Storage::in_memory();
        storage.put_cell(T1, b"row", "cf1", b"c", 1, b"a");
        storage.put_cell(T1, b"row", "cf2", b"c", 1, b"a");
        storage.put_cell(T2, b"row", "cf1", b"c", 1, b"a");

        assert_eq!(2, storage.delete_column_families_for_table(T1));
        assert!(!storage.row_exists(T1, b"row"));
        assert!(storage.row_exists(T2, b"row"));
    }

    #[test]
    fn test_create_table_persists_schema_and_manifest() {
        let storage = Storage::in_memory();
        let schema = storage
            .create_table(TableSchema::new(T1).with_family("cf1"))
            .unwrap();
        assert!(schema.has_family("cf1"));
        assert!(storage.cf_exists(T1, "cf1"));

        let persisted = storage.table_schema(T1).unwrap().unwrap();
        assert_eq!(T1, persisted.name);
        assert!(persisted.has_family("cf1"));
        assert_eq!(vec![T1.to_string()], storage.list_tables());
    }

    #[test]
    fn test_create_table_normalizes_prefixed_family_ids() {
        let storage = Storage::in_memory();
        let prefixed = prefixed_family(T1, "cf_pref");
        let schema = storage
            .create_table(TableSchema::new(T1).with_family(prefixed.clone()))
            .unwrap();
        assert!(schema.has_family("cf_pref"));
        assert!(!schema.has_family(&prefixed));

        let persisted = storage.table_schema(T1).unwrap().unwrap();
        assert!(persisted.has_family("cf_pref"));
        assert!(!persisted.has_family(&prefixed));
    }

    #[test]
    fn test_repeated_create_keeps_one_manifest_entry() {
        let storage = Storage::in_memory();
        let schema = TableSchema::new(T1).with_family("cf1");
        let _ = storage.create_table(schema.clone()).unwrap();
        let _ = storage.create_table(schema).unwrap();

        let manifest = storage.get_row(MANIFEST_KEY.as_bytes()).unwrap();
        let expected = schema_key(T1);
        assert_eq!(
            1,
            String::from_utf8(manifest)
                .unwrap()
                .lines()
                .filter(|line| *line == expected)
                .count()
        );
    }

    #[test]
    fn test_create_table_rejects_empty_name() {
        let storage = Storage::in_memory();
        let err = storage.create_table(TableSchema::new("")).unwrap_err();
        assert!(matches!(err, Error::InvalidTableName { .. }));
    }

    #[test]
    fn test_modify_column_families() {
        let storage = Storage::in_memory();
        let _ = storage
            .create_table(TableSchema::new(T1).with_family("cf1"))
            .unwrap();
        storage.put_cell(T1, b"row", "cf1", b"c", 1, b"a");

        let schema = storage
            .modify_column_families(T1, &["cf2".to_string()], &[])
            .unwrap();
        assert!(schema.has_family("cf1"));
        assert!(schema.has_family("cf2"));
        assert!(storage.table_schema(T1).unwrap().unwrap().has_family("cf2"));

        let _ = storage
            .modify_column_families(T1, &[], &["cf1".to_string()])
            .unwrap();
        assert!(!storage.cf_exists(T1, "cf1"));
        assert!(!storage.row_exists(T1, b"row"));

        let err = storage
            .modify_column_families(T1, &[], &["cf1".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::FamilyNotFound { .. }));
        let err = storage
            .modify_column_families(T2, &["cf1".to_string()], &[])
            .unwrap_err();
        assert!(matches!(err, Error::TableNotFound { .. }));
    }

    #[test]
    fn test_max_versions_gc() {
        let storage = Storage::in_memory();
        let mut schema = TableSchema::new(T1).with_family("cf");
        schema.column_families.get_mut("cf").unwrap().max_versions = Some(2);
        let _ = storage.create_table(schema).unwrap();

        for ts in [1_000, 2_000, 3_000] {
            let _ = storage
                .apply_mutations(
                    T1,
                    b"row",
                    &[Mutation::SetCell {
                        family: "cf".to_string(),
                        qualifier: b"c".to_vec(),
                        timestamp_micros: ts,
                        value: ts.to_string().into_bytes(),
                    }],
                )
                .unwrap();
        }

        let row = storage.read_row(T1, b"row", Some("cf")).unwrap();
        assert_eq!(2, row.cells.len());
        assert_eq!(Some(&b"3000"[..]), row.latest("cf", b"c"));
        assert_eq!(2_000, row.cells[1].timestamp_micros);
    }

    #[test]
    fn test_read_row_restricted_to_family() {
        let storage = Storage::in_memory();
        storage.put_cell(T1, b"car-1", "iddup", b"color", 1, b"red");
        storage.put_cell(T1, b"car-1", "iddup", b"year", 1, b"2020");
        storage.put_cell(T1, b"car-1", "other", b"mileage", 1, b"500");

        let row = storage.read_row(T1, b"car-1", Some("iddup")).unwrap();
        assert_eq!(2, row.cells.len());
        assert!(row.cells.iter().all(|c| c.family == "iddup"));
        assert_eq!(b"color".to_vec(), row.cells[0].qualifier);

        assert!(storage.read_row(T1, b"car-1", Some("missing")).is_none());
        assert!(storage.read_row(T1, b"car-2", None).is_none());
        assert_eq!(3, storage.read_row(T1, b"car-1", None).unwrap().cells.len());
    }

    #[test]
    fn test_scan() {
        let storage = Storage::in_memory();
        storage.put_row(b"meta", b"value");
        storage.put_cell(T1, b"row", "cf", b"c", 1, b"a");

        let entries = storage.scan();
        assert_eq!(2, entries.len());
        assert_eq!("default", entries[0].0);
        assert_eq!(prefixed_family(T1, "cf"), entries[1].0);
        assert_eq!(cell_key(T1, b"row", b"c", 1), entries[1].1);
    }

    #[test]
    fn test_reopen_preserves_all_keyspaces() {
        common_telemetry::init_default_ut_logging();
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Storage::open(dir.path()).unwrap();
            storage.put_row(b"meta", b"value");
            storage.put_cell(T1, b"row", "cf", b"c", 1, b"a");
            let _ = storage
                .create_table(TableSchema::new(T2).with_family("empty"))
                .unwrap();
            storage.flush().unwrap();
        }

        let storage = Storage::open(dir.path()).unwrap();
        assert_eq!(Some(b"value".to_vec()), storage.get_row(b"meta"));
        assert!(storage.cf_exists(T1, "cf"));
        assert!(storage.cf_exists(T2, "empty"));
        assert!(storage.row_exists_in_cf(T1, b"row", "cf"));
        assert_eq!(Some(dir.path()), storage.dir());
    }

    #[test]
    fn test_destroy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        assert!(!Storage::destroy(&path).unwrap());

        let storage = Storage::open(&path).unwrap();
        storage.put_row(b"meta", b"value");
        storage.flush().unwrap();
        drop(storage);

        assert!(Storage::destroy(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_in_memory_flush_is_noop() {
        let storage = Storage::in_memory();
        storage.put_row(b"meta", b"value");
        storage.flush().unwrap();
        assert!(storage.dir().is_none());
    }

    #[test]
    fn test_key_range_covers_prefix() {
        let keyspace: Keyspace = [b"a/1", b"a/2", b"b/1"]
            .into_iter()
            .map(|key| (key.to_vec(), vec![]))
            .collect();

        let prefix = b"a/".to_vec();
        let end = prefix_end(&prefix);
        let keys = keyspace
            .range::<[u8], _>(key_range(&prefix, &end))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        assert_eq!(vec![b"a/1".to_vec(), b"a/2".to_vec()], keys);
        assert!(has_prefix(&keyspace, b"b/"));
        assert!(!has_prefix(&keyspace, b"c/"));
    }
}
