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

//! Key layout of the storage.
//!
//! Cells live in one keyspace per `{table}/{family}` under
//! `/tables/{table}/{row}/{qualifier}/{timestamp}`. Row keys and qualifiers
//! are escaped so that `/` always separates components. The default keyspace
//! holds the table manifest and the schema of every table.

pub const TABLES_PREFIX: &str = "/tables/";
pub const MANIFEST_KEY: &str = "/manifest";

/// Name of the keyspace holding `family` of `table`.
pub fn prefixed_family(table: &str, family: &str) -> String {
    format!("{table}/{family}")
}

/// Key of the schema of `table` in the default keyspace, also the line
/// recorded for it in the manifest.
pub fn schema_key(table: &str) -> String {
    format!("{TABLES_PREFIX}{table}")
}

pub fn escape(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len());
    for b in bytes {
        match b {
            b'%' => escaped.extend_from_slice(b"%25"),
            b'/' => escaped.extend_from_slice(b"%2F"),
            _ => escaped.push(*b),
        }
    }
    escaped
}

pub fn unescape(bytes: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match &bytes[i..] {
            [b'%', b'2', b'5', ..] => {
                raw.push(b'%');
                i += 3;
            }
            [b'%', b'2', b'F', ..] => {
                raw.push(b'/');
                i += 3;
            }
            [b, ..] => {
                raw.push(*b);
                i += 1;
            }
            [] => unreachable!(),
        }
    }
    raw
}

pub fn table_prefix(table: &str) -> Vec<u8> {
    format!("{TABLES_PREFIX}{table}/").into_bytes()
}

pub fn row_prefix(table: &str, row_key: &[u8]) -> Vec<u8> {
    let mut prefix = table_prefix(table);
    prefix.extend(escape(row_key));
    prefix.push(b'/');
    prefix
}

pub fn column_prefix(table: &str, row_key: &[u8], qualifier: &[u8]) -> Vec<u8> {
    let mut prefix = row_prefix(table, row_key);
    prefix.extend(escape(qualifier));
    prefix.push(b'/');
    prefix
}

pub fn cell_key(table: &str, row_key: &[u8], qualifier: &[u8], timestamp_micros: i64) -> Vec<u8> {
    let mut key = column_prefix(table, row_key, qualifier);
    key.extend_from_slice(timestamp_micros.to_string().as_bytes());
    key
}

/// Splits a cell key below `row_prefix` into its qualifier and timestamp.
pub fn split_cell_key(row_prefix: &[u8], key: &[u8]) -> Option<(Vec<u8>, i64)> {
    let rest = key.strip_prefix(row_prefix)?;
    let sep = rest.iter().rposition(|b| *b == b'/')?;
    let timestamp = std::str::from_utf8(&rest[sep + 1..]).ok()?.parse().ok()?;
    Some((unescape(&rest[..sep]), timestamp))
}

/// Strips newlines and carriage returns at both ends.
pub fn trim_newlines(s: &str) -> &str {
    s.trim_matches(|c| c == '\n' || c == '\r')
}

/// The smallest key strictly greater than every key starting with `prefix`.
pub fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    // Trailing 0xFF bytes cannot be incremented.
    while end.last() == Some(&0xFF) {
        end.pop();
    }

    match end.last_mut() {
        Some(last) => {
            *last += 1;
            end
        }
        None => vec![0xFF],
    }
}
