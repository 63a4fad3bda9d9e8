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

use std::any::Any;

use async_trait::async_trait;
use common_error::ext::BoxedError;
use store_api::{MutateRowOutcome, Mutation, RowData, TableName, TableStore};

use crate::engine::Storage;

#[async_trait]
impl TableStore for Storage {
    fn name(&self) -> &str {
        "embedded"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn mutate_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        mutations: &[Mutation],
    ) -> Result<MutateRowOutcome, BoxedError> {
        let applied = self
            .apply_mutations(&table.path(), row_key, mutations)
            .map_err(BoxedError::new)?;
        Ok(MutateRowOutcome { applied })
    }

    async fn read_row(
        &self,
        table: &TableName,
        row_key: &[u8],
        family: Option<&str>,
    ) -> Result<Option<RowData>, BoxedError> {
        Ok(Storage::read_row(self, &table.path(), row_key, family))
    }

    async fn close(&self) -> Result<(), BoxedError> {
        self.flush().map_err(BoxedError::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common_error::ext::ErrorExt;
    use common_error::status_code::StatusCode;
    use store_api::TableStoreRef;

    use super::*;
    use crate::schema::TableSchema;

    fn cars() -> TableName {
        TableName::new("p", "i", "cars")
    }

    fn set_cell(family: &str, qualifier: &str, value: &str) -> Mutation {
        Mutation::SetCell {
            family: family.to_string(),
            qualifier: qualifier.as_bytes().to_vec(),
            timestamp_micros: 1_000,
            value: value.as_bytes().to_vec(),
        }
    }

    fn delete_family(family: &str) -> Mutation {
        Mutation::DeleteFromFamily {
            family: family.to_string(),
        }
    }

    async fn new_store() -> TableStoreRef {
        let storage = Storage::in_memory();
        let _ = storage
            .create_table(
                TableSchema::new(cars().path())
                    .with_family("iddup")
                    .with_family("other"),
            )
            .unwrap();
        let store: TableStoreRef = Arc::new(storage);
        let _ = store
            .mutate_row(
                &cars(),
                b"car-1",
                &[
                    set_cell("iddup", "color", "red"),
                    set_cell("iddup", "year", "2020"),
                    set_cell("other", "mileage", "500"),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_delete_family() {
        let store = new_store().await;
        let outcome = store
            .mutate_row(&cars(), b"car-1", &[delete_family("iddup")])
            .await
            .unwrap();
        assert_eq!(1, outcome.applied);

        assert!(store
            .read_row(&cars(), b"car-1", Some("iddup"))
            .await
            .unwrap()
            .is_none());
        let row = store.read_row(&cars(), b"car-1", None).await.unwrap().unwrap();
        assert_eq!(1, row.cells.len());
        assert_eq!(Some(&b"500"[..]), row.latest("other", b"mileage"));

        // Deleting again is a successful no-op.
        let _ = store
            .mutate_row(&cars(), b"car-1", &[delete_family("iddup")])
            .await
            .unwrap();
        let row = store.read_row(&cars(), b"car-1", None).await.unwrap().unwrap();
        assert_eq!(1, row.cells.len());
    }

    #[tokio::test]
    async fn test_delete_family_of_absent_row() {
        let store = new_store().await;
        let _ = store
            .mutate_row(&cars(), b"car-404", &[delete_family("iddup")])
            .await
            .unwrap();
        assert!(store
            .read_row(&cars(), b"car-404", None)
            .await
            .unwrap()
            .is_none());

        let storage = store.as_any().downcast_ref::<Storage>().unwrap();
        assert!(!storage.row_exists(&cars().path(), b"car-404"));
    }

    #[tokio::test]
    async fn test_unknown_family_is_atomic() {
        let store = new_store().await;
        let err = store
            .mutate_row(
                &cars(),
                b"car-1",
                &[delete_family("other"), delete_family("missing")],
            )
            .await
            .unwrap_err();
        assert_eq!(StatusCode::TableColumnNotFound, err.status_code());

        let row = store.read_row(&cars(), b"car-1", None).await.unwrap().unwrap();
        assert_eq!(3, row.cells.len());
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let store = new_store().await;
        let err = store
            .mutate_row(
                &TableName::new("p", "i", "bikes"),
                b"car-1",
                &[delete_family("iddup")],
            )
            .await
            .unwrap_err();
        assert_eq!(StatusCode::TableNotFound, err.status_code());
    }

    #[tokio::test]
    async fn test_server_assigned_timestamp() {
        let store = new_store().await;
        let _ = store
            .mutate_row(
                &cars(),
                b"car-2",
                &[Mutation::SetCell {
                    family: "other".to_string(),
                    qualifier: b"mileage".to_vec(),
                    timestamp_micros: store_api::SERVER_ASSIGNED_TIMESTAMP,
                    value: b"10".to_vec(),
                }],
            )
            .await
            .unwrap();

        let row = store.read_row(&cars(), b"car-2", None).await.unwrap().unwrap();
        let ts = row.cells[0].timestamp_micros;
        assert!(ts > 0);
        assert_eq!(0, ts % 1000);
    }

    #[tokio::test]
    async fn test_close_flushes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Storage::open(dir.path()).unwrap();
            let _ = storage
                .create_table(TableSchema::new(cars().path()).with_family("iddup"))
                .unwrap();
            let store: TableStoreRef = Arc::new(storage);
            let _ = store
                .mutate_row(&cars(), b"car-1", &[set_cell("iddup", "color", "red")])
                .await
                .unwrap();
            store.close().await.unwrap();
        }

        let store: TableStoreRef = Arc::new(Storage::open(dir.path()).unwrap());
        let row = store.read_row(&cars(), b"car-1", None).await.unwrap().unwrap();
        assert_eq!(Some(&b"red"[..]), row.latest("iddup", b"color"));
    }
}
