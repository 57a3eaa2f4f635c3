//! Persistent data block against real SQLite databases

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use common::sqlite::SqliteClient;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tempfile::TempDir;
use voltage_datastore::{
    BlockConfig, DataBlock, DataStoreError, DatabaseConfig, SequentialBlock, SlaveConfig,
    SlaveContext, SqliteBlock, SqliteStore, StorageClass,
};

fn file_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("slave.db").display())
}

#[tokio::test]
async fn test_repeated_write_keeps_single_latest_row() {
    let store = SqliteStore::open("sqlite::memory:", "modbus_slave")
        .await
        .unwrap();
    let block = store.block(StorageClass::HoldingRegister);

    block.write(10, &[1]).await.unwrap();
    block.write(10, &[2]).await.unwrap();

    assert_eq!(block.read(10, 1).await.unwrap(), vec![2]);
    assert_eq!(
        store.row_count(StorageClass::HoldingRegister).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_overlapping_writes_upsert() {
    let store = SqliteStore::open("sqlite::memory:", "modbus_slave")
        .await
        .unwrap();
    let block = store.block(StorageClass::HoldingRegister);

    block.write(1, &[1, 2, 3]).await.unwrap();
    block.write(2, &[20, 30, 40]).await.unwrap();

    assert_eq!(block.read(1, 4).await.unwrap(), vec![1, 20, 30, 40]);
    assert_eq!(
        store.row_count(StorageClass::HoldingRegister).await.unwrap(),
        4
    );
}

#[tokio::test]
async fn test_read_with_missing_rows_is_short() {
    let store = SqliteStore::open("sqlite::memory:", "modbus_slave")
        .await
        .unwrap();
    let block = store.block(StorageClass::InputRegister);
    block.write(1, &[7, 8]).await.unwrap();

    assert_eq!(block.read(1, 5).await.unwrap(), vec![7, 8]);
    assert!(!block.contains(1, 5).await.unwrap());
}

#[tokio::test]
async fn test_context_turns_short_read_into_range_error() {
    let store = SqliteStore::open("sqlite::memory:", "modbus_slave")
        .await
        .unwrap();
    let context = SlaveContext::builder()
        .holding_registers(Arc::new(store.block(StorageClass::HoldingRegister)))
        .build();

    context
        .write(StorageClass::HoldingRegister, 0, &[11, 12])
        .await
        .unwrap();
    assert!(context
        .validate(StorageClass::HoldingRegister, 0, 2)
        .await
        .unwrap());

    let err = context
        .read(StorageClass::HoldingRegister, 0, 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DataStoreError::OutOfRange {
            address: 1,
            count: 3
        }
    ));
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let url = file_url(&temp_dir);

    {
        let store = SqliteStore::open(&url, "modbus_slave").await.unwrap();
        store
            .block(StorageClass::Coil)
            .write(3, &[1, 0, 1])
            .await
            .unwrap();
    }

    let store = SqliteStore::open(&url, "modbus_slave").await.unwrap();
    assert_eq!(
        store.block(StorageClass::Coil).read(3, 3).await.unwrap(),
        vec![1, 0, 1]
    );
}

#[tokio::test]
async fn test_context_reset_recreates_table() {
    let store = SqliteStore::open("sqlite::memory:", "modbus_slave")
        .await
        .unwrap();
    let memory = Arc::new(SequentialBlock::filled(0, 10, 3));
    let context = SlaveContext::builder()
        .coils(Arc::new(store.block(StorageClass::Coil)))
        .holding_registers(Arc::new(store.block(StorageClass::HoldingRegister)))
        .input_registers(memory)
        .build();

    context.write(StorageClass::Coil, 0, &[1]).await.unwrap();
    context
        .write(StorageClass::HoldingRegister, 0, &[500])
        .await
        .unwrap();
    context
        .write(StorageClass::InputRegister, 0, &[9])
        .await
        .unwrap();

    context.reset().await.unwrap();

    assert_eq!(store.row_count(StorageClass::Coil).await.unwrap(), 0);
    assert_eq!(
        store.row_count(StorageClass::HoldingRegister).await.unwrap(),
        0
    );
    assert_eq!(
        context
            .read(StorageClass::InputRegister, 0, 1)
            .await
            .unwrap(),
        vec![3]
    );

    // Table is usable again after the reset
    context.write(StorageClass::Coil, 0, &[1]).await.unwrap();
    assert!(context.validate(StorageClass::Coil, 0, 1).await.unwrap());
}

#[tokio::test]
async fn test_reset_across_two_stores_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let first = SqliteStore::open(&file_url(&temp_dir), "slave_a")
        .await
        .unwrap();
    let second = SqliteStore::open("sqlite::memory:", "slave_b")
        .await
        .unwrap();
    let context = SlaveContext::builder()
        .coils(Arc::new(first.block(StorageClass::Coil)))
        .holding_registers(Arc::new(second.block(StorageClass::HoldingRegister)))
        .build();

    context.write(StorageClass::Coil, 0, &[1]).await.unwrap();
    context
        .write(StorageClass::HoldingRegister, 0, &[7])
        .await
        .unwrap();

    let err = context.reset().await.unwrap_err();
    assert!(matches!(err, DataStoreError::Unsupported(msg) if msg.contains("slave_a")));

    assert_eq!(first.row_count(StorageClass::Coil).await.unwrap(), 1);
    assert_eq!(
        second
            .row_count(StorageClass::HoldingRegister)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_store_from_existing_pool() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let client = SqliteClient::from_pool(pool);
    assert_eq!(client.url(), "from_pool");

    let store = SqliteStore::from_client(client, "pooled_slave")
        .await
        .unwrap();
    let block = store.block(StorageClass::InputRegister);
    block.write(1, &[3, 4]).await.unwrap();

    assert_eq!(block.read(1, 2).await.unwrap(), vec![3, 4]);
    assert!(matches!(
        SqliteStore::from_client(SqliteClient::from_pool(store.pool().clone()), "bad-name").await,
        Err(DataStoreError::Config(_))
    ));
}

#[tokio::test]
async fn test_from_config_shares_one_store() {
    let temp_dir = TempDir::new().unwrap();
    let config = SlaveConfig {
        coils: Some(BlockConfig::Sqlite),
        holding_registers: Some(BlockConfig::Sqlite),
        input_registers: Some(BlockConfig::Sequential {
            start: 0,
            count: Some(10),
            fill: 17,
            values: vec![],
        }),
        database: DatabaseConfig {
            url: file_url(&temp_dir),
            table: "plant_slave".to_string(),
        },
        ..Default::default()
    };

    let context = SlaveContext::from_config(&config).await.unwrap();

    let coils = context
        .block(StorageClass::Coil)
        .as_any()
        .downcast_ref::<SqliteBlock>()
        .unwrap();
    let holding = context
        .block(StorageClass::HoldingRegister)
        .as_any()
        .downcast_ref::<SqliteBlock>()
        .unwrap();
    assert!(Arc::ptr_eq(coils.store(), holding.store()));
    assert_eq!(coils.store().table(), "plant_slave");

    assert_eq!(
        context
            .read(StorageClass::InputRegister, 0, 2)
            .await
            .unwrap(),
        vec![17, 17]
    );
    // Unconfigured class falls back to a full-range block
    assert!(context
        .validate(StorageClass::DiscreteInput, u16::MAX, 1)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_from_config_rejects_bad_table_name() {
    let config = SlaveConfig {
        coils: Some(BlockConfig::Sqlite),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            table: "slave;--".to_string(),
        },
        ..Default::default()
    };

    let result = SlaveContext::from_config(&config).await;
    assert!(matches!(result, Err(DataStoreError::Config(_))));
}
