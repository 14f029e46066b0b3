#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex, time::Duration};

use agent_ledger::{
    core::{services::PricingService, FixedClock, Session},
    domain::Role,
    storage::{CsvBackend, LedgerStore, MemoryBackend, RetryPolicy, SheetStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// CSV-backed store in its own directory, schemas ensured and defaults seeded.
pub fn csv_store() -> (SheetStore<CsvBackend>, PathBuf) {
    let dir = temp_dir().join("sheets");
    let backend = CsvBackend::open(dir.clone()).expect("open csv backend");
    let store = SheetStore::new(backend, Duration::from_secs(300), RetryPolicy::immediate(2));
    store.ensure_all().expect("ensure sheets");
    PricingService::seed_defaults(&store).expect("seed defaults");
    (store, dir)
}

/// In-memory store with schemas ensured and defaults seeded.
pub fn memory_store() -> SheetStore<MemoryBackend> {
    let store = SheetStore::new(
        MemoryBackend::new(),
        Duration::from_secs(300),
        RetryPolicy::immediate(2),
    );
    store.ensure_all().expect("ensure sheets");
    PricingService::seed_defaults(&store).expect("seed defaults");
    store
}

/// 10:00 on 2024-05-01 in the outlet's zone.
pub fn clock() -> FixedClock {
    FixedClock::at("2024-05-01T10:00:00+01:00").expect("valid instant")
}

pub fn admin() -> Session {
    Session::new("admin", "ADMIN", Role::Admin)
}

pub fn attendant() -> Session {
    Session::new("attendant", "SALES", Role::Attendant)
}
