#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use couple_budget::{
    core::{ExpenseBook, GuestBook},
    storage::json_backend::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Books backed by a fresh local store in its own directory.
pub fn setup_books() -> (ExpenseBook, GuestBook, JsonStorage) {
    let storage = JsonStorage::new(temp_base().join("data")).expect("create json storage");
    let expenses = ExpenseBook::new(Box::new(storage.clone()), Box::new(storage.clone()));
    let guests = GuestBook::new(Box::new(storage.clone()));
    (expenses, guests, storage)
}

/// Base directory whose config selects the local JSON backend.
pub fn json_cli_home() -> PathBuf {
    let base = temp_base();
    std::fs::write(base.join("config.json"), r#"{ "backend": "json" }"#)
        .expect("write config");
    base
}
