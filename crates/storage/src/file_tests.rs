// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_file_is_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let file = StateFile::new(dir.path().join("state.json"));
    assert_eq!(file.load().unwrap(), StoredState::default());
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let file = StateFile::new(dir.path().join("nested").join("state.json"));

    let state = StoredState {
        last_checked_version: Some("1.4.0".to_string()),
        ..StoredState::default()
    };
    file.save(&state).unwrap();

    assert_eq!(file.load().unwrap(), state);
    assert!(!dir.path().join("nested").join("state.json.tmp").exists());
}

#[test]
fn corrupt_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = StateFile::new(&path).load().unwrap_err();
    assert!(matches!(err, StorageError::Json { .. }));
    assert!(err.to_string().contains("state.json"));
}
