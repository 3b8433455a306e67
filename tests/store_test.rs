//! ローカル記録ストアのテスト
//!
//! JSONファイルへの永続化と、下書き自動保存との組み合わせを検証

use flarenet_common::storage::{read_record, DRAFT_KEY, LATEST_KEY};
use flarenet_common::{DraftAutosave, Field, KeyValueStore, RecordIdentity, Section};
use flarenet_console::store::JsonFileStore;
use tempfile::tempdir;

/// 存在しないファイルは空のストア
#[test]
fn test_store_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = JsonFileStore::open(&dir.path().join("store.json"));

    assert_eq!(store.len(), 0);
    assert!(store.is_empty());
}

/// 書き込みは即座にファイルへ反映される
#[test]
fn test_store_persists_each_write() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("store.json");

    let mut store = JsonFileStore::open(&path);
    store.set("maintenanceRecord_42", r#"{"inspector":{"name":"A"}}"#).unwrap();

    let reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.len(), 1);
    assert_eq!(read_record(&reopened, "maintenanceRecord_42").unwrap().inspector.name, "A");
}

/// 削除
#[test]
fn test_store_remove() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("store.json");

    let mut store = JsonFileStore::open(&path);
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    store.remove("a").unwrap();
    store.remove("missing").unwrap();

    let reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.keys().collect::<Vec<_>>(), vec!["b"]);
}

/// 壊れたファイルは空として扱う
#[test]
fn test_store_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::open(&path);
    assert!(store.is_empty());
}

/// ストア削除
#[test]
fn test_store_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("store.json");

    let mut store = JsonFileStore::open(&path);
    store.set("a", "1").unwrap();
    assert!(store.clear().unwrap());
    assert!(!path.exists());
    assert!(!store.clear().unwrap());
}

/// 編集 → 待機 → 保存 の一連の流れがファイルに残る
#[test]
fn test_draft_lifecycle_on_disk() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("store.json");
    let identity = RecordIdentity::new(Some("7"), Some("99"));

    {
        let mut form = DraftAutosave::open(JsonFileStore::open(&path), &identity, None);
        form.set_field(0, Section::Inspector, Field::Voltage, "230");
        assert!(form.poll(700).unwrap());
    }
    let draft = read_record(&JsonFileStore::open(&path), DRAFT_KEY).expect("下書きがない");
    assert_eq!(draft.inspector.voltage, "230");

    {
        let mut form = DraftAutosave::open(JsonFileStore::open(&path), &identity, None);
        assert_eq!(form.form().inspector.voltage, "230");
        form.save("2026-03-01T10:00:00+05:30").unwrap();
    }

    let store = JsonFileStore::open(&path);
    assert!(store.get(DRAFT_KEY).unwrap().is_none());
    assert_eq!(read_record(&store, "maintenanceRecord_7").unwrap().inspector.voltage, "230");
    assert!(read_record(&store, LATEST_KEY).is_some());
}

/// 閉じる直前の編集もファイルに残る
#[test]
fn test_close_before_debounce_on_disk() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("store.json");

    {
        let mut form = DraftAutosave::open(JsonFileStore::open(&path), &RecordIdentity::default(), None);
        form.set_field(0, Section::Reinspection, Field::Name, "Nimal");
    }

    let draft = read_record(&JsonFileStore::open(&path), DRAFT_KEY).unwrap();
    assert_eq!(draft.reinspection.name, "Nimal");
}
