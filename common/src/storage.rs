//! キーバリューストア抽象
//!
//! ブラウザの `localStorage`、CLIのJSONファイル、テスト用メモリの3実装を
//! 同じキー命名で扱う。既存の保存データと互換を保つため、キー名は変更しないこと。

use crate::error::Result;
use crate::record::{MaintenanceRecord, RecordIdentity};
use std::collections::BTreeMap;

pub const RECORD_KEY_PREFIX: &str = "maintenanceRecord_";
/// 編集中フォームの下書き
pub const DRAFT_KEY: &str = "maintenanceRecord_draft";
/// 最後に保存した記録
pub const LATEST_KEY: &str = "maintenanceRecord_latest";
/// IDが何もないときの保存先
pub const GLOBAL_KEY: &str = "maintenanceRecord_global";

/// 点検IDで引くキー（記録解決のローカルフォールバック）
pub fn inspection_key(inspection_id: &str) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, inspection_id)
}

/// 保存時のキー: 変圧器ID → 点検ID → global の順
pub fn identity_key(identity: &RecordIdentity) -> String {
    match identity
        .transformer_id
        .as_deref()
        .or(identity.inspection_id.as_deref())
    {
        Some(id) => format!("{}{}", RECORD_KEY_PREFIX, id),
        None => GLOBAL_KEY.to_string(),
    }
}

/// 文字列キー・文字列値の永続ストア
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// メモリ上のストア（テスト・一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 記録を読む。読み込み失敗・パース失敗は「なし」として扱う
pub fn read_record<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<MaintenanceRecord> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, "local store read failed: {e}");
            return None;
        }
    };

    let record = MaintenanceRecord::from_json_str(&raw);
    if record.is_none() {
        tracing::warn!(key, "stored maintenance record is not valid JSON, ignoring");
    }
    record
}

/// 記録をJSONで書く
pub fn write_record<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    record: &MaintenanceRecord,
) -> Result<()> {
    let json = serde_json::to_string(record)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_precedence() {
        let both = RecordIdentity::new(Some("7"), Some("12"));
        assert_eq!(identity_key(&both), "maintenanceRecord_7");

        let inspection_only = RecordIdentity::new(None, Some("12"));
        assert_eq!(identity_key(&inspection_only), "maintenanceRecord_12");

        assert_eq!(identity_key(&RecordIdentity::default()), "maintenanceRecord_global");
    }

    #[test]
    fn test_inspection_key() {
        assert_eq!(inspection_key("12"), "maintenanceRecord_12");
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_record_ignores_corrupt_value() {
        let mut store = MemoryStore::new();
        store.set(DRAFT_KEY, "{ invalid json }").unwrap();
        assert!(read_record(&store, DRAFT_KEY).is_none());
    }

    #[test]
    fn test_write_then_read_record() {
        let mut store = MemoryStore::new();
        let mut record = MaintenanceRecord::default();
        record.inspector.name = "Nimal".into();

        write_record(&mut store, LATEST_KEY, &record).unwrap();
        let loaded = read_record(&store, LATEST_KEY).expect("保存したはず");
        assert_eq!(loaded.inspector.name, "Nimal");
    }

    #[test]
    fn test_store_through_mut_reference() {
        let mut store = MemoryStore::new();
        {
            let mut borrowed = &mut store;
            KeyValueStore::set(&mut borrowed, "k", "v").unwrap();
        }
        assert!(store.contains("k"));
    }
}
