//! ローカル記録ストア
//!
//! ブラウザの `localStorage` に相当するJSONファイル。
//! キーは `maintenanceRecord_*` をそのまま使い、値は記録のJSON文字列。
//! 書き込みのたびにファイルへ反映する。

use flarenet_common::{KeyValueStore, Result as CommonResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    entries: BTreeMap<String, String>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: JsonFileStore::CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// JSONファイルに永続化するキーバリューストア
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    file: StoreFile,
}

impl JsonFileStore {
    const CURRENT_VERSION: u32 = 1;

    /// ストアを開く。ファイルがない・読めない場合は空で始める
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file: Self::read_file(path),
        }
    }

    fn read_file(path: &Path) -> StoreFile {
        if !path.exists() {
            return StoreFile::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), "store file could not be opened: {e}");
                return StoreFile::default();
            }
        };

        match serde_json::from_reader::<_, StoreFile>(BufReader::new(file)) {
            Ok(store) if store.version == Self::CURRENT_VERSION => store,
            Ok(store) => {
                tracing::warn!(version = store.version, "store version mismatch, starting empty");
                StoreFile::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "store file is corrupt, starting empty: {e}");
                StoreFile::default()
            }
        }
    }

    fn persist(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &self.file)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.file.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    /// ファイルごと削除
    pub fn clear(&mut self) -> std::io::Result<bool> {
        self.file = StoreFile::default();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn storage_error(e: std::io::Error) -> flarenet_common::Error {
    flarenet_common::Error::Storage(e.to_string())
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> CommonResult<Option<String>> {
        Ok(self.file.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CommonResult<()> {
        self.file.entries.insert(key.to_string(), value.to_string());
        self.persist().map_err(storage_error)
    }

    fn remove(&mut self, key: &str) -> CommonResult<()> {
        if self.file.entries.remove(key).is_some() {
            self.persist().map_err(storage_error)?;
        }
        Ok(())
    }
}
