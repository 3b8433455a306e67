use crate::error::{ConsoleError, Result};
use flarenet_common::OverlayOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "FLARENET_API_URL";
pub const TOKEN_ENV: &str = "FLARENET_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
    /// ローカル記録ストア（`maintenanceRecord_*` キーのJSONファイル）
    pub store_path: Option<PathBuf>,
    pub overlay_offset: OverlayOffset,
    pub draft_debounce_ms: u64,
    /// オーバーレイ計算に使う表示幅（px）
    pub render_width: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            token: None,
            username: None,
            role: None,
            store_path: None,
            overlay_offset: OverlayOffset::DEFAULT,
            draft_debounce_ms: flarenet_common::DRAFT_DEBOUNCE_MS,
            render_width: 700,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ConsoleError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("flarenet"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 環境変数で上書き（ファイルより優先）
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.token = Some(token.trim().to_string());
            }
        }
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("store.json")),
        }
    }

    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(ConsoleError::MissingToken)
    }

    pub fn set_session(&mut self, token: String, username: Option<String>, role: Option<String>) {
        self.token = Some(token);
        self.username = username;
        self.role = role;
    }

    pub fn clear_session(&mut self) {
        self.token = None;
        self.username = None;
        self.role = None;
    }
}
