//! 認証トークンの保持
//!
//! ログイン応答のトークンを `localStorage` に置き、API呼び出しに付ける。

use crate::storage::{read_setting, write_setting};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "actorName";
const ROLE_KEY: &str = "actorRole";
const API_URL_KEY: &str = "apiBaseUrl";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl Session {
    pub fn load() -> Self {
        Self {
            token: read_setting(TOKEN_KEY),
            username: read_setting(USER_KEY),
            role: read_setting(ROLE_KEY),
        }
    }

    pub fn store(&self) {
        write_setting(TOKEN_KEY, self.token.as_deref());
        write_setting(USER_KEY, self.username.as_deref());
        write_setting(ROLE_KEY, self.role.as_deref());
    }

    pub fn clear() {
        Session::default().store();
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }
}

pub fn api_base_url() -> String {
    read_setting(API_URL_KEY).unwrap_or_else(|| DEFAULT_API_URL.to_string())
}
