//! FlareNet REST APIクライアント
//!
//! ベースURL + `/api` 配下のエンドポイントを叩く。認証はBearerトークン。
//! リトライはしない（失敗は呼び出し側のフォールバックに任せる）。

use crate::error::{ConsoleError, Result};
use flarenet_common::normalize::first_text;
use flarenet_common::{
    AnnotationApi, ImageApi, Inspection, InspectionApi, MaintenanceRecord, MaintenanceRecordApi,
    ThermalImage, Transformer,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// ログイン応答
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("flarenet-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConsoleError::Api(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        self.get_optional(path)
            .await?
            .ok_or_else(|| ConsoleError::ApiStatus {
                status: StatusCode::NOT_FOUND.as_u16(),
                url: self.endpoint(path),
            })
    }

    /// 404 は `None`
    async fn get_optional(&self, path: &str) -> Result<Option<Value>> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");

        let response = self.authorized(self.http.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    pub async fn transformers(&self) -> Result<Vec<Transformer>> {
        let value = self.get_json("/transformers").await?;
        Ok(list_of(value)
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    pub async fn inspections_for(&self, transformer_id: &str) -> Result<Vec<Inspection>> {
        let value = self
            .get_json(&format!("/inspections/transformer/{}", transformer_id))
            .await?;
        Ok(list_of(value).iter().map(Inspection::from_value).collect())
    }

    /// 記録をサーバーに保存（本文は記録JSONそのもの）
    pub async fn save_record(&self, record: &MaintenanceRecord) -> Result<Value> {
        let inspection_id = record
            .inspection_id
            .as_deref()
            .ok_or_else(|| ConsoleError::Api("点検IDのない記録はサーバーに保存できません".into()))?;

        let url = self.endpoint(&format!("/inspections/{}/maintenance-records", inspection_id));
        let mut request = self.authorized(self.http.post(&url)).json(record);
        if let Some(transformer_id) = record.transformer_id.as_deref() {
            request = request.query(&[("transformerId", transformer_id)]);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let url = self.endpoint("/auth/login");
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?
            .error_for_status()?;
        let body: Value = response.json().await?;

        let token = first_text(&body, &["token", "accessToken", "jwt"])
            .ok_or_else(|| ConsoleError::Api("ログイン応答にトークンがありません".into()))?;
        Ok(Session {
            token,
            username: first_text(&body, &["username"]).or_else(|| Some(username.to_string())),
            role: first_text(&body, &["role"]),
        })
    }

    /// 画像などのバイナリ取得（絶対URL）
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.authorized(self.http.get(url)).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// 一覧応答を配列に揃える（単体なら1件の配列）
fn list_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn image_of(value: Value) -> Option<ThermalImage> {
    serde_json::from_value(value)
        .map_err(|e| tracing::warn!("unexpected image payload: {e}"))
        .ok()
}

impl MaintenanceRecordApi for RestClient {
    async fn records_for_transformer_inspection(
        &self,
        transformer_id: &str,
        inspection_id: &str,
    ) -> flarenet_common::Result<Value> {
        let path = format!(
            "/transformers/{}/inspections/{}/maintenance-records",
            transformer_id, inspection_id
        );
        Ok(self.get_optional(&path).await?.unwrap_or(Value::Array(Vec::new())))
    }

    async fn records_for_inspection(&self, inspection_id: &str) -> flarenet_common::Result<Value> {
        let path = format!("/inspections/{}/maintenance-records", inspection_id);
        Ok(self.get_optional(&path).await?.unwrap_or(Value::Array(Vec::new())))
    }
}

impl ImageApi for RestClient {
    async fn baseline_image(&self, transformer_id: &str) -> flarenet_common::Result<Option<ThermalImage>> {
        let path = format!("/transformers/{}/images/baseline", transformer_id);
        let value = self.get_optional(&path).await?;
        Ok(value.and_then(|v| list_of(v).into_iter().next()).and_then(image_of))
    }

    async fn maintenance_images(
        &self,
        transformer_id: &str,
        inspection_id: &str,
    ) -> flarenet_common::Result<Vec<ThermalImage>> {
        let path = format!(
            "/transformers/{}/images/inspection/{}/maintenance",
            transformer_id, inspection_id
        );
        let value = self.get_optional(&path).await?.unwrap_or(Value::Null);
        Ok(list_of(value).into_iter().filter_map(image_of).collect())
    }
}

impl AnnotationApi for RestClient {
    async fn annotations(&self, image_id: &str) -> flarenet_common::Result<Option<Value>> {
        Ok(self.get_optional(&format!("/annotations/image/{}", image_id)).await?)
    }
}

impl InspectionApi for RestClient {
    async fn transformer(&self, transformer_id: &str) -> flarenet_common::Result<Option<Transformer>> {
        let value = self.get_optional(&format!("/transformers/{}", transformer_id)).await?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    async fn inspection(&self, inspection_id: &str) -> flarenet_common::Result<Option<Inspection>> {
        let value = self.get_optional(&format!("/inspections/{}", inspection_id)).await?;
        Ok(value.as_ref().map(Inspection::from_value))
    }
}
