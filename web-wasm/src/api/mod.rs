//! FlareNet REST APIクライアント（ブラウザ fetch）

use flarenet_common::normalize::first_text;
use flarenet_common::{
    AnnotationApi, Error, ImageApi, Inspection, InspectionApi, MaintenanceRecord, MaintenanceRecordApi,
    Result, ThermalImage, Transformer,
};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::auth::Session;

fn js_error(e: JsValue) -> Error {
    Error::Remote(format!("{:?}", e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebClient {
    base_url: String,
    token: Option<String>,
}

impl WebClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// fetch呼び出し（共通処理）。404は `None`
    async fn send(&self, method: &str, url: &str, body: Option<String>) -> Result<Option<String>> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
        if body.is_some() {
            request.headers().set("Content-Type", "application/json").map_err(js_error)?;
        }
        if let Some(token) = &self.token {
            request
                .headers()
                .set("Authorization", &format!("Bearer {}", token))
                .map_err(js_error)?;
        }

        let window = web_sys::window().ok_or_else(|| Error::Remote("window is not available".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let resp: Response = resp_value.dyn_into().map_err(js_error)?;

        if resp.status() == 404 {
            return Ok(None);
        }
        if !resp.ok() {
            return Err(Error::Remote(format!("API error {}: {}", resp.status(), url)));
        }

        let text = JsFuture::from(resp.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .unwrap_or_default();
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }

    async fn get_optional(&self, path: &str) -> Result<Option<Value>> {
        match self.send("GET", &self.endpoint(path), None).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// 記録をサーバーに保存
    pub async fn save_record(&self, record: &MaintenanceRecord) -> Result<()> {
        let inspection_id = record
            .inspection_id
            .as_deref()
            .ok_or_else(|| Error::Remote("record has no inspection id".into()))?;

        let mut url = self.endpoint(&format!("/inspections/{}/maintenance-records", inspection_id));
        if let Some(transformer_id) = record.transformer_id.as_deref() {
            let encoded = js_sys::encode_uri_component(transformer_id);
            url.push_str(&format!("?transformerId={}", String::from(encoded)));
        }

        let body = serde_json::to_string(record)?;
        self.send("POST", &url, Some(body)).await?;
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let body = serde_json::json!({ "username": username, "password": password }).to_string();
        let text = self
            .send("POST", &self.endpoint("/auth/login"), Some(body))
            .await?
            .ok_or_else(|| Error::Remote("empty login response".into()))?;
        let value: Value = serde_json::from_str(&text)?;
        session_from_login(&value, username)
    }
}

/// ログイン応答からセッションを作る。ユーザー名が無ければ入力値を使う
fn session_from_login(value: &Value, username: &str) -> Result<Session> {
    let token = first_text(value, &["token", "accessToken", "jwt"])
        .ok_or_else(|| Error::Remote("login response has no token".into()))?;
    Ok(Session {
        token: Some(token),
        username: first_text(value, &["username"]).or_else(|| Some(username.to_string())),
        role: first_text(value, &["role"]),
    })
}

fn list_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn image_of(value: Value) -> Option<ThermalImage> {
    serde_json::from_value(value).ok()
}

impl MaintenanceRecordApi for WebClient {
    async fn records_for_transformer_inspection(&self, transformer_id: &str, inspection_id: &str) -> Result<Value> {
        let path = format!("/transformers/{}/inspections/{}/maintenance-records", transformer_id, inspection_id);
        Ok(self.get_optional(&path).await?.unwrap_or(Value::Array(Vec::new())))
    }

    async fn records_for_inspection(&self, inspection_id: &str) -> Result<Value> {
        let path = format!("/inspections/{}/maintenance-records", inspection_id);
        Ok(self.get_optional(&path).await?.unwrap_or(Value::Array(Vec::new())))
    }
}

impl ImageApi for WebClient {
    async fn baseline_image(&self, transformer_id: &str) -> Result<Option<ThermalImage>> {
        let value = self.get_optional(&format!("/transformers/{}/images/baseline", transformer_id)).await?;
        Ok(value.and_then(|v| list_of(v).into_iter().next()).and_then(image_of))
    }

    async fn maintenance_images(&self, transformer_id: &str, inspection_id: &str) -> Result<Vec<ThermalImage>> {
        let path = format!("/transformers/{}/images/inspection/{}/maintenance", transformer_id, inspection_id);
        let value = self.get_optional(&path).await?.unwrap_or(Value::Null);
        Ok(list_of(value).into_iter().filter_map(image_of).collect())
    }
}

impl AnnotationApi for WebClient {
    async fn annotations(&self, image_id: &str) -> Result<Option<Value>> {
        self.get_optional(&format!("/annotations/image/{}", image_id)).await
    }
}

impl InspectionApi for WebClient {
    async fn transformer(&self, transformer_id: &str) -> Result<Option<Transformer>> {
        let value = self.get_optional(&format!("/transformers/{}", transformer_id)).await?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    async fn inspection(&self, inspection_id: &str) -> Result<Option<Inspection>> {
        let value = self.get_optional(&format!("/inspections/{}", inspection_id)).await?;
        Ok(value.as_ref().map(Inspection::from_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_api_prefix() {
        let client = WebClient::new("http://localhost:8080/", None);
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.endpoint("/inspections/15/maintenance-records"),
            "http://localhost:8080/api/inspections/15/maintenance-records"
        );
    }

    #[test]
    fn test_list_of_accepts_single_and_null() {
        assert_eq!(list_of(json!([1, 2])).len(), 2);
        assert_eq!(list_of(json!({"id": 1})).len(), 1);
        assert!(list_of(Value::Null).is_empty());
    }

    #[test]
    fn test_session_from_login() {
        let session = session_from_login(&json!({"token": "abc", "role": "ENGINEER"}), "kamal").unwrap();
        assert_eq!(session.token.as_deref(), Some("abc"));
        assert_eq!(session.username.as_deref(), Some("kamal"));
        assert_eq!(session.role.as_deref(), Some("ENGINEER"));

        assert!(session_from_login(&json!({"username": "x"}), "x").is_err());
    }

    #[test]
    fn test_image_of_ignores_malformed_entries() {
        assert!(image_of(json!("not an image")).is_none());
        assert!(image_of(json!({"id": 7, "url": "/files/a.png"})).is_some());
    }
}
