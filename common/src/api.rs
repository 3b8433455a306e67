//! バックエンドAPIの契約
//!
//! CLI（reqwest）とWeb（`web_sys::Request` + `JsFuture` の fetch）がそれぞれ実装する。
//! 応答は上流の形のまま `serde_json::Value` で返し、正規化はこのクレート側で行う。

use crate::error::Result;
use crate::types::{Inspection, ThermalImage, Transformer};
use serde_json::Value;

/// メンテナンス記録ストア
#[allow(async_fn_in_trait)]
pub trait MaintenanceRecordApi {
    /// 変圧器+点検で絞った記録一覧（古い順）
    async fn records_for_transformer_inspection(
        &self,
        transformer_id: &str,
        inspection_id: &str,
    ) -> Result<Value>;

    /// 点検で絞った記録（一覧または単体）
    async fn records_for_inspection(&self, inspection_id: &str) -> Result<Value>;
}

/// 画像ストア
#[allow(async_fn_in_trait)]
pub trait ImageApi {
    async fn baseline_image(&self, transformer_id: &str) -> Result<Option<ThermalImage>>;

    async fn maintenance_images(
        &self,
        transformer_id: &str,
        inspection_id: &str,
    ) -> Result<Vec<ThermalImage>>;
}

/// ユーザー注釈ストア
#[allow(async_fn_in_trait)]
pub trait AnnotationApi {
    /// 画像の注釈。未登録なら `None`
    async fn annotations(&self, image_id: &str) -> Result<Option<Value>>;
}

/// 変圧器・点検のメタデータ
#[allow(async_fn_in_trait)]
pub trait InspectionApi {
    async fn transformer(&self, transformer_id: &str) -> Result<Option<Transformer>>;

    async fn inspection(&self, inspection_id: &str) -> Result<Option<Inspection>>;
}
