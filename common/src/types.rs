//! 点検コンソールの型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - Anomaly: 検出/注釈された異常領域
//! - ImageDimensions: 表示中の熱画像サイズ
//! - Transformer / Inspection / ThermalImage: REST APIの応答

use crate::normalize::{deserialize_opt_id, first_id, first_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 元画像（原寸）座標系のバウンディングボックス
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 異常領域（検出器の出力またはユーザー注釈）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// 0.0〜1.0。ちょうど1はユーザー注釈の印
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,

    #[serde(default)]
    pub is_deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_reason: Option<String>,
}

/// 異常の出所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalySource {
    UserAnnotated,
    AiDetected,
}

impl AnomalySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySource::UserAnnotated => "User annotated",
            AnomalySource::AiDetected => "AI detected",
        }
    }
}

impl std::fmt::Display for AnomalySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl Anomaly {
    /// 表示名: label → type → category → "-"
    pub fn display_name(&self) -> &str {
        non_empty(&self.label)
            .or_else(|| non_empty(&self.kind))
            .or_else(|| non_empty(&self.category))
            .unwrap_or("-")
    }

    /// severityが "faulty" で始まる（大文字小文字無視）なら高重大度
    pub fn is_faulty(&self) -> bool {
        self.severity
            .as_deref()
            .map(|s| s.to_lowercase().starts_with("faulty"))
            .unwrap_or(false)
    }

    pub fn source(&self) -> AnomalySource {
        match self.confidence {
            Some(c) if c == 1.0 => AnomalySource::UserAnnotated,
            _ => AnomalySource::AiDetected,
        }
    }

    /// 表の「Severity / Confidence」列
    pub fn severity_summary(&self) -> String {
        let severity = non_empty(&self.severity)
            .map(|s| format!("{} / ", s))
            .unwrap_or_default();
        let confidence = self
            .confidence
            .map(|c| format!("{:.2}", c))
            .unwrap_or_default();
        format!("{}{}", severity, confidence)
    }

    /// 表の「Location」列（原寸座標を丸めて表示）
    pub fn location_summary(&self) -> String {
        match &self.bbox {
            Some(b) => format!(
                "{}, {}, {}, {}",
                b.x.round(),
                b.y.round(),
                b.width.round(),
                b.height.round()
            ),
            None => "-".to_string(),
        }
    }

    /// 表の「Details」列
    pub fn details_summary(&self) -> &str {
        non_empty(&self.details)
            .or_else(|| non_empty(&self.comment))
            .or_else(|| non_empty(&self.edit_reason))
            .unwrap_or("")
    }
}

/// 表示中の熱画像サイズ
///
/// 4値すべてが正の有限値になるまでオーバーレイは描画しない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDimensions {
    pub natural_width: f64,
    pub natural_height: f64,
    pub rendered_width: f64,
    pub rendered_height: f64,
}

impl ImageDimensions {
    pub fn new(natural_width: f64, natural_height: f64, rendered_width: f64, rendered_height: f64) -> Self {
        Self {
            natural_width,
            natural_height,
            rendered_width,
            rendered_height,
        }
    }

    /// 原寸と表示幅から、縦横比を保った表示サイズを求める（`width: 100%; height: auto` 相当）
    pub fn fit_width(natural_width: f64, natural_height: f64, rendered_width: f64) -> Self {
        let rendered_height = if natural_width > 0.0 {
            natural_height * rendered_width / natural_width
        } else {
            0.0
        };
        Self::new(natural_width, natural_height, rendered_width, rendered_height)
    }

    pub fn is_ready(&self) -> bool {
        [
            self.natural_width,
            self.natural_height,
            self.rendered_width,
            self.rendered_height,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }

    /// (sx, sy)。未ロード時は `None`
    pub fn scale(&self) -> Option<(f64, f64)> {
        if !self.is_ready() {
            return None;
        }
        Some((
            self.rendered_width / self.natural_width,
            self.rendered_height / self.natural_height,
        ))
    }
}

/// 変圧器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transformer {
    #[serde(deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    pub transformer_no: Option<String>,
    pub pole_no: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "capacityKVA")]
    pub capacity_kva: Option<f64>,
    pub location_details: Option<String>,
}

/// 点検
///
/// IDは `id` / `inspectionID` / `inspectionId` のいずれでも届くため、
/// serdeの別名ではなく `from_value` で正規化する。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Option<String>,
    pub inspection_number: Option<String>,
    pub inspected_date: Option<String>,
    pub inspection_time: Option<String>,
    pub branch: Option<String>,
    pub status: Option<String>,
}

impl Inspection {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: first_id(value, &["id", "inspectionID", "inspectionId"]),
            inspection_number: first_text(value, &["inspectionNumber"]),
            inspected_date: first_text(value, &["inspectedDate", "inspectionDate"]),
            inspection_time: first_text(value, &["inspectionTime"]),
            branch: first_text(value, &["branch"]),
            status: first_text(value, &["status"]),
        }
    }

    /// 表示用の点検番号（番号がなければID）
    pub fn display_number(&self) -> Option<&str> {
        self.inspection_number.as_deref().or(self.id.as_deref())
    }
}

/// 熱画像（ベースライン/メンテナンス）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThermalImage {
    #[serde(deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    pub url: Option<String>,
    pub weather_condition: Option<String>,
    pub image_type: Option<String>,
    /// サーバー側解析結果（JSON文字列または構造化済み）
    pub analysis: Option<Value>,
}

impl ThermalImage {
    /// APIベースURLを前置した絶対URL
    pub fn absolute_url(&self, base_url: &str) -> Option<String> {
        let url = self.url.as_deref().filter(|u| !u.is_empty())?;
        if url.starts_with("http://") || url.starts_with("https://") {
            Some(url.to_string())
        } else {
            Some(format!("{}{}", base_url.trim_end_matches('/'), url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anomaly_deserialize_camel_case() {
        let json = r#"{
            "label": "Loose joint",
            "bbox": {"x": 10, "y": 20.5, "width": 30, "height": 40},
            "severity": "Faulty",
            "confidence": 0.87,
            "offsetX": 5,
            "isDeleted": false
        }"#;

        let anomaly: Anomaly = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(anomaly.label.as_deref(), Some("Loose joint"));
        assert_eq!(anomaly.bbox.unwrap().y, 20.5);
        assert_eq!(anomaly.offset_x, Some(5.0));
        assert_eq!(anomaly.offset_y, None);
        assert!(!anomaly.is_deleted);
    }

    #[test]
    fn test_anomaly_display_name_fallbacks() {
        let a = Anomaly { kind: Some("hotspot".into()), category: Some("Point".into()), ..Default::default() };
        assert_eq!(a.display_name(), "hotspot");

        let b = Anomaly { label: Some("".into()), category: Some("Point".into()), ..Default::default() };
        assert_eq!(b.display_name(), "Point");

        assert_eq!(Anomaly::default().display_name(), "-");
    }

    #[test]
    fn test_anomaly_is_faulty_case_insensitive() {
        let a = Anomaly { severity: Some("FAULTY - urgent".into()), ..Default::default() };
        let b = Anomaly { severity: Some("Potentially Faulty".into()), ..Default::default() };
        assert!(a.is_faulty());
        assert!(!b.is_faulty());
        assert!(!Anomaly::default().is_faulty());
    }

    #[test]
    fn test_anomaly_source_sentinel() {
        let user = Anomaly { confidence: Some(1.0), ..Default::default() };
        let ai = Anomaly { confidence: Some(0.99), ..Default::default() };
        assert_eq!(user.source(), AnomalySource::UserAnnotated);
        assert_eq!(ai.source(), AnomalySource::AiDetected);
        assert_eq!(Anomaly::default().source(), AnomalySource::AiDetected);
    }

    #[test]
    fn test_anomaly_summaries() {
        let a = Anomaly {
            severity: Some("Faulty".into()),
            confidence: Some(0.8),
            bbox: Some(BoundingBox { x: 10.4, y: 20.6, width: 30.0, height: 40.0 }),
            comment: Some("checked".into()),
            ..Default::default()
        };
        assert_eq!(a.severity_summary(), "Faulty / 0.80");
        assert_eq!(a.location_summary(), "10, 21, 30, 40");
        assert_eq!(a.details_summary(), "checked");
    }

    #[test]
    fn test_image_dimensions_ready() {
        assert!(ImageDimensions::new(640.0, 480.0, 320.0, 240.0).is_ready());
        assert!(!ImageDimensions::new(640.0, 480.0, 0.0, 240.0).is_ready());
        assert!(!ImageDimensions::new(640.0, 480.0, f64::NAN, 240.0).is_ready());
        assert!(!ImageDimensions::default().is_ready());
    }

    #[test]
    fn test_image_dimensions_fit_width() {
        let dims = ImageDimensions::fit_width(1000.0, 500.0, 700.0);
        assert_eq!(dims.rendered_height, 350.0);
        assert_eq!(dims.scale(), Some((0.7, 0.7)));

        let unloaded = ImageDimensions::fit_width(0.0, 0.0, 700.0);
        assert_eq!(unloaded.scale(), None);
    }

    #[test]
    fn test_transformer_numeric_id() {
        let t: Transformer = serde_json::from_value(json!({
            "id": 7,
            "transformerNo": "AZ-8890",
            "capacityKVA": 100.0,
            "type": "Distribution"
        }))
        .expect("デシリアライズ失敗");
        assert_eq!(t.id.as_deref(), Some("7"));
        assert_eq!(t.kind.as_deref(), Some("Distribution"));
        assert_eq!(t.capacity_kva, Some(100.0));
    }

    #[test]
    fn test_inspection_aliases() {
        let i = Inspection::from_value(&json!({"inspectionId": 12, "inspectionDate": "2025-10-01"}));
        assert_eq!(i.id.as_deref(), Some("12"));
        assert_eq!(i.inspected_date.as_deref(), Some("2025-10-01"));
        assert_eq!(i.display_number(), Some("12"));
    }

    #[test]
    fn test_thermal_image_absolute_url() {
        let img = ThermalImage { url: Some("/api/files/1.png".into()), ..Default::default() };
        assert_eq!(
            img.absolute_url("http://localhost:8080/").as_deref(),
            Some("http://localhost:8080/api/files/1.png")
        );
        assert_eq!(ThermalImage::default().absolute_url("http://x"), None);
    }
}
