//! `view` コマンド: 記録表示画面のターミナル版
//!
//! 異常表・オーバーレイ座標・メンテナンス記録（出どころつき）を表示する。

use crate::error::{ConsoleError, Result};
use flarenet_common::overlay::{map_overlays, OverlayBox, OverlayOffset};
use flarenet_common::record::{Field, Section};
use flarenet_common::{ImageDimensions, RecordView};
use serde::Serialize;
use std::fmt::Write as _;

/// 画像バイト列から原寸を読み、表示幅に合わせた寸法を作る
pub fn image_dimensions(bytes: &[u8], render_width: u32) -> Result<ImageDimensions> {
    let img = image::load_from_memory(bytes).map_err(|e| ConsoleError::Image(e.to_string()))?;
    Ok(ImageDimensions::fit_width(
        img.width() as f64,
        img.height() as f64,
        render_width as f64,
    ))
}

/// RFC 3339 の時刻はローカル時刻に直す。それ以外はそのまま
pub fn display_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// 寸法が分かっていればオーバーレイを計算する
pub fn overlays_for(view: &RecordView, dims: Option<&ImageDimensions>, offset: OverlayOffset) -> Vec<OverlayBox> {
    match dims {
        Some(dims) => map_overlays(&view.anomalies, dims, offset),
        None => Vec::new(),
    }
}

/// `--json` 出力
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewJson<'a> {
    pub transformer_id: Option<&'a str>,
    pub inspection_id: Option<&'a str>,
    pub transformer: Option<&'a flarenet_common::Transformer>,
    pub inspection: Option<&'a flarenet_common::Inspection>,
    pub anomalies: &'a [flarenet_common::Anomaly],
    pub image_dimensions: Option<&'a ImageDimensions>,
    pub overlays: &'a [OverlayBox],
    pub record: Option<&'a flarenet_common::MaintenanceRecord>,
    pub record_source: Option<String>,
}

pub fn to_json(view: &RecordView, dims: Option<&ImageDimensions>, overlays: &[OverlayBox]) -> Result<String> {
    let json = RecordViewJson {
        transformer_id: view.identity.transformer_id.as_deref(),
        inspection_id: view.identity.inspection_id.as_deref(),
        transformer: view.transformer.as_ref(),
        inspection: view.inspection.as_ref(),
        anomalies: &view.anomalies,
        image_dimensions: dims,
        overlays,
        record: view.record.as_ref().map(|r| &r.record),
        record_source: view.record.as_ref().map(|r| r.provenance.to_string()),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// 人が読む形式
pub fn render_text(view: &RecordView, overlays: &[OverlayBox]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📋 Inspection {}", view.inspection_label().unwrap_or("-"));
    if let Some(t) = &view.transformer {
        let _ = writeln!(
            out,
            "  Transformer: {}  Pole: {}  Region: {}",
            t.transformer_no.as_deref().unwrap_or("-"),
            t.pole_no.as_deref().unwrap_or("-"),
            t.region.as_deref().unwrap_or("-"),
        );
    }
    if let Some(i) = &view.inspection {
        let _ = writeln!(
            out,
            "  Inspected: {} {}  Branch: {}",
            i.inspected_date.as_deref().unwrap_or("-"),
            i.inspection_time.as_deref().unwrap_or(""),
            i.branch.as_deref().unwrap_or("-"),
        );
    }
    let _ = writeln!(
        out,
        "  Baseline image: {}  Thermal image: {}",
        if view.baseline.is_some() { "yes" } else { "none" },
        if view.thermal.is_some() { "yes" } else { "none" },
    );

    let _ = writeln!(out, "\nAnomalies");
    let visible: Vec<_> = view.visible_anomalies().collect();
    if visible.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, a) in visible.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{:<3} {:<24} {:<18} [{}] {} {}",
            i + 1,
            a.display_name(),
            a.severity_summary(),
            a.location_summary(),
            a.source(),
            a.details_summary(),
        );
    }

    if !overlays.is_empty() {
        let _ = writeln!(out, "\nOverlay (px)");
        for b in overlays {
            let _ = writeln!(
                out,
                "  {:<12} left={:.1} top={:.1} width={:.1} height={:.1} color={}",
                b.label,
                b.rect.left,
                b.rect.top,
                b.rect.width,
                b.rect.height,
                b.tone.border_color(),
            );
        }
    }

    let _ = writeln!(out, "\nMaintenance record");
    match &view.record {
        None => {
            let _ = writeln!(out, "  No maintenance record for this inspection");
        }
        Some(resolved) => {
            let _ = writeln!(out, "  Source: {}", resolved.provenance.describe());
            if !resolved.record.timestamp.is_empty() {
                let _ = writeln!(out, "  Saved: {}", display_timestamp(&resolved.record.timestamp));
            }
            for section in Section::ALL {
                let data = resolved.record.section(section);
                if !data.has_content() {
                    continue;
                }
                let _ = writeln!(out, "  [{}]", section.label());
                for field in Field::ALL {
                    let mut value = data.get(field);
                    if field == Field::Timestamp {
                        value = display_timestamp(&value);
                    }
                    if !value.is_empty() {
                        let _ = writeln!(out, "    {:<20} {}", field.label(), value);
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flarenet_common::{Anomaly, BoundingBox, RecordIdentity};

    fn view_with_anomaly() -> RecordView {
        RecordView {
            identity: RecordIdentity::new(Some("T1"), Some("I1")),
            anomalies: vec![Anomaly {
                label: Some("Loose joint".into()),
                severity: Some("Faulty".into()),
                confidence: Some(0.9),
                bbox: Some(BoundingBox { x: 100.0, y: 100.0, width: 50.0, height: 50.0 }),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_render_without_record() {
        let text = render_text(&view_with_anomaly(), &[]);
        assert!(text.contains("Inspection I1"));
        assert!(text.contains("Loose joint"));
        assert!(text.contains("No maintenance record"));
        assert!(!text.contains("Overlay"));
    }

    #[test]
    fn test_overlays_need_dimensions() {
        let view = view_with_anomaly();
        assert!(overlays_for(&view, None, OverlayOffset::DEFAULT).is_empty());

        let dims = ImageDimensions::fit_width(1000.0, 500.0, 500.0);
        let boxes = overlays_for(&view, Some(&dims), OverlayOffset::DEFAULT);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].rect.top, 80.0);
        assert!(render_text(&view, &boxes).contains("color=red"));
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(display_timestamp("yesterday"), "yesterday");
        let shown = display_timestamp("2025-10-01T10:00:00Z");
        assert!(!shown.contains('T'));
        assert!(shown.starts_with("2025-10-0"));
    }

    #[test]
    fn test_invalid_image_bytes() {
        assert!(matches!(image_dimensions(b"not an image", 700), Err(ConsoleError::Image(_))));
    }

    #[test]
    fn test_json_output_has_source() {
        let json = to_json(&view_with_anomaly(), None, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["inspectionId"], "I1");
        assert!(value["recordSource"].is_null());
    }
}
