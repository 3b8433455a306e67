//! 異常オーバーレイの座標変換
//!
//! 原寸画像座標のバウンディングボックスを、表示中の画像サイズへ写す。
//! 画像ロード・リサイズのたびに `map_overlays` を呼び直す前提で、内部状態は持たない。

use crate::types::{Anomaly, ImageDimensions};
use serde::{Deserialize, Serialize};

/// 全ボックス共通の画素オフセット
///
/// 手動調整値。画像メタデータからの算出はしない。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayOffset {
    pub x: f64,
    pub y: f64,
}

impl OverlayOffset {
    pub const DEFAULT: OverlayOffset = OverlayOffset { x: 0.0, y: 30.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for OverlayOffset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 表示座標の矩形（px）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// 表示色の2段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlayTone {
    Faulty,
    Potential,
}

impl OverlayTone {
    pub fn of(anomaly: &Anomaly) -> Self {
        if anomaly.is_faulty() {
            OverlayTone::Faulty
        } else {
            OverlayTone::Potential
        }
    }

    pub fn border_color(&self) -> &'static str {
        match self {
            OverlayTone::Faulty => "red",
            OverlayTone::Potential => "gold",
        }
    }

    pub fn text_color(&self) -> &'static str {
        match self {
            OverlayTone::Faulty => "#fff",
            OverlayTone::Potential => "#000",
        }
    }
}

/// ラベルはボックス上端からこの高さだけ上に置く
pub const LABEL_LIFT_PX: f64 = 22.0;

/// 描画1件分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    /// 1始まりの表示番号（削除済みを除いた順）
    pub index: usize,
    pub rect: ScreenRect,
    pub tone: OverlayTone,
    pub label: String,
}

impl OverlayBox {
    /// ラベルの上端。画像の外へは出さない
    pub fn label_top(&self) -> f64 {
        (self.rect.top - LABEL_LIFT_PX).max(0.0)
    }
}

/// 1件の異常を表示座標へ写す
///
/// 画像サイズが揃っていない場合は `None`（NaN/Infinityを出さない）。
/// 個別オフセットがあれば共通オフセットより優先する。
pub fn map_to_screen(
    anomaly: &Anomaly,
    dims: &ImageDimensions,
    offset: OverlayOffset,
) -> Option<ScreenRect> {
    let (sx, sy) = dims.scale()?;
    let bbox = anomaly.bbox.unwrap_or_default();
    let offset_x = anomaly.offset_x.unwrap_or(offset.x);
    let offset_y = anomaly.offset_y.unwrap_or(offset.y);

    Some(ScreenRect {
        left: bbox.x * sx + offset_x,
        top: bbox.y * sy + offset_y,
        width: bbox.width * sx,
        height: bbox.height * sy,
    })
}

/// 表示ラベル: `#番号 (信頼度)`
pub fn overlay_label(index: usize, anomaly: &Anomaly) -> String {
    match anomaly.confidence {
        Some(c) => format!("#{} ({:.2})", index, c),
        None => format!("#{}", index),
    }
}

/// 削除済みを除いた全異常を表示座標へ写す
pub fn map_overlays(
    anomalies: &[Anomaly],
    dims: &ImageDimensions,
    offset: OverlayOffset,
) -> Vec<OverlayBox> {
    if !dims.is_ready() {
        return Vec::new();
    }

    anomalies
        .iter()
        .filter(|a| !a.is_deleted)
        .enumerate()
        .filter_map(|(i, anomaly)| {
            let rect = map_to_screen(anomaly, dims, offset)?;
            Some(OverlayBox {
                index: i + 1,
                rect,
                tone: OverlayTone::of(anomaly),
                label: overlay_label(i + 1, anomaly),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn anomaly(x: f64, y: f64, w: f64, h: f64) -> Anomaly {
        Anomaly {
            bbox: Some(BoundingBox { x, y, width: w, height: h }),
            ..Default::default()
        }
    }

    fn half_scale() -> ImageDimensions {
        ImageDimensions::new(1000.0, 800.0, 500.0, 400.0)
    }

    #[test]
    fn test_scaling_with_global_offset() {
        let rect = map_to_screen(&anomaly(100.0, 200.0, 50.0, 40.0), &half_scale(), OverlayOffset::new(0.0, 30.0))
            .expect("サイズは揃っている");
        assert_eq!(rect, ScreenRect { left: 50.0, top: 130.0, width: 25.0, height: 20.0 });
    }

    #[test]
    fn test_per_anomaly_offset_wins() {
        let mut a = anomaly(100.0, 100.0, 10.0, 10.0);
        a.offset_x = Some(5.0);

        let rect = map_to_screen(&a, &half_scale(), OverlayOffset::new(0.0, 0.0)).unwrap();
        assert_eq!(rect.left, 55.0);
        assert_eq!(rect.top, 50.0);
    }

    #[test]
    fn test_zero_rendered_width_yields_nothing() {
        let dims = ImageDimensions::new(1000.0, 800.0, 0.0, 400.0);
        assert!(map_to_screen(&anomaly(1.0, 1.0, 1.0, 1.0), &dims, OverlayOffset::DEFAULT).is_none());
        assert!(map_overlays(&[anomaly(1.0, 1.0, 1.0, 1.0)], &dims, OverlayOffset::DEFAULT).is_empty());
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let a = anomaly(123.0, 45.0, 67.0, 89.0);
        let dims = ImageDimensions::new(640.0, 480.0, 333.0, 250.0);
        let first = map_to_screen(&a, &dims, OverlayOffset::DEFAULT);
        let second = map_to_screen(&a, &dims, OverlayOffset::DEFAULT);
        assert_eq!(first, second);

        let list = vec![a.clone(), a];
        assert_eq!(
            map_overlays(&list, &dims, OverlayOffset::DEFAULT),
            map_overlays(&list, &dims, OverlayOffset::DEFAULT)
        );
    }

    #[test]
    fn test_deleted_anomalies_are_excluded_and_indices_compact() {
        let mut deleted = anomaly(0.0, 0.0, 10.0, 10.0);
        deleted.is_deleted = true;
        deleted.label = Some("gone".into());
        let mut kept = anomaly(10.0, 10.0, 10.0, 10.0);
        kept.confidence = Some(0.5);

        let boxes = map_overlays(&[deleted, kept.clone(), kept], &half_scale(), OverlayOffset::DEFAULT);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].index, 1);
        assert_eq!(boxes[1].index, 2);
        assert_eq!(boxes[0].label, "#1 (0.50)");
    }

    #[test]
    fn test_missing_bbox_maps_to_offset_origin() {
        let rect = map_to_screen(&Anomaly::default(), &half_scale(), OverlayOffset::new(3.0, 4.0)).unwrap();
        assert_eq!(rect, ScreenRect { left: 3.0, top: 4.0, width: 0.0, height: 0.0 });
    }

    #[test]
    fn test_tone_and_label_position() {
        let mut faulty = anomaly(0.0, 10.0, 10.0, 10.0);
        faulty.severity = Some("Faulty".into());
        let boxes = map_overlays(&[faulty], &half_scale(), OverlayOffset::new(0.0, 0.0));

        assert_eq!(boxes[0].tone, OverlayTone::Faulty);
        assert_eq!(boxes[0].tone.border_color(), "red");
        assert_eq!(boxes[0].label, "#1");
        assert_eq!(boxes[0].label_top(), 0.0);
    }
}
