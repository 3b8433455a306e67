//! 記録表示の統合テスト
//!
//! 擬似バックエンド + JSONファイルストアで、記録の解決順とオーバーレイ計算を検証

use flarenet_common::storage::{inspection_key, write_record};
use flarenet_common::{
    load_record_view, AnnotationApi, Error, ImageApi, ImageDimensions, Inspection, InspectionApi,
    KeyValueStore, MaintenanceRecord, MaintenanceRecordApi, OverlayOffset, RecordIdentity,
    RecordProvenance, Result, ThermalImage, Transformer,
};
use flarenet_console::record_view::{overlays_for, render_text, to_json};
use flarenet_console::store::JsonFileStore;
use serde_json::{json, Value};
use tempfile::tempdir;

/// サーバーが落ちている状態
struct OfflineBackend;

impl MaintenanceRecordApi for OfflineBackend {
    async fn records_for_transformer_inspection(&self, _t: &str, _i: &str) -> Result<Value> {
        Err(Error::Remote("connection refused".into()))
    }

    async fn records_for_inspection(&self, _i: &str) -> Result<Value> {
        Err(Error::Remote("connection refused".into()))
    }
}

impl ImageApi for OfflineBackend {
    async fn baseline_image(&self, _t: &str) -> Result<Option<ThermalImage>> {
        Err(Error::Remote("connection refused".into()))
    }

    async fn maintenance_images(&self, _t: &str, _i: &str) -> Result<Vec<ThermalImage>> {
        Err(Error::Remote("connection refused".into()))
    }
}

impl AnnotationApi for OfflineBackend {
    async fn annotations(&self, _id: &str) -> Result<Option<Value>> {
        Err(Error::Remote("connection refused".into()))
    }
}

impl InspectionApi for OfflineBackend {
    async fn transformer(&self, _id: &str) -> Result<Option<Transformer>> {
        Err(Error::Remote("connection refused".into()))
    }

    async fn inspection(&self, _id: &str) -> Result<Option<Inspection>> {
        Err(Error::Remote("connection refused".into()))
    }
}

/// 画像と記録を返すサーバー
struct OnlineBackend;

impl MaintenanceRecordApi for OnlineBackend {
    async fn records_for_transformer_inspection(&self, _t: &str, _i: &str) -> Result<Value> {
        Ok(json!([
            { "id": 1, "recordJson": "{\"inspector\":{\"voltage\":\"220\"}}" },
            { "id": 2, "recordJson": "{\"inspector\":{\"voltage\":\"230\"}}" }
        ]))
    }

    async fn records_for_inspection(&self, _i: &str) -> Result<Value> {
        panic!("transformer+inspection lookup succeeded; inspection-only lookup must not run");
    }
}

impl ImageApi for OnlineBackend {
    async fn baseline_image(&self, _t: &str) -> Result<Option<ThermalImage>> {
        Ok(None)
    }

    async fn maintenance_images(&self, _t: &str, _i: &str) -> Result<Vec<ThermalImage>> {
        Ok(vec![ThermalImage {
            id: Some("img-1".into()),
            url: Some("/uploads/img-1.jpg".into()),
            analysis: Some(json!({
                "anomalies": [
                    { "label": "deleted", "isDeleted": true, "bbox": { "x": 0, "y": 0, "width": 1, "height": 1 } },
                    { "label": "hot", "severity": "Faulty", "confidence": 0.91,
                      "bbox": { "x": 200, "y": 100, "width": 40, "height": 20 } }
                ]
            })),
            ..Default::default()
        }])
    }
}

impl AnnotationApi for OnlineBackend {
    async fn annotations(&self, _id: &str) -> Result<Option<Value>> {
        Ok(None)
    }
}

impl InspectionApi for OnlineBackend {
    async fn transformer(&self, id: &str) -> Result<Option<Transformer>> {
        Ok(Some(Transformer {
            id: Some(id.into()),
            transformer_no: Some("AZ-8890".into()),
            ..Default::default()
        }))
    }

    async fn inspection(&self, id: &str) -> Result<Option<Inspection>> {
        Ok(Some(Inspection::from_value(&json!({ "inspectionID": id, "inspectionNumber": "000123" }))))
    }
}

#[tokio::test]
async fn test_offline_falls_back_to_local_cache() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonFileStore::open(&dir.path().join("store.json"));

    let mut record = MaintenanceRecord::default();
    record.inspector.name = "cached".into();
    write_record(&mut store, &inspection_key("9"), &record).unwrap();

    let view = load_record_view(&OfflineBackend, &store, &RecordIdentity::new(Some("1"), Some("9"))).await;

    let resolved = view.record.as_ref().expect("ローカルの記録が使われる");
    assert_eq!(resolved.record.inspector.name, "cached");
    assert!(resolved.provenance.is_local());
    assert!(render_text(&view, &[]).contains("Local cache (inspection 9)"));
}

#[tokio::test]
async fn test_offline_without_cache_shows_nothing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = JsonFileStore::open(&dir.path().join("store.json"));
    // 別の点検と latest は使われない
    store.set("maintenanceRecord_8", r#"{"inspector":{"name":"other"}}"#).unwrap();
    store.set("maintenanceRecord_latest", r#"{"inspector":{"name":"latest"}}"#).unwrap();

    let view = load_record_view(&OfflineBackend, &store, &RecordIdentity::new(Some("1"), Some("9"))).await;
    assert!(view.record.is_none());
    assert!(render_text(&view, &[]).contains("No maintenance record"));
}

#[tokio::test]
async fn test_online_view_with_overlays() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = JsonFileStore::open(&dir.path().join("store.json"));

    let view = load_record_view(&OnlineBackend, &store, &RecordIdentity::new(Some("1"), Some("9"))).await;

    let resolved = view.record.as_ref().expect("サーバーの記録");
    assert_eq!(resolved.record.inspector.voltage, "230");
    assert_eq!(resolved.provenance, RecordProvenance::ServerTransformerInspection);
    assert_eq!(view.inspection_label(), Some("000123"));

    // 原寸800x600を400px幅で表示
    let dims = ImageDimensions::fit_width(800.0, 600.0, 400.0);
    let overlays = overlays_for(&view, Some(&dims), OverlayOffset::DEFAULT);
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].index, 1);
    assert_eq!(overlays[0].rect.left, 100.0);
    assert_eq!(overlays[0].rect.top, 80.0);
    assert_eq!(overlays[0].tone.border_color(), "red");

    let text = render_text(&view, &overlays);
    assert!(text.contains("AZ-8890"));
    assert!(text.contains("Server (transformer + inspection)"));

    let json: Value = serde_json::from_str(&to_json(&view, Some(&dims), &overlays).unwrap()).unwrap();
    assert_eq!(json["recordSource"], "server:transformer_inspection");
    assert_eq!(json["overlays"][0]["label"], "#1 (0.91)");
}
