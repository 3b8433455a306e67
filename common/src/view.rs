//! 記録表示画面のデータ読み込み
//!
//! メタデータ・画像・異常・記録をそれぞれ独立に取得する。
//! どれかが失敗しても他の取得は続ける（画像が取れなくても記録は解決する）。

use crate::analysis::resolve_anomalies;
use crate::api::{AnnotationApi, ImageApi, InspectionApi, MaintenanceRecordApi};
use crate::record::RecordIdentity;
use crate::resolver::{RecordResolver, ResolvedRecord};
use crate::storage::KeyValueStore;
use crate::types::{Anomaly, Inspection, ThermalImage, Transformer};

/// 記録表示画面に必要なもの一式
#[derive(Debug, Clone, Default)]
pub struct RecordView {
    pub identity: RecordIdentity,
    pub transformer: Option<Transformer>,
    pub inspection: Option<Inspection>,
    pub baseline: Option<ThermalImage>,
    pub thermal: Option<ThermalImage>,
    pub anomalies: Vec<Anomaly>,
    pub record: Option<ResolvedRecord>,
}

impl RecordView {
    /// 削除済みを除いた異常
    pub fn visible_anomalies(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(|a| !a.is_deleted)
    }

    /// 見出し用の点検番号
    pub fn inspection_label(&self) -> Option<&str> {
        self.inspection
            .as_ref()
            .and_then(Inspection::display_number)
            .or(self.identity.inspection_id.as_deref())
    }
}

/// 表示データを読む
pub async fn load_record_view<A, S>(api: &A, store: &S, identity: &RecordIdentity) -> RecordView
where
    A: MaintenanceRecordApi + ImageApi + AnnotationApi + InspectionApi + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let mut view = RecordView {
        identity: identity.clone(),
        ..Default::default()
    };

    if let Some(id) = identity.transformer_id.as_deref() {
        view.transformer = api
            .transformer(id)
            .await
            .map_err(|e| tracing::warn!(transformer_id = id, "transformer lookup failed: {e}"))
            .ok()
            .flatten();
    }
    if let Some(id) = identity.inspection_id.as_deref() {
        view.inspection = api
            .inspection(id)
            .await
            .map_err(|e| tracing::warn!(inspection_id = id, "inspection lookup failed: {e}"))
            .ok()
            .flatten();
    }

    if let Some(transformer_id) = identity.transformer_id.as_deref() {
        view.baseline = api
            .baseline_image(transformer_id)
            .await
            .map_err(|e| tracing::warn!(transformer_id, "baseline image lookup failed: {e}"))
            .ok()
            .flatten();

        if let Some(inspection_id) = identity.inspection_id.as_deref() {
            view.thermal = api
                .maintenance_images(transformer_id, inspection_id)
                .await
                .map_err(|e| tracing::warn!(inspection_id, "maintenance image lookup failed: {e}"))
                .ok()
                .and_then(|images| images.into_iter().next());
        }
    }

    if let Some(thermal) = view.thermal.as_ref() {
        view.anomalies = load_anomalies(api, thermal).await;
    }

    view.record = RecordResolver::new(api, store).resolve(identity).await;
    view
}

/// 熱画像の異常リスト（注釈があれば注釈を優先）
pub async fn load_anomalies<A>(api: &A, image: &ThermalImage) -> Vec<Anomaly>
where
    A: AnnotationApi + ?Sized,
{
    let annotation = match image.id.as_deref() {
        Some(image_id) => api
            .annotations(image_id)
            .await
            .map_err(|e| tracing::warn!(image_id, "annotation lookup failed: {e}"))
            .ok()
            .flatten(),
        None => None,
    };

    resolve_anomalies(image.analysis.as_ref(), annotation.as_ref())
}
