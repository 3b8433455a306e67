//! 異常リストの取り出し
//!
//! 画像に埋め込まれた解析結果と、ユーザー注釈の両方から `anomalies` を読む。
//! 注釈が読めた場合は解析結果より優先する。

use crate::normalize::embedded_json;
use crate::types::Anomaly;
use serde_json::Value;

/// 解析ドキュメントの `anomalies` 配列を読む
///
/// 配列でなければ空。個々の要素が壊れている場合はその要素だけ捨てる。
pub fn anomalies_in(document: &Value) -> Vec<Anomaly> {
    let Some(items) = document.get("anomalies").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Anomaly>(item.clone()) {
            Ok(anomaly) => Some(anomaly),
            Err(e) => {
                tracing::warn!("skipping malformed anomaly: {e}");
                None
            }
        })
        .collect()
}

/// 画像の `analysis` ペイロード（文字列JSONまたは構造化済み）を解析ドキュメントにする
pub fn analysis_document(analysis: &Value) -> Option<Value> {
    let parsed = embedded_json(analysis);
    if parsed.is_none() && !analysis.is_null() {
        tracing::warn!("failed to parse image analysis payload");
    }
    parsed
}

/// 注釈ストアの応答を解析ドキュメントにする
///
/// 応答は `{annotationsJson: "<json>"}` 形式と、注釈ドキュメントそのものの両方がある。
pub fn annotation_document(response: &Value) -> Option<Value> {
    if let Some(embedded) = response.get("annotationsJson") {
        return embedded_json(embedded);
    }
    match response {
        Value::Object(_) => Some(response.clone()),
        Value::String(_) => embedded_json(response),
        _ => None,
    }
}

/// 解析結果と注釈から表示する異常リストを決める
///
/// 注釈ドキュメントが読めれば、それが `anomalies` を持たなくても注釈側を採用する。
pub fn resolve_anomalies(analysis: Option<&Value>, annotation: Option<&Value>) -> Vec<Anomaly> {
    let annotated = annotation.and_then(annotation_document);
    let document = annotated.or_else(|| analysis.and_then(analysis_document));
    document.as_ref().map(anomalies_in).unwrap_or_default()
}
