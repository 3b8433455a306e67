//! 入力正規化モジュール
//!
//! 上流データは同じ値を複数の別名で送ってくる（`inspectionID` / `inspectionId` / `id` など）。
//! ここで一度だけ正規形へ写像し、以降の処理は正規形のみを扱う。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// ドット区切りのパスで値を引く（例: `"inspector.name"`）
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

/// 値をテキストとして取り出す。空文字・null・オブジェクトは「値なし」
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// IDとして取り出す（数値・文字列どちらも受け付ける）
pub fn as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 候補パスを順に試し、最初に見つかったテキストを返す
pub fn first_text(value: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(as_text))
}

/// 候補パスを順に試し、最初に見つかったIDを返す
pub fn first_id(value: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(as_id))
}

/// serde用: 数値/文字列どちらのIDも `Option<String>` として受ける
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_id))
}

/// 文字列で埋め込まれたJSONと構造化済みJSONの両方を受ける
///
/// 文字列のパースに失敗した場合は `None`。
pub fn embedded_json(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        Value::Null => None,
        other => Some(other.clone()),
    }
}
