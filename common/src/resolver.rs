//! メンテナンス記録の解決
//!
//! 表示する記録を次の順で探す。最初に見つかったものを採用し、以降は問い合わせない。
//!
//! 1. サーバー: 変圧器+点検で絞った記録
//! 2. サーバー: 点検のみで絞った記録
//! 3. ローカル: `maintenanceRecord_<点検ID>`
//!
//! どこにもなければ「記録なし」。変圧器単位や `latest` など、別の点検の記録では代用しない。

use crate::api::MaintenanceRecordApi;
use crate::normalize::embedded_json;
use crate::record::{MaintenanceRecord, RecordIdentity};
use crate::storage::{inspection_key, read_record, KeyValueStore};
use serde_json::Value;
use std::fmt;

/// 記録の出どころ（表示用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordProvenance {
    ServerTransformerInspection,
    ServerInspection,
    LocalInspection { inspection_id: String },
    /// この画面の編集フォームで保存した直後の記録（解決は経ていない）
    SavedInEditor,
}

impl RecordProvenance {
    /// 画面・CLI向けの短い説明
    pub fn describe(&self) -> String {
        match self {
            RecordProvenance::ServerTransformerInspection => {
                "Server (transformer + inspection)".to_string()
            }
            RecordProvenance::ServerInspection => "Server (inspection)".to_string(),
            RecordProvenance::LocalInspection { inspection_id } => {
                format!("Local cache (inspection {})", inspection_id)
            }
            RecordProvenance::SavedInEditor => "Saved in editor".to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, RecordProvenance::LocalInspection { .. })
    }
}

impl fmt::Display for RecordProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordProvenance::ServerTransformerInspection => write!(f, "server:transformer_inspection"),
            RecordProvenance::ServerInspection => write!(f, "server:inspection"),
            RecordProvenance::LocalInspection { inspection_id } => {
                write!(f, "local:inspection:{}", inspection_id)
            }
            RecordProvenance::SavedInEditor => write!(f, "editor:saved"),
        }
    }
}

/// 解決結果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub record: MaintenanceRecord,
    pub provenance: RecordProvenance,
}

/// 探索手順1つ分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    ServerTransformerInspection,
    ServerInspection,
    LocalInspection,
}

/// 優先順
pub const RESOLUTION_ORDER: [ResolutionStep; 3] = [
    ResolutionStep::ServerTransformerInspection,
    ResolutionStep::ServerInspection,
    ResolutionStep::LocalInspection,
];

impl ResolutionStep {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionStep::ServerTransformerInspection => "server_transformer_inspection",
            ResolutionStep::ServerInspection => "server_inspection",
            ResolutionStep::LocalInspection => "local_inspection",
        }
    }
}

/// サーバー応答（一覧または単体）から最新の記録を取り出す
///
/// 一覧は古い順なので末尾を使う。`recordJson` は文字列でもオブジェクトでもよく、
/// 解釈できなければエンベロープ自体を記録として読む。
pub fn select_latest(response: &Value) -> Option<MaintenanceRecord> {
    let entry = match response {
        Value::Array(items) => items.last()?,
        Value::Object(_) => response,
        _ => return None,
    };

    let payload = entry
        .get("recordJson")
        .and_then(embedded_json)
        .and_then(|v| MaintenanceRecord::from_value(&v));

    payload.or_else(|| MaintenanceRecord::from_value(entry))
}

/// ローカルキャッシュから点検IDの記録を読む。パース失敗は「なし」
pub fn local_for_inspection<S: KeyValueStore + ?Sized>(
    store: &S,
    inspection_id: &str,
) -> Option<MaintenanceRecord> {
    read_record(store, &inspection_key(inspection_id))
}

/// 記録リゾルバ
///
/// APIとストアは借用するだけ。各手順は前の手順の完了を待ってから実行する。
pub struct RecordResolver<'a, A: ?Sized, S: ?Sized> {
    api: &'a A,
    store: &'a S,
}

impl<'a, A, S> RecordResolver<'a, A, S>
where
    A: MaintenanceRecordApi + ?Sized,
    S: KeyValueStore + ?Sized,
{
    pub fn new(api: &'a A, store: &'a S) -> Self {
        Self { api, store }
    }

    /// 優先順に探して最初に見つかった記録を返す
    pub async fn resolve(&self, identity: &RecordIdentity) -> Option<ResolvedRecord> {
        for step in RESOLUTION_ORDER {
            if let Some(resolved) = self.attempt(step, identity).await {
                tracing::debug!(step = step.name(), provenance = %resolved.provenance, "maintenance record resolved");
                return Some(resolved);
            }
        }
        tracing::debug!(?identity, "no maintenance record found");
        None
    }

    /// 手順1つを試す。通信・ストアの失敗はログに残して `None`
    pub async fn attempt(
        &self,
        step: ResolutionStep,
        identity: &RecordIdentity,
    ) -> Option<ResolvedRecord> {
        let inspection_id = identity.inspection_id.as_deref()?;

        match step {
            ResolutionStep::ServerTransformerInspection => {
                let transformer_id = identity.transformer_id.as_deref()?;
                let response = self
                    .api
                    .records_for_transformer_inspection(transformer_id, inspection_id)
                    .await
                    .map_err(|e| {
                        tracing::warn!(transformer_id, inspection_id, "record lookup by transformer+inspection failed: {e}");
                    })
                    .ok()?;
                Some(ResolvedRecord {
                    record: select_latest(&response)?,
                    provenance: RecordProvenance::ServerTransformerInspection,
                })
            }
            ResolutionStep::ServerInspection => {
                let response = self
                    .api
                    .records_for_inspection(inspection_id)
                    .await
                    .map_err(|e| {
                        tracing::warn!(inspection_id, "record lookup by inspection failed: {e}");
                    })
                    .ok()?;
                Some(ResolvedRecord {
                    record: select_latest(&response)?,
                    provenance: RecordProvenance::ServerInspection,
                })
            }
            ResolutionStep::LocalInspection => Some(ResolvedRecord {
                record: local_for_inspection(self.store, inspection_id)?,
                provenance: RecordProvenance::LocalInspection {
                    inspection_id: inspection_id.to_string(),
                },
            }),
        }
    }
}

/// 表示中の対象
///
/// 画面側は要求時の対象を保持し、結果が届いた時点で対象が変わっていれば捨てる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTarget {
    current: Option<RecordIdentity>,
    generation: u64,
}

/// 発行済み要求の控え
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTicket {
    identity: RecordIdentity,
    generation: u64,
}

impl TargetTicket {
    pub fn identity(&self) -> &RecordIdentity {
        &self.identity
    }
}

impl RecordTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// 対象を切り替えて要求の控えを返す
    pub fn begin(&mut self, identity: RecordIdentity) -> TargetTicket {
        self.generation += 1;
        self.current = Some(identity.clone());
        TargetTicket {
            identity,
            generation: self.generation,
        }
    }

    /// 画面を閉じた等。以降の結果はすべて捨てる
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// 控えがまだ有効か
    pub fn accepts(&self, ticket: &TargetTicket) -> bool {
        self.generation == ticket.generation && self.current.as_ref() == Some(&ticket.identity)
    }

    pub fn current(&self) -> Option<&RecordIdentity> {
        self.current.as_ref()
    }
}
