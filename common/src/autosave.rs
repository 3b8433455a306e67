//! 編集フォームの下書き自動保存
//!
//! 時刻はミリ秒の数値で外から渡す。ブラウザでは `Date.now()`、CLIでは tokio の時計を使う。
//! タイマー自体は持たず、呼び出し側が `poll` を定期的に（またはタイマー満了時に）呼ぶ。

use crate::error::Result;
use crate::record::{Field, MaintenanceRecord, RecordIdentity, Section};
use crate::storage::{identity_key, read_record, write_record, KeyValueStore, DRAFT_KEY, LATEST_KEY};
use serde_json::Value;

/// 最後の編集から下書きを書くまでの待ち時間
pub const DRAFT_DEBOUNCE_MS: u64 = 600;

/// 単発のデバウンス期限
///
/// `trigger` のたびに期限を延ばす。未処理の期限は常に高々1つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Debounce {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// 期限を `now + delay` に張り直す
    pub fn trigger(&mut self, now_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// 期限を過ぎていれば解除して `true`
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// 期限までの残り時間
    pub fn remaining(&self, now_ms: u64) -> Option<u64> {
        self.deadline.map(|d| d.saturating_sub(now_ms))
    }
}

/// フォーム初期値の出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    Initial,
    Draft,
    Identity,
    Latest,
    Blank,
}

impl RestoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreSource::Initial => "initial data",
            RestoreSource::Draft => "draft",
            RestoreSource::Identity => "saved record",
            RestoreSource::Latest => "latest saved record",
            RestoreSource::Blank => "blank",
        }
    }
}

/// 下書き自動保存つきの編集フォーム
///
/// 閉じる（`close` または drop）と、保存後に編集がなければ何もせず、
/// 未保存の編集があればタイマーに関係なく下書きを1回書く。
pub struct DraftAutosave<S: KeyValueStore> {
    store: S,
    form: MaintenanceRecord,
    restored_from: RestoreSource,
    debounce: Debounce,
    unsaved: bool,
    closed: bool,
}

impl<S: KeyValueStore> DraftAutosave<S> {
    /// フォームを開く
    ///
    /// 初期データがなければ 下書き → 識別キー → latest → 空 の順に復元する。
    pub fn open(store: S, identity: &RecordIdentity, initial: Option<&Value>) -> Self {
        let (mut form, restored_from) = match initial.and_then(MaintenanceRecord::from_value) {
            Some(record) => (record, RestoreSource::Initial),
            None => restore(&store, identity),
        };

        if identity.transformer_id.is_some() {
            form.transformer_id = identity.transformer_id.clone();
        }
        if identity.inspection_id.is_some() {
            form.inspection_id = identity.inspection_id.clone();
        }

        tracing::debug!(source = restored_from.as_str(), "maintenance form opened");

        Self {
            store,
            form,
            restored_from,
            debounce: Debounce::new(DRAFT_DEBOUNCE_MS),
            unsaved: false,
            closed: false,
        }
    }

    /// 待ち時間を変える（設定値から）
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.debounce = Debounce::new(delay_ms);
        self
    }

    pub fn form(&self) -> &MaintenanceRecord {
        &self.form
    }

    pub fn restored_from(&self) -> RestoreSource {
        self.restored_from
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn debounce(&self) -> &Debounce {
        &self.debounce
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// フォームを書き換え、タイマーを張り直す
    pub fn edit<F>(&mut self, now_ms: u64, f: F)
    where
        F: FnOnce(&mut MaintenanceRecord),
    {
        f(&mut self.form);
        self.unsaved = true;
        self.debounce.trigger(now_ms);
    }

    pub fn set_field(&mut self, now_ms: u64, section: Section, field: Field, value: &str) {
        self.edit(now_ms, |form| form.set_field(section, field, value));
    }

    /// 期限が来ていれば下書きを書く。書いたら `true`
    pub fn poll(&mut self, now_ms: u64) -> Result<bool> {
        if !self.debounce.fire(now_ms) {
            return Ok(false);
        }
        self.write_draft()?;
        Ok(true)
    }

    /// 期限を待たずに下書きを書く
    pub fn flush(&mut self) -> Result<()> {
        self.debounce.cancel();
        self.write_draft()
    }

    /// 確定保存
    ///
    /// 識別キーと `latest` に書き、下書きを消す。
    pub fn save(&mut self, saved_at: &str) -> Result<MaintenanceRecord> {
        self.debounce.cancel();
        self.form.timestamp = saved_at.to_string();
        self.form.inspector.timestamp = Some(saved_at.to_string());

        let key = identity_key(&self.form.identity());
        write_record(&mut self.store, &key, &self.form)?;
        write_record(&mut self.store, LATEST_KEY, &self.form)?;
        self.store.remove(DRAFT_KEY)?;
        self.unsaved = false;

        tracing::info!(key = %key, "maintenance record saved locally");
        Ok(self.form.clone())
    }

    /// フォームを閉じる。未保存の編集があれば下書きを書く
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.debounce.cancel();

        if self.unsaved {
            self.write_draft()?;
        }
        Ok(())
    }

    fn write_draft(&mut self) -> Result<()> {
        write_record(&mut self.store, DRAFT_KEY, &self.form)?;
        tracing::debug!("draft written");
        Ok(())
    }
}

impl<S: KeyValueStore> Drop for DraftAutosave<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("final draft write failed: {e}");
        }
    }
}

/// 下書きが同じ変圧器・点検のものか
pub fn has_draft_for<S: KeyValueStore + ?Sized>(store: &S, identity: &RecordIdentity) -> bool {
    read_record(store, DRAFT_KEY)
        .map(|draft| draft.identity() == *identity)
        .unwrap_or(false)
}

/// 編集フォームを開くときの初期値
///
/// 同じ変圧器・点検の下書きがあれば `None` を返して下書きを復元させる。
/// なければ表示中の記録を初期値にする。フォームを開くたびに呼ぶこと。
pub fn editor_initial<S: KeyValueStore + ?Sized>(
    store: &S,
    identity: &RecordIdentity,
    shown: Option<&MaintenanceRecord>,
) -> Option<Value> {
    if has_draft_for(store, identity) {
        return None;
    }
    shown.and_then(|record| serde_json::to_value(record).ok())
}

fn restore<S: KeyValueStore + ?Sized>(
    store: &S,
    identity: &RecordIdentity,
) -> (MaintenanceRecord, RestoreSource) {
    if let Some(record) = read_record(store, DRAFT_KEY) {
        return (record, RestoreSource::Draft);
    }
    if let Some(record) = read_record(store, &identity_key(identity)) {
        return (record, RestoreSource::Identity);
    }
    if let Some(record) = read_record(store, LATEST_KEY) {
        return (record, RestoreSource::Latest);
    }
    (MaintenanceRecord::default(), RestoreSource::Blank)
}
