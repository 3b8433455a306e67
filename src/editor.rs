//! 対話式メンテナンス記録エディタ
//!
//! 入力プロンプトはブロッキングなので `spawn_blocking` で回し、
//! その間もバックグラウンドのティッカーが下書きのデバウンス期限を見て書き込む。

use crate::api::RestClient;
use crate::error::{ConsoleError, Result};
use dialoguer::{Input, Select};
use flarenet_common::record::{Field, MaintenanceStatus, Section};
use flarenet_common::{DraftAutosave, KeyValueStore, MaintenanceRecord};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// ティッカーの確認間隔
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub type SharedForm<S> = Arc<Mutex<DraftAutosave<S>>>;

/// エディタ起動からの経過ミリ秒
#[derive(Debug, Clone, Copy)]
pub struct EditorClock {
    start: Instant,
}

impl EditorClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

pub fn lock_form<S: KeyValueStore>(form: &SharedForm<S>) -> Result<MutexGuard<'_, DraftAutosave<S>>> {
    form.lock()
        .map_err(|_| ConsoleError::Autosave("フォームのロックが壊れています".into()))
}

/// 下書きのデバウンス期限を定期的に確認するタスク
pub fn spawn_autosave_ticker<S>(form: SharedForm<S>, clock: EditorClock) -> JoinHandle<()>
where
    S: KeyValueStore + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        loop {
            ticker.tick().await;
            let Ok(mut guard) = form.lock() else {
                tracing::warn!("autosave stopped: form lock poisoned");
                return;
            };
            match guard.poll(clock.now_ms()) {
                Ok(true) => tracing::debug!("draft autosaved"),
                Ok(false) => {}
                Err(e) => tracing::warn!("draft autosave failed: {e}"),
            }
        }
    })
}

/// メニューの操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Edit(Section),
    Review,
    Save { upload: bool },
    Quit,
}

impl EditorAction {
    pub const MENU: [EditorAction; 6] = [
        EditorAction::Edit(Section::Inspector),
        EditorAction::Edit(Section::Rectification),
        EditorAction::Edit(Section::Reinspection),
        EditorAction::Review,
        EditorAction::Save { upload: true },
        EditorAction::Quit,
    ];

    pub fn label(&self) -> String {
        match self {
            EditorAction::Edit(section) => format!("{} を編集", section.label()),
            EditorAction::Review => "内容を確認".to_string(),
            EditorAction::Save { upload: true } => "保存（サーバーにも送信）".to_string(),
            EditorAction::Save { upload: false } => "保存（ローカルのみ）".to_string(),
            EditorAction::Quit => "終了（下書きは残る）".to_string(),
        }
    }
}

/// ブロッキングのプロンプトを別スレッドで実行
async fn prompt<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ConsoleError::Prompt(e.to_string()))?
}

fn select_action(offline: bool) -> Result<EditorAction> {
    let actions: Vec<EditorAction> = EditorAction::MENU
        .iter()
        .map(|a| match a {
            EditorAction::Save { .. } if offline => EditorAction::Save { upload: false },
            other => *other,
        })
        .collect();
    let labels: Vec<String> = actions.iter().map(EditorAction::label).collect();

    let idx = Select::new()
        .with_prompt("操作")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(actions[idx])
}

fn select_field(section: Section, current: &MaintenanceRecord) -> Result<Option<Field>> {
    let mut labels: Vec<String> = Field::ALL
        .iter()
        .map(|f| {
            let value = current.get_field(section, *f);
            format!("{:<20} {}", f.label(), if value.is_empty() { "-" } else { value.as_str() })
        })
        .collect();
    labels.push("戻る".to_string());

    let idx = Select::new()
        .with_prompt(format!("{} の項目", section.label()))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Field::ALL.get(idx).copied())
}

fn prompt_value(field: Field, current: String) -> Result<String> {
    if field == Field::Status {
        let labels: Vec<&str> = MaintenanceStatus::ALL.iter().map(MaintenanceStatus::as_str).collect();
        let default = MaintenanceStatus::parse(&current)
            .and_then(|s| MaintenanceStatus::ALL.iter().position(|x| *x == s))
            .unwrap_or(0);
        let idx = Select::new()
            .with_prompt(field.label())
            .items(&labels)
            .default(default)
            .interact()?;
        return Ok(labels[idx].to_string());
    }

    let value: String = Input::new()
        .with_prompt(field.label())
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    Ok(value.trim().to_string())
}

/// 記録を表示用の行にする
pub fn summarize(record: &MaintenanceRecord) -> Vec<String> {
    let mut lines = Vec::new();
    for section in Section::ALL {
        lines.push(format!("[{}]", section.label()));
        for field in Field::ALL {
            let value = record.get_field(section, field);
            lines.push(format!("  {:<20} {}", field.label(), if value.is_empty() { "-" } else { value.as_str() }));
        }
    }
    lines
}

/// 対話式に記録を編集する
///
/// 終了時（保存済みでなければ）は下書きを書いてから戻る。
pub async fn run_editor<S>(form: SharedForm<S>, client: Option<&RestClient>) -> Result<()>
where
    S: KeyValueStore + Send + 'static,
{
    let clock = EditorClock::start();
    let ticker = spawn_autosave_ticker(form.clone(), clock);

    {
        let guard = lock_form(&form)?;
        println!("📝 メンテナンス記録の編集（初期値: {}）", guard.restored_from().as_str());
    }
    println!("---\n");

    let outcome = editor_loop(&form, clock, client).await;

    ticker.abort();
    let close = lock_form(&form)?.close();

    outcome?;
    close?;
    Ok(())
}

async fn editor_loop<S>(form: &SharedForm<S>, clock: EditorClock, client: Option<&RestClient>) -> Result<()>
where
    S: KeyValueStore + Send + 'static,
{
    let offline = client.is_none();
    loop {
        let action = prompt(move || select_action(offline)).await?;

        match action {
            EditorAction::Edit(section) => loop {
                let snapshot = lock_form(form)?.form().clone();
                let Some(field) = prompt(move || select_field(section, &snapshot)).await? else {
                    break;
                };

                let current = lock_form(form)?.form().get_field(section, field);
                let value = prompt(move || prompt_value(field, current)).await?;
                lock_form(form)?.set_field(clock.now_ms(), section, field, &value);
                println!("  → {}: {}\n", field.label(), value);
            },
            EditorAction::Review => {
                let record = lock_form(form)?.form().clone();
                for line in summarize(&record) {
                    println!("{}", line);
                }
                println!();
            }
            EditorAction::Save { upload } => {
                let saved_at = chrono::Local::now().to_rfc3339();
                let record = lock_form(form)?.save(&saved_at)?;
                println!("✔ ローカルに保存しました");

                if upload {
                    if let Some(client) = client {
                        match client.save_record(&record).await {
                            Ok(_) => println!("✔ サーバーに送信しました"),
                            Err(e) => {
                                tracing::warn!("record upload failed: {e}");
                                println!("⚠ サーバー送信に失敗しました（ローカル保存は完了）: {}", e);
                            }
                        }
                    }
                }
                return Ok(());
            }
            EditorAction::Quit => {
                println!("終了します（未保存の編集は下書きに残ります）");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flarenet_common::storage::{read_record, DRAFT_KEY};
    use flarenet_common::{MemoryStore, RecordIdentity};

    fn shared() -> SharedForm<MemoryStore> {
        let identity = RecordIdentity::new(Some("T1"), Some("I1"));
        Arc::new(Mutex::new(DraftAutosave::open(MemoryStore::new(), &identity, None)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_writes_draft_after_quiet_period() {
        let form = shared();
        let clock = EditorClock::start();
        let ticker = spawn_autosave_ticker(form.clone(), clock);

        lock_form(&form)
            .unwrap()
            .set_field(clock.now_ms(), Section::Inspector, Field::Voltage, "230");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(read_record(lock_form(&form).unwrap().store(), DRAFT_KEY).is_none());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let draft = read_record(lock_form(&form).unwrap().store(), DRAFT_KEY).unwrap();
        assert_eq!(draft.inspector.voltage, "230");

        ticker.abort();
    }

    #[test]
    fn test_menu_labels() {
        assert_eq!(EditorAction::Edit(Section::Reinspection).label(), "Re-inspection を編集");
        assert_eq!(EditorAction::MENU.len(), 6);
    }

    #[test]
    fn test_summarize_marks_empty_fields() {
        let lines = summarize(&MaintenanceRecord::default());
        assert_eq!(lines[0], "[Inspector]");
        assert!(lines[1].ends_with('-'));
        assert_eq!(lines.len(), 3 * (Field::ALL.len() + 1));
    }
}
