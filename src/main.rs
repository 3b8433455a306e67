use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::{Input, Password};
use flarenet_common::storage::DRAFT_KEY;
use flarenet_common::{load_record_view, DraftAutosave, KeyValueStore, OverlayOffset, RecordIdentity};
use flarenet_console::{api, cli, config, editor, export, logging, record_view, store};
use api::RestClient;
use cli::{Cli, Commands, Target};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store::JsonFileStore;

fn identity_of(target: &Target) -> anyhow::Result<RecordIdentity> {
    let identity = RecordIdentity::new(target.transformer.as_deref(), target.inspection.as_deref());
    if identity.inspection_id.is_none() {
        bail!("点検IDを指定してください（--inspection）");
    }
    Ok(identity)
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    tracing::debug!(api = %config.api_base_url, "config loaded");

    match cli.command {
        Commands::View { target, json, pdf, width } => {
            let identity = identity_of(&target)?;
            let client = RestClient::new(&config.api_base_url, config.token.clone())?;
            let local = JsonFileStore::open(&config.store_path()?);

            let pb = spinner("記録を読み込み中...");
            let view = load_record_view(&client, &local, &identity).await;

            // オーバーレイ用に熱画像の原寸を取る
            let render_width = width.unwrap_or(config.render_width);
            let mut dims = None;
            if let Some(url) = view.thermal.as_ref().and_then(|t| t.absolute_url(client.base_url())) {
                match client.fetch_bytes(&url).await {
                    Ok(bytes) => match record_view::image_dimensions(&bytes, render_width) {
                        Ok(d) => dims = Some(d),
                        Err(e) => tracing::warn!("thermal image could not be decoded: {e}"),
                    },
                    Err(e) => tracing::warn!("thermal image download failed: {e}"),
                }
            }
            pb.finish_and_clear();

            let overlays = record_view::overlays_for(&view, dims.as_ref(), config.overlay_offset);
            if json {
                println!("{}", record_view::to_json(&view, dims.as_ref(), &overlays)?);
            } else {
                print!("{}", record_view::render_text(&view, &overlays));
            }

            if let Some(output) = pdf {
                if let Err(e) = export::export_record_pdf(&view, &output) {
                    eprintln!("⚠ PDFを出力できませんでした: {}", e);
                }
            }
        }

        Commands::Edit { target, initial, offline } => {
            let identity = RecordIdentity::new(target.transformer.as_deref(), target.inspection.as_deref());
            let initial = match initial {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("初期値ファイルを読めません: {}", path.display()))?;
                    Some(serde_json::from_str::<serde_json::Value>(&content)?)
                }
                None => None,
            };

            let local = JsonFileStore::open(&config.store_path()?);
            let form = DraftAutosave::open(local, &identity, initial.as_ref())
                .with_delay(config.draft_debounce_ms);
            let form = Arc::new(Mutex::new(form));

            let client = if offline {
                None
            } else {
                Some(RestClient::new(&config.api_base_url, Some(config.token()?.to_string()))?)
            };
            editor::run_editor(form, client.as_ref()).await?;
        }

        Commands::Login { username } => {
            let username = match username {
                Some(u) => u,
                None => Input::<String>::new().with_prompt("ユーザー名").interact_text()?,
            };
            let password = Password::new().with_prompt("パスワード").interact()?;

            let client = RestClient::new(&config.api_base_url, None)?;
            let session = client.login(&username, &password).await?;
            config.set_session(session.token, session.username, session.role);
            config.save()?;
            println!(
                "✔ ログインしました: {} ({})",
                config.username.as_deref().unwrap_or("-"),
                config.role.as_deref().unwrap_or("-")
            );
        }

        Commands::Logout => {
            config.clear_session();
            config.save()?;
            println!("✔ ログアウトしました");
        }

        Commands::List { transformer } => {
            let client = RestClient::new(&config.api_base_url, config.token.clone())?;
            match transformer {
                Some(id) => {
                    let inspections = client.inspections_for(&id).await?;
                    println!("点検一覧（変圧器 {}）: {}件", id, inspections.len());
                    for i in inspections {
                        println!(
                            "  {:<8} {:<12} {:<12} {}",
                            i.id.as_deref().unwrap_or("-"),
                            i.inspection_number.as_deref().unwrap_or("-"),
                            i.inspected_date.as_deref().unwrap_or("-"),
                            i.status.as_deref().unwrap_or("-"),
                        );
                    }
                }
                None => {
                    let transformers = client.transformers().await?;
                    println!("変圧器一覧: {}件", transformers.len());
                    for t in transformers {
                        println!(
                            "  {:<8} {:<12} {:<12} {}",
                            t.id.as_deref().unwrap_or("-"),
                            t.transformer_no.as_deref().unwrap_or("-"),
                            t.pole_no.as_deref().unwrap_or("-"),
                            t.region.as_deref().unwrap_or("-"),
                        );
                    }
                }
            }
        }

        Commands::Config { set_api_url, set_offset_x, set_offset_y, show } => {
            // 環境変数・--api-url の上書きを保存しないよう読み直す
            let mut stored = Config::load_from(&Config::config_path()?)?;
            let mut changed = false;

            if let Some(url) = set_api_url {
                stored.api_base_url = url;
                changed = true;
            }
            if set_offset_x.is_some() || set_offset_y.is_some() {
                stored.overlay_offset = OverlayOffset::new(
                    set_offset_x.unwrap_or(stored.overlay_offset.x),
                    set_offset_y.unwrap_or(stored.overlay_offset.y),
                );
                changed = true;
            }
            if changed {
                stored.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  APIベースURL: {}", config.api_base_url);
                println!("  ユーザー: {}", config.username.as_deref().unwrap_or("未ログイン"));
                println!("  トークン: {}", if config.token.is_some() { "設定済み" } else { "未設定" });
                println!("  ストア: {}", config.store_path()?.display());
                println!(
                    "  オーバーレイオフセット: x={} y={}",
                    stored.overlay_offset.x, stored.overlay_offset.y
                );
                println!("  下書き保存の待ち時間: {}ms", config.draft_debounce_ms);
            }
        }

        Commands::Store { clear, clear_draft, info } => {
            let path = config.store_path()?;
            let mut local = JsonFileStore::open(&path);

            if info || !(clear || clear_draft) {
                println!("ストア情報:");
                println!("  パス: {}", local.path().display());
                println!("  件数: {}", local.len());
                for key in local.keys() {
                    println!("    {}", key);
                }
            }

            if clear_draft {
                local.remove(DRAFT_KEY)?;
                println!("✔ 下書きを削除しました");
            }

            if clear {
                match local.clear() {
                    Ok(true) => println!("✔ ストアを削除しました: {}", path.display()),
                    Ok(false) => println!("ストアファイルが存在しません"),
                    Err(e) => println!("ストア削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}
