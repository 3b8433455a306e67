use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flarenet")]
#[command(about = "FlareNet 変圧器点検コンソール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// APIのベースURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

/// 対象の変圧器・点検
#[derive(clap::Args, Clone, Debug)]
pub struct Target {
    /// 変圧器ID
    #[arg(short, long)]
    pub transformer: Option<String>,

    /// 点検ID
    #[arg(short, long)]
    pub inspection: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 点検の記録・異常・オーバーレイ座標を表示
    View {
        #[command(flatten)]
        target: Target,

        /// JSONで出力
        #[arg(long)]
        json: bool,

        /// PDFを出力（ファイルまたはディレクトリ）
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// オーバーレイ計算に使う表示幅（px）
        #[arg(long)]
        width: Option<u32>,
    },

    /// メンテナンス記録を対話的に編集（下書きは自動保存）
    Edit {
        #[command(flatten)]
        target: Target,

        /// 初期値にするJSONファイル（省略時は下書き等から復元）
        #[arg(long)]
        initial: Option<PathBuf>,

        /// サーバーには送信せずローカルにのみ保存
        #[arg(long)]
        offline: bool,
    },

    /// ログインしてトークンを保存
    Login {
        /// ユーザー名
        #[arg(short, long)]
        username: Option<String>,
    },

    /// 保存済みトークンを削除
    Logout,

    /// 変圧器一覧（--transformer 指定時はその点検一覧）
    List {
        /// 変圧器ID
        #[arg(short, long)]
        transformer: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIのベースURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// オーバーレイの共通オフセットX（px）
        #[arg(long, allow_hyphen_values = true)]
        set_offset_x: Option<f64>,

        /// オーバーレイの共通オフセットY（px）
        #[arg(long, allow_hyphen_values = true)]
        set_offset_y: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// ローカル記録ストア管理
    Store {
        /// ストアを削除
        #[arg(long)]
        clear: bool,

        /// 下書きだけ削除
        #[arg(long)]
        clear_draft: bool,

        /// ストア情報を表示
        #[arg(long)]
        info: bool,
    },
}
