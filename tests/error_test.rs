//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use flarenet_console::config::Config;
use flarenet_console::error::ConsoleError;
use flarenet_console::record_view;
use tempfile::tempdir;

/// 画像として読めないバイト列
#[test]
fn test_image_decode_error() {
    let result = record_view::image_dimensions(b"\x00\x01garbage", 700);
    assert!(matches!(result, Err(ConsoleError::Image(_))));
}

/// 壊れた設定ファイルはJSONエラー
#[test]
fn test_corrupt_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ConsoleError::Json(_))));
}

/// トークン未設定
#[test]
fn test_missing_token() {
    let config = Config::default();
    assert!(matches!(config.token(), Err(ConsoleError::MissingToken)));
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let err: ConsoleError = flarenet_common::Error::Storage("disk full".into()).into();
    assert_eq!(err.to_string(), "Storage error: disk full");
}

/// ConsoleErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ConsoleError::Config("テスト設定エラー".to_string()),
        ConsoleError::MissingToken,
        ConsoleError::Api("接続失敗".to_string()),
        ConsoleError::ApiStatus { status: 503, url: "http://localhost/api".to_string() },
        ConsoleError::Image("壊れた画像".to_string()),
        ConsoleError::PdfGeneration("PDF生成エラー".to_string()),
        ConsoleError::Prompt("中断".to_string()),
        ConsoleError::Autosave("ロック".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 共通ライブラリ側へ渡すときの変換
#[test]
fn test_console_error_into_common() {
    let common: flarenet_common::Error = ConsoleError::ApiStatus { status: 500, url: "u".into() }.into();
    assert!(matches!(common, flarenet_common::Error::Remote(_)));
}
