use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ログインしていません。`flarenet login` でトークンを取得してください")]
    MissingToken,

    #[error("API呼び出しエラー: {0}")]
    Api(String),

    #[error("APIがステータス {status} を返しました: {url}")]
    ApiStatus { status: u16, url: String },

    #[error("画像読み込みエラー: {0}")]
    Image(String),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("下書き保存エラー: {0}")]
    Autosave(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] flarenet_common::Error),
}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        match (e.status(), e.url()) {
            (Some(status), Some(url)) => ConsoleError::ApiStatus {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ => ConsoleError::Api(e.to_string()),
        }
    }
}

impl From<dialoguer::Error> for ConsoleError {
    fn from(e: dialoguer::Error) -> Self {
        ConsoleError::Prompt(e.to_string())
    }
}

impl From<ConsoleError> for flarenet_common::Error {
    fn from(e: ConsoleError) -> Self {
        match e {
            ConsoleError::Common(inner) => inner,
            ConsoleError::Io(io) => flarenet_common::Error::Storage(io.to_string()),
            other => flarenet_common::Error::Remote(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
