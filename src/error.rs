use reqwest::StatusCode;
use thiserror::Error;

/// UIに表示する汎用エラーメッセージ
pub const DOWNLOAD_FAILED_MESSAGE: &str = "ダウンロード処理中にエラーが発生しました。";

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("リモート要求エラー: {status} ({url})")]
    RemoteRequest { url: String, status: StatusCode },

    #[error("通信エラー: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTML解析エラー: {0}")]
    MalformedHtml(String),

    #[error("内訳データが0件です")]
    EmptyInput,

    #[error("必須項目が見つかりません: {0}")]
    MissingMetadata(&'static str),

    #[error("CSV解析エラー: {0}")]
    MalformedCsv(#[from] csv::Error),

    #[error("URLが不正です: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("請求年月が不正です: {0}")]
    InvalidMonth(String),

    #[error("リクエストが不正です: {0}")]
    InvalidRequest(String),

    #[error("ファイル操作エラー: {0}")]
    Io(#[from] std::io::Error),
}

impl BillingError {
    /// 原因を区別しない利用者向けメッセージ
    pub fn user_message(&self) -> &'static str {
        DOWNLOAD_FAILED_MESSAGE
    }

    /// リモートが返したHTTPステータス（非2xx応答の場合のみ）
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BillingError::RemoteRequest { status, .. } => Some(*status),
            BillingError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
