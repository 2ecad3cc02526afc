use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::client::BillingSpecClient;
use crate::config::ClientConfig;
use crate::error::BillingError;
use crate::month::BillingMonth;
use crate::traits::BreakdownSource;

/// ダウンロードリクエスト
#[derive(Clone)]
pub struct DownloadRequest {
    pub user_id: String,
    pub password: String,
    pub month: BillingMonth,
    pub output_dir: PathBuf,
}

impl std::fmt::Debug for DownloadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("user_id", &self.user_id)
            .field("month", &self.month)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl DownloadRequest {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>, month: BillingMonth) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            month,
            output_dir: PathBuf::from("./downloads"),
        }
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// 空白のみのユーザーID・パスワードは通信前に拒否する
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.user_id.trim().is_empty() {
            return Err(BillingError::InvalidRequest("ユーザーIDが未入力です".into()));
        }
        if self.password.trim().is_empty() {
            return Err(BillingError::InvalidRequest("パスワードが未入力です".into()));
        }
        Ok(())
    }

    /// `base` の接続設定に、このリクエストの認証情報と保存先を重ねる
    fn into_config(self, base: &ClientConfig) -> ClientConfig {
        ClientConfig {
            user_id: self.user_id,
            password: self.password,
            output_dir: self.output_dir,
            ..base.clone()
        }
    }
}

/// ダウンロード結果
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub csv_path: PathBuf,
    pub customer_number: String,
    pub publish_number: String,
    /// 見出し行を含む行数
    pub row_count: usize,
}

/// tower::Serviceを実装した請求内訳ダウンロードサービス
///
/// リクエストごとに新しいセッションでサインインし、内訳を結合してCSVに保存する。
#[derive(Debug, Clone, Default)]
pub struct BillingService {
    base: ClientConfig,
}

impl BillingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続先・タイムアウト・並行数の既定値を指定する
    pub fn with_config(base: ClientConfig) -> Self {
        Self { base }
    }
}

impl Service<DownloadRequest> for BillingService {
    type Response = DownloadResult;
    type Error = BillingError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DownloadRequest) -> Self::Future {
        info!(
            "ダウンロードリクエスト受信: user_id={}, 請求月={}",
            req.user_id, req.month
        );
        let base = self.base.clone();

        Box::pin(async move {
            req.validate()?;
            let month = req.month;
            let config = req.into_config(&base);
            let output_dir = config.output_dir.clone();

            let mut client = BillingSpecClient::new(config)?;
            let breakdown = client.execute(month).await?;

            std::fs::create_dir_all(&output_dir)?;
            let csv_path = output_dir.join(breakdown.default_file_name());
            breakdown.save(&csv_path)?;

            let result = DownloadResult {
                csv_path,
                customer_number: breakdown.customer_number().to_string(),
                publish_number: breakdown.publish_number().to_string(),
                row_count: breakdown.rows().len(),
            };

            info!(
                "ダウンロード完了: path={:?}, {}行",
                result.csv_path, result.row_count
            );

            Ok(result)
        })
    }
}
