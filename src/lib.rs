//! ソフトバンク WEB明細 請求内訳ダウンローダー
//!
//! - WEB明細サイトへのログインをHTTP通信で再現（Cookieセッション）
//! - 料金明細内訳のページングを解析し、全ページのCSVを並行ダウンロード
//! - ページ単位のCSVを1つの請求内訳に結合してCSV (UTF-8) で保存
//!
//! # 使用例
//!
//! ```rust,ignore
//! use billing_spec_downloader::{BillingMonth, BillingService, DownloadRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = BillingService::new();
//!
//!     let month: BillingMonth = "2016-07".parse().unwrap();
//!     let request = DownloadRequest::new("user_id", "password", month)
//!         .with_output_dir("./downloads");
//!
//!     let result = service.call(request).await.unwrap();
//!     println!("CSV saved: {:?}", result.csv_path);
//! }
//! ```
//!
//! # クライアントを直接使う例
//!
//! ```rust,ignore
//! use billing_spec_downloader::{BillingSpecClient, BreakdownSource, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::new("user_id", "password");
//!     let mut client = BillingSpecClient::new(config).unwrap();
//!     client.sign_in().await.unwrap();
//!
//!     let breakdown = client.download_breakdown("201607".parse().unwrap()).await.unwrap();
//!     breakdown.save(breakdown.default_file_name()).unwrap();
//! }
//! ```

pub mod breakdown;
pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod html;
pub mod http;
pub mod month;
pub mod service;
pub mod signin;
pub mod traits;
pub mod writer;

// 主要な型をリエクスポート
pub use breakdown::{BillingBreakdown, RawFragment};
pub use client::BillingSpecClient;
pub use config::{ClientConfig, Endpoints};
pub use error::BillingError;
pub use html::{HtmlScraper, LenientHtmlScraper};
pub use http::HttpSession;
pub use month::BillingMonth;
pub use service::{BillingService, DownloadRequest, DownloadResult};
pub use signin::Credentials;
pub use traits::BreakdownSource;
pub use writer::{DelimitedWriter, WriterSetting};
