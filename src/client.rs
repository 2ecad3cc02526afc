use async_trait::async_trait;
use tracing::{info, warn};

use crate::breakdown::RawFragment;
use crate::config::ClientConfig;
use crate::download::BreakdownDownloader;
use crate::error::BillingError;
use crate::html::{HtmlScraper, LenientHtmlScraper};
use crate::http::HttpSession;
use crate::month::BillingMonth;
use crate::signin::{Credentials, SigninFlow};
use crate::traits::BreakdownSource;

/// WEB明細へアクセスするクライアント
///
/// セッション（Cookie）はこのクライアントが所有し、破棄とともに失われる。
pub struct BillingSpecClient {
    config: ClientConfig,
    session: HttpSession,
    scraper: Box<dyn HtmlScraper>,
    signed_in: bool,
}

impl BillingSpecClient {
    pub fn new(config: ClientConfig) -> Result<Self, BillingError> {
        let session = HttpSession::new(config.timeout)?;
        Ok(Self {
            config,
            session,
            scraper: Box::new(LenientHtmlScraper::new()),
            signed_in: false,
        })
    }

    /// スクレイピング実装を差し替える
    pub fn with_scraper(mut self, scraper: Box<dyn HtmlScraper>) -> Self {
        self.scraper = scraper;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    /// 指定された認証情報でサインインする
    pub async fn sign_in_as(&mut self, credentials: &Credentials) -> Result<(), BillingError> {
        self.signed_in = false;
        SigninFlow::new(&self.session, self.scraper.as_ref(), &self.config.endpoints)
            .run(credentials)
            .await?;
        self.signed_in = true;
        Ok(())
    }

    /// 最終ページ番号
    pub async fn last_page_number(&self, month: BillingMonth) -> Result<u32, BillingError> {
        self.downloader().last_page_number(month).await
    }

    fn downloader(&self) -> BreakdownDownloader<'_> {
        BreakdownDownloader::new(
            &self.session,
            self.scraper.as_ref(),
            &self.config.endpoints,
            self.config.max_concurrent_downloads,
        )
    }
}

#[async_trait]
impl BreakdownSource for BillingSpecClient {
    async fn sign_in(&mut self) -> Result<(), BillingError> {
        let credentials = Credentials::new(&self.config.user_id, &self.config.password);
        self.sign_in_as(&credentials).await
    }

    async fn download_fragments(
        &self,
        month: BillingMonth,
    ) -> Result<Vec<RawFragment>, BillingError> {
        if !self.signed_in {
            warn!("サインイン前にダウンロードを開始します");
        }
        info!("請求内訳を取得: 請求月={}", month);
        self.downloader().download_all(month).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let config = ClientConfig::new("test_user", "test_password");
        let client = BillingSpecClient::new(config).unwrap();
        assert!(!client.is_signed_in());
        assert_eq!(client.config().user_id, "test_user");
        assert_eq!(client.config().max_concurrent_downloads, 6);
    }
}
