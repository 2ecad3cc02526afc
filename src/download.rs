//! 請求内訳のページ単位ダウンロード

use encoding_rs::SHIFT_JIS;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::breakdown::RawFragment;
use crate::config::Endpoints;
use crate::error::BillingError;
use crate::html::HtmlScraper;
use crate::http::HttpSession;
use crate::month::BillingMonth;

pub struct BreakdownDownloader<'a> {
    session: &'a HttpSession,
    scraper: &'a dyn HtmlScraper,
    endpoints: &'a Endpoints,
    max_concurrent: usize,
}

impl<'a> BreakdownDownloader<'a> {
    pub fn new(
        session: &'a HttpSession,
        scraper: &'a dyn HtmlScraper,
        endpoints: &'a Endpoints,
        max_concurrent: usize,
    ) -> Self {
        Self {
            session,
            scraper,
            endpoints,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 料金明細内訳ページのページングから最終ページ番号を取得する
    pub async fn last_page_number(&self, month: BillingMonth) -> Result<u32, BillingError> {
        let url = self.endpoints.bill_items_url(month)?;
        let response = self.session.get(&url).await?;
        let (html, _, _) = SHIFT_JIS.decode(&response.body);

        let current_query = format!("?billYm={}", month.bill_ym());
        let last = self.scraper.extract_max_page_number(&html, &current_query);
        debug!("最終ページ: {} (請求月={})", last, month);
        Ok(last)
    }

    /// 全ページのCSVを並行して取得する
    ///
    /// 1ページでも失敗すれば、取得中の残りのページは破棄してエラーを返す。
    /// 戻り値の順序は不定。
    pub async fn download_all(&self, month: BillingMonth) -> Result<Vec<RawFragment>, BillingError> {
        let last = self.last_page_number(month).await?;
        info!("内訳ダウンロード開始: 請求月={}, {}ページ", month, last);

        let fragments: Vec<RawFragment> = stream::iter(1..=last)
            .map(|page_number| self.download_page(month, page_number))
            .buffer_unordered(self.max_concurrent)
            .try_collect()
            .await?;

        info!("内訳ダウンロード完了: {}ページ", fragments.len());
        Ok(fragments)
    }

    async fn download_page(
        &self,
        month: BillingMonth,
        page_number: u32,
    ) -> Result<RawFragment, BillingError> {
        let url = self.endpoints.csv_url(month, page_number)?;
        let response = self.session.get(&url).await?;
        debug!("ページ{}取得: {}bytes", page_number, response.body.len());
        Ok(RawFragment::new(month, page_number, response.body))
    }
}
