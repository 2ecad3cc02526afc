//! HTMLスクレイピング
//!
//! サーバー側で生成された古いHTML（閉じタグ欠落など）を前提とするため、
//! html5ever ベースの `scraper` で寛容にパースする。

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::PAGING_PATH_PREFIX;
use crate::error::BillingError;

/// サインイン・ダウンロードが必要とするスクレイピング機能
pub trait HtmlScraper: Send + Sync {
    /// 全 `<input>` の name/value を文書順に取得する
    fn extract_form_fields(&self, html: &str) -> Result<Vec<(String, String)>, BillingError>;

    /// ページングリンクから最終ページ番号を取得する（ページングが無ければ1）
    ///
    /// `current_query` はリンクから取り除く現在のクエリ（例: `?billYm=201607`）。
    fn extract_max_page_number(&self, html: &str, current_query: &str) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LenientHtmlScraper;

impl LenientHtmlScraper {
    pub fn new() -> Self {
        Self
    }
}

impl HtmlScraper for LenientHtmlScraper {
    fn extract_form_fields(&self, html: &str) -> Result<Vec<(String, String)>, BillingError> {
        let selector = Selector::parse("input").expect("input セレクタは正しい");
        let document = Html::parse_document(html);

        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for input in document.select(&selector) {
            let element = input.value();
            let name = element
                .attr("name")
                .ok_or_else(|| BillingError::MalformedHtml("input に name 属性がありません".into()))?;
            let value = element.attr("value").ok_or_else(|| {
                BillingError::MalformedHtml(format!("input[name={}] に value 属性がありません", name))
            })?;
            if !seen.insert(name.to_string()) {
                return Err(BillingError::MalformedHtml(format!(
                    "input[name={}] が重複しています",
                    name
                )));
            }
            fields.push((name.to_string(), value.to_string()));
        }

        debug!("フォーム項目を{}件取得", fields.len());
        Ok(fields)
    }

    fn extract_max_page_number(&self, html: &str, current_query: &str) -> u32 {
        let selector = Selector::parse("p.pagelink").expect("pagelink セレクタは正しい");
        let document = Html::parse_document(html);

        let Some(pagelink) = document.select(&selector).next() else {
            debug!("ページングなし");
            return 1;
        };

        pagelink
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "a")
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| {
                let page = href
                    .replace(PAGING_PATH_PREFIX, "")
                    .replace(current_query, "");
                match page.trim().parse::<u32>() {
                    Ok(n) if n > 0 => Some(n),
                    _ => {
                        warn!("ページ番号として解釈できないリンク: {}", href);
                        None
                    }
                }
            })
            .max()
            .unwrap_or(1)
    }
}
