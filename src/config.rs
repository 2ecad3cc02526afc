use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::BillingError;
use crate::month::BillingMonth;

const WEB_MEISAI_BASE: &str = "https://web-meisai.softbanktelecom.co.jp";
const BILLING_BASE: &str = "https://bltm11.my.softbank.jp";

const BOOTSTRAP_PATH: &str = "/cgi-bin/meisai/usr/scripts/web_meisai.jsp";
const LOGIN_STEP1_PATH: &str = "/cgi-bin/meisai/usr/scripts/login.jsp";
const LOGIN_STEP2_PATH: &str = "/cgi-bin/meisai/usr/scripts/WC102001.jsp";
const REDIRECT_BOOTSTRAP_PATH: &str = "/cgi-bin/meisai/usr/scripts/obi_redirect.jsp";
const BILLING_INDEX_PATH: &str = "/wcot/index/";
const BILL_ITEMS_PATH: &str = "/wcot/billTotal/doBillItems";
const CSV_PATH: &str = "/wcot/billItems/doCsv";

/// ページングリンクの href 先頭部分
pub const PAGING_PATH_PREFIX: &str = "/wcot/billItems/goPaging/";

/// 接続先
///
/// パスは固定で、ホスト部分のみ差し替えられる（テストではモックサーバーを指す）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// WEB明細サイト
    pub web_meisai: Url,
    /// オンライン料金案内サイト
    pub billing: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            web_meisai: Url::parse(WEB_MEISAI_BASE).expect("WEB明細のURLは正しい"),
            billing: Url::parse(BILLING_BASE).expect("料金案内のURLは正しい"),
        }
    }
}

impl Endpoints {
    pub fn new(web_meisai: &str, billing: &str) -> Result<Self, BillingError> {
        Ok(Self {
            web_meisai: Url::parse(web_meisai)?,
            billing: Url::parse(billing)?,
        })
    }

    pub fn bootstrap_url(&self) -> Result<Url, BillingError> {
        Ok(self.web_meisai.join(BOOTSTRAP_PATH)?)
    }

    pub fn login_step1_url(&self) -> Result<Url, BillingError> {
        Ok(self.web_meisai.join(LOGIN_STEP1_PATH)?)
    }

    pub fn login_step2_url(&self) -> Result<Url, BillingError> {
        Ok(self.web_meisai.join(LOGIN_STEP2_PATH)?)
    }

    pub fn redirect_bootstrap_url(&self) -> Result<Url, BillingError> {
        Ok(self.web_meisai.join(REDIRECT_BOOTSTRAP_PATH)?)
    }

    pub fn billing_index_url(&self) -> Result<Url, BillingError> {
        Ok(self.billing.join(BILLING_INDEX_PATH)?)
    }

    /// 料金明細内訳のトップページ
    pub fn bill_items_url(&self, month: BillingMonth) -> Result<Url, BillingError> {
        let mut url = self.billing.join(BILL_ITEMS_PATH)?;
        url.query_pairs_mut().append_pair("billYm", &month.bill_ym());
        Ok(url)
    }

    /// ページ単位のCSV
    pub fn csv_url(&self, month: BillingMonth, page_number: u32) -> Result<Url, BillingError> {
        let mut url = self.billing.join(CSV_PATH)?;
        url.query_pairs_mut()
            .append_pair("billYm", &month.bill_ym())
            .append_pair("pageNumber", &page_number.to_string());
        Ok(url)
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pub user_id: String,
    pub password: String,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    /// 同時に取得するページ数の上限
    pub max_concurrent_downloads: usize,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            password: String::new(),
            output_dir: PathBuf::from("./downloads"),
            timeout: Duration::from_secs(60),
            max_concurrent_downloads: 6,
            endpoints: Endpoints::default(),
        }
    }
}

// パスワードはログに出さない
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("user_id", &self.user_id)
            .field("password", &"********")
            .field("output_dir", &self.output_dir)
            .field("timeout", &self.timeout)
            .field("max_concurrent_downloads", &self.max_concurrent_downloads)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent_downloads(mut self, limit: usize) -> Self {
        self.max_concurrent_downloads = limit.max(1);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}
