//! サインイン手順
//!
//! ブラウザでのログイン操作を4回のHTTP通信で再現する。
//! 各段階は前段で設定されたCookieに依存するため必ず順番に実行し、
//! どこかで失敗した時点で中断する。

use tracing::info;

use crate::config::Endpoints;
use crate::error::BillingError;
use crate::html::HtmlScraper;
use crate::http::HttpSession;

/// 認証情報（サインイン中のみ保持する）
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

pub struct SigninFlow<'a> {
    session: &'a HttpSession,
    scraper: &'a dyn HtmlScraper,
    endpoints: &'a Endpoints,
}

impl<'a> SigninFlow<'a> {
    pub fn new(
        session: &'a HttpSession,
        scraper: &'a dyn HtmlScraper,
        endpoints: &'a Endpoints,
    ) -> Self {
        Self {
            session,
            scraper,
            endpoints,
        }
    }

    pub async fn run(&self, credentials: &Credentials) -> Result<(), BillingError> {
        info!("サインイン開始: user_id={}", credentials.user_id);
        self.cache_web_meisai_cookie().await?;
        self.emulate_login_step1(credentials).await?;
        self.emulate_login_step2(credentials).await?;
        self.cache_billing_cookie().await?;
        info!("サインイン完了");
        Ok(())
    }

    /// WEB明細サイトの初期Cookieを取得
    async fn cache_web_meisai_cookie(&self) -> Result<(), BillingError> {
        let url = self.endpoints.bootstrap_url()?;
        self.session.get(&url).await?;
        info!("(1/4) WEB明細トップ取得");
        Ok(())
    }

    async fn emulate_login_step1(&self, credentials: &Credentials) -> Result<(), BillingError> {
        let url = self.endpoints.login_step1_url()?;
        self.session
            .post_form(&url, &login_step1_form(credentials))
            .await?;
        info!("(2/4) ログイン第1段階");
        Ok(())
    }

    async fn emulate_login_step2(&self, credentials: &Credentials) -> Result<(), BillingError> {
        let url = self.endpoints.login_step2_url()?;
        self.session
            .post_form(&url, &login_step2_form(credentials))
            .await?;
        info!("(3/4) ログイン第2段階");
        Ok(())
    }

    /// オンライン料金案内のCookieを取得
    ///
    /// リダイレクト用ページのフォームをそのまま料金案内サイトへPOSTする。
    async fn cache_billing_cookie(&self) -> Result<(), BillingError> {
        let url = self.endpoints.redirect_bootstrap_url()?;
        let html = self.session.get(&url).await?.decode_utf8();
        let form = self.scraper.extract_form_fields(&html)?;

        let url = self.endpoints.billing_index_url()?;
        self.session.post_form(&url, &form).await?;
        info!("(4/4) 料金案内サイトのCookie取得");
        Ok(())
    }
}

fn login_step1_form(credentials: &Credentials) -> Vec<(String, String)> {
    form(&[
        ("hidPageID", ""),
        ("@base", ""),
        ("hidNext_page", ""),
        ("hidCountNG", "0"),
        ("hidPreUser_id", ""),
        ("hidReadchk", "1"),
        ("txtUser_id", credentials.user_id.as_str()),
        ("pasPassword", credentials.password.as_str()),
    ])
}

fn login_step2_form(credentials: &Credentials) -> Vec<(String, String)> {
    form(&[
        ("hidPageID", ""),
        ("base", "login.jsp"),
        ("hidNext_page", "top_usr.jsp"),
        ("hidCountNG", "0"),
        ("hidPreUser_id", credentials.user_id.as_str()),
        ("txtUser_id", credentials.user_id.as_str()),
        ("pasPassword", credentials.password.as_str()),
        ("BV_UseBVCookie", "NO"),
    ])
}

fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'f>(form: &'f [(String, String)], name: &str) -> Option<&'f str> {
        form.iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_login_step1_form() {
        let form = login_step1_form(&Credentials::new("0801234", "pw"));
        assert_eq!(form.len(), 8);
        assert_eq!(lookup(&form, "@base"), Some(""));
        assert_eq!(lookup(&form, "hidCountNG"), Some("0"));
        assert_eq!(lookup(&form, "hidReadchk"), Some("1"));
        assert_eq!(lookup(&form, "hidPreUser_id"), Some(""));
        assert_eq!(lookup(&form, "txtUser_id"), Some("0801234"));
        assert_eq!(lookup(&form, "pasPassword"), Some("pw"));
    }

    #[test]
    fn test_login_step2_form_repeats_user_id() {
        let form = login_step2_form(&Credentials::new("0801234", "pw"));
        assert_eq!(form.len(), 8);
        assert_eq!(lookup(&form, "base"), Some("login.jsp"));
        assert_eq!(lookup(&form, "hidNext_page"), Some("top_usr.jsp"));
        assert_eq!(lookup(&form, "hidPreUser_id"), Some("0801234"));
        assert_eq!(lookup(&form, "txtUser_id"), Some("0801234"));
        assert_eq!(lookup(&form, "BV_UseBVCookie"), Some("NO"));
        assert_eq!(lookup(&form, "@base"), None);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let printed = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(!printed.contains("hunter2"));
    }
}
