//! Cookieを保持するHTTPセッション

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::error::BillingError;

/// GET の応答本体
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: Vec<u8>,
    /// Content-Type の charset
    pub charset: Option<String>,
}

impl HttpResponse {
    /// charset に従ってデコードする。不明な場合は `fallback` を使う
    pub fn decode(&self, fallback: &'static Encoding) -> String {
        let encoding = self
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(fallback);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }

    pub fn decode_utf8(&self) -> String {
        self.decode(UTF_8)
    }
}

/// 全リクエストで同じCookieストアを共有するセッション
///
/// reqwest のCookieストアは内部で同期されるため、並行リクエストから共有してよい。
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new(timeout: Duration) -> Result<Self, BillingError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: &Url) -> Result<HttpResponse, BillingError> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let response = ensure_success(url, response)?;
        let charset = charset_of(&response);
        let body = response.bytes().await?.to_vec();
        debug!("GET {} -> {}bytes (charset={:?})", url, body.len(), charset);
        Ok(HttpResponse { body, charset })
    }

    /// フォームを application/x-www-form-urlencoded で送信する
    pub async fn post_form(
        &self,
        url: &Url,
        form: &[(String, String)],
    ) -> Result<Vec<u8>, BillingError> {
        let names: Vec<&str> = form.iter().map(|(name, _)| name.as_str()).collect();
        debug!("POST {} fields={:?}", url, names);
        let response = self.client.post(url.clone()).form(form).send().await?;
        let response = ensure_success(url, response)?;
        let body = response.bytes().await?.to_vec();
        debug!("POST {} -> {}bytes", url, body.len());
        Ok(body)
    }
}

fn ensure_success(url: &Url, response: Response) -> Result<Response, BillingError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BillingError::RemoteRequest {
            url: url.to_string(),
            status,
        })
    }
}

fn charset_of(response: &Response) -> Option<String> {
    let content_type = response.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    parse_charset(content_type)
}

fn parse_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;

    #[test]
    fn test_parse_charset() {
        assert_eq!(
            parse_charset("text/html; charset=Shift_JIS"),
            Some("Shift_JIS".to_string())
        );
        assert_eq!(
            parse_charset("text/html;CHARSET=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(parse_charset("text/html"), None);
        assert_eq!(parse_charset("text/html; charset="), None);
    }

    #[test]
    fn test_decode_uses_hint_then_fallback() {
        let (bytes, _, _) = SHIFT_JIS.encode("お客様番号");
        let hinted = HttpResponse {
            body: bytes.to_vec(),
            charset: Some("shift_jis".into()),
        };
        assert_eq!(hinted.decode_utf8(), "お客様番号");

        let unhinted = HttpResponse {
            body: bytes.to_vec(),
            charset: None,
        };
        assert_eq!(unhinted.decode(SHIFT_JIS), "お客様番号");

        let unknown = HttpResponse {
            body: "abc".as_bytes().to_vec(),
            charset: Some("x-unknown".into()),
        };
        assert_eq!(unknown.decode_utf8(), "abc");
    }
}
