//! モックサーバー用の共通フィクスチャ
#![allow(dead_code)]

use billing_spec_downloader::{BillingMonth, ClientConfig, Endpoints};
use encoding_rs::SHIFT_JIS;
use wiremock::{
    matchers::{body_string_contains, header_regex, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const USER_ID: &str = "0801234567";
pub const PASSWORD: &str = "p@ss word";

pub fn month() -> BillingMonth {
    BillingMonth::new(2016, 7).unwrap()
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    let endpoints = Endpoints::new(&server.uri(), &server.uri()).unwrap();
    ClientConfig::new(USER_ID, PASSWORD)
        .with_endpoints(endpoints)
        .with_max_concurrent_downloads(2)
}

pub fn sjis(text: &str) -> Vec<u8> {
    let (bytes, _, _) = SHIFT_JIS.encode(text);
    bytes.into_owned()
}

/// 1ページ分の内訳CSV（先頭のデータ行はページの見出し）
pub fn fragment_csv(items: &[&str]) -> Vec<u8> {
    let mut text = String::from(
        "\"お客様番号\",\"C0001\"\r\n\"請求書発行番号\",\"P0001\"\r\n\"請求年月\",\"2016年07月\"\r\n",
    );
    text.push_str(
        "\"電話番号\",\"内訳区分\",\"項目\",\"数量\",\"単価\",\"金額\",\"税区分\",\"備考\",\"摘要\"\r\n",
    );
    for item in items {
        text.push_str(&format!(
            "\"090-0000-0000\",\"通話料\",\"{}\",\"1\",\"100\",\"100\",\"課税\",\"\",\"\"\r\n",
            item.replace('"', "\"\"")
        ));
    }
    sjis(&text)
}

/// 料金明細内訳トップ（最終ページが `last` のページング付き）
pub fn bill_items_html(last: u32) -> Vec<u8> {
    let links: String = (2..=last)
        .map(|n| {
            format!(
                "<a href=\"/wcot/billItems/goPaging/{}?billYm=201607\">{}</a>",
                n, n
            )
        })
        .collect();
    let html = format!(
        "<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=Shift_JIS\">\
         <title>料金明細内訳</title></head><body>\
         <p class=\"pagelink\"><span>1</span>{}<a href=\"/wcot/billItems/goPaging/next?billYm=201607\">次へ</a>\
         <table><tr><td>明細",
        links
    );
    sjis(&html)
}

pub fn redirect_html() -> String {
    r#"<html><body onload="document.forms[0].submit()">
<form name="f" method="post" action="https://bltm11.my.softbank.jp/wcot/index/">
<input type="hidden" name="obiToken" value="tkn-123">
<input type="hidden" name="obiMode" value="billing">
</form>"#
        .to_string()
}

/// サインイン4段階のモック
///
/// 各段階は前段で設定されたCookieが無いと一致しない。
pub async fn mount_signin(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/meisai/usr/scripts/web_meisai.jsp"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=meisai01; Path=/")
                .set_body_string("<html><body>WEB明細</body></html>"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/meisai/usr/scripts/login.jsp"))
        .and(header_regex("cookie", "JSESSIONID=meisai01"))
        .and(body_string_contains("txtUser_id=0801234567"))
        .and(body_string_contains("hidReadchk=1"))
        .and(body_string_contains("%40base="))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "login1=done; Path=/"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/meisai/usr/scripts/WC102001.jsp"))
        .and(header_regex("cookie", "login1=done"))
        .and(body_string_contains("hidPreUser_id=0801234567"))
        .and(body_string_contains("base=login.jsp"))
        .and(body_string_contains("hidNext_page=top_usr.jsp"))
        .and(body_string_contains("BV_UseBVCookie=NO"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "login2=done; Path=/"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cgi-bin/meisai/usr/scripts/obi_redirect.jsp"))
        .and(header_regex("cookie", "login2=done"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=UTF-8")
                .set_body_string(redirect_html()),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wcot/index/"))
        .and(header_regex("cookie", "login2=done"))
        .and(body_string_contains("obiToken=tkn-123"))
        .and(body_string_contains("obiMode=billing"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "WCOT=billing01; Path=/"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// 料金明細内訳トップと各ページのCSVのモック（料金案内のCookie必須）
pub async fn mount_breakdown(server: &MockServer, pages: &[Vec<u8>]) {
    Mock::given(method("GET"))
        .and(path("/wcot/billTotal/doBillItems"))
        .and(query_param("billYm", "201607"))
        .and(header_regex("cookie", "WCOT=billing01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(bill_items_html(pages.len() as u32), "text/html"),
        )
        .mount(server)
        .await;

    for (i, body) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/wcot/billItems/doCsv"))
            .and(query_param("billYm", "201607"))
            .and(query_param("pageNumber", (i + 1).to_string()))
            .and(header_regex("cookie", "WCOT=billing01"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "text/csv"))
            .expect(1)
            .mount(server)
            .await;
    }
}
