use billing_spec_downloader::{BillingMonth, BillingSpecClient, BreakdownSource, ClientConfig};

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let user_id = std::env::var("SOFTBANK_USER_ID")
        .expect("SOFTBANK_USER_ID environment variable not set");
    let password = std::env::var("SOFTBANK_PASSWORD")
        .expect("SOFTBANK_PASSWORD environment variable not set");

    // 対象月一覧（JSON形式）
    // 例: BILLING_MONTHS='["201605", "201606", "2016-07"]'
    let months_json = std::env::var("BILLING_MONTHS")
        .expect("BILLING_MONTHS environment variable not set");
    let months: Vec<BillingMonth> = serde_json::from_str(&months_json)
        .expect("Failed to parse BILLING_MONTHS JSON");

    println!("=== Billing Breakdown Multi-Month Test ===\n");

    // 1回のサインインで全月を取得する
    let config = ClientConfig::new(user_id, password).with_output_dir("./downloads");
    let output_dir = config.output_dir.clone();
    let mut client = BillingSpecClient::new(config).expect("クライアント生成に失敗");
    if let Err(e) = client.sign_in().await {
        eprintln!("✗ サインイン失敗: {}", e);
        return;
    }
    std::fs::create_dir_all(&output_dir).expect("保存先の作成に失敗");

    for month in months {
        println!("--- {} ---", month);
        let result = match client.download_breakdown(month).await {
            Ok(breakdown) => {
                let path = output_dir.join(breakdown.default_file_name());
                breakdown.save(&path).map(|_| (path, breakdown.rows().len()))
            }
            Err(e) => Err(e),
        };

        match result {
            Ok((path, rows)) => println!("✓ 成功! {:?} ({}行)", path, rows),
            Err(e) => eprintln!("✗ エラー: {}", e),
        }
        println!();
    }

    println!("=== テスト完了 ===");
}
