//! 請求内訳の型定義

use std::path::Path;

use tracing::info;

use crate::error::BillingError;
use crate::month::BillingMonth;
use crate::writer::{self, WriterSetting};

/// お客様番号の行ラベル
pub const CUSTOMER_NUMBER_LABEL: &str = "お客様番号";
/// 請求書発行番号の行ラベル
pub const PUBLISH_NUMBER_LABEL: &str = "請求書発行番号";
/// 見出し行の先頭フィールド
pub const PAGE_NUMBER_MARKER: &str = "ページ番号";
/// 内訳データ行のフィールド数
pub const DATA_ROW_FIELDS: usize = 9;

pub type Row = Vec<String>;

/// 1ページ分の内訳CSV（Shift_JIS の生データ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub billing_month: BillingMonth,
    /// 1始まり
    pub page_number: u32,
    pub data: Vec<u8>,
}

impl RawFragment {
    pub fn new(billing_month: BillingMonth, page_number: u32, data: Vec<u8>) -> Self {
        Self {
            billing_month,
            page_number,
            data,
        }
    }
}

/// 1か月分の請求内訳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingBreakdown {
    pub(super) customer_number: String,
    pub(super) publish_number: String,
    pub(super) billing_month: BillingMonth,
    /// 見出し行 + 各ページのデータ行
    pub(super) rows: Vec<Row>,
}

impl BillingBreakdown {
    pub fn customer_number(&self) -> &str {
        &self.customer_number
    }

    pub fn publish_number(&self) -> &str {
        &self.publish_number
    }

    pub fn billing_month(&self) -> BillingMonth {
        self.billing_month
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 見出し行を除いた行数
    pub fn data_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.first().map(String::as_str) != Some(PAGE_NUMBER_MARKER))
            .count()
    }

    /// 保存ダイアログの既定ファイル名
    pub fn default_file_name(&self) -> String {
        format!("請求明細 {}.csv", self.billing_month)
    }

    /// CSV (UTF-8) で保存する
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BillingError> {
        let path = path.as_ref();
        let setting = WriterSetting::csv().with_byte_order_mark(true);
        writer::write_file(path, setting, &self.rows)?;
        info!(
            "請求内訳を保存: {:?} ({}行, 請求月={})",
            path,
            self.rows.len(),
            self.billing_month
        );
        Ok(())
    }
}
