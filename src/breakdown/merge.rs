//! 断片の結合

use encoding_rs::SHIFT_JIS;
use tracing::{debug, info};

use super::types::{
    BillingBreakdown, RawFragment, Row, CUSTOMER_NUMBER_LABEL, DATA_ROW_FIELDS,
    PAGE_NUMBER_MARKER, PUBLISH_NUMBER_LABEL,
};
use crate::error::BillingError;

impl BillingBreakdown {
    /// ページ単位の断片から請求内訳を生成する
    ///
    /// 断片はページ番号順に並べ替えてから結合するため、入力順序は結果に影響しない。
    /// お客様番号・請求書発行番号は最小ページの断片から取得する。
    /// 各断片の最初のデータ行は見出し行として扱い、結合後は先頭の1行だけを残す。
    pub fn from_fragments(mut fragments: Vec<RawFragment>) -> Result<Self, BillingError> {
        if fragments.is_empty() {
            return Err(BillingError::EmptyInput);
        }
        fragments.sort_by_key(|fragment| fragment.page_number);

        let mut pages = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            let records = parse_records(&fragment.data)?;
            debug!(
                "ページ{}: {}レコード",
                fragment.page_number,
                records.len()
            );
            pages.push((fragment.page_number, records));
        }

        let (_, first_records) = &pages[0];
        let customer_number = find_metadata(first_records, CUSTOMER_NUMBER_LABEL)?;
        let publish_number = find_metadata(first_records, PUBLISH_NUMBER_LABEL)?;

        let rows: Vec<Row> = pages
            .iter()
            .flat_map(|(page_number, records)| tag_data_rows(*page_number, records))
            .enumerate()
            .filter(|(i, row)| *i == 0 || row[0] != PAGE_NUMBER_MARKER)
            .map(|(_, row)| row)
            .collect();

        let billing_month = fragments[0].billing_month;
        info!(
            "請求内訳を結合: 請求月={}, {}ページ, {}行",
            billing_month,
            fragments.len(),
            rows.len()
        );

        Ok(Self {
            customer_number,
            publish_number,
            billing_month,
            rows,
        })
    }
}

/// Shift_JIS のCSVをレコードに分割する（前後の空白は除去）
fn parse_records(data: &[u8]) -> Result<Vec<Row>, BillingError> {
    let (text, _, _) = SHIFT_JIS.decode(data);
    let text = strip_space_before_quotes(&text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(String::from).collect());
    }
    Ok(records)
}

/// フィールド先頭から開き引用符までの空白を除く
///
/// csv はフィールド先頭が `"` のときだけ引用符として扱うため、`x, "a,b"` の
/// ような行では区切り文字が分割されてしまう。
fn strip_space_before_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if field_start {
            match c {
                ' ' | '\t' => {
                    pending.push(c);
                    continue;
                }
                '"' => {
                    pending.clear();
                    out.push(c);
                    // 閉じ引用符まで（`""` はエスケープ）そのまま写す
                    while let Some(q) = chars.next() {
                        out.push(q);
                        if q == '"' {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                out.push('"');
                            } else {
                                break;
                            }
                        }
                    }
                    field_start = false;
                    continue;
                }
                _ => out.push_str(&std::mem::take(&mut pending)),
            }
        }
        out.push(c);
        field_start = matches!(c, ',' | '\r' | '\n');
    }
    out.push_str(&pending);
    out
}

fn find_metadata(records: &[Row], label: &'static str) -> Result<String, BillingError> {
    records
        .iter()
        .find(|record| record.first().map(String::as_str) == Some(label))
        .and_then(|record| record.get(1).cloned())
        .ok_or(BillingError::MissingMetadata(label))
}

/// データ行の先頭フィールドを、最初の行は見出しに、以降はページ番号に置き換える
fn tag_data_rows(page_number: u32, records: &[Row]) -> impl Iterator<Item = Row> + '_ {
    let page = page_number.to_string();
    records
        .iter()
        .filter(|record| record.len() == DATA_ROW_FIELDS)
        .enumerate()
        .map(move |(i, record)| {
            let mut row = record.clone();
            row[0] = if i == 0 {
                PAGE_NUMBER_MARKER.to_string()
            } else {
                page.clone()
            };
            row
        })
}
