//! 請求内訳
//!
//! ページ単位でダウンロードした内訳CSV（断片）を1つの内訳に組み立てる。

mod merge;
mod types;

pub use types::{
    BillingBreakdown, RawFragment, Row, CUSTOMER_NUMBER_LABEL, DATA_ROW_FIELDS,
    PAGE_NUMBER_MARKER, PUBLISH_NUMBER_LABEL,
};
