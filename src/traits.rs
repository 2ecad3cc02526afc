use async_trait::async_trait;

use crate::breakdown::{BillingBreakdown, RawFragment};
use crate::error::BillingError;
use crate::month::BillingMonth;

#[async_trait]
pub trait BreakdownSource: Send + Sync {
    /// サインイン実行
    async fn sign_in(&mut self) -> Result<(), BillingError>;

    /// 指定月の内訳を全ページ取得（順不同）
    async fn download_fragments(&self, month: BillingMonth)
        -> Result<Vec<RawFragment>, BillingError>;

    /// 指定月の内訳を取得して1つに結合
    async fn download_breakdown(&self, month: BillingMonth) -> Result<BillingBreakdown, BillingError> {
        let fragments = self.download_fragments(month).await?;
        BillingBreakdown::from_fragments(fragments)
    }

    /// 一括実行（sign_in → download_breakdown）
    async fn execute(&mut self, month: BillingMonth) -> Result<BillingBreakdown, BillingError> {
        self.sign_in().await?;
        self.download_breakdown(month).await
    }
}
