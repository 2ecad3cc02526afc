//! 請求年月

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// 請求年月 (日は常に1日)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingMonth(NaiveDate);

impl BillingMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, BillingError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| BillingError::InvalidMonth(format!("{}-{}", year, month)))
    }

    /// 日付の属する月
    pub fn from_date(date: NaiveDate) -> Self {
        // 1日は全ての月に存在する
        Self(date.with_day(1).unwrap_or(date))
    }

    /// 今月
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// `billYm` クエリ形式 (YYYYMM)
    pub fn bill_ym(&self) -> String {
        self.0.format("%Y%m").to_string()
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

/// `YYYYMM` と `YYYY-MM` の両方を受け付ける
impl FromStr for BillingMonth {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits: String = s.chars().filter(|c| *c != '-').collect();
        let well_formed = digits.len() == 6
            && digits.chars().all(|c| c.is_ascii_digit())
            && (s.len() == 6 || (s.len() == 7 && s.as_bytes()[4] == b'-'));
        if !well_formed {
            return Err(BillingError::InvalidMonth(s.to_string()));
        }

        let year = digits[..4]
            .parse()
            .map_err(|_| BillingError::InvalidMonth(s.to_string()))?;
        let month = digits[4..]
            .parse()
            .map_err(|_| BillingError::InvalidMonth(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BillingMonth {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingMonth> for String {
    fn from(month: BillingMonth) -> Self {
        month.bill_ym()
    }
}
