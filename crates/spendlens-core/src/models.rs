//! Domain models for SpendLens

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Known export layouts for CSV import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    Amex,
    Chase,
    CapitalOne,
    /// Headerless file, columns assigned positionally
    Generic,
    /// Header row present but not a known bank
    Unknown,
}

impl Schema {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amex => "amex",
            Self::Chase => "chase",
            Self::CapitalOne => "capitalone",
            Self::Generic => "generic",
            Self::Unknown => "unknown",
        }
    }

    /// Human-facing bank label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Amex => "American Express",
            Self::Chase => "Chase",
            Self::CapitalOne => "Capital One",
            Self::Generic => "Generic (headerless)",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for Schema {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amex" | "americanexpress" => Ok(Self::Amex),
            "chase" => Ok(Self::Chase),
            "capitalone" | "capital_one" => Ok(Self::CapitalOne),
            "generic" | "headerless" => Ok(Self::Generic),
            _ => Err(format!(
                "Unknown bank: {} (valid: amex, chase, capitalone, generic)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A canonical transaction, independent of the source bank format
///
/// Negative amounts are spending, positive amounts are income. Import never
/// produces a zero or non-finite amount; the aggregator ignores such rows
/// when they are built by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            category: category.into(),
            amount,
        }
    }

    /// Money leaving the account
    pub fn is_spending(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        !self.is_spending()
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    pub fn has_category(&self) -> bool {
        !self.category.is_empty()
    }

    /// Nonzero and finite, as every imported row is
    pub fn is_normalized(&self) -> bool {
        self.amount != 0.0 && self.amount.is_finite()
    }
}

// ========== Aggregate Models ==========

/// Merchant with the highest cumulative spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantTotal {
    pub name: String,
    pub amount: f64,
}

/// Single largest spending transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargestExpense {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// One slice of the category breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: f64,
}

/// Spending total for a period label (`2024-03`, `Mar`, `2024`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAmount {
    pub period: String,
    pub amount: f64,
}

/// Mean spend per transaction for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekAverage {
    pub day: String,
    pub average: f64,
}

/// A candidate subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub description: String,
    pub amount: f64,
    /// Ascending month abbreviations, e.g. `"Jan, Feb, Mar"`
    pub months_charged: String,
}

/// Running balance after a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub running_balance: f64,
}

/// Spending per category within one month
///
/// Categories without spending that month are absent, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrendRow {
    pub month: String,
    pub categories: BTreeMap<String, f64>,
}

/// Earliest and latest observed transaction dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

/// Everything derived from one transaction set
///
/// Recomputed wholesale for every load; the default value is the
/// result for an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub transaction_count: usize,
    pub spending_count: usize,
    pub income_count: usize,
    pub total_spent: f64,
    pub total_income: f64,
    pub avg_transaction: f64,
    pub avg_monthly_spend: f64,
    pub avg_daily_spend: f64,
    /// Percent change of the latest month vs the previous one (positive = more spending)
    pub month_over_month_change: f64,
    /// Percent change of the latest year vs the previous one (positive = more spending)
    pub year_over_year_change: f64,
    pub top_merchant: Option<MerchantTotal>,
    pub largest_expense: Option<LargestExpense>,
    pub category_breakdown: Vec<CategorySlice>,
    pub monthly_spending: Vec<PeriodAmount>,
    pub yearly_spending: Vec<PeriodAmount>,
    pub spending_by_year: Vec<PeriodAmount>,
    pub avg_spending_by_day_of_week: Vec<DayOfWeekAverage>,
    pub recurring_payments: Vec<RecurringPayment>,
    pub balance_trend: Vec<BalancePoint>,
    pub category_trend: Vec<CategoryTrendRow>,
    pub date_range: Option<DateRange>,
    pub has_category_data: bool,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}
