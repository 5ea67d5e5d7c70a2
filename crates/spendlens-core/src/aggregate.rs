//! Spending metrics over a pooled transaction set
//!
//! Computes, in one pass plus a derived pass:
//! - Totals and averages (per transaction, per day, per month)
//! - Top merchant and largest single expense
//! - Category breakdown (top N plus an `Other` bucket)
//! - Monthly, per-month-name and per-year spending series
//! - Average spend by day of week
//! - Recurring payments (same merchant and amount in several calendar months)
//! - Month-over-month and year-over-year change
//! - Running balance and per-category monthly trend
//!
//! Aggregation is a pure function of the transaction slice. Calling it twice
//! on the same input gives identical results.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    AggregateResult, BalancePoint, CategorySlice, CategoryTrendRow, DateRange, DayOfWeekAverage,
    LargestExpense, MerchantTotal, PeriodAmount, RecurringPayment, Transaction,
};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Sunday first
pub const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Label for the bucket that collects categories past the top N
pub const OTHER_CATEGORY: &str = "Other";

/// Label for spending without category data
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Aggregation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Categories shown individually in the breakdown before collapsing into `Other`
    pub top_categories: usize,
    /// Distinct calendar months a charge must appear in to count as recurring
    pub recurring_min_months: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            top_categories: 5,
            recurring_min_months: 3,
        }
    }
}

/// Aggregate with the default configuration
pub fn aggregate(transactions: &[Transaction]) -> AggregateResult {
    aggregate_with(transactions, &AggregateConfig::default())
}

/// Compute every derived metric for a transaction set
///
/// An empty set yields `AggregateResult::default()`. Transactions with a zero
/// or non-finite amount are ignored.
pub fn aggregate_with(transactions: &[Transaction], config: &AggregateConfig) -> AggregateResult {
    if !transactions.iter().all(Transaction::is_normalized) {
        let normalized: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| tx.is_normalized())
            .cloned()
            .collect();
        debug!(
            "Ignoring {} transactions with a zero or non-finite amount",
            transactions.len() - normalized.len()
        );
        return aggregate_with(&normalized, config);
    }

    let Some(first) = transactions.first() else {
        debug!("No transactions to aggregate");
        return AggregateResult::default();
    };

    let mut total_spent = 0.0;
    let mut total_income = 0.0;
    let mut spending_count = 0;
    let mut earliest = first.date;
    let mut latest = first.date;
    let mut has_category_data = false;

    let mut merchants = Tally::default();
    let mut categories = Tally::default();
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    let mut by_month_name = [0.0_f64; 12];
    let mut weekday_sums = [0.0_f64; 7];
    let mut weekday_counts = [0_usize; 7];
    let mut recurring = RecurringTracker::default();
    let mut largest: Option<&Transaction> = None;
    let mut category_trend: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

    for tx in transactions {
        earliest = earliest.min(tx.date);
        latest = latest.max(tx.date);
        has_category_data |= tx.has_category();

        if !tx.is_spending() {
            total_income += tx.amount;
            continue;
        }

        let spend = tx.abs_amount();
        let category = category_label(tx);
        let month = month_key(tx.date);

        total_spent += spend;
        spending_count += 1;

        merchants.add(&tx.description, spend);
        categories.add(category, spend);
        *by_month.entry(month.clone()).or_insert(0.0) += spend;
        *by_year.entry(tx.date.year()).or_insert(0.0) += spend;
        by_month_name[tx.date.month0() as usize] += spend;

        let weekday = tx.date.weekday().num_days_from_sunday() as usize;
        weekday_sums[weekday] += spend;
        weekday_counts[weekday] += 1;

        recurring.add(tx);

        if largest.map_or(true, |l| spend > l.abs_amount()) {
            largest = Some(tx);
        }

        *category_trend
            .entry(month)
            .or_default()
            .entry(category.to_string())
            .or_insert(0.0) += spend;
    }

    let days = ((latest - earliest).num_days() + 1).max(1);
    let months = month_span(earliest, latest);

    let avg_transaction = if spending_count > 0 {
        total_spent / spending_count as f64
    } else {
        0.0
    };

    let category_breakdown = if has_category_data {
        breakdown(categories.into_entries(), config.top_categories)
    } else {
        vec![CategorySlice {
            name: UNCATEGORIZED.to_string(),
            value: total_spent,
        }]
    };

    let month_over_month_change = period_change(by_month.values().copied());
    let year_over_year_change = period_change(by_year.values().copied());

    debug!(
        "Aggregated {} transactions ({} spending) from {} to {}",
        transactions.len(),
        spending_count,
        earliest,
        latest
    );

    AggregateResult {
        transaction_count: transactions.len(),
        spending_count,
        income_count: transactions.len() - spending_count,
        total_spent,
        total_income,
        avg_transaction,
        avg_monthly_spend: total_spent / months as f64,
        avg_daily_spend: total_spent / days as f64,
        month_over_month_change,
        year_over_year_change,
        top_merchant: merchants
            .max()
            .map(|(name, amount)| MerchantTotal { name, amount }),
        largest_expense: largest.map(|tx| LargestExpense {
            description: tx.description.clone(),
            amount: tx.abs_amount(),
            date: tx.date,
        }),
        category_breakdown,
        monthly_spending: by_month
            .into_iter()
            .map(|(period, amount)| PeriodAmount { period, amount })
            .collect(),
        yearly_spending: MONTH_ABBREVIATIONS
            .iter()
            .zip(by_month_name)
            .map(|(name, amount)| PeriodAmount {
                period: name.to_string(),
                amount,
            })
            .collect(),
        spending_by_year: by_year
            .into_iter()
            .map(|(year, amount)| PeriodAmount {
                period: year.to_string(),
                amount,
            })
            .collect(),
        avg_spending_by_day_of_week: WEEKDAY_ABBREVIATIONS
            .iter()
            .enumerate()
            .map(|(i, day)| DayOfWeekAverage {
                day: day.to_string(),
                average: if weekday_counts[i] > 0 {
                    weekday_sums[i] / weekday_counts[i] as f64
                } else {
                    0.0
                },
            })
            .collect(),
        recurring_payments: recurring.into_payments(config.recurring_min_months),
        balance_trend: balance_trend(transactions),
        category_trend: category_trend
            .into_iter()
            .map(|(month, categories)| CategoryTrendRow { month, categories })
            .collect(),
        date_range: Some(DateRange { earliest, latest }),
        has_category_data,
    }
}

/// Running balance in chronological order
///
/// Transactions on the same date keep their input order.
pub fn balance_trend(transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.date);

    let mut running_balance = 0.0;
    ordered
        .into_iter()
        .map(|tx| {
            running_balance += tx.amount;
            BalancePoint {
                date: tx.date,
                running_balance,
            }
        })
        .collect()
}

/// Percent change between the last two period totals
///
/// Returns 0 with fewer than two periods or when the previous total is 0.
pub fn period_change<I>(totals: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let totals: Vec<f64> = totals.into_iter().collect();
    match totals.as_slice() {
        [.., previous, latest] if *previous != 0.0 => (latest - previous) / previous * 100.0,
        _ => 0.0,
    }
}

/// `YYYY-MM` key, which sorts chronologically as a string
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Inclusive number of calendar months touched by the range, at least 1
fn month_span(earliest: NaiveDate, latest: NaiveDate) -> i64 {
    let years = (latest.year() - earliest.year()) as i64;
    let months = latest.month() as i64 - earliest.month() as i64;
    (years * 12 + months + 1).max(1)
}

fn category_label(tx: &Transaction) -> &str {
    if tx.has_category() {
        &tx.category
    } else {
        UNCATEGORIZED
    }
}

/// Top `limit` categories by spend, the remainder summed into `Other`
///
/// A real category named `Other` never takes a top-N slot; it joins the
/// remainder, so `Other` is always last and appears at most once.
fn breakdown(entries: Vec<(String, f64)>, limit: usize) -> Vec<CategorySlice> {
    let (mut named, existing_other): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(name, _)| name.as_str() != OTHER_CATEGORY);

    // Stable: equal totals keep first-seen order
    named.sort_by(|a, b| b.1.total_cmp(&a.1));

    let rest = if named.len() > limit {
        named.split_off(limit)
    } else {
        Vec::new()
    };

    let mut slices: Vec<CategorySlice> = named
        .into_iter()
        .map(|(name, value)| CategorySlice { name, value })
        .collect();

    if !rest.is_empty() || !existing_other.is_empty() {
        let remainder: f64 = rest.iter().chain(&existing_other).map(|(_, v)| v).sum();
        slices.push(CategorySlice {
            name: OTHER_CATEGORY.to_string(),
            value: remainder,
        });
    }

    slices
}

/// Per-key totals that remember first-seen order
#[derive(Default)]
struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<(String, f64)>,
}

impl Tally {
    fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), amount));
            }
        }
    }

    /// Largest total; the earliest key wins a tie
    fn max(&self) -> Option<(String, f64)> {
        let mut best: Option<&(String, f64)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.cloned()
    }

    fn into_entries(self) -> Vec<(String, f64)> {
        self.entries
    }
}

struct RecurringCandidate {
    description: String,
    cents: i64,
    months: BTreeSet<u32>,
}

/// Groups spending by (description, amount in cents)
#[derive(Default)]
struct RecurringTracker {
    index: HashMap<(String, i64), usize>,
    candidates: Vec<RecurringCandidate>,
}

impl RecurringTracker {
    fn add(&mut self, tx: &Transaction) {
        let cents = (tx.abs_amount() * 100.0).round() as i64;
        let key = (tx.description.clone(), cents);
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                self.index.insert(key, self.candidates.len());
                self.candidates.push(RecurringCandidate {
                    description: tx.description.clone(),
                    cents,
                    months: BTreeSet::new(),
                });
                self.candidates.len() - 1
            }
        };
        self.candidates[i].months.insert(tx.date.month0());
    }

    fn into_payments(self, min_months: usize) -> Vec<RecurringPayment> {
        let mut payments: Vec<RecurringPayment> = self
            .candidates
            .into_iter()
            .filter(|c| c.months.len() >= min_months)
            .map(|c| RecurringPayment {
                description: c.description,
                amount: c.cents as f64 / 100.0,
                months_charged: c
                    .months
                    .iter()
                    .map(|&m| MONTH_ABBREVIATIONS[m as usize])
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        payments.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        payments
    }
}
