//! Spending dashboard command

use anyhow::{bail, Context, Result};
use serde_json::json;
use spendlens_core::{
    aggregate_with, request_insights, AggregateConfig, AggregateResult, BatchResult,
    OllamaInsights, Settings,
};
use tracing::warn;

use super::core::{format_change, load_batch};
use super::truncate;
use crate::cli::InputArgs;

/// Widest bar drawn in the monthly chart
const BAR_WIDTH: f64 = 30.0;

pub async fn cmd_summary(
    settings: &Settings,
    input: &InputArgs,
    json: bool,
    top: Option<usize>,
    insights: bool,
) -> Result<()> {
    let config = aggregate_config(settings, top)?;
    let batch = load_batch(input).await?;
    let result = aggregate_with(&batch.transactions, &config);

    let commentary = if insights {
        match OllamaInsights::from_settings(&settings.insights) {
            Some(backend) => request_insights(&backend, &batch.transactions, &result).await,
            None => {
                warn!("Insights requested but OLLAMA_HOST is not set");
                None
            }
        }
    } else {
        None
    };

    if json {
        let output = summary_json(&batch, &result, commentary.as_deref());
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize summary")?
        );
        return Ok(());
    }

    print_summary(&batch, &result);

    if let Some(text) = commentary {
        println!();
        println!("💡 Insights");
        println!("   ─────────────────────────────────────────────────────────────");
        for line in text.lines() {
            println!("   {}", line);
        }
    }

    Ok(())
}

/// Settings with the `--top` override applied
pub fn aggregate_config(settings: &Settings, top: Option<usize>) -> Result<AggregateConfig> {
    let mut config = settings.aggregate.clone();
    if let Some(top) = top {
        if top == 0 {
            bail!("--top must be at least 1");
        }
        config.top_categories = top;
    }
    Ok(config)
}

pub fn summary_json(
    batch: &BatchResult,
    result: &AggregateResult,
    insights: Option<&str>,
) -> serde_json::Value {
    json!({
        "files": batch.files,
        "summary": result,
        "insights": insights,
    })
}

fn print_summary(batch: &BatchResult, result: &AggregateResult) {
    println!();
    println!("📊 Spending Summary");
    println!(
        "   Files: {} loaded, {} skipped, {} rows rejected",
        batch.imported_files(),
        batch.skipped_files(),
        batch.rejected_rows()
    );

    let Some(range) = result.date_range else {
        println!("   ─────────────────────────────────────────────────────────────");
        println!("   No transactions found.");
        return;
    };

    println!("   Period: {} to {}", range.earliest, range.latest);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Transactions:      {} ({} spending, {} income)",
        result.transaction_count, result.spending_count, result.income_count
    );
    println!("   Total spent:       ${:.2}", result.total_spent);
    println!("   Total income:      ${:.2}", result.total_income);
    println!("   Avg transaction:   ${:.2}", result.avg_transaction);
    println!("   Avg per month:     ${:.2}", result.avg_monthly_spend);
    println!("   Avg per day:       ${:.2}", result.avg_daily_spend);
    println!(
        "   Month over month:  {}",
        format_change(result.month_over_month_change)
    );
    println!(
        "   Year over year:    {}",
        format_change(result.year_over_year_change)
    );

    if let Some(merchant) = &result.top_merchant {
        println!(
            "   Top merchant:      {} (${:.2})",
            truncate(&merchant.name, 35),
            merchant.amount
        );
    }
    if let Some(expense) = &result.largest_expense {
        println!(
            "   Largest expense:   {} (${:.2} on {})",
            truncate(&expense.description, 35),
            expense.amount,
            expense.date
        );
    }

    print_categories(result);
    print_monthly(result);
    print_weekdays(result);
    print_recurring(result);
}

fn print_categories(result: &AggregateResult) {
    if result.category_breakdown.is_empty() {
        return;
    }

    println!();
    println!("🏷️  Categories");
    println!("   {:25} │ {:>10} │ {:>6}", "Category", "Amount", "%");
    println!("   ──────────────────────────┼────────────┼────────");

    for slice in &result.category_breakdown {
        let percent = if result.total_spent > 0.0 {
            slice.value / result.total_spent * 100.0
        } else {
            0.0
        };
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}%",
            truncate(&slice.name, 25),
            slice.value,
            percent
        );
    }

    if !result.has_category_data {
        println!("   \x1b[2mThese exports carry no category data\x1b[0m");
    }
}

fn print_monthly(result: &AggregateResult) {
    let max = result
        .monthly_spending
        .iter()
        .map(|m| m.amount)
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return;
    }

    println!();
    println!("📅 Monthly Spending");
    for month in &result.monthly_spending {
        let width = (month.amount / max * BAR_WIDTH).round() as usize;
        println!(
            "   {} │ {:>10.2} │ {}",
            month.period,
            month.amount,
            "█".repeat(width)
        );
    }
}

fn print_weekdays(result: &AggregateResult) {
    if result.spending_count == 0 {
        return;
    }

    println!();
    println!("📆 Average Spend by Day");
    for day in &result.avg_spending_by_day_of_week {
        println!("   {} │ {:>10.2}", day.day, day.average);
    }
}

fn print_recurring(result: &AggregateResult) {
    println!();
    if result.recurring_payments.is_empty() {
        println!("🔁 No recurring payments found.");
        return;
    }

    println!("🔁 Recurring Payments ({})", result.recurring_payments.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for payment in &result.recurring_payments {
        println!(
            "   {:30} │ {:>8.2} │ {}",
            truncate(&payment.description, 30),
            payment.amount,
            payment.months_charged
        );
    }
}
