//! Transaction listing and balance commands

use anyhow::{Context, Result};
use spendlens_core::aggregate::balance_trend;
use spendlens_core::Transaction;

use super::core::{format_amount, load_batch};
use super::truncate;
use crate::cli::InputArgs;

pub async fn cmd_transactions(input: &InputArgs, limit: usize, json: bool) -> Result<()> {
    let batch = load_batch(input).await?;
    let recent = most_recent(&batch.transactions, limit);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recent).context("Failed to serialize transactions")?
        );
        return Ok(());
    }

    if recent.is_empty() {
        println!("No transactions found in the given files.");
        return Ok(());
    }

    println!();
    println!(
        "📝 Recent Transactions ({} of {})",
        recent.len(),
        batch.transactions.len()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in recent {
        let category = if tx.has_category() {
            format!(" [{}]", truncate(&tx.category, 20))
        } else {
            String::new()
        };
        println!(
            "   {} │ {:>10} │ {}{}",
            tx.date,
            format_amount(tx.amount),
            truncate(&tx.description, 40),
            category
        );
    }

    Ok(())
}

/// Newest first; same-day transactions keep their pooled order
pub fn most_recent(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));
    ordered.truncate(limit);
    ordered
}

pub async fn cmd_balance(input: &InputArgs, json: bool) -> Result<()> {
    let batch = load_batch(input).await?;
    let trend = balance_trend(&batch.transactions);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&trend).context("Failed to serialize balance trend")?
        );
        return Ok(());
    }

    if trend.is_empty() {
        println!("No transactions found in the given files.");
        return Ok(());
    }

    println!();
    println!("📈 Balance Trend");
    println!("   ─────────────────────────────────────────────────────────────");

    for (tx, point) in chronological(&batch.transactions).iter().zip(&trend) {
        println!(
            "   {} │ {:>10} │ {:>12.2} │ {}",
            point.date,
            format_amount(tx.amount),
            point.running_balance,
            truncate(&tx.description, 30)
        );
    }

    Ok(())
}

/// Chronological order matching `balance_trend`
fn chronological(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.date);
    ordered
}
