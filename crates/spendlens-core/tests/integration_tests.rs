//! Integration tests for spendlens-core
//!
//! These tests exercise the full file → detect → normalize → aggregate workflow.

use std::io::Write;
use std::path::{Path, PathBuf};

use spendlens_core::{
    aggregate, aggregate_with, load_files, load_readers, parse_csv, AggregateConfig, FileOutcome,
    ImportOptions, Schema,
};

/// Chase export with three monthly subscriptions (Netflix, Spotify, Hulu)
/// across Jan-Mar, a paycheck, one zero-amount row and one bad date.
fn chase_csv() -> &'static str {
    r#"Transaction Date,Post Date,Description,Category,Type,Amount,Memo
01/15/2024,01/16/2024,NETFLIX.COM,Entertainment,Sale,-15.49,
02/15/2024,02/16/2024,NETFLIX.COM,Entertainment,Sale,-15.49,
03/15/2024,03/16/2024,NETFLIX.COM,Entertainment,Sale,-15.49,
01/20/2024,01/21/2024,SPOTIFY USA,Entertainment,Sale,-10.99,
02/20/2024,02/21/2024,SPOTIFY USA,Entertainment,Sale,-10.99,
01/01/2024,01/02/2024,HULU,Entertainment,Sale,-17.99,
02/01/2024,02/02/2024,HULU,Entertainment,Sale,-17.99,
03/01/2024,03/02/2024,HULU,Entertainment,Sale,-17.99,
01/31/2024,01/31/2024,PAYROLL,Income,Payment,2500.00,
02/05/2024,02/05/2024,REFUNDED,Shopping,Sale,0.00,
not-a-date,02/06/2024,MYSTERY,Shopping,Sale,-5.00,"#
}

/// Amex export: charges are positive, payments negative
fn amex_csv() -> &'static str {
    r#"Date,Description,Card Member,Account #,Amount,Category
01/10/2024,WHOLE FOODS MARKET,J DOE,-12345,84.20,Groceries
02/10/2024,WHOLE FOODS MARKET,J DOE,-12345,91.05,Groceries
03/02/2024,DELTA AIR LINES,J DOE,-12345,412.00,Travel
03/05/2024,AUTOPAY PAYMENT - THANK YOU,J DOE,-12345,-600.00,Payment"#
}

fn capital_one_csv() -> &'static str {
    r#"Account Number,Transaction Description,Transaction Date,Transaction Type,Transaction Amount,Balance
1234,SHELL OIL,2024-01-08,Debit,45.00,955.00
1234,DIRECT DEPOSIT,2024-01-15,Credit,1200.00,2155.00
1234,SHELL OIL,2024-02-08,Debit,48.50,2106.50"#
}

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create fixture");
    file.write_all(contents.as_bytes()).expect("Failed to write fixture");
    path
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Import Tests
// =============================================================================

#[test]
fn test_detection_per_schema() {
    let options = ImportOptions::default();

    let chase = parse_csv(chase_csv().as_bytes(), &options).unwrap();
    let amex = parse_csv(amex_csv().as_bytes(), &options).unwrap();
    let capital_one = parse_csv(capital_one_csv().as_bytes(), &options).unwrap();
    let unknown = parse_csv("Foo,Bar,Baz\n1,2,3\n".as_bytes(), &options).unwrap();

    assert_eq!(chase.schema, Schema::Chase);
    assert_eq!(amex.schema, Schema::Amex);
    assert_eq!(capital_one.schema, Schema::CapitalOne);
    assert_eq!(unknown.schema, Schema::Unknown);
    assert!(unknown.transactions.is_empty());
}

#[test]
fn test_bad_rows_are_dropped() {
    let parsed = parse_csv(chase_csv().as_bytes(), &ImportOptions::default()).unwrap();

    assert_eq!(parsed.transactions.len(), 9);
    assert_eq!(parsed.rejected, 2);
    assert!(parsed
        .transactions
        .iter()
        .all(|t| t.description != "REFUNDED" && t.description != "MYSTERY"));
}

#[test]
fn test_sign_conventions_across_banks() {
    let options = ImportOptions::default();
    let amex = parse_csv(amex_csv().as_bytes(), &options).unwrap();
    let capital_one = parse_csv(capital_one_csv().as_bytes(), &options).unwrap();

    assert_eq!(amex.transactions[0].amount, -84.20);
    assert_eq!(amex.transactions[3].amount, 600.00);
    assert_eq!(capital_one.transactions[0].amount, -45.00);
    assert_eq!(capital_one.transactions[1].amount, 1200.00);
    assert!(capital_one.transactions.iter().all(|t| t.category.is_empty()));
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[test]
fn test_full_aggregate_workflow() {
    let batch = load_readers(
        vec![
            ("chase.csv".to_string(), chase_csv().as_bytes()),
            ("amex.csv".to_string(), amex_csv().as_bytes()),
        ],
        &ImportOptions::default(),
    );

    assert_eq!(batch.imported_files(), 2);
    assert_eq!(batch.rejected_rows(), 2);
    assert_eq!(batch.transactions.len(), 13);

    let result = aggregate(&batch.transactions);

    // Totals partition the set
    assert_eq!(
        result.spending_count + result.income_count,
        result.transaction_count
    );
    let spent: f64 = batch
        .transactions
        .iter()
        .filter(|t| t.amount < 0.0)
        .map(|t| -t.amount)
        .sum();
    let income: f64 = batch
        .transactions
        .iter()
        .filter(|t| t.amount >= 0.0)
        .map(|t| t.amount)
        .sum();
    assert_close(result.total_spent, spent);
    assert_close(result.total_income, income);

    // Breakdown sums to total spend
    let breakdown: f64 = result.category_breakdown.iter().map(|c| c.value).sum();
    assert_close(breakdown, result.total_spent);

    let largest = result.largest_expense.as_ref().unwrap();
    assert_eq!(largest.description, "DELTA AIR LINES");
    assert_close(largest.amount, 412.00);

    let top = result.top_merchant.as_ref().unwrap();
    assert_eq!(top.name, "DELTA AIR LINES");

    // Netflix and Hulu hit three months, Spotify only two
    let recurring: Vec<&str> = result
        .recurring_payments
        .iter()
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(recurring, vec!["HULU", "NETFLIX.COM"]);
    assert_eq!(result.recurring_payments[0].months_charged, "Jan, Feb, Mar");

    let range = result.date_range.unwrap();
    assert_eq!(range.earliest.to_string(), "2024-01-01");
    assert_eq!(range.latest.to_string(), "2024-03-15");

    let months: Vec<&str> = result
        .monthly_spending
        .iter()
        .map(|m| m.period.as_str())
        .collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

    let last = result.balance_trend.last().unwrap();
    assert_close(last.running_balance, income - spent);
}

#[test]
fn test_aggregate_is_idempotent() {
    let parsed = parse_csv(chase_csv().as_bytes(), &ImportOptions::default()).unwrap();
    let first = aggregate(&parsed.transactions);
    let second = aggregate(&parsed.transactions);
    assert_eq!(first, second);
}

#[test]
fn test_capital_one_only_is_uncategorized() {
    let parsed = parse_csv(capital_one_csv().as_bytes(), &ImportOptions::default()).unwrap();
    let result = aggregate(&parsed.transactions);

    assert!(!result.has_category_data);
    assert_eq!(result.category_breakdown.len(), 1);
    assert_eq!(result.category_breakdown[0].name, "Uncategorized");
    assert_close(result.category_breakdown[0].value, 93.50);
}

#[test]
fn test_recurring_threshold_is_configurable() {
    let parsed = parse_csv(chase_csv().as_bytes(), &ImportOptions::default()).unwrap();
    let config = AggregateConfig {
        recurring_min_months: 2,
        ..AggregateConfig::default()
    };
    let result = aggregate_with(&parsed.transactions, &config);

    assert_eq!(result.recurring_payments.len(), 3);
    assert!(result
        .recurring_payments
        .iter()
        .any(|r| r.description == "SPOTIFY USA" && r.months_charged == "Jan, Feb"));
}

#[test]
fn test_headerless_file() {
    let csv = "2024-01-05,COFFEE SHOP,-4.50\n2024-01-06,BOOKSTORE,-22.00\n2024-01-07,REFUND,4.50\n";
    let parsed = parse_csv(csv.as_bytes(), &ImportOptions::default()).unwrap();

    assert_eq!(parsed.schema, Schema::Generic);
    assert_eq!(parsed.transactions.len(), 3);

    let result = aggregate(&parsed.transactions);
    assert_close(result.total_spent, 26.50);
    assert_close(result.total_income, 4.50);
}

// =============================================================================
// Batch Loading Tests
// =============================================================================

#[tokio::test]
async fn test_load_files_skips_bad_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let chase = write_csv(dir.path(), "chase.csv", chase_csv());
    let unknown = write_csv(dir.path(), "unknown.csv", "Foo,Bar\n1,2\n");
    let empty = write_csv(dir.path(), "empty.csv", "");
    let capital_one = write_csv(dir.path(), "capone.csv", capital_one_csv());

    let batch = load_files(
        &[chase, unknown, empty, capital_one],
        &ImportOptions::default(),
    )
    .await;

    assert_eq!(batch.files.len(), 4);
    assert_eq!(batch.imported_files(), 2);
    assert_eq!(batch.skipped_files(), 2);
    assert_eq!(batch.transactions.len(), 12);
    assert!(matches!(
        batch.files[3].outcome,
        FileOutcome::Imported {
            schema: Schema::CapitalOne,
            imported: 3,
            rejected: 0,
        }
    ));

    let result = aggregate(&batch.transactions);
    assert!(result.has_category_data);
}

#[tokio::test]
async fn test_load_files_all_skipped_gives_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let unknown = write_csv(dir.path(), "unknown.csv", "Foo,Bar\n1,2\n");

    let batch = load_files(&[unknown], &ImportOptions::default()).await;
    let result = aggregate(&batch.transactions);

    assert!(result.is_empty());
    assert_eq!(result.total_spent, 0.0);
    assert!(result.category_breakdown.is_empty());
}
