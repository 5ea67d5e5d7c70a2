//! CSV import: bank format detection and row normalization

use std::io::Read;

use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Schema, Transaction};

/// Column names assigned to a headerless file, in positional order
const GENERIC_HEADERS: [&str; 4] = ["date", "description", "amount", "category"];

/// How a single source should be read
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Skip detection and use this schema
    pub schema: Option<Schema>,
    /// Treat the first row as data even if it looks like a header
    pub headerless: bool,
}

/// Result of parsing one CSV source
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub schema: Schema,
    pub transactions: Vec<Transaction>,
    /// Rows dropped for an unparseable date or a missing/zero amount
    pub rejected: usize,
}

/// Detect bank format from the set of header names
///
/// Schemas with more required columns are checked first so a richer
/// header is never classified by a looser match.
pub fn detect_schema<'a, I>(headers: I) -> Schema
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = headers.into_iter().map(clean_header).collect();
    let has_all = |cols: &[&str]| cols.iter().all(|c| names.contains(c));

    if has_all(&[
        "Account Number",
        "Transaction Description",
        "Transaction Date",
        "Transaction Amount",
        "Balance",
    ]) {
        return Schema::CapitalOne;
    }

    if has_all(&["Transaction Date", "Description", "Amount", "Category"]) {
        return Schema::Chase;
    }

    if has_all(&["Date", "Description", "Amount"]) {
        return Schema::Amex;
    }

    Schema::Unknown
}

fn clean_header(h: &str) -> &str {
    h.trim_start_matches('\u{feff}').trim()
}

/// One CSV data row viewed through its file's header row
pub struct RawRow<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    pub fn new(headers: &'a StringRecord, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Cell under the header with exactly this name
    pub fn get(&self, name: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| clean_header(h) == name)?;
        self.record.get(idx)
    }

    /// Cell under the first header containing `keyword`, ignoring case
    pub fn find(&self, keyword: &str) -> Option<&'a str> {
        let keyword = keyword.to_lowercase();
        let idx = self
            .headers
            .iter()
            .position(|h| clean_header(h).to_lowercase().contains(&keyword))?;
        self.record.get(idx)
    }
}

/// Normalize one row into a canonical transaction
///
/// Returns `None` when the row has no valid date or a missing, non-numeric
/// or zero amount. Rows of an `Unknown` schema are always rejected.
pub fn normalize_row(schema: Schema, row: &RawRow<'_>) -> Option<Transaction> {
    normalize_record(schema, row).ok()
}

fn normalize_record(schema: Schema, row: &RawRow<'_>) -> Result<Transaction> {
    let (date, description, category, amount) = match schema {
        Schema::Amex => (
            row.get("Date"),
            row.get("Description"),
            row.get("Category"),
            // Amex reports charges as positive numbers
            required(row.get("Amount"), "amount").and_then(parse_amount).map(|a| -a),
        ),
        Schema::Chase => (
            row.get("Transaction Date"),
            row.get("Description"),
            row.get("Category"),
            required(row.get("Amount"), "amount").and_then(parse_amount),
        ),
        Schema::CapitalOne => {
            let is_debit = row
                .get("Transaction Type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("debit"));
            let amount = required(row.get("Transaction Amount"), "amount")
                .and_then(parse_amount)
                .map(|a| if is_debit { -a } else { a });
            (
                row.get("Transaction Date"),
                row.get("Transaction Description"),
                None,
                amount,
            )
        }
        Schema::Generic => (
            row.find("date"),
            row.find("description"),
            row.find("category"),
            required(row.find("amount"), "amount").and_then(parse_amount),
        ),
        Schema::Unknown => {
            return Err(Error::UnsupportedBank(
                "rows of an unrecognized format cannot be normalized".into(),
            ))
        }
    };

    let amount = amount?;
    if amount == 0.0 {
        return Err(Error::Import("Zero amount".into()));
    }
    let date = parse_date(required(date, "date")?)?;

    Ok(Transaction {
        date,
        description: description.unwrap_or("").trim().to_string(),
        category: category.unwrap_or("").trim().to_string(),
        amount,
    })
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Import(format!("Missing {}", field)))
}

/// Parse CSV data into canonical transactions
///
/// The schema is detected from the header row unless one is forced in
/// `options`. A file whose first cell already parses as a date has no
/// usable header and is read with the generic positional layout.
/// Unrecognized headers produce an `Unknown` result with no transactions.
pub fn parse_csv<R: Read>(reader: R, options: &ImportOptions) -> Result<ParsedFile> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = rdr.records();
    let first = match records.next() {
        Some(record) => record?,
        None => return Err(Error::Import("CSV file is empty".into())),
    };

    let headerless = options.headerless || looks_headerless(&first);
    let (headers, schema, pending) = if headerless {
        (StringRecord::from(GENERIC_HEADERS.to_vec()), Schema::Generic, Some(first))
    } else {
        let schema = options
            .schema
            .unwrap_or_else(|| detect_schema(first.iter()));
        (first, schema, None)
    };

    if schema == Schema::Unknown {
        warn!(
            "Unrecognized CSV header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        );
        return Ok(ParsedFile {
            schema,
            transactions: Vec::new(),
            rejected: 0,
        });
    }

    debug!("Parsing CSV with {} format ({} columns)", schema, headers.len());

    let mut transactions = Vec::new();
    let mut rejected = 0;

    for (line, result) in pending.into_iter().map(Ok).chain(records).enumerate() {
        let record = result?;
        match normalize_record(schema, &RawRow::new(&headers, &record)) {
            Ok(tx) => transactions.push(tx),
            Err(e) => {
                debug!("Rejected row {}: {}", line + 1, e);
                rejected += 1;
            }
        }
    }

    debug!(
        "Parsed {} {} transactions ({} rejected)",
        transactions.len(),
        schema,
        rejected
    );

    Ok(ParsedFile {
        schema,
        transactions,
        rejected,
    })
}

fn looks_headerless(first: &StringRecord) -> bool {
    first
        .get(0)
        .map(|cell| parse_date(clean_header(cell)).is_ok())
        .unwrap_or(false)
}

/// Parse a date string in various common formats
///
/// Timestamps are truncated to their date part.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    // %Y accepts short years, so the two-digit form goes first
    let formats = [
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%b %d, %Y", // Jan 15, 2024
    ];

    for fmt in formats {
        match NaiveDate::parse_from_str(s, fmt) {
            Ok(date) if date.year() >= 1000 => return Ok(date),
            _ => {}
        }
    }

    // 2024-01-15T10:30:00Z, 2024-01-15 10:30
    if let Some((day, _time)) = s.split_once(['T', ' ']) {
        if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(Error::Import(format!("Unable to parse amount: {}", s))),
    }
}
