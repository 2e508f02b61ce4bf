//! `od_query` - Aggregation and reporting queries for Opsdeck
//!
//! This crate provides:
//! - Pure aggregation primitives over loaded tables (frequency ranking,
//!   category sums, date-indexed series)
//! - Domain views backing the analytics screens (top products, sales trend,
//!   revenue vs. expenses, reorder alerts)
//! - The digest report and the sales forecast seam
//!
//! Everything here is stateless: callers load a [`Table`] through
//! [`od_store::TableStore`] and pass it in.

use chrono::NaiveDate;
use indexmap::IndexMap;
use thiserror::Error;

use od_store::{InventoryItem, Sale, Table, Transaction, TxnType};

pub mod digest;
pub mod forecast;

pub use digest::{generate_digest, DigestReport, DigestSection, DigestSummary};
pub use forecast::{fit, forecast_series, LinearModel};

/// Query errors
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Store error: {0}")]
    Store(#[from] od_store::StoreError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not enough data: {0}")]
    NotEnoughData(String),
}

// ============================================================================
// Aggregation primitives
// ============================================================================

/// Most frequent value, with its count. Ties break toward the value seen
/// first in input order (the counts live in an insertion-ordered map).
/// Returns `None` for empty input.
pub fn most_frequent<I, S>(values: I) -> Option<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let counts = frequency_counts(values);
    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        let replace = match &best {
            Some((_, best_count)) => count > *best_count,
            None => true,
        };
        if replace {
            best = Some((value, count));
        }
    }
    best
}

/// Top `k` values by frequency, descending. Values with equal counts keep
/// their first-seen input order (stable sort over an insertion-ordered map).
pub fn top_k_by_frequency<I, S>(values: I, k: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ranked: Vec<(String, usize)> = frequency_counts(values).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(k);
    ranked
}

fn frequency_counts<I, S>(values: I) -> IndexMap<String, usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value.as_ref().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Sum of `amount` over rows whose category matches. No matches sum to 0.
pub fn sum_by_category<'a, I>(rows: I, category: &str) -> f64
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    rows.into_iter()
        .filter(|(row_category, _)| *row_category == category)
        .map(|(_, amount)| amount)
        .sum()
}

/// Parse `(date string, value)` rows into a series sorted ascending by date.
/// Dates must be calendar dates in `YYYY-MM-DD` form; the sort is stable, so
/// rows sharing a date keep their input order.
///
/// # Errors
///
/// Returns [`QueryError::Parse`] on the first malformed date. A bad row fails
/// the whole view rather than being silently dropped.
pub fn time_series<'a, I>(rows: I) -> Result<Vec<(NaiveDate, f64)>, QueryError>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut points = Vec::new();
    for (raw, value) in rows {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| QueryError::Parse(format!("invalid date '{raw}': {e}")))?;
        points.push((date, value));
    }
    points.sort_by_key(|(date, _)| *date);
    Ok(points)
}

// ============================================================================
// Domain views
// ============================================================================

/// Top products by units-sold frequency (the Sales Analytics bar chart).
#[must_use]
pub fn top_products(sales: &Table<Sale>, k: usize) -> Vec<(String, usize)> {
    top_k_by_frequency(sales.iter().map(|sale| sale.product_name.as_str()), k)
}

/// Top customers by purchase count (the Customer Insights view).
#[must_use]
pub fn top_customers(sales: &Table<Sale>, k: usize) -> Vec<(String, usize)> {
    top_k_by_frequency(sales.iter().map(|sale| sale.customer_name.as_str()), k)
}

/// Sale-date-indexed series of total prices (the Sales Trends line chart).
///
/// # Errors
///
/// Returns [`QueryError::Parse`] if any sale carries a malformed date.
pub fn sales_trend(sales: &Table<Sale>) -> Result<Vec<(NaiveDate, f64)>, QueryError> {
    time_series(
        sales
            .iter()
            .map(|sale| (sale.sale_date.as_str(), sale.total_price)),
    )
}

/// Total revenue recorded in the financial ledger.
#[must_use]
pub fn revenue_total(transactions: &Table<Transaction>) -> f64 {
    txn_total(transactions, TxnType::Revenue)
}

/// Total expenses recorded in the financial ledger.
#[must_use]
pub fn expense_total(transactions: &Table<Transaction>) -> f64 {
    txn_total(transactions, TxnType::Expense)
}

/// Revenue minus expenses.
#[must_use]
pub fn net_profit(transactions: &Table<Transaction>) -> f64 {
    revenue_total(transactions) - expense_total(transactions)
}

fn txn_total(transactions: &Table<Transaction>, txn_type: TxnType) -> f64 {
    sum_by_category(
        transactions
            .iter()
            .map(|txn| (txn.txn_type.as_str(), txn.amount)),
        txn_type.as_str(),
    )
}

/// Inventory items at or below their reorder threshold, in table order.
#[must_use]
pub fn reorder_alerts(inventory: &Table<InventoryItem>) -> Vec<&InventoryItem> {
    inventory.iter().filter(|item| item.needs_reorder()).collect()
}
