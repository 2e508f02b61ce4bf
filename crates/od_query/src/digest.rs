//! Business digest generation
//!
//! Aggregates sales, inventory, production, personnel, and finance into
//! one headline report (the dashboard's "key metrics", made concrete).

use serde::{Deserialize, Serialize};

use od_store::{Batch, BatchStatus, Employee, InventoryItem, Sale, TableStore, Transaction};

use crate::{
    expense_total, net_profit, reorder_alerts, revenue_total, top_customers, top_products,
    QueryError,
};

// ============================================================================
// Digest sections
// ============================================================================

/// A digest section with title and items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestSection {
    pub title: String,
    pub items: Vec<String>,
}

/// Complete digest report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestReport {
    pub generated_at: String,
    pub sections: Vec<DigestSection>,
    pub summary: DigestSummary,
}

/// High-level summary numbers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestSummary {
    pub total_sales: usize,
    pub production_batches: usize,
    pub inventory_items: usize,
    pub low_stock_items: usize,
    pub headcount: usize,
    pub revenue: f64,
    pub expenses: f64,
    pub net_profit: f64,
}

// ============================================================================
// Report generator
// ============================================================================

/// Generate a digest report from the store.
///
/// # Errors
///
/// Returns [`QueryError::Store`] if any table fails to load.
pub fn generate_digest(store: &TableStore) -> Result<DigestReport, QueryError> {
    let now = chrono::Utc::now();

    let mut sections = Vec::new();
    let mut summary = DigestSummary::default();

    sections.push(build_sales_section(store, &mut summary)?);
    sections.push(build_inventory_section(store, &mut summary)?);
    sections.push(build_production_section(store, &mut summary)?);
    sections.push(build_personnel_section(store, &mut summary)?);
    sections.push(build_finance_section(store, &mut summary)?);

    Ok(DigestReport {
        generated_at: now.to_rfc3339(),
        sections,
        summary,
    })
}

fn build_sales_section(
    store: &TableStore,
    summary: &mut DigestSummary,
) -> Result<DigestSection, QueryError> {
    let sales = store.load::<Sale>()?;
    let mut items = Vec::new();

    summary.total_sales = sales.len();
    let gross: f64 = sales.iter().map(|sale| sale.total_price).sum();
    items.push(format!("Sales recorded: {}", sales.len()));
    items.push(format!("Gross sales: ${gross:.2}"));

    if let Some((product, count)) = top_products(&sales, 1).into_iter().next() {
        items.push(format!("Top product: {product} ({count} sales)"));
    }
    if let Some((customer, count)) = top_customers(&sales, 1).into_iter().next() {
        items.push(format!("Top customer: {customer} ({count} purchases)"));
    }

    Ok(DigestSection {
        title: "Sales".to_string(),
        items,
    })
}

fn build_inventory_section(
    store: &TableStore,
    summary: &mut DigestSummary,
) -> Result<DigestSection, QueryError> {
    let inventory = store.load::<InventoryItem>()?;
    let mut items = Vec::new();

    summary.inventory_items = inventory.len();
    let units: u64 = inventory
        .iter()
        .map(|item| u64::from(item.stock_quantity))
        .sum();
    items.push(format!(
        "Products tracked: {} ({units} units in stock)",
        inventory.len()
    ));

    let low = reorder_alerts(&inventory);
    summary.low_stock_items = low.len();
    if low.is_empty() {
        items.push("No reorder alerts".to_string());
    } else {
        for item in low {
            items.push(format!(
                "Reorder: {} (stock {}, threshold {})",
                item.product_name, item.stock_quantity, item.reorder_level
            ));
        }
    }

    Ok(DigestSection {
        title: "Inventory".to_string(),
        items,
    })
}

fn build_production_section(
    store: &TableStore,
    summary: &mut DigestSummary,
) -> Result<DigestSection, QueryError> {
    let production = store.load::<Batch>()?;
    let mut items = Vec::new();

    summary.production_batches = production.len();
    let completed = production
        .iter()
        .filter(|batch| batch.status == BatchStatus::Completed)
        .count();
    let in_progress = production
        .iter()
        .filter(|batch| batch.status == BatchStatus::InProgress)
        .count();
    items.push(format!("Batches: {}", production.len()));
    items.push(format!(
        "Completed: {completed}, In progress: {in_progress}, Scheduled: {}",
        production.len() - completed - in_progress
    ));

    Ok(DigestSection {
        title: "Production".to_string(),
        items,
    })
}

fn build_personnel_section(
    store: &TableStore,
    summary: &mut DigestSummary,
) -> Result<DigestSection, QueryError> {
    let employees = store.load::<Employee>()?;
    let mut items = Vec::new();

    summary.headcount = employees.len();
    items.push(format!("Headcount: {}", employees.len()));

    if !employees.is_empty() {
        let total: u32 = employees.iter().map(|e| u32::from(e.attendance)).sum();
        let avg = f64::from(total) / employees.len() as f64;
        items.push(format!("Average attendance: {avg:.1}%"));
    }

    Ok(DigestSection {
        title: "Personnel".to_string(),
        items,
    })
}

fn build_finance_section(
    store: &TableStore,
    summary: &mut DigestSummary,
) -> Result<DigestSection, QueryError> {
    let ledger = store.load::<Transaction>()?;
    let mut items = Vec::new();

    summary.revenue = revenue_total(&ledger);
    summary.expenses = expense_total(&ledger);
    summary.net_profit = net_profit(&ledger);

    items.push(format!("Total revenue: ${:.2}", summary.revenue));
    items.push(format!("Total expenses: ${:.2}", summary.expenses));
    items.push(format!("Net profit: ${:.2}", summary.net_profit));

    Ok(DigestSection {
        title: "Finance".to_string(),
        items,
    })
}
