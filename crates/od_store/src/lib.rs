//! `od_store` - CSV table storage layer for Opsdeck
//!
//! This crate provides:
//! - Typed records for the five business tables
//! - Whole-file load/append/save with sequential ID assignment
//! - Insert-time validation (required fields, domain rules)
//! - Optional advisory file locking for the read-modify-write cycle
//!
//! Tables only grow: records are created through [`TableStore::append`] and
//! there is no update or delete path. IDs are `<prefix><row count + 1>`
//! zero-padded to three digits, which is deliberately not collision-safe --
//! two unlocked writers can race to the same ID. Enable locking through
//! [`TableStore::with_locking`] to serialize the cycle per table.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub mod records;
pub use records::{
    Batch, BatchStatus, Employee, InventoryItem, PaymentMethod, Role, Sale, Transaction, TxnType,
};

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A typed row in one of the business tables.
///
/// Implementations declare the file the table persists to, the ID prefix,
/// and the column headers in persisted order. `validate` runs before an ID
/// is assigned; a rejected record leaves the table untouched.
pub trait TableRecord: Clone + Serialize + DeserializeOwned {
    /// File name under the data directory
    const FILE_NAME: &'static str;
    /// Prefix for sequential IDs ("B" yields "B001", "B002", ...)
    const ID_PREFIX: &'static str;
    /// Column headers, in persisted order
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Check required fields and domain acceptance rules.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] naming the offending field.
    fn validate(&self) -> Result<(), StoreError>;
}

/// An in-memory table: an ordered sequence of same-schema records.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R: TableRecord> Table<R> {
    #[must_use]
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column headers declared by the schema, present even when no file exists.
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    /// Next sequential ID, derived from the current row count.
    #[must_use]
    pub fn next_id(&self) -> String {
        format!("{}{:03}", R::ID_PREFIX, self.rows.len() + 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R: TableRecord> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R: TableRecord> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Main storage handle: one CSV file per table under a data directory.
#[derive(Debug, Clone)]
pub struct TableStore {
    data_dir: PathBuf,
    locking: bool,
}

impl TableStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    #[instrument]
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;
        info!(dir = %data_dir.display(), "Opening table store");
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            locking: false,
        })
    }

    /// Serialize each append's read-modify-write cycle behind an exclusive
    /// advisory file lock. Off by default: the unlocked lost-update behavior
    /// of the original file format is preserved unless asked for.
    #[must_use]
    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn table_path<R: TableRecord>(&self) -> PathBuf {
        self.data_dir.join(R::FILE_NAME)
    }

    /// Load the full table for `R`.
    ///
    /// A missing file is not an error: it yields an empty table that still
    /// reports the schema's declared columns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] when a present file has rows that fail
    /// typed decoding (malformed numerics, unknown enum strings).
    pub fn load<R: TableRecord>(&self) -> Result<Table<R>, StoreError> {
        let path = self.table_path::<R>();
        if !path.exists() {
            debug!(table = R::FILE_NAME, "Table file absent, substituting empty table");
            return Ok(Table::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(Table { rows })
    }

    /// Persist the full table, overwriting the previous file. An empty table
    /// writes a header-only file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure. Not atomic: a
    /// crash mid-write can leave a truncated file, faithful to the original
    /// whole-file-rewrite design.
    pub fn save<R: TableRecord>(&self, table: &Table<R>) -> Result<(), StoreError> {
        let path = self.table_path::<R>();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(R::COLUMNS)?;
        for row in table.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Validate `record`, assign the next sequential ID, append, and rewrite
    /// the table file. Returns the stored record with its ID filled in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the record is rejected (the
    /// table file is untouched), or [`StoreError::Csv`]/[`StoreError::Io`]
    /// from the load/save cycle.
    pub fn append<R: TableRecord>(&self, mut record: R) -> Result<R, StoreError> {
        record.validate()?;

        let _guard = if self.locking {
            Some(self.lock_table::<R>()?)
        } else {
            None
        };

        let mut table = self.load::<R>()?;
        record.set_id(table.next_id());
        table.rows.push(record.clone());
        self.save(&table)?;
        debug!(table = R::FILE_NAME, id = record.id(), "Appended record");
        Ok(record)
    }

    fn lock_table<R: TableRecord>(&self) -> Result<TableLock, StoreError> {
        let lock_path = self.data_dir.join(format!("{}.lock", R::FILE_NAME));
        TableLock::acquire(&lock_path)
    }
}

/// Scoped exclusive lock on a table's companion lock file.
struct TableLock {
    file: File,
}

impl TableLock {
    fn acquire(path: &Path) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, TableStore) {
        let dir = TempDir::new().unwrap();
        let store = TableStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn sample_sale(customer: &str) -> Sale {
        Sale::new(
            "Lotion X",
            5,
            50.0,
            "2024-01-01",
            customer,
            PaymentMethod::Cash,
        )
    }

    // =========================================================================
    // Load
    // =========================================================================

    #[test]
    fn test_load_missing_file_is_empty_table() {
        let (_dir, store) = temp_store();
        let table: Table<Sale> = store.load().unwrap();
        assert!(table.is_empty());
        assert_eq!(
            table.columns(),
            &[
                "Sale ID",
                "Product ID",
                "Product Name",
                "Quantity Sold",
                "Total Price",
                "Sale Date",
                "Customer Name",
                "Payment Method",
            ]
        );
    }

    #[test]
    fn test_load_header_only_file_is_empty_table() {
        let (_dir, store) = temp_store();
        store.save(&Table::<Batch>::new()).unwrap();
        let table: Table<Batch> = store.load().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_malformed_numeric_is_error() {
        let (dir, store) = temp_store();
        std::fs::write(
            dir.path().join(Transaction::FILE_NAME),
            "Transaction ID,Description,Amount,Type,Date\nT001,Rent,not-a-number,Expense,2024-01-01\n",
        )
        .unwrap();
        assert!(store.load::<Transaction>().is_err());
    }

    // =========================================================================
    // Append
    // =========================================================================

    #[test]
    fn test_append_assigns_sequential_ids() {
        let (_dir, store) = temp_store();

        let first = store.append(sample_sale("Jane")).unwrap();
        assert_eq!(first.sale_id, "S001");

        let second = store.append(sample_sale("Kofi")).unwrap();
        assert_eq!(second.sale_id, "S002");

        let table: Table<Sale> = store.load().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].customer_name, "Kofi");
    }

    #[test]
    fn test_append_zero_pads_ids() {
        let (_dir, store) = temp_store();
        for i in 0..11 {
            store.append(sample_sale(&format!("c{i}"))).unwrap();
        }
        let table: Table<Sale> = store.load().unwrap();
        assert_eq!(table.rows()[8].sale_id, "S009");
        assert_eq!(table.rows()[10].sale_id, "S011");
    }

    #[test]
    fn test_append_rejected_leaves_table_unchanged() {
        let (_dir, store) = temp_store();
        store.append(sample_sale("Jane")).unwrap();

        let bad = InventoryItem::new(
            "Lotion X",
            5,
            9,
            "2024-01-01",
            "2025-01-01",
            "Acme",
            "CBW-111111",
        );
        let err = store.append(bad).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let inventory: Table<InventoryItem> = store.load().unwrap();
        assert!(inventory.is_empty());
        let sales: Table<Sale> = store.load().unwrap();
        assert_eq!(sales.len(), 1);
    }

    #[test]
    fn test_append_preserves_caller_product_id() {
        let (_dir, store) = temp_store();
        let sale = store
            .append(sample_sale("Jane").with_product_id("P007"))
            .unwrap();
        assert_eq!(sale.product_id, "P007");

        let table: Table<Sale> = store.load().unwrap();
        assert_eq!(table.rows()[0].product_id, "P007");
    }

    #[test]
    fn test_append_with_locking_enabled() {
        let (_dir, store) = temp_store();
        let store = store.with_locking(true);
        let sale = store.append(sample_sale("Jane")).unwrap();
        assert_eq!(sale.sale_id, "S001");
        let table: Table<Sale> = store.load().unwrap();
        assert_eq!(table.len(), 1);
    }

    // =========================================================================
    // Round trip
    // =========================================================================

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = temp_store();
        store
            .append(Batch::new(
                "Body Butter",
                "shea butter, cocoa butter",
                40,
                "2024-02-10",
                BatchStatus::InProgress,
            ))
            .unwrap();
        store
            .append(Batch::new(
                "Lip Balm",
                "beeswax, coconut oil",
                120,
                "2024-02-11",
                BatchStatus::Completed,
            ))
            .unwrap();

        let loaded: Table<Batch> = store.load().unwrap();
        store.save(&loaded).unwrap();
        let reloaded: Table<Batch> = store.load().unwrap();
        assert_eq!(loaded, reloaded);
        assert_eq!(reloaded.rows()[0].status, BatchStatus::InProgress);
    }

    #[test]
    fn test_round_trip_preserves_commas_in_fields() {
        let (_dir, store) = temp_store();
        store
            .append(Batch::new(
                "Soap, Bar",
                "lye, olive oil, fragrance",
                10,
                "2024-03-01",
                BatchStatus::Scheduled,
            ))
            .unwrap();
        let table: Table<Batch> = store.load().unwrap();
        assert_eq!(table.rows()[0].product_name, "Soap, Bar");
        assert_eq!(table.rows()[0].raw_materials, "lye, olive oil, fragrance");
    }

    #[test]
    fn test_all_tables_append_and_reload() {
        let (_dir, store) = temp_store();

        store
            .append(Batch::new(
                "Lotion X",
                "aloe",
                10,
                "2024-01-01",
                BatchStatus::Scheduled,
            ))
            .unwrap();
        store
            .append(InventoryItem::new(
                "Lotion X",
                50,
                10,
                "2024-01-01",
                "2025-01-01",
                "Acme",
                "CBW-654321",
            ))
            .unwrap();
        store.append(sample_sale("Jane")).unwrap();
        store
            .append(Employee::new("Ama", Role::Sales, 900, "2023-05-02", 96))
            .unwrap();
        store
            .append(Transaction::new(
                "January sales",
                150.0,
                TxnType::Revenue,
                "2024-01-31",
            ))
            .unwrap();

        assert_eq!(store.load::<Batch>().unwrap().rows()[0].batch_id, "B001");
        assert_eq!(
            store.load::<InventoryItem>().unwrap().rows()[0].product_id,
            "P001"
        );
        assert_eq!(store.load::<Sale>().unwrap().rows()[0].sale_id, "S001");
        assert_eq!(
            store.load::<Employee>().unwrap().rows()[0].employee_id,
            "E001"
        );
        assert_eq!(
            store.load::<Transaction>().unwrap().rows()[0].transaction_id,
            "T001"
        );
    }
}
