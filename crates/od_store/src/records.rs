//! Typed records for the five business tables.
//!
//! Field names serialize to the exact column headers the CSV files carry,
//! so files written here stay readable by spreadsheet tools and older
//! exports stay loadable.

use serde::{Deserialize, Serialize};

use crate::{StoreError, TableRecord};

fn require(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Production
// ============================================================================

/// Lifecycle state of a production batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BatchStatus {
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl BatchStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Scheduled => "Scheduled",
            BatchStatus::InProgress => "In Progress",
            BatchStatus::Completed => "Completed",
        }
    }
}

impl std::str::FromStr for BatchStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "scheduled" => Ok(BatchStatus::Scheduled),
            "in progress" | "in-progress" | "inprogress" => Ok(BatchStatus::InProgress),
            "completed" => Ok(BatchStatus::Completed),
            other => Err(format!("unknown batch status: {other}")),
        }
    }
}

/// One production batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(rename = "Batch ID")]
    pub batch_id: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Raw Materials Used")]
    pub raw_materials: String,
    #[serde(rename = "Quantity Produced")]
    pub quantity: u32,
    #[serde(rename = "Production Date")]
    pub production_date: String,
    #[serde(rename = "Status")]
    pub status: BatchStatus,
}

impl Batch {
    /// Build a batch awaiting ID assignment by the store.
    pub fn new(
        product_name: impl Into<String>,
        raw_materials: impl Into<String>,
        quantity: u32,
        production_date: impl Into<String>,
        status: BatchStatus,
    ) -> Self {
        Self {
            batch_id: String::new(),
            product_name: product_name.into(),
            raw_materials: raw_materials.into(),
            quantity,
            production_date: production_date.into(),
            status,
        }
    }
}

impl TableRecord for Batch {
    const FILE_NAME: &'static str = "production.csv";
    const ID_PREFIX: &'static str = "B";
    const COLUMNS: &'static [&'static str] = &[
        "Batch ID",
        "Product Name",
        "Raw Materials Used",
        "Quantity Produced",
        "Production Date",
        "Status",
    ];

    fn id(&self) -> &str {
        &self.batch_id
    }

    fn set_id(&mut self, id: String) {
        self.batch_id = id;
    }

    fn validate(&self) -> Result<(), StoreError> {
        require("Product Name", &self.product_name)?;
        require("Raw Materials Used", &self.raw_materials)?;
        require("Production Date", &self.production_date)?;
        Ok(())
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// One stocked product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "Product ID")]
    pub product_id: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Stock Quantity")]
    pub stock_quantity: u32,
    #[serde(rename = "Reorder Level")]
    pub reorder_level: u32,
    #[serde(rename = "Last Restocked")]
    pub last_restocked: String,
    #[serde(rename = "Expiration Date")]
    pub expiration_date: String,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Barcode")]
    pub barcode: String,
}

impl InventoryItem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product_name: impl Into<String>,
        stock_quantity: u32,
        reorder_level: u32,
        last_restocked: impl Into<String>,
        expiration_date: impl Into<String>,
        supplier: impl Into<String>,
        barcode: impl Into<String>,
    ) -> Self {
        Self {
            product_id: String::new(),
            product_name: product_name.into(),
            stock_quantity,
            reorder_level,
            last_restocked: last_restocked.into(),
            expiration_date: expiration_date.into(),
            supplier: supplier.into(),
            barcode: barcode.into(),
        }
    }

    /// Whether the item has fallen to (or below) its reorder threshold.
    #[must_use]
    pub fn needs_reorder(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }
}

impl TableRecord for InventoryItem {
    const FILE_NAME: &'static str = "inventory.csv";
    const ID_PREFIX: &'static str = "P";
    const COLUMNS: &'static [&'static str] = &[
        "Product ID",
        "Product Name",
        "Stock Quantity",
        "Reorder Level",
        "Last Restocked",
        "Expiration Date",
        "Supplier",
        "Barcode",
    ];

    fn id(&self) -> &str {
        &self.product_id
    }

    fn set_id(&mut self, id: String) {
        self.product_id = id;
    }

    fn validate(&self) -> Result<(), StoreError> {
        require("Product Name", &self.product_name)?;
        require("Supplier", &self.supplier)?;
        if self.reorder_level >= self.stock_quantity {
            return Err(StoreError::Validation {
                field: "Reorder Level".to_string(),
                reason: "must be less than Stock Quantity".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Sales
// ============================================================================

/// How a sale was paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Card,
    #[serde(rename = "Mobile Money")]
    MobileMoney,
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::MobileMoney => "Mobile Money",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "mobile money" | "mobile-money" | "mobilemoney" => Ok(PaymentMethod::MobileMoney),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// One point-of-sale transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "Sale ID")]
    pub sale_id: String,
    /// Reference to an inventory product, when the caller knows it.
    /// Empty when the sale was rung up free-form.
    #[serde(rename = "Product ID")]
    pub product_id: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Quantity Sold")]
    pub quantity_sold: u32,
    #[serde(rename = "Total Price")]
    pub total_price: f64,
    #[serde(rename = "Sale Date")]
    pub sale_date: String,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Payment Method")]
    pub payment_method: PaymentMethod,
}

impl Sale {
    pub fn new(
        product_name: impl Into<String>,
        quantity_sold: u32,
        total_price: f64,
        sale_date: impl Into<String>,
        customer_name: impl Into<String>,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            sale_id: String::new(),
            product_id: String::new(),
            product_name: product_name.into(),
            quantity_sold,
            total_price,
            sale_date: sale_date.into(),
            customer_name: customer_name.into(),
            payment_method,
        }
    }

    #[must_use]
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }
}

impl TableRecord for Sale {
    const FILE_NAME: &'static str = "sales.csv";
    const ID_PREFIX: &'static str = "S";
    const COLUMNS: &'static [&'static str] = &[
        "Sale ID",
        "Product ID",
        "Product Name",
        "Quantity Sold",
        "Total Price",
        "Sale Date",
        "Customer Name",
        "Payment Method",
    ];

    fn id(&self) -> &str {
        &self.sale_id
    }

    fn set_id(&mut self, id: String) {
        self.sale_id = id;
    }

    fn validate(&self) -> Result<(), StoreError> {
        require("Product Name", &self.product_name)?;
        require("Customer Name", &self.customer_name)?;
        require("Sale Date", &self.sale_date)?;
        Ok(())
    }
}

// ============================================================================
// Employees
// ============================================================================

/// Employee department
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Production,
    Sales,
    #[serde(rename = "HR")]
    Hr,
    Finance,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Production => "Production",
            Role::Sales => "Sales",
            Role::Hr => "HR",
            Role::Finance => "Finance",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "production" => Ok(Role::Production),
            "sales" => Ok(Role::Sales),
            "hr" => Ok(Role::Hr),
            "finance" => Ok(Role::Finance),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One personnel record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "Employee ID")]
    pub employee_id: String,
    #[serde(rename = "Employee Name")]
    pub name: String,
    #[serde(rename = "Role")]
    pub role: Role,
    #[serde(rename = "Salary")]
    pub salary: u32,
    #[serde(rename = "Join Date")]
    pub join_date: String,
    /// Attendance percentage, 0-100
    #[serde(rename = "Attendance")]
    pub attendance: u8,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        role: Role,
        salary: u32,
        join_date: impl Into<String>,
        attendance: u8,
    ) -> Self {
        Self {
            employee_id: String::new(),
            name: name.into(),
            role,
            salary,
            join_date: join_date.into(),
            attendance,
        }
    }
}

impl TableRecord for Employee {
    const FILE_NAME: &'static str = "employees.csv";
    const ID_PREFIX: &'static str = "E";
    const COLUMNS: &'static [&'static str] = &[
        "Employee ID",
        "Employee Name",
        "Role",
        "Salary",
        "Join Date",
        "Attendance",
    ];

    fn id(&self) -> &str {
        &self.employee_id
    }

    fn set_id(&mut self, id: String) {
        self.employee_id = id;
    }

    fn validate(&self) -> Result<(), StoreError> {
        require("Employee Name", &self.name)?;
        require("Join Date", &self.join_date)?;
        if self.attendance > 100 {
            return Err(StoreError::Validation {
                field: "Attendance".to_string(),
                reason: "must be between 0 and 100".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Financial
// ============================================================================

/// Direction of a financial transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxnType {
    Revenue,
    Expense,
}

impl TxnType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Revenue => "Revenue",
            TxnType::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for TxnType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "revenue" => Ok(TxnType::Revenue),
            "expense" => Ok(TxnType::Expense),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Transaction ID")]
    pub transaction_id: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Type")]
    pub txn_type: TxnType,
    #[serde(rename = "Date")]
    pub date: String,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        txn_type: TxnType,
        date: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: String::new(),
            description: description.into(),
            amount,
            txn_type,
            date: date.into(),
        }
    }
}

impl TableRecord for Transaction {
    const FILE_NAME: &'static str = "financial.csv";
    const ID_PREFIX: &'static str = "T";
    const COLUMNS: &'static [&'static str] = &[
        "Transaction ID",
        "Description",
        "Amount",
        "Type",
        "Date",
    ];

    fn id(&self) -> &str {
        &self.transaction_id
    }

    fn set_id(&mut self, id: String) {
        self.transaction_id = id;
    }

    fn validate(&self) -> Result<(), StoreError> {
        require("Description", &self.description)?;
        require("Date", &self.date)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_status_round_trip() {
        for status in [
            BatchStatus::Scheduled,
            BatchStatus::InProgress,
            BatchStatus::Completed,
        ] {
            let parsed: BatchStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_payment_method_parse_variants() {
        assert_eq!(
            "Mobile Money".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::MobileMoney
        );
        assert_eq!(
            "mobile-money".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::MobileMoney
        );
        assert!("barter".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("hr".parse::<Role>().unwrap(), Role::Hr);
        assert_eq!("Finance".parse::<Role>().unwrap(), Role::Finance);
        assert!("intern".parse::<Role>().is_err());
    }

    #[test]
    fn test_batch_requires_product_name() {
        let batch = Batch::new("", "shea butter", 10, "2024-01-01", BatchStatus::Scheduled);
        let err = batch.validate().unwrap_err();
        assert!(err.to_string().contains("Product Name"));
    }

    #[test]
    fn test_inventory_reorder_rule() {
        let item = InventoryItem::new(
            "Lotion X",
            10,
            10,
            "2024-01-01",
            "2025-01-01",
            "Acme Supplies",
            "CBW-123456",
        );
        let err = item.validate().unwrap_err();
        assert!(err.to_string().contains("Reorder Level"));

        let ok = InventoryItem::new(
            "Lotion X",
            10,
            4,
            "2024-01-01",
            "2025-01-01",
            "Acme Supplies",
            "CBW-123456",
        );
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_needs_reorder() {
        let mut item = InventoryItem::new(
            "Soap",
            20,
            5,
            "2024-01-01",
            "2025-01-01",
            "Acme",
            "CBW-000001",
        );
        assert!(!item.needs_reorder());
        item.stock_quantity = 5;
        assert!(item.needs_reorder());
    }

    #[test]
    fn test_employee_attendance_bounds() {
        let employee = Employee::new("Ama", Role::Production, 1200, "2023-06-01", 101);
        let err = employee.validate().unwrap_err();
        assert!(err.to_string().contains("Attendance"));
    }

    #[test]
    fn test_sale_with_product_id() {
        let sale = Sale::new("Lotion X", 2, 20.0, "2024-01-01", "Jane", PaymentMethod::Cash)
            .with_product_id("P004");
        assert_eq!(sale.product_id, "P004");
    }
}
