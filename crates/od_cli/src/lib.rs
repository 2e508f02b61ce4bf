//! `od_cli` - CLI commands for Opsdeck
//!
//! This crate provides:
//! - clap-based command definitions
//! - Text and JSON output formatting
//! - All subcommands (production, inventory, pos, staff, finance, report)
//!
//! Every command is one synchronous load-mutate-save cycle against the
//! table store; there is no background work.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use od_config::OdConfig;
use od_store::{
    Batch, BatchStatus, Employee, InventoryItem, PaymentMethod, Role, Sale, TableStore,
    Transaction, TxnType,
};

/// CLI errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Config error: {0}")]
    Config(#[from] od_config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] od_store::StoreError),

    #[error("Query error: {0}")]
    Query(#[from] od_query::QueryError),

    #[error("Scan error: {0}")]
    Scan(#[from] od_scan::ScanError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Standard JSON output
    Json,
}

/// Main CLI application
#[derive(Parser, Debug)]
#[command(name = "od")]
#[command(
    author,
    version,
    about = "Opsdeck - production, inventory, POS, personnel, and finance in flat files"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for commands
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Production batch tracking
    Production {
        #[command(subcommand)]
        command: ProductionCommands,
    },

    /// Inventory and barcode management
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },

    /// Point of sale
    Pos {
        #[command(subcommand)]
        command: PosCommands,
    },

    /// Personnel records
    Staff {
        #[command(subcommand)]
        command: StaffCommands,
    },

    /// Financial ledger
    Finance {
        #[command(subcommand)]
        command: FinanceCommands,
    },

    /// Analytics and reporting
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Production subcommands
#[derive(Subcommand, Debug)]
pub enum ProductionCommands {
    /// Record a new production batch
    Add {
        /// Product name
        #[arg(long)]
        product: String,

        /// Raw materials used
        #[arg(long)]
        materials: String,

        /// Quantity produced
        #[arg(long)]
        quantity: u32,

        /// Production date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Batch status
        #[arg(long, default_value = "scheduled")]
        status: BatchStatus,
    },

    /// List production batches
    List,
}

/// Inventory subcommands
#[derive(Subcommand, Debug)]
pub enum InventoryCommands {
    /// Stock a new product
    Add {
        /// Product name
        #[arg(long)]
        product: String,

        /// Stock quantity
        #[arg(long)]
        stock: u32,

        /// Reorder threshold (must be below stock)
        #[arg(long)]
        reorder: u32,

        /// Last restocked date (YYYY-MM-DD)
        #[arg(long)]
        restocked: NaiveDate,

        /// Expiration date (YYYY-MM-DD)
        #[arg(long)]
        expires: NaiveDate,

        /// Supplier name
        #[arg(long)]
        supplier: String,

        /// Barcode label; generated when omitted
        #[arg(long)]
        barcode: Option<String>,
    },

    /// List stocked products
    List,

    /// Show items at or below their reorder threshold
    Alerts,

    /// Decode a barcode label image
    Scan {
        /// Path to the label image
        image: PathBuf,
    },
}

/// Point-of-sale subcommands
#[derive(Subcommand, Debug)]
pub enum PosCommands {
    /// Process a sale
    Sell {
        /// Product name
        #[arg(long)]
        product: String,

        /// Quantity sold
        #[arg(long)]
        quantity: u32,

        /// Total price
        #[arg(long)]
        price: f64,

        /// Sale date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Customer name
        #[arg(long)]
        customer: String,

        /// Payment method
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,

        /// Inventory product ID, when known
        #[arg(long)]
        product_id: Option<String>,
    },

    /// Show sales history
    History,
}

/// Personnel subcommands
#[derive(Subcommand, Debug)]
pub enum StaffCommands {
    /// Add an employee
    Add {
        /// Employee name
        #[arg(long)]
        name: String,

        /// Role (production, sales, hr, finance)
        #[arg(long)]
        role: Role,

        /// Salary
        #[arg(long)]
        salary: u32,

        /// Join date (YYYY-MM-DD)
        #[arg(long)]
        joined: NaiveDate,

        /// Attendance percentage (0-100)
        #[arg(long)]
        attendance: u8,
    },

    /// List employees
    List,
}

/// Finance subcommands
#[derive(Subcommand, Debug)]
pub enum FinanceCommands {
    /// Record a transaction
    Add {
        /// Transaction description
        #[arg(long)]
        description: String,

        /// Amount
        #[arg(long)]
        amount: f64,

        /// Transaction type (revenue, expense)
        #[arg(long = "type")]
        txn_type: TxnType,

        /// Transaction date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },

    /// List transactions, optionally one type only
    List {
        /// Filter by type (revenue, expense)
        #[arg(long = "type")]
        txn_type: Option<TxnType>,
    },

    /// Revenue vs. expenses summary
    Summary,
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Full business digest
    Digest,

    /// Top products by sales count
    TopProducts {
        /// How many products to show
        #[arg(short, default_value = "5")]
        k: usize,
    },

    /// Top customers by purchase count
    TopCustomers {
        /// How many customers to show
        #[arg(short, default_value = "5")]
        k: usize,
    },

    /// Sales trend (date-ordered totals)
    Trend,

    /// Sales forecast from the linear trend
    Forecast {
        /// Days to forecast; defaults to the configured horizon
        #[arg(long)]
        days: Option<u32>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show config file search paths
    Paths,
}

impl Cli {
    /// Run the CLI
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when the command fails; validation rejections
    /// and parse failures surface here with the offending field or value.
    pub fn run(self) -> Result<(), CliError> {
        let config = load_config(self.config.as_deref())?;

        match self.command {
            Commands::Production { command } => {
                let store = open_store(&config)?;
                match command {
                    ProductionCommands::Add {
                        product,
                        materials,
                        quantity,
                        date,
                        status,
                    } => {
                        let batch = store.append(Batch::new(
                            product,
                            materials,
                            quantity,
                            date.to_string(),
                            status,
                        ))?;
                        println!(
                            "Production batch {} for {} added",
                            batch.batch_id, batch.product_name
                        );
                    }
                    ProductionCommands::List => {
                        let table = store.load::<Batch>()?;
                        print_rows(table.rows(), self.format, |batch| {
                            format!(
                                "{}  {}  qty {}  {}  {}",
                                batch.batch_id,
                                batch.product_name,
                                batch.quantity,
                                batch.production_date,
                                batch.status.as_str()
                            )
                        })?;
                    }
                }
            }
            Commands::Inventory { command } => {
                let store = open_store(&config)?;
                match command {
                    InventoryCommands::Add {
                        product,
                        stock,
                        reorder,
                        restocked,
                        expires,
                        supplier,
                        barcode,
                    } => {
                        let barcode = barcode.unwrap_or_else(|| {
                            od_scan::generate_label(&config.barcode.label_prefix)
                        });
                        let item = store.append(InventoryItem::new(
                            product,
                            stock,
                            reorder,
                            restocked.to_string(),
                            expires.to_string(),
                            supplier,
                            barcode,
                        ))?;
                        println!(
                            "{} added to inventory as {} (barcode {})",
                            item.product_name, item.product_id, item.barcode
                        );
                    }
                    InventoryCommands::List => {
                        let table = store.load::<InventoryItem>()?;
                        print_rows(table.rows(), self.format, |item| {
                            format!(
                                "{}  {}  stock {}  reorder at {}  {}  {}",
                                item.product_id,
                                item.product_name,
                                item.stock_quantity,
                                item.reorder_level,
                                item.supplier,
                                item.barcode
                            )
                        })?;
                    }
                    InventoryCommands::Alerts => {
                        let table = store.load::<InventoryItem>()?;
                        let alerts = od_query::reorder_alerts(&table);
                        if alerts.is_empty() {
                            println!("No reorder alerts");
                        } else {
                            print_rows(&alerts, self.format, |item| {
                                format!(
                                    "{}  {}  stock {} <= reorder level {}",
                                    item.product_id,
                                    item.product_name,
                                    item.stock_quantity,
                                    item.reorder_level
                                )
                            })?;
                        }
                    }
                    InventoryCommands::Scan { image } => {
                        let bytes = std::fs::read(&image)?;
                        match od_scan::decode_image(&bytes)? {
                            Some(code) => println!("Scanned barcode: {code}"),
                            None => {
                                return Err(CliError::CommandFailed(format!(
                                    "No barcode detected in {}",
                                    image.display()
                                )));
                            }
                        }
                    }
                }
            }
            Commands::Pos { command } => {
                let store = open_store(&config)?;
                match command {
                    PosCommands::Sell {
                        product,
                        quantity,
                        price,
                        date,
                        customer,
                        payment,
                        product_id,
                    } => {
                        let mut sale = Sale::new(
                            product,
                            quantity,
                            price,
                            date.to_string(),
                            customer,
                            payment,
                        );
                        if let Some(product_id) = product_id {
                            sale = sale.with_product_id(product_id);
                        }
                        let sale = store.append(sale)?;
                        println!(
                            "Sale {} for {} processed (${:.2})",
                            sale.sale_id, sale.product_name, sale.total_price
                        );
                    }
                    PosCommands::History => {
                        let table = store.load::<Sale>()?;
                        print_rows(table.rows(), self.format, |sale| {
                            format!(
                                "{}  {}  {} x{}  ${:.2}  {}  {}",
                                sale.sale_id,
                                sale.sale_date,
                                sale.product_name,
                                sale.quantity_sold,
                                sale.total_price,
                                sale.customer_name,
                                sale.payment_method.as_str()
                            )
                        })?;
                    }
                }
            }
            Commands::Staff { command } => {
                let store = open_store(&config)?;
                match command {
                    StaffCommands::Add {
                        name,
                        role,
                        salary,
                        joined,
                        attendance,
                    } => {
                        let employee = store.append(Employee::new(
                            name,
                            role,
                            salary,
                            joined.to_string(),
                            attendance,
                        ))?;
                        println!("Employee {} added as {}", employee.name, employee.employee_id);
                    }
                    StaffCommands::List => {
                        let table = store.load::<Employee>()?;
                        print_rows(table.rows(), self.format, |employee| {
                            format!(
                                "{}  {}  {}  salary {}  joined {}  attendance {}%",
                                employee.employee_id,
                                employee.name,
                                employee.role.as_str(),
                                employee.salary,
                                employee.join_date,
                                employee.attendance
                            )
                        })?;
                    }
                }
            }
            Commands::Finance { command } => {
                let store = open_store(&config)?;
                match command {
                    FinanceCommands::Add {
                        description,
                        amount,
                        txn_type,
                        date,
                    } => {
                        let txn = store.append(Transaction::new(
                            description,
                            amount,
                            txn_type,
                            date.to_string(),
                        ))?;
                        println!(
                            "Transaction {} recorded ({} ${:.2})",
                            txn.transaction_id,
                            txn.txn_type.as_str(),
                            txn.amount
                        );
                    }
                    FinanceCommands::List { txn_type } => {
                        let table = store.load::<Transaction>()?;
                        let rows: Vec<&Transaction> = table
                            .iter()
                            .filter(|txn| txn_type.map_or(true, |wanted| txn.txn_type == wanted))
                            .collect();
                        print_rows(&rows, self.format, |txn| {
                            format!(
                                "{}  {}  {}  ${:.2}  {}",
                                txn.transaction_id,
                                txn.date,
                                txn.txn_type.as_str(),
                                txn.amount,
                                txn.description
                            )
                        })?;
                    }
                    FinanceCommands::Summary => {
                        let table = store.load::<Transaction>()?;
                        let summary = FinanceSummary {
                            revenue: od_query::revenue_total(&table),
                            expenses: od_query::expense_total(&table),
                            net_profit: od_query::net_profit(&table),
                        };
                        match self.format {
                            OutputFormat::Json => print_json(&summary)?,
                            OutputFormat::Text => {
                                println!("Total revenue:  ${:.2}", summary.revenue);
                                println!("Total expenses: ${:.2}", summary.expenses);
                                println!("Net profit:     ${:.2}", summary.net_profit);
                            }
                        }
                    }
                }
            }
            Commands::Report { command } => {
                let store = open_store(&config)?;
                match command {
                    ReportCommands::Digest => {
                        let report = od_query::generate_digest(&store)?;
                        match self.format {
                            OutputFormat::Json => print_json(&report)?,
                            OutputFormat::Text => {
                                for section in &report.sections {
                                    println!("== {} ==", section.title);
                                    for item in &section.items {
                                        println!("  {item}");
                                    }
                                }
                            }
                        }
                    }
                    ReportCommands::TopProducts { k } => {
                        let sales = store.load::<Sale>()?;
                        print_ranked(&od_query::top_products(&sales, k), self.format)?;
                    }
                    ReportCommands::TopCustomers { k } => {
                        let sales = store.load::<Sale>()?;
                        print_ranked(&od_query::top_customers(&sales, k), self.format)?;
                    }
                    ReportCommands::Trend => {
                        let sales = store.load::<Sale>()?;
                        let trend = od_query::sales_trend(&sales)?;
                        print_series(&trend, self.format)?;
                    }
                    ReportCommands::Forecast { days } => {
                        let sales = store.load::<Sale>()?;
                        let trend = od_query::sales_trend(&sales)?;
                        let horizon = days.unwrap_or(config.forecast.horizon_days);
                        let forecast = od_query::forecast_series(&trend, horizon)?;
                        print_series(&forecast, self.format)?;
                    }
                }
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => match self.format {
                    OutputFormat::Json => print_json(&config)?,
                    OutputFormat::Text => {
                        let rendered = toml::to_string_pretty(&config)
                            .map_err(|e| CliError::CommandFailed(e.to_string()))?;
                        println!("{rendered}");
                    }
                },
                ConfigCommands::Paths => {
                    for path in OdConfig::search_paths() {
                        println!("{}", path.display());
                    }
                }
            },
        }

        Ok(())
    }
}

/// Summary row for `finance summary`
#[derive(Debug, Serialize)]
struct FinanceSummary {
    revenue: f64,
    expenses: f64,
    net_profit: f64,
}

fn load_config(path: Option<&std::path::Path>) -> Result<OdConfig, CliError> {
    let config = match path {
        Some(path) => OdConfig::load_with_env(path)?,
        None => OdConfig::discover_with_env()?,
    };
    debug!(data_dir = %config.global.data_dir.display(), "Loaded config");
    Ok(config)
}

fn open_store(config: &OdConfig) -> Result<TableStore, CliError> {
    let store = TableStore::open(&config.global.data_dir)?.with_locking(config.store.locking);
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rows<T, F>(rows: &[T], format: OutputFormat, line: F) -> Result<(), CliError>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("(no records)");
            }
            for row in rows {
                println!("{}", line(row));
            }
        }
    }
    Ok(())
}

fn print_ranked(ranked: &[(String, usize)], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(&ranked)?,
        OutputFormat::Text => {
            if ranked.is_empty() {
                println!("(no records)");
            }
            for (rank, (value, count)) in ranked.iter().enumerate() {
                println!("{}. {value} ({count})", rank + 1);
            }
        }
    }
    Ok(())
}

fn print_series(series: &[(NaiveDate, f64)], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<(String, f64)> = series
                .iter()
                .map(|(date, value)| (date.to_string(), *value))
                .collect();
            print_json(&rows)?;
        }
        OutputFormat::Text => {
            if series.is_empty() {
                println!("(no records)");
            }
            for (date, value) in series {
                println!("{date}  {value:.2}");
            }
        }
    }
    Ok(())
}
