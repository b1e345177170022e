use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{OrderLedger, Report};
use crate::domain::{
    CustomerId, NewOrder, OrderId, ProductId, SubscriptionId, DEFAULT_PRODUCT_TYPE,
    DEFAULT_SUBSCRIPTION_MONTHS,
};

/// Ordledger - order and subscription ledger
#[derive(Parser)]
#[command(name = "ordledger")]
#[command(about = "Record customers, products, orders and subscriptions, then check them")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "ordledger.db")]
    pub database: PathBuf,

    /// Schema script to apply instead of the built-in one
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Product management commands
    #[command(subcommand)]
    Product(ProductCommands),

    /// Order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Subscription management commands
    #[command(subcommand)]
    Subscription(SubscriptionCommands),

    /// List orders with missing references or unknown statuses
    Validate,

    /// Print orders joined with customer and product names
    Report {
        /// Output format: table, csv, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: report, issues, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format for the report: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,
    },

    /// Import orders from CSV (customer_id,product_id,status,comment[,created_at])
    Import {
        /// What to import: orders
        import_type: String,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Parse without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Populate sample data, including one broken order, then validate and report
    Demo,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Create a new customer
    Create {
        /// Customer name
        name: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List all customers
    List,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Create a new product
    Create {
        /// Product name
        name: String,

        /// Product type tag
        #[arg(short = 't', long = "type", default_value = DEFAULT_PRODUCT_TYPE)]
        product_type: String,
    },

    /// List all products
    List,
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create a new order (status starts as Processing)
    Create {
        /// Customer ID
        #[arg(long)]
        customer: CustomerId,

        /// Product ID
        #[arg(long)]
        product: ProductId,

        /// Free-text comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Set an order's status and comment (omitting --comment clears it)
    Status {
        /// Order ID
        id: OrderId,

        /// New status: Processing, Completed, Failed, Cancelled
        status: String,

        /// Free-text comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List all orders
    List,

    /// Show one order and its subscriptions
    Show {
        /// Order ID
        id: OrderId,
    },
}

#[derive(Subcommand)]
pub enum SubscriptionCommands {
    /// Start a subscription for an order
    Create {
        /// Order ID
        order_id: OrderId,

        /// Length in 30-day months
        #[arg(short, long, default_value_t = DEFAULT_SUBSCRIPTION_MONTHS)]
        months: u32,
    },

    /// Cancel a subscription
    Cancel {
        /// Subscription ID
        id: SubscriptionId,
    },

    /// List all subscriptions
    List,
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

impl Cli {
    async fn open(&self) -> Result<OrderLedger> {
        let ledger = match &self.schema {
            Some(schema) => OrderLedger::init_with_schema_file(&self.database, schema).await?,
            None => OrderLedger::init(&self.database).await?,
        };
        Ok(ledger)
    }

    pub async fn run(self) -> Result<()> {
        let ledger = self.open().await?;

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", self.database.display());
            }

            Commands::Customer(cmd) => run_customer_command(&ledger, cmd).await?,

            Commands::Product(cmd) => run_product_command(&ledger, cmd).await?,

            Commands::Order(cmd) => run_order_command(&ledger, cmd).await?,

            Commands::Subscription(cmd) => run_subscription_command(&ledger, cmd).await?,

            Commands::Validate => run_validate_command(&ledger).await?,

            Commands::Report { format } => run_report_command(&ledger, &format).await?,

            Commands::Export {
                export_type,
                output,
                format,
            } => run_export_command(&ledger, &export_type, output.as_deref(), &format).await?,

            Commands::Import {
                import_type,
                input,
                dry_run,
            } => run_import_command(&ledger, &import_type, input.as_deref(), dry_run).await?,

            Commands::Demo => run_demo(&ledger).await?,
        }

        Ok(())
    }
}

async fn run_customer_command(ledger: &OrderLedger, cmd: CustomerCommands) -> Result<()> {
    match cmd {
        CustomerCommands::Create { name, email } => {
            let id = ledger.create_customer(name.clone(), email).await?;
            println!("Created customer: {} ({})", name, id);
        }

        CustomerCommands::List => {
            let customers = ledger.list_customers().await?;
            if customers.is_empty() {
                println!("No customers found.");
            } else {
                println!("{:<6} {:<30} {}", "ID", "NAME", "EMAIL");
                println!("{}", "-".repeat(60));
                for customer in customers {
                    println!(
                        "{:<6} {:<30} {}",
                        customer.id,
                        customer.name,
                        customer.email.unwrap_or_default()
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_product_command(ledger: &OrderLedger, cmd: ProductCommands) -> Result<()> {
    match cmd {
        ProductCommands::Create { name, product_type } => {
            let id = ledger
                .create_product(name.clone(), Some(product_type.clone()))
                .await?;
            println!("Created product: {} [{}] ({})", name, product_type, id);
        }

        ProductCommands::List => {
            let products = ledger.list_products().await?;
            if products.is_empty() {
                println!("No products found.");
            } else {
                println!("{:<6} {:<30} {}", "ID", "NAME", "TYPE");
                println!("{}", "-".repeat(50));
                for product in products {
                    println!(
                        "{:<6} {:<30} {}",
                        product.id, product.name, product.product_type
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_order_command(ledger: &OrderLedger, cmd: OrderCommands) -> Result<()> {
    match cmd {
        OrderCommands::Create {
            customer,
            product,
            comment,
        } => {
            let id = ledger.create_order(customer, product, comment).await?;
            println!("Created order: {}", id);
        }

        OrderCommands::Status {
            id,
            status,
            comment,
        } => {
            let changed = ledger.update_order_status(id, &status, comment).await?;
            if changed == 0 {
                println!("No order with id {}", id);
            } else {
                println!("Order {} is now {}", id, status);
            }
        }

        OrderCommands::List => {
            let orders = ledger.list_orders().await?;
            if orders.is_empty() {
                println!("No orders found.");
            } else {
                println!(
                    "{:<6} {:<9} {:<8} {:<20} {:<12} {}",
                    "ID", "CUSTOMER", "PRODUCT", "CREATED", "STATUS", "COMMENT"
                );
                println!("{}", "-".repeat(80));
                for order in orders {
                    println!(
                        "{:<6} {:<9} {:<8} {:<20} {:<12} {}",
                        order.id,
                        order.customer_id,
                        order.product_id,
                        order.created_at.format("%Y-%m-%d %H:%M:%S"),
                        order.status,
                        order.comment.unwrap_or_default()
                    );
                }
            }
        }

        OrderCommands::Show { id } => {
            let order = ledger.get_order(id).await?;
            let subscriptions = ledger.subscriptions_for_order(id).await?;

            println!("Order: {}", order.id);
            println!("  Customer:  {}", order.customer_id);
            println!("  Product:   {}", order.product_id);
            println!(
                "  Created:   {}",
                order.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!(
                "  Status:    {}{}",
                order.status,
                if order.known_status().is_some() {
                    ""
                } else {
                    " (not a known status)"
                }
            );
            if let Some(comment) = &order.comment {
                println!("  Comment:   {}", comment);
            }
            if !subscriptions.is_empty() {
                println!("  Subscriptions:");
                for sub in subscriptions {
                    println!(
                        "    #{} {} -> {} {}",
                        sub.id,
                        sub.start_date,
                        sub.end_date,
                        if sub.active { "active" } else { "cancelled" }
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_subscription_command(ledger: &OrderLedger, cmd: SubscriptionCommands) -> Result<()> {
    match cmd {
        SubscriptionCommands::Create { order_id, months } => {
            let id = ledger.create_subscription(order_id, months).await?;
            let sub = ledger.get_subscription(id).await?;
            println!(
                "Created subscription: {} for order {} ({} -> {})",
                id, order_id, sub.start_date, sub.end_date
            );
        }

        SubscriptionCommands::Cancel { id } => {
            let changed = ledger.cancel_subscription(id).await?;
            if changed == 0 {
                println!("No subscription with id {}", id);
            } else {
                println!("Cancelled subscription: {}", id);
            }
        }

        SubscriptionCommands::List => {
            let subscriptions = ledger.list_subscriptions().await?;
            if subscriptions.is_empty() {
                println!("No subscriptions found.");
            } else {
                println!(
                    "{:<6} {:<8} {:<12} {:<12} {}",
                    "ID", "ORDER", "START", "END", "ACTIVE"
                );
                println!("{}", "-".repeat(48));
                for sub in subscriptions {
                    println!(
                        "{:<6} {:<8} {:<12} {:<12} {}",
                        sub.id,
                        sub.order_id,
                        sub.start_date.to_string(),
                        sub.end_date.to_string(),
                        if sub.active { "yes" } else { "no" }
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_validate_command(ledger: &OrderLedger) -> Result<()> {
    let issues = ledger.validate_orders().await?;

    if issues.is_empty() {
        println!("All orders are consistent.");
        return Ok(());
    }

    println!("Issues found:");
    for issue in &issues {
        println!("  - order {}: {}", issue.order_id, issue.kind);
    }
    anyhow::bail!("{} order issue(s) found", issues.len())
}

async fn run_report_command(ledger: &OrderLedger, format: &str) -> Result<()> {
    use crate::io::Exporter;
    use std::io::stdout;

    match format {
        "table" => {
            let report = ledger.generate_report().await?;
            print_report_table(&report);
        }
        "csv" => {
            Exporter::new(ledger).export_report_csv(stdout()).await?;
        }
        "json" => {
            Exporter::new(ledger).export_report_json(stdout()).await?;
            println!();
        }
        _ => anyhow::bail!("Unknown format '{}'. Use: table, csv, json", format),
    }
    Ok(())
}

fn print_report_table(report: &Report) {
    let lines = report.lines();
    let mut widths = vec![0; Report::header().len()];
    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for (i, line) in lines.iter().enumerate() {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("{}", cells.join("  ").trim_end());
        if i == 0 {
            println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
        }
    }

    if report.rows.is_empty() {
        println!("No orders to report.");
    }
}

async fn run_export_command(
    ledger: &OrderLedger,
    export_type: &str,
    output: Option<&Path>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(ledger);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match (export_type, format) {
        ("report", "csv") => {
            let count = exporter.export_report_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} report rows", count);
            }
        }
        ("report", "json") => {
            let report = exporter.export_report_json(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} report rows", report.rows.len());
            }
        }
        ("issues", _) => {
            let count = exporter.export_issues_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} issues", count);
            }
        }
        ("full", _) => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} customers, {} products, {} orders, {} subscriptions",
                    snapshot.customers.len(),
                    snapshot.products.len(),
                    snapshot.orders.len(),
                    snapshot.subscriptions.len()
                );
            }
        }
        ("report", _) => anyhow::bail!("Unknown report format '{}'. Use: csv, json", format),
        _ => anyhow::bail!(
            "Unknown export type '{}'. Use: report, issues, full",
            export_type
        ),
    }

    Ok(())
}

async fn run_import_command(
    ledger: &OrderLedger,
    import_type: &str,
    input: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{stdin, Read};

    if import_type != "orders" {
        anyhow::bail!("Unknown import type '{}'. Use: orders", import_type);
    }

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = Importer::new(ledger)
        .import_orders_csv(reader, ImportOptions { dry_run })
        .await?;

    if dry_run {
        println!("Dry run: {} orders would be imported", result.imported);
    } else {
        println!("Imported {} orders", result.imported);
    }

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in &result.errors {
            println!("  {}", error);
        }
        anyhow::bail!("{} line(s) could not be imported", result.errors.len());
    }

    Ok(())
}

/// Sample session: two customers, two products, two orders, one subscription,
/// status updates, then one order with dangling references and a bad status.
async fn run_demo(ledger: &OrderLedger) -> Result<()> {
    let alice = ledger
        .create_customer("Alice Martin".into(), Some("alice@example.com".into()))
        .await?;
    let test = ledger
        .create_customer("Test Customer".into(), Some("test@example.com".into()))
        .await?;

    let feed = ledger
        .create_product("Market Data Feed".into(), Some("data_feed".into()))
        .await?;
    let index = ledger
        .create_product("Index Subscription".into(), Some("subscription".into()))
        .await?;

    let first = ledger
        .create_order(alice, feed, Some("Initial order for data feed".into()))
        .await?;
    let second = ledger
        .create_order(test, index, Some("Subscription order".into()))
        .await?;

    ledger.create_subscription(second, 3).await?;

    ledger
        .update_order_status(first, "Completed", Some("Provisioned successfully".into()))
        .await?;
    ledger
        .update_order_status(
            second,
            "Processing",
            Some("Waiting for billing validation".into()),
        )
        .await?;

    ledger
        .record_order(
            NewOrder::new(999, 999)
                .with_status("UnknownStatus")
                .with_comment("bad refs"),
        )
        .await?;

    let issues = ledger.validate_orders().await?;
    let report = ledger.generate_report().await?;

    println!("--- ISSUES ---");
    for issue in &issues {
        println!("{}", issue);
    }

    println!("\n--- REPORT ---");
    for line in report.lines() {
        println!("[{}]", line.join(", "));
    }

    Ok(())
}
