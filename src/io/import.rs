use anyhow::Result;
use chrono::Utc;
use std::io::Read;

use crate::application::OrderLedger;
use crate::domain::{CustomerId, NewOrder, ProductId};
use crate::storage::parse_timestamp;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error on one line of the input
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "line {} ({}): {}", self.line, field, self.error),
            None => write!(f, "line {}: {}", self.line, self.error),
        }
    }
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Parse every line but write nothing
    pub dry_run: bool,
}

/// Importer for loading orders into the ledger
pub struct Importer<'a> {
    ledger: &'a OrderLedger,
}

impl<'a> Importer<'a> {
    pub fn new(ledger: &'a OrderLedger) -> Self {
        Self { ledger }
    }

    /// Import orders from CSV with columns
    /// `customer_id,product_id,status,comment[,created_at]`.
    ///
    /// Rows are written as-is: status is kept verbatim and references are not
    /// looked up, so imported rows show up in `validate_orders` when broken.
    pub async fn import_orders_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let mut result = ImportResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let order = match parse_order_record(&record, line) {
                Ok(order) => order,
                Err(e) => {
                    result.errors.push(e);
                    continue;
                }
            };

            if options.dry_run {
                result.imported += 1;
                continue;
            }

            match self.ledger.record_order(order).await {
                Ok(_) => result.imported += 1,
                Err(e) => result.errors.push(ImportError {
                    line,
                    field: None,
                    error: format!("Order creation failed: {}", e),
                }),
            }
        }

        tracing::info!(
            imported = result.imported,
            errors = result.errors.len(),
            dry_run = options.dry_run,
            "order import finished"
        );
        Ok(result)
    }
}

fn parse_order_record(
    record: &csv::StringRecord,
    line: usize,
) -> std::result::Result<NewOrder, ImportError> {
    let field_error = |field: &str, error: String| ImportError {
        line,
        field: Some(field.to_string()),
        error,
    };

    let customer_str = record.get(0).unwrap_or("").trim();
    let customer_id: CustomerId = customer_str
        .parse()
        .map_err(|_| field_error("customer_id", format!("Invalid id: '{}'", customer_str)))?;

    let product_str = record.get(1).unwrap_or("").trim();
    let product_id: ProductId = product_str
        .parse()
        .map_err(|_| field_error("product_id", format!("Invalid id: '{}'", product_str)))?;

    let status = record.get(2).unwrap_or("");

    let mut order = NewOrder::new(customer_id, product_id).with_status(status);

    if let Some(comment) = record.get(3).filter(|s| !s.is_empty()) {
        order = order.with_comment(comment);
    }

    let created_at = match record.get(4).map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_timestamp(s)
            .map_err(|e| field_error("created_at", e.to_string()))?,
        None => Utc::now(),
    };

    Ok(order.with_created_at(created_at))
}
