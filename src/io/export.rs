use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{OrderLedger, Report};
use crate::domain::{Customer, Order, Product, Subscription};

/// Database snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub subscriptions: Vec<Subscription>,
}

/// Exporter for writing ledger data as CSV or JSON
pub struct Exporter<'a> {
    ledger: &'a OrderLedger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a OrderLedger) -> Self {
        Self { ledger }
    }

    /// Export the order report to CSV, header first. Returns the number of data rows.
    pub async fn export_report_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.ledger.generate_report().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        for line in report.lines() {
            csv_writer.write_record(&line)?;
        }

        csv_writer.flush()?;
        Ok(report.rows.len())
    }

    /// Export the order report rows as a JSON array
    pub async fn export_report_json<W: Write>(&self, mut writer: W) -> Result<Report> {
        let report = self.ledger.generate_report().await?;

        let json = serde_json::to_string_pretty(&report.rows)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(report)
    }

    /// Export validation issues to CSV. Returns the number of issues.
    pub async fn export_issues_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let issues = self.ledger.validate_orders().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["order_id", "issue"])?;

        for issue in &issues {
            csv_writer.write_record([issue.order_id.to_string(), issue.description()])?;
        }

        csv_writer.flush()?;
        Ok(issues.len())
    }

    /// Export every table as one JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            customers: self.ledger.list_customers().await?,
            products: self.ledger.list_products().await?,
            orders: self.ledger.list_orders().await?,
            subscriptions: self.ledger.list_subscriptions().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
