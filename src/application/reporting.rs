use serde::{Deserialize, Serialize};

use crate::domain::OrderId;

/// Column names of the order report, in output order.
pub const REPORT_HEADER: [&str; 6] = [
    "OrderID",
    "Customer",
    "Product",
    "CreatedAt",
    "Status",
    "Comment",
];

/// One order joined with its customer and product names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub order_id: OrderId,
    pub customer: String,
    pub product: String,
    /// Stored timestamp text, untouched
    pub created_at: String,
    pub status: String,
    pub comment: Option<String>,
}

impl ReportRow {
    /// Cells in `REPORT_HEADER` order. An absent comment is an empty cell.
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.order_id.to_string(),
            self.customer.clone(),
            self.product.clone(),
            self.created_at.clone(),
            self.status.clone(),
            self.comment.clone().unwrap_or_default(),
        ]
    }
}

/// Orders whose customer and product both resolve, ascending by order id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn header() -> Vec<String> {
        REPORT_HEADER.iter().map(|s| s.to_string()).collect()
    }

    /// Header line followed by one line per row.
    pub fn lines(&self) -> Vec<Vec<String>> {
        std::iter::once(Self::header())
            .chain(self.rows.iter().map(ReportRow::cells))
            .collect()
    }

    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.rows.iter().any(|row| row.order_id == order_id)
    }
}
