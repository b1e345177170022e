use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomerId, ProductId};

pub type OrderId = i64;

/// The accepted order statuses.
///
/// Orders store their status as free text: nothing stops a write from using a
/// value outside this set. Only [`crate::domain::validate_order`] checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Failed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Failed => "Failed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Case-sensitive: "completed" is not a valid status.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Processing" => Some(OrderStatus::Processing),
            "Completed" => Some(OrderStatus::Completed),
            "Failed" => Some(OrderStatus::Failed),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    /// Set once when the order is written, never changed afterwards
    pub created_at: DateTime<Utc>,
    /// Raw status text as stored
    pub status: String,
    pub comment: Option<String>,
}

impl Order {
    /// The parsed status, or `None` when the stored text is outside the enumeration.
    pub fn known_status(&self) -> Option<OrderStatus> {
        OrderStatus::from_str(&self.status)
    }
}

/// An order row about to be written.
///
/// `NewOrder::new` always starts in `Processing`; `with_status` exists for the
/// low-level write path (imports, raw inserts) which keeps whatever it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub comment: Option<String>,
}

impl NewOrder {
    pub fn new(customer_id: CustomerId, product_id: ProductId) -> Self {
        Self {
            customer_id,
            product_id,
            created_at: Utc::now(),
            status: OrderStatus::Processing.as_str().to_string(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
