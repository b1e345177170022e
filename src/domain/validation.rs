use serde::{Deserialize, Serialize};

use super::{OrderId, OrderStatus};

/// What the store knows about one order's references, as gathered by the
/// validation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCheck {
    pub order_id: OrderId,
    pub customer_exists: bool,
    pub product_exists: bool,
    /// `None` when the row holds SQL NULL
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IssueKind {
    MissingCustomer,
    MissingProduct,
    InvalidStatus(Option<String>),
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::MissingCustomer => write!(f, "Missing customer"),
            IssueKind::MissingProduct => write!(f, "Missing product"),
            IssueKind::InvalidStatus(Some(status)) => write!(f, "Invalid status: {}", status),
            IssueKind::InvalidStatus(None) => write!(f, "Invalid status: NULL"),
        }
    }
}

/// A referential or enumeration violation found on a stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub order_id: OrderId,
    pub kind: IssueKind,
}

impl Issue {
    pub fn description(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.order_id, self.kind)
    }
}

/// Run every check against one order.
/// Each check is independent, so one order yields up to three issues, always in
/// customer, product, status order.
pub fn validate_order(check: &OrderCheck) -> Vec<Issue> {
    let mut issues = Vec::new();

    if !check.customer_exists {
        issues.push(Issue {
            order_id: check.order_id,
            kind: IssueKind::MissingCustomer,
        });
    }
    if !check.product_exists {
        issues.push(Issue {
            order_id: check.order_id,
            kind: IssueKind::MissingProduct,
        });
    }

    let status_ok = check
        .status
        .as_deref()
        .and_then(OrderStatus::from_str)
        .is_some();
    if !status_ok {
        issues.push(Issue {
            order_id: check.order_id,
            kind: IssueKind::InvalidStatus(check.status.clone()),
        });
    }

    issues
}

/// Validate a batch of orders, keeping the order of `checks`.
pub fn validate_all<'a, I>(checks: I) -> Vec<Issue>
where
    I: IntoIterator<Item = &'a OrderCheck>,
{
    checks.into_iter().flat_map(validate_order).collect()
}
