use thiserror::Error;

use crate::domain::{OrderId, SubscriptionId};

/// Failures surfaced by [`crate::application::OrderLedger`].
///
/// Broken references and unknown statuses are not errors: they are reported as
/// [`crate::domain::Issue`] values by the validation pass.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(SubscriptionId),

    #[error("Failed to read schema file {path}: {source}")]
    SchemaRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
