// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use ordledger::application::OrderLedger;
use ordledger::domain::{CustomerId, OrderId, ProductId};
use tempfile::TempDir;

/// Helper to create a ledger over a fresh temporary database
pub async fn test_ledger() -> Result<(OrderLedger, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let ledger = OrderLedger::init(&db_path).await?;
    Ok((ledger, temp_dir))
}

/// Test fixture: one customer, one product, one order referencing both
pub struct AliceFeed {
    pub customer: CustomerId,
    pub product: ProductId,
    pub order: OrderId,
}

impl AliceFeed {
    pub async fn create(ledger: &OrderLedger) -> Result<Self> {
        let customer = ledger.create_customer("Alice".into(), None).await?;
        let product = ledger
            .create_product("Feed".into(), Some("data_feed".into()))
            .await?;
        let order = ledger.create_order(customer, product, None).await?;
        Ok(Self {
            customer,
            product,
            order,
        })
    }
}
