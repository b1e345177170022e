use std::path::Path;

use chrono::Utc;

use crate::domain::{
    validate_all, Customer, CustomerId, Issue, NewCustomer, NewOrder, NewProduct,
    NewSubscription, Order, OrderId, Product, ProductId, Subscription, SubscriptionId,
};
use crate::storage::{Repository, SCHEMA};

use super::{AppError, Report};

/// Application service providing the order ledger operations.
///
/// Writes are permissive: nothing here checks that referenced customers,
/// products or orders exist, or that a status belongs to the enumeration.
/// [`OrderLedger::validate_orders`] reports those problems after the fact.
pub struct OrderLedger {
    repo: Repository,
}

impl OrderLedger {
    /// Create a new ledger over the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open or create the database at `path` and apply the built-in schema.
    pub async fn init(path: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::init_with_schema(path, SCHEMA).await
    }

    /// Open or create the database at `path` and apply `schema`.
    pub async fn init_with_schema(path: impl AsRef<Path>, schema: &str) -> Result<Self, AppError> {
        let repo = Repository::init(path.as_ref(), schema).await?;
        Ok(Self::new(repo))
    }

    /// Like [`OrderLedger::init_with_schema`], reading the schema script from a file.
    pub async fn init_with_schema_file(
        path: impl AsRef<Path>,
        schema_path: impl AsRef<Path>,
    ) -> Result<Self, AppError> {
        let schema_path = schema_path.as_ref();
        let schema = std::fs::read_to_string(schema_path).map_err(|source| AppError::SchemaRead {
            path: schema_path.display().to_string(),
            source,
        })?;
        Self::init_with_schema(path, &schema).await
    }

    /// Open an existing database without touching its schema.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let repo = Repository::connect(path.as_ref(), false).await?;
        Ok(Self::new(repo))
    }

    /// Direct access to the store, bypassing the operation set.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Customers and products
    // ========================

    /// Create a customer. Name and email are stored as given.
    pub async fn create_customer(
        &self,
        name: String,
        email: Option<String>,
    ) -> Result<CustomerId, AppError> {
        let customer = NewCustomer { name, email };
        let id = self.repo.insert_customer(&customer).await?;
        tracing::info!(customer_id = id, name = %customer.name, "customer created");
        Ok(id)
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.repo.list_customers().await?)
    }

    /// Create a product. `None` uses the default type, "data_feed".
    pub async fn create_product(
        &self,
        name: String,
        product_type: Option<String>,
    ) -> Result<ProductId, AppError> {
        let mut product = NewProduct::new(name);
        if let Some(product_type) = product_type {
            product = product.with_type(product_type);
        }
        let id = self.repo.insert_product(&product).await?;
        tracing::info!(
            product_id = id,
            name = %product.name,
            product_type = %product.product_type,
            "product created"
        );
        Ok(id)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.repo.list_products().await?)
    }

    // ========================
    // Orders
    // ========================

    /// Create an order in `Processing`, timestamped now.
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        comment: Option<String>,
    ) -> Result<OrderId, AppError> {
        let mut order = NewOrder::new(customer_id, product_id);
        order.comment = comment;
        let id = self.repo.insert_order(&order).await?;
        tracing::info!(order_id = id, customer_id, product_id, "order created");
        Ok(id)
    }

    /// Write an order row as given, status included. Used for imports and
    /// for seeding deliberately broken data.
    pub async fn record_order(&self, order: NewOrder) -> Result<OrderId, AppError> {
        let id = self.repo.insert_order(&order).await?;
        tracing::info!(order_id = id, status = %order.status, "order recorded");
        Ok(id)
    }

    /// Set status and comment together; `None` clears the comment.
    /// Any status text is accepted. Returns the number of rows changed (0 or 1).
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: &str,
        comment: Option<String>,
    ) -> Result<u64, AppError> {
        let changed = self
            .repo
            .update_order_status(order_id, new_status, comment.as_deref())
            .await?;
        tracing::info!(order_id, status = new_status, changed, "order status updated");
        Ok(changed)
    }

    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, AppError> {
        self.repo
            .get_order(order_id)
            .await?
            .ok_or(AppError::OrderNotFound(order_id))
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.repo.list_orders().await?)
    }

    // ========================
    // Subscriptions
    // ========================

    /// Start a subscription today (UTC) lasting `months` 30-day months.
    /// The order is not looked up and may already have subscriptions.
    pub async fn create_subscription(
        &self,
        order_id: OrderId,
        months: u32,
    ) -> Result<SubscriptionId, AppError> {
        let start = Utc::now().date_naive();
        let subscription = NewSubscription::new(order_id, start, months);
        let id = self.repo.insert_subscription(&subscription).await?;
        tracing::info!(
            subscription_id = id,
            order_id,
            end_date = %subscription.end_date,
            "subscription created"
        );
        Ok(id)
    }

    /// Mark a subscription inactive. Unknown ids yield 0; cancelling twice yields 1 both times.
    pub async fn cancel_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<u64, AppError> {
        let changed = self.repo.cancel_subscription(subscription_id).await?;
        tracing::info!(subscription_id, changed, "subscription cancelled");
        Ok(changed)
    }

    pub async fn get_subscription(
        &self,
        subscription_id: SubscriptionId,
    ) -> Result<Subscription, AppError> {
        self.repo
            .get_subscription(subscription_id)
            .await?
            .ok_or(AppError::SubscriptionNotFound(subscription_id))
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        Ok(self.repo.list_subscriptions().await?)
    }

    pub async fn subscriptions_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Subscription>, AppError> {
        Ok(self.repo.list_subscriptions_for_order(order_id).await?)
    }

    // ========================
    // Validation and reporting
    // ========================

    /// Every missing reference and unknown status, ascending by order id.
    pub async fn validate_orders(&self) -> Result<Vec<Issue>, AppError> {
        let checks = self.repo.order_checks().await?;
        let issues = validate_all(&checks);
        if issues.is_empty() {
            tracing::debug!(orders = checks.len(), "all orders valid");
        } else {
            tracing::warn!(orders = checks.len(), issues = issues.len(), "order issues found");
        }
        Ok(issues)
    }

    /// Orders with a resolvable customer and product, joined with their names.
    pub async fn generate_report(&self) -> Result<Report, AppError> {
        let rows = self.repo.report_rows().await?;
        tracing::debug!(rows = rows.len(), "report generated");
        Ok(Report { rows })
    }
}
