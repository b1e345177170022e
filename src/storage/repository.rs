use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::application::ReportRow;
use crate::domain::{
    Customer, CustomerId, NewCustomer, NewOrder, NewProduct, NewSubscription, Order, OrderCheck,
    OrderId, Product, ProductId, Subscription, SubscriptionId,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for persisting and querying customers, products, orders and subscriptions.
///
/// Every method is a single statement; SQLite commits it before the call returns.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the SQLite file at `path` over a single connection.
    ///
    /// Foreign-key enforcement is switched off so that orders and subscriptions
    /// can point at rows that do not exist, whatever the schema declares.
    pub async fn connect(path: &Path, create_if_missing: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create_if_missing)
            .foreign_keys(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))?;

        tracing::debug!(path = %path.display(), "database opened");
        Ok(Self::new(pool))
    }

    /// Execute a schema script (several statements) against the store.
    pub async fn apply_schema(&self, script: &str) -> Result<()> {
        sqlx::raw_sql(script)
            .execute(&self.pool)
            .await
            .context("Failed to apply schema")?;
        tracing::debug!("schema applied");
        Ok(())
    }

    /// Open or create the store, then apply `script`.
    pub async fn init(path: &Path, script: &str) -> Result<Self> {
        let repo = Self::connect(path, true).await?;
        repo.apply_schema(script).await?;
        Ok(repo)
    }

    // ========================
    // Customer operations
    // ========================

    pub async fn insert_customer(&self, customer: &NewCustomer) -> Result<CustomerId> {
        let result = sqlx::query("INSERT INTO customers (customer_name, email) VALUES (?, ?)")
            .bind(&customer.name)
            .bind(&customer.email)
            .execute(&self.pool)
            .await
            .context("Failed to save customer")?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT customer_id, customer_name, email FROM customers ORDER BY customer_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list customers")?;

        Ok(rows
            .iter()
            .map(|row| Customer {
                id: row.get("customer_id"),
                name: row.get("customer_name"),
                email: row.get("email"),
            })
            .collect())
    }

    // ========================
    // Product operations
    // ========================

    pub async fn insert_product(&self, product: &NewProduct) -> Result<ProductId> {
        let result =
            sqlx::query("INSERT INTO products (product_name, product_type) VALUES (?, ?)")
                .bind(&product.name)
                .bind(&product.product_type)
                .execute(&self.pool)
                .await
                .context("Failed to save product")?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT product_id, product_name, product_type FROM products ORDER BY product_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        Ok(rows
            .iter()
            .map(|row| Product {
                id: row.get("product_id"),
                name: row.get("product_name"),
                product_type: row.get("product_type"),
            })
            .collect())
    }

    // ========================
    // Order operations
    // ========================

    /// Write an order row exactly as given. References and status are not checked.
    pub async fn insert_order(&self, order: &NewOrder) -> Result<OrderId> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, product_id, created_at, status, comment)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.customer_id)
        .bind(order.product_id)
        .bind(order.created_at.to_rfc3339())
        .bind(&order.status)
        .bind(&order.comment)
        .execute(&self.pool)
        .await
        .context("Failed to save order")?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrite status and comment together. Returns the number of rows changed.
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: &str,
        comment: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query("UPDATE orders SET status = ?, comment = ? WHERE order_id = ?")
            .bind(status)
            .bind(comment)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update order status")?;
        Ok(result.rows_affected())
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT order_id, customer_id, product_id, created_at, status, comment
            FROM orders
            WHERE order_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch order")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_order(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, customer_id, product_id, created_at, status, comment
            FROM orders
            ORDER BY order_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list orders")?;

        rows.iter().map(Self::row_to_order).collect()
    }

    /// Reference and status facts for every order, ascending by id.
    pub async fn order_checks(&self) -> Result<Vec<OrderCheck>> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.order_id,
                o.status,
                EXISTS (SELECT 1 FROM customers c WHERE c.customer_id = o.customer_id) AS has_customer,
                EXISTS (SELECT 1 FROM products p WHERE p.product_id = o.product_id) AS has_product
            FROM orders o
            ORDER BY o.order_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load orders for validation")?;

        Ok(rows
            .iter()
            .map(|row| OrderCheck {
                order_id: row.get("order_id"),
                customer_exists: row.get::<i64, _>("has_customer") != 0,
                product_exists: row.get::<i64, _>("has_product") != 0,
                status: row.get("status"),
            })
            .collect())
    }

    /// Orders joined with their customer and product names.
    /// Orders whose customer or product is missing are left out.
    pub async fn report_rows(&self) -> Result<Vec<ReportRow>> {
        let rows = sqlx::query(
            r#"
            SELECT o.order_id, c.customer_name, p.product_name, o.created_at, o.status, o.comment
            FROM orders o
            JOIN customers c ON o.customer_id = c.customer_id
            JOIN products p ON o.product_id = p.product_id
            ORDER BY o.order_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to build report")?;

        Ok(rows
            .iter()
            .map(|row| ReportRow {
                order_id: row.get("order_id"),
                customer: row.get("customer_name"),
                product: row.get("product_name"),
                created_at: row.get("created_at"),
                status: row.get::<Option<String>, _>("status").unwrap_or_default(),
                comment: row.get("comment"),
            })
            .collect())
    }

    fn row_to_order(row: &SqliteRow) -> Result<Order> {
        let created_at_str: String = row.get("created_at");

        Ok(Order {
            id: row.get("order_id"),
            customer_id: row
                .try_get("customer_id")
                .context("Order has no customer_id")?,
            product_id: row
                .try_get("product_id")
                .context("Order has no product_id")?,
            created_at: parse_timestamp(&created_at_str)?,
            status: row
                .get::<Option<String>, _>("status")
                .unwrap_or_default(),
            comment: row.get("comment"),
        })
    }

    // ========================
    // Subscription operations
    // ========================

    pub async fn insert_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<SubscriptionId> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (order_id, start_date, end_date, active)
            VALUES (?, ?, ?, 1)
            "#,
        )
        .bind(subscription.order_id)
        .bind(subscription.start_date.format(DATE_FORMAT).to_string())
        .bind(subscription.end_date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await
        .context("Failed to save subscription")?;
        Ok(result.last_insert_rowid())
    }

    /// Clear the active flag. Already-cancelled rows still count as affected.
    pub async fn cancel_subscription(&self, id: SubscriptionId) -> Result<u64> {
        let result = sqlx::query("UPDATE subscriptions SET active = 0 WHERE subscription_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to cancel subscription")?;
        Ok(result.rows_affected())
    }

    pub async fn get_subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT subscription_id, order_id, start_date, end_date, active
            FROM subscriptions
            WHERE subscription_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch subscription")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_subscription(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT subscription_id, order_id, start_date, end_date, active
            FROM subscriptions
            ORDER BY subscription_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscriptions")?;

        rows.iter().map(Self::row_to_subscription).collect()
    }

    pub async fn list_subscriptions_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT subscription_id, order_id, start_date, end_date, active
            FROM subscriptions
            WHERE order_id = ?
            ORDER BY subscription_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscriptions for order")?;

        rows.iter().map(Self::row_to_subscription).collect()
    }

    fn row_to_subscription(row: &SqliteRow) -> Result<Subscription> {
        let start_str: String = row.get("start_date");
        let end_str: String = row.get("end_date");

        Ok(Subscription {
            id: row.get("subscription_id"),
            order_id: row
                .try_get("order_id")
                .context("Subscription has no order_id")?,
            start_date: NaiveDate::parse_from_str(&start_str, DATE_FORMAT)
                .context("Invalid start_date")?,
            end_date: NaiveDate::parse_from_str(&end_str, DATE_FORMAT)
                .context("Invalid end_date")?,
            active: row.get::<i64, _>("active") != 0,
        })
    }
}

/// Parse a stored timestamp. RFC 3339 is what this crate writes; naive ISO-8601
/// text (no offset) is read as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .with_context(|| format!("Invalid timestamp: {}", s))
}
