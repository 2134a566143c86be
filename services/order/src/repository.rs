//! Order persistence
//!
//! The write path inserts the order header and its lines in one
//! transaction. The read path runs a single join ordered by order id and
//! groups rows as they stream past, emitting an order whenever the id
//! changes.

use crate::models::{Order, OrderLine};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::ServiceResult;
use futures_util::TryStreamExt;
use sqlx::{PgPool, Row};
use tracing::info;

/// Store contract the placement saga runs against
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: &Order) -> ServiceResult<()>;

    /// Orders for an account; lines carry only product_id and quantity,
    /// enrichment happens in the service
    async fn list_for_account(&self, account_id: &str) -> ServiceResult<Vec<Order>>;
}

/// Postgres-backed order store
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, order: &Order) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, created_at, account_id, total_price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&order.id)
        .bind(order.created_at)
        .bind(&order.account_id)
        .bind(order.total_price)
        .execute(&mut *tx)
        .await?;

        let product_ids: Vec<String> =
            order.products.iter().map(|p| p.product_id.clone()).collect();
        let quantities: Vec<i32> = order.products.iter().map(|p| p.quantity as i32).collect();

        sqlx::query(
            r#"
            INSERT INTO order_products (order_id, product_id, quantity)
            SELECT $1, product_id, quantity
            FROM UNNEST($2::text[], $3::int[]) AS lines (product_id, quantity)
            "#,
        )
        .bind(&order.id)
        .bind(&product_ids)
        .bind(&quantities)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("committed order {}", order.id);
        Ok(())
    }

    async fn list_for_account(&self, account_id: &str) -> ServiceResult<Vec<Order>> {
        let mut rows = sqlx::query(
            r#"
            SELECT o.id, o.created_at, o.account_id, o.total_price,
                   op.product_id, op.quantity
            FROM orders o
            JOIN order_products op ON o.id = op.order_id
            WHERE o.account_id = $1
            ORDER BY o.id
            "#,
        )
        .bind(account_id)
        .fetch(&self.pool);

        let mut acc = OrderRowAccumulator::default();
        while let Some(row) = rows.try_next().await? {
            acc.push(OrderRow {
                order_id: row.get("id"),
                created_at: row.get("created_at"),
                account_id: row.get("account_id"),
                total_price: row.get("total_price"),
                product_id: row.get("product_id"),
                quantity: row.get::<i32, _>("quantity") as u32,
            });
        }

        Ok(acc.finish())
    }
}

/// One row of the orders ⨝ order_products join
pub(crate) struct OrderRow {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub account_id: String,
    pub total_price: f64,
    pub product_id: String,
    pub quantity: u32,
}

/// Groups join rows into orders as they stream past
///
/// Relies on the rows arriving ordered by order id; a boundary is emitted
/// whenever the id changes.
#[derive(Default)]
pub(crate) struct OrderRowAccumulator {
    orders: Vec<Order>,
    current: Option<Order>,
}

impl OrderRowAccumulator {
    pub fn push(&mut self, row: OrderRow) {
        let boundary = self
            .current
            .as_ref()
            .map(|o| o.id != row.order_id)
            .unwrap_or(true);

        if boundary {
            if let Some(done) = self.current.take() {
                self.orders.push(done);
            }
            self.current = Some(Order {
                id: row.order_id.clone(),
                created_at: row.created_at,
                account_id: row.account_id.clone(),
                total_price: row.total_price,
                products: Vec::new(),
            });
        }

        if let Some(current) = self.current.as_mut() {
            current.products.push(OrderLine {
                product_id: row.product_id,
                name: String::new(),
                description: String::new(),
                price: 0.0,
                quantity: row.quantity,
                stock: 0,
            });
        }
    }

    pub fn finish(mut self) -> Vec<Order> {
        if let Some(done) = self.current.take() {
            self.orders.push(done);
        }
        self.orders
    }
}
