//! Product repository for database operations

use crate::models::Product;
use common::error::{ServiceError, ServiceResult};
use sqlx::{PgPool, Row};
use tracing::info;

/// Product repository over the products table
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, product: &Product) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, sold, out_of_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.sold)
        .bind(product.out_of_stock)
        .execute(&self.pool)
        .await?;

        info!("inserted product {}", product.id);
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Product> {
        let row = sqlx::query(
            "SELECT id, name, description, price, stock, sold, out_of_stock FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("product not found".to_string()))?;

        Ok(product_from_row(&row))
    }

    pub async fn list(&self, skip: u64, take: u64) -> ServiceResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, stock, sold, out_of_stock
            FROM products
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(take as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    /// Batch lookup; ids that do not exist are simply absent from the result
    pub async fn list_with_ids(&self, ids: &[String]) -> ServiceResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, stock, sold, out_of_stock
            FROM products
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    pub async fn search(&self, query: &str, skip: u64, take: u64) -> ServiceResult<Vec<Product>> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, stock, sold, out_of_stock
            FROM products
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(take as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    /// Atomically move `quantity` units from stock to sold
    ///
    /// Positive quantities are reservations and require enough stock;
    /// negative quantities are saga compensations and always apply. The
    /// out_of_stock flag is recomputed in the same statement so the
    /// `out_of_stock <=> stock == 0` invariant cannot be observed broken.
    pub async fn update_stock_and_sold(&self, id: &str, quantity: i32) -> ServiceResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2,
                sold = sold + $2,
                out_of_stock = (stock - $2) <= 0
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft delete: flagged out of stock and emptied, row retained
    pub async fn soft_delete(&self, id: &str) -> ServiceResult<()> {
        let result =
            sqlx::query("UPDATE products SET stock = 0, out_of_stock = TRUE WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("product not found".to_string()));
        }
        info!("soft-deleted product {}", id);
        Ok(())
    }

    pub async fn restock(&self, id: &str, new_stock: i32) -> ServiceResult<()> {
        let result = sqlx::query(
            "UPDATE products SET stock = $2, out_of_stock = ($2 <= 0) WHERE id = $1",
        )
        .bind(id)
        .bind(new_stock)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("product not found".to_string()));
        }
        Ok(())
    }

    /// Name-prefix suggestions
    pub async fn suggest(&self, prefix: &str, size: u64) -> ServiceResult<Vec<Product>> {
        let pattern = format!("{}%", prefix);
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, stock, sold, out_of_stock
            FROM products
            WHERE name ILIKE $1
            ORDER BY name
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(size as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }
}

fn product_from_row(row: &sqlx::postgres::PgRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        stock: row.get("stock"),
        sold: row.get("sold"),
        out_of_stock: row.get("out_of_stock"),
    }
}
