//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Lookup Contract
//! `get_by_id` and `get_by_barcode` return ACTIVE products only: that is the
//! view the register is allowed to sell from. Historical data never needs
//! these lookups because sale lines carry their own frozen product snapshot.
//!
//! ## Stock
//! Plain restocking goes through [`ProductRepository::restock`] (a positive
//! delta). Stock DECREMENTS for sales never happen here - they are part of
//! the atomic commit in [`crate::repository::sale::SaleRepository::commit_sale`],
//! where they are conditional on sufficient stock.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use super::{money_from_db, money_to_db};
use crate::error::{DbError, DbResult};
use till_core::Product;

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw row shape: money columns come back as TEXT and are parsed into
/// `Money` in `TryFrom`, so decode failures are typed errors.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    name: String,
    barcode: Option<String>,
    description: Option<String>,
    price: String,
    cost_price: String,
    stock: i64,
    min_stock: i64,
    category_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Product> {
        Ok(Product {
            price: money_from_db("products.price", &row.price)?,
            cost_price: money_from_db("products.cost_price", &row.cost_price)?,
            id: row.id,
            name: row.name,
            barcode: row.barcode,
            description: row.description,
            stock: row.stock,
            min_stock: row.min_stock,
            category_id: row.category_id,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = r#"
    id, name, barcode, description, price, cost_price,
    stock, min_stock, category_id, is_active, created_at, updated_at
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, description, price, cost_price,
                stock, min_stock, category_id, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(money_to_db(product.price))
        .bind(money_to_db(product.cost_price))
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category_id)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                barcode = ?3,
                description = ?4,
                price = ?5,
                cost_price = ?6,
                stock = ?7,
                min_stock = ?8,
                category_id = ?9,
                is_active = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(money_to_db(product.price))
        .bind(money_to_db(product.cost_price))
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category_id)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Gets an active product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets an active product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1 AND is_active = 1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Lists all active products sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Lists active products in a category, sorted by name.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE category_id = ?1 AND is_active = 1 ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Searches active products by name or barcode substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list_active().await;
        }

        let pattern = format!("%{}%", query);

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE (name LIKE ?1 OR barcode LIKE ?1) AND is_active = 1
             ORDER BY name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Lists active products at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE stock <= min_stock AND is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Increases a product's stock (receiving goods).
    ///
    /// Sale decrements do NOT use this; they run inside the sale commit
    /// transaction with a stock-sufficiency condition.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Restocking product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity.max(0))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical sale lines still reference this product, so rows are never
    /// physically removed by the application.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and seed checks).
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use chrono::Utc;
    use till_core::{Money, Product};

    fn product(name: &str, barcode: Option<&str>, price: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_id(),
            name: name.to_string(),
            barcode: barcode.map(String::from),
            description: None,
            price: price.parse().unwrap(),
            cost_price: Money::zero(),
            stock,
            min_stock: 2,
            category_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_by_id() {
        let db = test_db().await;
        let p = product("Milk 1L", Some("4791111111111"), "250.00", 20);

        db.products().insert(&p).await.unwrap();

        let loaded = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Milk 1L");
        assert_eq!(loaded.price, "250.00".parse().unwrap());
        assert_eq!(loaded.stock, 20);
    }

    #[tokio::test]
    async fn test_get_by_barcode_is_active_only() {
        let db = test_db().await;
        let p = product("Milk 1L", Some("4791111111111"), "250.00", 20);
        db.products().insert(&p).await.unwrap();

        let found = db
            .products()
            .get_by_barcode("4791111111111")
            .await
            .unwrap();
        assert!(found.is_some());

        db.products().soft_delete(&p.id).await.unwrap();

        let found = db
            .products()
            .get_by_barcode("4791111111111")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = test_db().await;
        db.products()
            .insert(&product("A", Some("479"), "1.00", 1))
            .await
            .unwrap();

        let err = db
            .products()
            .insert(&product("B", Some("479"), "2.00", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_matches_name_and_barcode() {
        let db = test_db().await;
        db.products()
            .insert(&product("Coca-Cola 330ml", Some("5449000000996"), "1.50", 10))
            .await
            .unwrap();
        db.products()
            .insert(&product("Pepsi 330ml", Some("1234567890123"), "1.40", 10))
            .await
            .unwrap();

        let by_name = db.products().search("cola").await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_barcode = db.products().search("544900").await.unwrap();
        assert_eq!(by_barcode.len(), 1);

        let all = db.products().search("").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let mut low = product("Low", None, "1.00", 2); // min_stock = 2
        low.min_stock = 2;
        let ok = product("Ok", None, "1.00", 50);
        db.products().insert(&low).await.unwrap();
        db.products().insert(&ok).await.unwrap();

        let listed = db.products().list_low_stock().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Low");
    }

    #[tokio::test]
    async fn test_restock() {
        let db = test_db().await;
        let p = product("A", None, "1.00", 5);
        db.products().insert(&p).await.unwrap();

        db.products().restock(&p.id, 7).await.unwrap();

        let loaded = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 12);
    }
}
