//! # Sale Repository
//!
//! Database operations for sales and sale lines, including the atomic
//! cart-to-sale commit.
//!
//! ## Commit Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     commit_sale transaction                         │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    INSERT sale header (status = completed)                          │
//! │    for each line:                                                   │
//! │      INSERT sale_items row (frozen snapshot)                        │
//! │      UPDATE products SET stock = stock - qty                        │
//! │        WHERE id = ? AND stock >= qty                                │
//! │        └── 0 rows? stock changed since validation:                  │
//! │            ROLLBACK, return StockConflict                           │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  Nothing is visible to readers until COMMIT, so a failure at any    │
//! │  step leaves no partial sale and no decremented stock behind. The   │
//! │  system can never record a sale that oversells, and never loses     │
//! │  stock without a matching sale record.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use super::{money_from_db, money_to_db};
use crate::error::{DbError, DbResult};
use till_core::{Money, PaymentMethod, Sale, SaleLine, SaleStatus};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    invoice_number: String,
    cashier_id: String,
    cashier_name: String,
    sale_date: DateTime<Utc>,
    subtotal: String,
    discount: String,
    tax: String,
    total: String,
    amount_paid: String,
    change: String,
    payment_method: PaymentMethod,
    status: SaleStatus,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> DbResult<Sale> {
        Ok(Sale {
            subtotal: money_from_db("sales.subtotal", &row.subtotal)?,
            discount: money_from_db("sales.discount", &row.discount)?,
            tax: money_from_db("sales.tax", &row.tax)?,
            total: money_from_db("sales.total", &row.total)?,
            amount_paid: money_from_db("sales.amount_paid", &row.amount_paid)?,
            change: money_from_db("sales.change", &row.change)?,
            id: row.id,
            invoice_number: row.invoice_number,
            cashier_id: row.cashier_id,
            cashier_name: row.cashier_name,
            sale_date: row.sale_date,
            payment_method: row.payment_method,
            status: row.status,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleLineRow {
    id: String,
    sale_id: String,
    product_id: Option<String>,
    product_name: String,
    product_barcode: Option<String>,
    quantity: i64,
    unit_price: String,
    discount: String,
    line_total: String,
}

impl TryFrom<SaleLineRow> for SaleLine {
    type Error = DbError;

    fn try_from(row: SaleLineRow) -> DbResult<SaleLine> {
        Ok(SaleLine {
            unit_price: money_from_db("sale_items.unit_price", &row.unit_price)?,
            discount: money_from_db("sale_items.discount", &row.discount)?,
            line_total: money_from_db("sale_items.line_total", &row.line_total)?,
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_barcode: row.product_barcode,
            quantity: row.quantity,
        })
    }
}

const SALE_COLUMNS: &str = r#"
    id, invoice_number, cashier_id, cashier_name, sale_date,
    subtotal, discount, tax, total, amount_paid, change,
    payment_method, status
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Commits a sale atomically: header, lines and stock decrements all
    /// land together or not at all.
    ///
    /// Each stock decrement is conditional on sufficient stock; if any line
    /// fails that condition (the product sold down or disappeared between
    /// cart validation and commit), the whole transaction rolls back and
    /// [`DbError::StockConflict`] identifies the offending product so the
    /// caller can re-sync and re-price.
    pub async fn commit_sale(&self, sale: &Sale, lines: &[SaleLine]) -> DbResult<()> {
        debug!(
            id = %sale.id,
            invoice = %sale.invoice_number,
            lines = lines.len(),
            "Committing sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, cashier_id, cashier_name, sale_date,
                subtotal, discount, tax, total, amount_paid, change,
                payment_method, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_number)
        .bind(&sale.cashier_id)
        .bind(&sale.cashier_name)
        .bind(sale.sale_date)
        .bind(money_to_db(sale.subtotal))
        .bind(money_to_db(sale.discount))
        .bind(money_to_db(sale.tax))
        .bind(money_to_db(sale.total))
        .bind(money_to_db(sale.amount_paid))
        .bind(money_to_db(sale.change))
        .bind(sale.payment_method)
        .bind(sale.status)
        .execute(&mut *tx)
        .await?;

        let now = Utc::now();

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name, product_barcode,
                    quantity, unit_price, discount, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&line.id)
            .bind(&line.sale_id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(&line.product_barcode)
            .bind(line.quantity)
            .bind(money_to_db(line.unit_price))
            .bind(money_to_db(line.discount))
            .bind(money_to_db(line.line_total))
            .execute(&mut *tx)
            .await?;

            let Some(product_id) = &line.product_id else {
                continue;
            };

            // The decrement only matches when stock is sufficient; a miss
            // means the stock figure the cart validated against is stale.
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?1, updated_at = ?2
                WHERE id = ?3 AND stock >= ?1
                "#,
            )
            .bind(line.quantity)
            .bind(now)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await.ok();
                return Err(DbError::StockConflict {
                    product_id: product_id.clone(),
                });
            }
        }

        tx.commit().await?;

        info!(id = %sale.id, invoice = %sale.invoice_number, total = %sale.total, "Sale committed");
        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> =
            sqlx::query_as(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Gets a sale by its invoice number.
    pub async fn get_by_invoice(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE invoice_number = ?1"
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Gets all lines for a sale, in insertion order.
    pub async fn items_for(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let rows: Vec<SaleLineRow> = sqlx::query_as(
            r#"
            SELECT id, sale_id, product_id, product_name, product_barcode,
                   quantity, unit_price, discount, line_total
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleLine::try_from).collect()
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Lists sales in a date range, newest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(&format!(
            "SELECT {SALE_COLUMNS} FROM sales
             WHERE sale_date >= ?1 AND sale_date < ?2
             ORDER BY sale_date DESC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Sums completed-sale totals in a date range.
    ///
    /// Money lives in TEXT columns, so the summing happens in exact decimal
    /// arithmetic here rather than as a lossy SQL SUM.
    pub async fn total_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Money> {
        let totals: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT total FROM sales
            WHERE sale_date >= ?1 AND sale_date < ?2 AND status = 'completed'
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut sum = Decimal::ZERO;
        for raw in &totals {
            sum += money_from_db("sales.total", raw)?.amount();
        }
        Ok(Money::new(sum))
    }

    /// Sums today's completed-sale totals (UTC day).
    pub async fn today_total(&self) -> DbResult<Money> {
        let start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let end = start + chrono::Duration::days(1);
        self.total_between(start, end).await
    }

    /// Counts completed sales.
    pub async fn count_completed(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE status = 'completed'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Flips a completed sale to refunded. Totals and lines stay frozen;
    /// stock compensation is a separate concern outside this layer.
    pub async fn mark_refunded(&self, id: &str) -> DbResult<()> {
        self.transition_status(id, SaleStatus::Refunded).await
    }

    /// Flips a completed sale to voided.
    pub async fn mark_voided(&self, id: &str) -> DbResult<()> {
        self.transition_status(id, SaleStatus::Voided).await
    }

    async fn transition_status(&self, id: &str, status: SaleStatus) -> DbResult<()> {
        debug!(id = %id, status = ?status, "Transitioning sale status");

        let result = sqlx::query("UPDATE sales SET status = ?2 WHERE id = ?1 AND status = 'completed'")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (completed)", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use till_core::Product;

    fn product(name: &str, price: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_id(),
            name: name.to_string(),
            barcode: None,
            description: None,
            price: price.parse().unwrap(),
            cost_price: Money::zero(),
            stock,
            min_stock: 0,
            category_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn sale(invoice: &str, total: &str, paid: &str) -> Sale {
        let total: Money = total.parse().unwrap();
        let paid: Money = paid.parse().unwrap();
        Sale {
            id: generate_id(),
            invoice_number: invoice.to_string(),
            cashier_id: "u1".to_string(),
            cashier_name: "Test Cashier".to_string(),
            sale_date: Utc::now(),
            subtotal: total,
            discount: Money::zero(),
            tax: Money::zero(),
            total,
            amount_paid: paid,
            change: paid - total,
            payment_method: PaymentMethod::Cash,
            status: SaleStatus::Completed,
        }
    }

    fn line(sale_id: &str, product: &Product, quantity: i64) -> SaleLine {
        let unit_price = product.price;
        SaleLine {
            id: generate_id(),
            sale_id: sale_id.to_string(),
            product_id: Some(product.id.clone()),
            product_name: product.name.clone(),
            product_barcode: product.barcode.clone(),
            quantity,
            unit_price,
            discount: Money::zero(),
            line_total: unit_price * quantity,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_commit_sale_persists_and_decrements() {
        let db = test_db().await;
        let p = product("Milk", "250.00", 10);
        db.products().insert(&p).await.unwrap();

        let s = sale("INV20260807120000", "750.00", "1000.00");
        let lines = vec![line(&s.id, &p, 3)];

        db.sales().commit_sale(&s, &lines).await.unwrap();

        let loaded = db.sales().get_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(loaded.total, "750.00".parse().unwrap());
        assert_eq!(loaded.change, "250.00".parse().unwrap());
        assert_eq!(loaded.status, SaleStatus::Completed);

        let items = db.sales().items_for(&s.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);

        let stocked = db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(stocked.stock, 7);
    }

    #[tokio::test]
    async fn test_commit_sale_rolls_back_on_stock_conflict() {
        let db = test_db().await;
        let plenty = product("Plenty", "10.00", 100);
        let scarce = product("Scarce", "5.00", 1);
        db.products().insert(&plenty).await.unwrap();
        db.products().insert(&scarce).await.unwrap();

        let s = sale("INV20260807120001", "30.00", "30.00");
        // Second line asks for more than is in stock
        let lines = vec![line(&s.id, &plenty, 2), line(&s.id, &scarce, 3)];

        let err = db.sales().commit_sale(&s, &lines).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { ref product_id } if *product_id == scarce.id));

        // Nothing is visible: no sale, no lines, no stock movement
        assert!(db.sales().get_by_id(&s.id).await.unwrap().is_none());
        assert!(db.sales().items_for(&s.id).await.unwrap().is_empty());
        let p = db.products().get_by_id(&plenty.id).await.unwrap().unwrap();
        assert_eq!(p.stock, 100);
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_rejected() {
        let db = test_db().await;

        let a = sale("INV20260807120002", "10.00", "10.00");
        let b = sale("INV20260807120002", "20.00", "20.00");

        db.sales().commit_sale(&a, &[]).await.unwrap();
        let err = db.sales().commit_sale(&b, &[]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_get_by_invoice_and_recent_listing() {
        let db = test_db().await;
        let s = sale("INV20260807120003", "42.00", "50.00");
        db.sales().commit_sale(&s, &[]).await.unwrap();

        let by_invoice = db
            .sales()
            .get_by_invoice("INV20260807120003")
            .await
            .unwrap();
        assert!(by_invoice.is_some());

        let recent = db.sales().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_today_total_counts_completed_only() {
        let db = test_db().await;

        let a = sale("INV20260807120004", "100.50", "100.50");
        let b = sale("INV20260807120005", "49.50", "49.50");
        db.sales().commit_sale(&a, &[]).await.unwrap();
        db.sales().commit_sale(&b, &[]).await.unwrap();
        db.sales().mark_voided(&b.id).await.unwrap();

        let total = db.sales().today_total().await.unwrap();
        assert_eq!(total, "100.50".parse().unwrap());
        assert_eq!(db.sales().count_completed().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_refund_keeps_totals_frozen() {
        let db = test_db().await;
        let s = sale("INV20260807120006", "99.99", "100.00");
        db.sales().commit_sale(&s, &[]).await.unwrap();

        db.sales().mark_refunded(&s.id).await.unwrap();

        let loaded = db.sales().get_by_id(&s.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SaleStatus::Refunded);
        assert_eq!(loaded.total, "99.99".parse().unwrap());

        // A second transition is rejected: only completed sales flip
        assert!(db.sales().mark_voided(&s.id).await.is_err());
    }
}
