//! # Catalog Snapshot
//!
//! Read-only view of products and categories, refreshed from storage on
//! demand.
//!
//! There is no caching layer: a snapshot is a plain copy taken by
//! re-querying storage, and callers that need fresher data take another one.
//! Stock checks for cart mutations never go through a snapshot - they re-read
//! the single product row at mutation time.

use chrono::{DateTime, Utc};
use tracing::debug;

use till_core::{Category, Product};
use till_db::error::DbResult;
use till_db::Database;

// =============================================================================
// Catalog
// =============================================================================

/// Storage-backed catalog access.
#[derive(Debug, Clone)]
pub struct Catalog {
    db: Database,
}

impl Catalog {
    /// Creates a catalog over the given database.
    pub fn new(db: Database) -> Self {
        Catalog { db }
    }

    /// Takes a fresh point-in-time snapshot of active products and
    /// categories.
    pub async fn snapshot(&self) -> DbResult<CatalogSnapshot> {
        let products = self.db.products().list_active().await?;
        let categories = self.db.categories().list_active().await?;

        debug!(
            products = products.len(),
            categories = categories.len(),
            "Catalog snapshot taken"
        );

        Ok(CatalogSnapshot {
            products,
            categories,
            taken_at: Utc::now(),
        })
    }

    /// Fresh single-product read by id (active products only).
    pub async fn product_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.db.products().get_by_id(id).await
    }

    /// Fresh single-product read by barcode (active products only).
    pub async fn product_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        self.db.products().get_by_barcode(barcode).await
    }
}

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// A point-in-time copy of the active catalog.
///
/// Filtering for the product grid runs in memory over the copy, matching how
/// hosts actually use it (type-ahead search, category chips).
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub taken_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Filters products by a search query (case-insensitive name substring,
    /// or barcode substring). An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                query.is_empty()
                    || p.name.to_lowercase().contains(&query)
                    || p.barcode
                        .as_deref()
                        .map(|b| b.contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    /// Filters products by category.
    pub fn in_category(&self, category_id: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category_id.as_deref() == Some(category_id))
            .collect()
    }

    /// Products at or below their reorder threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_low_stock()).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
