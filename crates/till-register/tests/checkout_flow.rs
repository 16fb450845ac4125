//! End-to-end register flow: catalog → cart → checkout → committed sale.
//!
//! Runs against an in-memory SQLite database, exactly as a host would drive
//! the register.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use till_core::{Money, PaymentMethod, Product, SaleStatus};
use till_db::{generate_id, Database, DbConfig};
use till_register::{CheckoutError, Register, RegisterConfig, StaticSession};

async fn setup() -> (Database, Register) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let session = Arc::new(StaticSession::new("u1", "Asha Perera"));
    let register = Register::new(db.clone(), RegisterConfig::default(), session);
    (db, register)
}

async fn insert_product(
    db: &Database,
    name: &str,
    barcode: Option<&str>,
    price: &str,
    stock: i64,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: generate_id(),
        name: name.to_string(),
        barcode: barcode.map(String::from),
        description: None,
        price: price.parse().unwrap(),
        cost_price: Money::zero(),
        stock,
        min_stock: 0,
        category_id: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product
}

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_full_checkout_flow() {
    let (db, register) = setup().await;
    let a = insert_product(&db, "Product A", None, "100.00", 5).await;
    let b = insert_product(&db, "Product B", None, "50.00", 1).await;

    register.add_product(&a.id, 3).await.unwrap();
    register.add_product(&b.id, 1).await.unwrap();
    register.set_discount_percent(Decimal::from(10)).unwrap();
    register.set_tax_percent(Decimal::from(5)).unwrap();

    let view = register.cart();
    assert_eq!(view.totals.subtotal, money("350.00"));
    assert_eq!(view.totals.discount_amount, money("35.00"));
    assert_eq!(view.totals.tax_amount, money("15.75"));
    assert_eq!(view.totals.total, money("330.75"));

    let receipt = register
        .checkout(PaymentMethod::Cash, money("350.00"))
        .await
        .unwrap();

    // Receipt carries the frozen figures
    assert!(receipt.sale.invoice_number.starts_with("INV"));
    assert_eq!(receipt.sale.total, money("330.75"));
    assert_eq!(receipt.sale.change, money("19.25"));
    assert_eq!(receipt.sale.cashier_name, "Asha Perera");
    assert_eq!(receipt.lines.len(), 2);
    assert_eq!(receipt.store_name, "Till POS Store");
    assert!(receipt.summary("Rs.").starts_with("Invoice: INV"));

    // Cart is reset: lines gone, discount back to zero, tax kept
    let after = register.cart();
    assert!(after.lines.is_empty());
    assert_eq!(after.totals.discount_amount, Money::zero());

    // Stock decremented by exactly the line quantities
    let a_after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
    let b_after = db.products().get_by_id(&b.id).await.unwrap().unwrap();
    assert_eq!(a_after.stock, 2);
    assert_eq!(b_after.stock, 0);

    // The sale is durable and queryable
    let stored = db
        .sales()
        .get_by_invoice(&receipt.sale.invoice_number)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, SaleStatus::Completed);
    assert_eq!(stored.total, money("330.75"));
    assert_eq!(db.sales().items_for(&stored.id).await.unwrap().len(), 2);
    assert_eq!(db.sales().today_total().await.unwrap(), money("330.75"));
}

#[tokio::test]
async fn test_insufficient_payment_leaves_cart_open() {
    let (db, register) = setup().await;
    let a = insert_product(&db, "Product A", None, "100.00", 5).await;
    let b = insert_product(&db, "Product B", None, "50.00", 1).await;

    register.add_product(&a.id, 3).await.unwrap();
    register.add_product(&b.id, 1).await.unwrap();
    register.set_discount_percent(Decimal::from(10)).unwrap();
    register.set_tax_percent(Decimal::from(5)).unwrap();

    // One cent short of 330.75
    let err = register
        .checkout(PaymentMethod::Cash, money("330.74"))
        .await
        .unwrap_err();

    match err {
        CheckoutError::InsufficientPayment { required, offered } => {
            assert_eq!(required, money("330.75"));
            assert_eq!(offered, money("330.74"));
        }
        other => panic!("expected InsufficientPayment, got {other:?}"),
    }

    // Cart unchanged, nothing persisted, stock untouched
    let view = register.cart();
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.totals.total, money("330.75"));
    assert_eq!(db.sales().count_completed().await.unwrap(), 0);
    let a_after = db.products().get_by_id(&a.id).await.unwrap().unwrap();
    assert_eq!(a_after.stock, 5);
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let (_db, register) = setup().await;

    let err = register
        .checkout(PaymentMethod::Card, money("100.00"))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn test_stock_change_between_add_and_checkout_is_rejected() {
    let (db, register) = setup().await;
    let a = insert_product(&db, "Product A", None, "100.00", 5).await;

    register.add_product(&a.id, 3).await.unwrap();

    // Another terminal sells the product down behind our back
    let mut stale = db.products().get_by_id(&a.id).await.unwrap().unwrap();
    stale.stock = 1;
    db.products().update(&stale).await.unwrap();

    let err = register
        .checkout(PaymentMethod::Cash, money("300.00"))
        .await
        .unwrap_err();

    match err {
        CheckoutError::StockChanged { product_id, .. } => assert_eq!(product_id, a.id),
        other => panic!("expected StockChanged, got {other:?}"),
    }

    // The cart stays open so the host can re-sync and re-price
    assert_eq!(register.cart().lines.len(), 1);
    assert_eq!(db.sales().count_completed().await.unwrap(), 0);
}

#[tokio::test]
async fn test_barcode_adds_clamp_to_stock() {
    let (db, register) = setup().await;
    insert_product(&db, "Scarce", Some("4790000000017"), "75.00", 1).await;

    register.add_by_barcode("4790000000017").await.unwrap();
    // Second scan: stock ceiling already reached, silently stays at 1
    let view = register.add_by_barcode("4790000000017").await.unwrap();

    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].quantity, 1);

    // Unknown barcode is a lookup error, not a silent no-op
    assert!(register.add_by_barcode("0000000000000").await.is_err());
}

#[tokio::test]
async fn test_quantity_controls() {
    let (db, register) = setup().await;
    let a = insert_product(&db, "Product A", None, "10.00", 4).await;

    // addProduct(P, 10) where stock == 4 clamps to 4
    let view = register.add_product(&a.id, 10).await.unwrap();
    assert_eq!(view.lines[0].quantity, 4);

    let view = register.set_quantity(&a.id, 2).await.unwrap();
    assert_eq!(view.lines[0].quantity, 2);

    let view = register.increment_quantity(&a.id).await.unwrap();
    assert_eq!(view.lines[0].quantity, 3);

    register.decrement_quantity(&a.id);
    register.decrement_quantity(&a.id);
    // Decrement at quantity 1 removes the line
    let view = register.decrement_quantity(&a.id);
    assert!(view.lines.is_empty());
}

#[tokio::test]
async fn test_discount_percent_is_validated() {
    let (_db, register) = setup().await;

    assert!(register.set_discount_percent(Decimal::from(150)).is_err());
    assert!(register.set_discount_percent(Decimal::from(-5)).is_err());
    assert!(register.set_discount_percent(Decimal::from(100)).is_ok());
}

#[tokio::test]
async fn test_tax_rate_survives_across_sales() {
    let (db, register) = setup().await;
    let a = insert_product(&db, "Product A", None, "100.00", 10).await;

    register.set_tax_percent(Decimal::from(5)).unwrap();
    register.add_product(&a.id, 1).await.unwrap();
    register
        .checkout(PaymentMethod::Cash, money("105.00"))
        .await
        .unwrap();

    // Next sale: tax still applies without being re-set
    let view = register.add_product(&a.id, 1).await.unwrap();
    assert_eq!(view.totals.tax_amount, money("5.00"));
    assert_eq!(view.totals.total, money("105.00"));
}
