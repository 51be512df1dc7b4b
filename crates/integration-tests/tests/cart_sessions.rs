//! Integration tests for the file-backed cart across sessions.
//!
//! Each "session" is a fresh `CartStore` (or a restarted storefront) over the
//! same data directory.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pocket_store_core::storage::CART_KEY;
use pocket_store_core::{CartStore, KeyValueStore, LoadOutcome, ProductId};
use pocket_store_integration_tests::{TestContext, sample_products};
use pocket_store_storefront::storage::FileStore;

fn open(ctx: &TestContext) -> CartStore {
    CartStore::open(Arc::new(ctx.storage()))
}

// =============================================================================
// CartStore over FileStore
// =============================================================================

#[tokio::test]
async fn test_cart_survives_new_session() {
    let ctx = TestContext::new().await;
    let products = sample_products();

    let mut first = open(&ctx);
    first.add_item(&products[0]);
    first.add_item(&products[1]);
    first.set_quantity(ProductId::new(1), 3);
    drop(first);

    let second = open(&ctx);
    let ids: Vec<i32> = second.items().iter().map(|item| item.id.as_i32()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(second.get(ProductId::new(1)).unwrap().quantity, 3);
    assert_eq!(second.item_count(), 4);
    assert_eq!(second.total().to_string(), "$352.15");
}

#[tokio::test]
async fn test_saved_lines_keep_captured_description() {
    let ctx = TestContext::new().await;
    let product = ctx.state.catalog().get_product(ProductId::new(1)).await.unwrap();

    let mut store = open(&ctx);
    store.add_item(&product);

    let reopened = open(&ctx);
    assert_eq!(
        reopened.get(ProductId::new(1)).unwrap().description,
        "Premium product: men's clothing. Your perfect pack for everyday use and walks in the forest...."
    );
}

#[tokio::test]
async fn test_corrupt_cart_file_starts_empty_and_is_replaced() {
    let ctx = TestContext::new().await;
    let storage = ctx.storage();
    storage.set(CART_KEY, "{not json").unwrap();

    let mut store = CartStore::new(Arc::new(FileStore::open(ctx.dir.path()).unwrap()));
    assert_eq!(store.load(), LoadOutcome::Corrupt);
    assert!(store.is_empty());

    store.add_item(&sample_products()[2]);
    let raw = storage.get(CART_KEY).unwrap().unwrap();
    let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved[0]["id"], 3);
    assert_eq!(saved[0]["quantity"], 1);
}

#[tokio::test]
async fn test_cart_with_duplicate_lines_is_rejected() {
    let ctx = TestContext::new().await;
    let line = r#"{"id":1,"title":"A","unitPrice":"1.00","quantity":1,"imageUrl":"","description":""}"#;
    ctx.storage()
        .set(CART_KEY, &format!("[{line},{line}]"))
        .unwrap();

    let mut store = CartStore::new(Arc::new(ctx.storage()));
    assert_eq!(store.load(), LoadOutcome::Corrupt);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_confirmed_order_persists_empty_cart() {
    let ctx = TestContext::new().await;
    let mut store = open(&ctx);
    store.add_item(&sample_products()[0]);
    store.checkout().unwrap();
    store.confirm_checkout().unwrap();

    assert_eq!(ctx.storage().get(CART_KEY).unwrap().as_deref(), Some("[]"));
    assert!(open(&ctx).is_empty());
}

// =============================================================================
// Storefront restart
// =============================================================================

#[tokio::test]
async fn test_restarted_storefront_renders_saved_cart() {
    let mut ctx = TestContext::new().await;
    ctx.state.with_cart(|store| store.add_item(&sample_products()[1]));

    ctx.restart().await;

    assert_eq!(ctx.state.frame().item_count(), 1);
    assert!(ctx.state.frame().html().contains("Mens Casual T-Shirt"));
    // A restart shows the cart but announces nothing.
    assert_eq!(ctx.state.frame().active_notice(), None);
}
