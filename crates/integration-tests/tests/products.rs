//! Product operations against a real `PostgreSQL` database.
//!
//! Run with: cargo test -p clientele-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use clientele_core::{CustomerId, ProductId};
use clientele_integration_tests::{TestContext, jane_doe, laptop};
use clientele_server::services::CustomerError;
use rust_decimal::Decimal;

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_add_and_list_laptop() {
    let ctx = TestContext::new().await;
    let service = ctx.service();

    let jane = service.create_customer(jane_doe()).await.unwrap();
    let product = service.add_product(laptop(jane.customer_id)).await.unwrap();

    assert_eq!(product.customer_id, jane.customer_id);
    assert_eq!(product.product_name, "Laptop");
    assert_eq!(product.quantity, 1);
    assert_eq!(product.price.amount(), Decimal::new(120_000, 2));

    let listed = service.list_products(jane.customer_id).await.unwrap();
    assert_eq!(listed, vec![product]);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_price_is_rounded_to_cents() {
    let ctx = TestContext::new().await;
    let service = ctx.service();

    let jane = service.create_customer(jane_doe()).await.unwrap();
    let mut draft = laptop(jane.customer_id);
    draft.price = Some(Decimal::new(19_995, 3));

    let product = service.add_product(draft).await.unwrap();
    assert_eq!(product.price.to_string(), "20.00");

    let listed = service.list_products(jane.customer_id).await.unwrap();
    assert_eq!(listed[0].price, product.price);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_price_beyond_column_range_is_a_validation_error() {
    let ctx = TestContext::new().await;
    let service = ctx.service();

    let jane = service.create_customer(jane_doe()).await.unwrap();
    let mut draft = laptop(jane.customer_id);
    draft.price = Some(Decimal::new(10_000_000_000, 0));

    let err = service.add_product(draft).await.unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let mut draft = laptop(jane.customer_id);
    draft.price = Some(Decimal::new(999_999_999_999, 2));
    let product = service.add_product(draft).await.unwrap();
    assert_eq!(product.price.to_string(), "9999999999.99");
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_add_for_unknown_customer() {
    let ctx = TestContext::new().await;
    let err = ctx
        .service()
        .add_product(laptop(CustomerId::new(1_000_000_001)))
        .await
        .unwrap_err();
    assert!(matches!(err, CustomerError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_delete_requires_matching_owner() {
    let ctx = TestContext::new().await;
    let service = ctx.service();

    let jane = service.create_customer(jane_doe()).await.unwrap();
    let product = service.add_product(laptop(jane.customer_id)).await.unwrap();

    let err = service
        .delete_product(CustomerId::new(1_000_000_001), product.product_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CustomerError::NotFound(_)));
    assert_eq!(service.list_products(jane.customer_id).await.unwrap().len(), 1);

    service
        .delete_product(jane.customer_id, product.product_id)
        .await
        .unwrap();
    assert!(service.list_products(jane.customer_id).await.unwrap().is_empty());

    let err = service
        .delete_product(jane.customer_id, ProductId::new(product.product_id.get()))
        .await
        .unwrap_err();
    assert!(matches!(err, CustomerError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_list_for_unknown_customer_is_empty() {
    let ctx = TestContext::new().await;
    let products = ctx
        .service()
        .list_products(CustomerId::new(1_000_000_001))
        .await
        .unwrap();
    assert!(products.is_empty());
}
