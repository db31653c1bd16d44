//! Order lifecycle scenarios: creation, payment transitions, token minting,
//! and persistence across reopen.

#![allow(clippy::unwrap_used)]

use benchlab_core::{OrderStatus, Vin};
use benchlab_integration_tests::TestContext;
use benchlab_server::store::{OrderStore, StoreError};
use chrono::{TimeDelta, Utc};

fn vin(s: &str) -> Vin {
    Vin::parse(s).unwrap()
}

#[tokio::test]
async fn create_then_pay_then_mint() {
    let ctx = TestContext::new().await;

    let order = ctx.store.create(vin("VIN123")).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.token.is_none());

    let paid = ctx
        .store
        .mark_paid(order.id, Some("stripe_pi_123".to_string()))
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.provider_reference.as_deref(), Some("stripe_pi_123"));

    let token = ctx
        .store
        .mint_token(order.id, TimeDelta::seconds(3600))
        .await
        .unwrap();

    let stored = ctx.store.get(order.id).await.unwrap();
    assert_eq!(stored.token.as_ref(), Some(&token));
    let expires_at = stored.token_expires_at.unwrap();
    assert!(expires_at > Utc::now());
    assert!(expires_at <= Utc::now() + TimeDelta::seconds(3600));
}

#[tokio::test]
async fn paid_and_failed_are_terminal() {
    let ctx = TestContext::new().await;

    let paid_order = ctx.store.create(vin("VINAAA")).await.unwrap();
    ctx.store.mark_paid(paid_order.id, None).await.unwrap();
    assert!(matches!(
        ctx.store.mark_paid(paid_order.id, None).await,
        Err(StoreError::InvalidState {
            current: OrderStatus::Paid
        })
    ));
    assert!(matches!(
        ctx.store.mark_failed(paid_order.id).await,
        Err(StoreError::InvalidState { .. })
    ));

    let failed_order = ctx.store.create(vin("VINBBB")).await.unwrap();
    ctx.store.mark_failed(failed_order.id).await.unwrap();
    assert!(matches!(
        ctx.store.mark_paid(failed_order.id, None).await,
        Err(StoreError::InvalidState {
            current: OrderStatus::Failed
        })
    ));
}

#[tokio::test]
async fn mint_requires_paid_status() {
    let ctx = TestContext::new().await;

    let order = ctx.store.create(vin("VINCCC")).await.unwrap();
    assert!(matches!(
        ctx.store.mint_token(order.id, TimeDelta::seconds(60)).await,
        Err(StoreError::InvalidState {
            current: OrderStatus::Pending
        })
    ));

    let failed = ctx.store.create(vin("VINDDD")).await.unwrap();
    ctx.store.mark_failed(failed.id).await.unwrap();
    assert!(matches!(
        ctx.store.mint_token(failed.id, TimeDelta::seconds(60)).await,
        Err(StoreError::InvalidState {
            current: OrderStatus::Failed
        })
    ));
}

#[tokio::test]
async fn remint_invalidates_unused_token() {
    let ctx = TestContext::new().await;

    let order = ctx.store.create(vin("VINEEE")).await.unwrap();
    ctx.store.mark_paid(order.id, None).await.unwrap();

    let first = ctx
        .store
        .mint_token(order.id, TimeDelta::seconds(3600))
        .await
        .unwrap();
    let second = ctx
        .store
        .mint_token(order.id, TimeDelta::seconds(3600))
        .await
        .unwrap();

    // The first token dies before it was ever presented
    assert!(matches!(
        ctx.store.find_by_token(first.expose()).await,
        Err(StoreError::NotFound)
    ));
    let holder = ctx.store.find_by_token(second.expose()).await.unwrap();
    assert_eq!(holder.id, order.id);
}

#[tokio::test]
async fn consume_token_twice_is_a_noop() {
    let ctx = TestContext::new().await;

    let order = ctx.store.create(vin("VINFFF")).await.unwrap();
    ctx.store.mark_paid(order.id, None).await.unwrap();
    ctx.store
        .mint_token(order.id, TimeDelta::seconds(3600))
        .await
        .unwrap();

    ctx.store.consume_token(order.id).await.unwrap();
    let after_first = ctx.store.get(order.id).await.unwrap();

    ctx.store.consume_token(order.id).await.unwrap();
    let after_second = ctx.store.get(order.id).await.unwrap();

    assert!(after_first.token.is_none());
    assert!(after_first.token_expires_at.is_none());
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn failed_persist_rolls_back_in_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.json");
    let store = OrderStore::open(&path).await.unwrap();

    let order = store.create(vin("VINHHH")).await.unwrap();

    // Replace the store file with a non-empty directory so the temp-file
    // rename cannot land
    tokio::fs::remove_file(&path).await.unwrap();
    tokio::fs::create_dir(&path).await.unwrap();
    tokio::fs::write(path.join("occupant"), b"x").await.unwrap();

    let result = store.mark_paid(order.id, Some("prov-1".to_string())).await;
    assert!(matches!(result, Err(StoreError::Storage(_))));

    // The transition was rolled back, not half-applied
    let stored = store.get(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert!(stored.paid_at.is_none());
    assert!(stored.provider_reference.is_none());

    // Once storage recovers the same transition goes through
    tokio::fs::remove_dir_all(&path).await.unwrap();
    let paid = store.mark_paid(order.id, Some("prov-1".to_string())).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
}

#[tokio::test]
async fn orders_survive_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.json");

    let (order_id, token) = {
        let store = OrderStore::open(&path).await.unwrap();
        let order = store.create(vin("VINGGG")).await.unwrap();
        store.mark_paid(order.id, None).await.unwrap();
        let token = store
            .mint_token(order.id, TimeDelta::seconds(3600))
            .await
            .unwrap();
        (order.id, token)
    };

    // A fresh store instance over the same file sees the paid order and its
    // live token
    let reopened = OrderStore::open(&path).await.unwrap();
    let order = reopened.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.token, Some(token));
}
