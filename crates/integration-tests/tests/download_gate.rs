//! Download gate scenarios: single-use consumption, expiry semantics, and
//! the concurrent-presentation race.

#![allow(clippy::unwrap_used)]

use benchlab_core::{OrderId, Vin};
use benchlab_integration_tests::TestContext;
use benchlab_server::gate::AuthorizeError;
use chrono::{TimeDelta, Utc};

async fn paid_order_with_token(ctx: &TestContext, vin: &str) -> (OrderId, String) {
    let order = ctx.store.create(Vin::parse(vin).unwrap()).await.unwrap();
    ctx.store.mark_paid(order.id, None).await.unwrap();
    let token = ctx
        .store
        .mint_token(order.id, TimeDelta::seconds(3600))
        .await
        .unwrap();
    (order.id, token.expose().to_string())
}

#[tokio::test]
async fn token_authorizes_exactly_one_download() {
    let ctx = TestContext::new().await;
    let (order_id, token) = paid_order_with_token(&ctx, "VIN123").await;

    let t0 = Utc::now();

    // First presentation wins and comes back with the token already cleared
    let order = ctx
        .gate
        .authorize(Some(&token), t0 + TimeDelta::seconds(10))
        .await
        .unwrap();
    assert_eq!(order.id, order_id);
    assert!(order.token.is_none());
    assert!(order.token_expires_at.is_none());

    // Second presentation of the same token is invalid, not expired
    let result = ctx
        .gate
        .authorize(Some(&token), t0 + TimeDelta::seconds(20))
        .await;
    assert!(matches!(result, Err(AuthorizeError::InvalidToken)));
}

#[tokio::test]
async fn expired_token_is_cleared_on_first_presentation() {
    let ctx = TestContext::new().await;
    let (order_id, token) = paid_order_with_token(&ctx, "VINAAA").await;

    let past_expiry = Utc::now() + TimeDelta::seconds(7200);
    let result = ctx.gate.authorize(Some(&token), past_expiry).await;
    assert!(matches!(result, Err(AuthorizeError::TokenExpired)));

    // The expired presentation burned the token; a retry cannot distinguish
    // it from a token that never existed
    let result = ctx.gate.authorize(Some(&token), Utc::now()).await;
    assert!(matches!(result, Err(AuthorizeError::InvalidToken)));

    // And the order itself is back to the no-token state
    let order = ctx.store.get(order_id).await.unwrap();
    assert!(order.token.is_none());
}

#[tokio::test]
async fn missing_token_is_rejected_up_front() {
    let ctx = TestContext::new().await;

    assert!(matches!(
        ctx.gate.authorize(None, Utc::now()).await,
        Err(AuthorizeError::MissingToken)
    ));
    assert!(matches!(
        ctx.gate.authorize(Some(""), Utc::now()).await,
        Err(AuthorizeError::MissingToken)
    ));
}

#[tokio::test]
async fn concurrent_presentations_have_one_winner() {
    let ctx = TestContext::new().await;
    let (_order_id, token) = paid_order_with_token(&ctx, "VINBBB").await;

    let now = Utc::now();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let gate = ctx.gate.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            gate.authorize(Some(&token), now).await
        }));
    }

    let mut successes = 0;
    let mut invalid = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AuthorizeError::InvalidToken) => invalid += 1,
            Err(other) => panic!("unexpected denial: {other}"),
        }
    }

    assert_eq!(successes, 1, "exactly one presentation may win");
    assert_eq!(invalid, 7);
}

#[tokio::test]
async fn fresh_token_after_consumption_works() {
    let ctx = TestContext::new().await;
    let (order_id, token) = paid_order_with_token(&ctx, "VINCCC").await;

    ctx.gate.authorize(Some(&token), Utc::now()).await.unwrap();

    // The paid-order flow can mint again; only the new token is live
    let replacement = ctx
        .store
        .mint_token(order_id, TimeDelta::seconds(3600))
        .await
        .unwrap();
    assert_ne!(replacement.expose(), token);

    let order = ctx
        .gate
        .authorize(Some(replacement.expose()), Utc::now())
        .await
        .unwrap();
    assert_eq!(order.id, order_id);
}
