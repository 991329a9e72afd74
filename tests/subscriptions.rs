mod common;

use axum::http::StatusCode;
use common::{TestApp, body_json};

#[tokio::test]
async fn subscribe_then_duplicate_conflicts() {
    let app = TestApp::new().await;
    let (author_id, _) = app.create_user("alice").await;
    let (_, follower_code) = app.create_user("bob").await;
    let cookie = app.login(&follower_code).await;

    let uri = format!("/users/{author_id}/subscribe");

    let resp = app.post(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 0);

    let resp = app.post(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "You are already subscribed to this author");
}

#[tokio::test]
async fn self_subscribe_is_always_rejected() {
    let app = TestApp::new().await;
    let (user_id, access_code) = app.create_user("alice").await;
    let cookie = app.login(&access_code).await;

    let resp = app
        .post(&format!("/users/{user_id}/subscribe"), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "You cannot subscribe to yourself");

    let rows = app
        .count(
            "SELECT COUNT(*) FROM subscriptions WHERE follower_id = ?",
            &user_id,
        )
        .await;
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn unsubscribe_twice_conflicts() {
    let app = TestApp::new().await;
    let (author_id, _) = app.create_user("alice").await;
    let (_, follower_code) = app.create_user("bob").await;
    let cookie = app.login(&follower_code).await;

    let uri = format!("/users/{author_id}/subscribe");

    assert_eq!(app.post(&uri, Some(&cookie)).await.status(), StatusCode::CREATED);
    assert_eq!(
        app.delete(&uri, Some(&cookie)).await.status(),
        StatusCode::NO_CONTENT
    );

    let resp = app.delete(&uri, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "You are not subscribed to this author");
}

#[tokio::test]
async fn subscribe_to_missing_user_is_404() {
    let app = TestApp::new().await;
    let (_, code) = app.create_user("bob").await;
    let cookie = app.login(&code).await;

    let resp = app.post("/users/no-such-id/subscribe", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscriptions_list_limits_preview_but_not_count() {
    let app = TestApp::new().await;
    let (author_id, _) = app.create_user("alice").await;
    let (_, follower_code) = app.create_user("bob").await;
    let cookie = app.login(&follower_code).await;

    for i in 0..3 {
        app.create_recipe(&author_id, &format!("Recipe {i}")).await;
    }

    let resp = app
        .post(&format!("/users/{author_id}/subscribe"), Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .get("/users/subscriptions?recipes_limit=2", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;

    let subs = body.as_array().unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0]["username"], "alice");
    assert_eq!(subs[0]["recipes"].as_array().unwrap().len(), 2);
    // Full count, unaffected by the preview limit.
    assert_eq!(subs[0]["recipes_count"], 3);
}

#[tokio::test]
async fn subscriptions_list_requires_auth() {
    let app = TestApp::new().await;
    let resp = app.get("/users/subscriptions", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_view_reports_subscription_state() {
    let app = TestApp::new().await;
    let (author_id, _) = app.create_user("alice").await;
    let (_, follower_code) = app.create_user("bob").await;
    let cookie = app.login(&follower_code).await;

    let resp = app.get(&format!("/users/{author_id}"), Some(&cookie)).await;
    let body = body_json(resp).await;
    assert_eq!(body["is_subscribed"], false);

    app.post(&format!("/users/{author_id}/subscribe"), Some(&cookie))
        .await;

    let resp = app.get(&format!("/users/{author_id}"), Some(&cookie)).await;
    let body = body_json(resp).await;
    assert_eq!(body["is_subscribed"], true);

    // Anonymous viewers always see false.
    let resp = app.get(&format!("/users/{author_id}"), None).await;
    let body = body_json(resp).await;
    assert_eq!(body["is_subscribed"], false);
}
