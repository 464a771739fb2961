//! Chirp CRUD and the Polka upgrade webhook

mod common;

use common::{spawn_app, token_of};
use serde_json::{json, Value};

#[tokio::test]
async fn create_chirp_requires_an_access_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/chirps"))
        .json(&json!({ "body": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn create_chirp_masks_profanity() {
    let app = spawn_app().await;
    let login = app.signed_in_user("walt@example.com", "pw1").await;

    let response = app
        .post_chirp(
            &token_of(&login, "token"),
            "This is a Kerfuffle opinion I need to share with the world sharbert!",
        )
        .await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["body"],
        "This is a **** opinion I need to share with the world sharbert!"
    );
    assert_eq!(body["user_id"], login["id"]);
}

#[tokio::test]
async fn create_chirp_rejects_long_bodies() {
    let app = spawn_app().await;
    let login = app.signed_in_user("walt@example.com", "pw1").await;
    let token = token_of(&login, "token");

    let response = app.post_chirp(&token, &"a".repeat(141)).await;
    assert_eq!(400, response.status().as_u16());

    let response = app.post_chirp(&token, &"a".repeat(140)).await;
    assert_eq!(201, response.status().as_u16());
}

#[tokio::test]
async fn list_and_get_chirps() {
    let app = spawn_app().await;
    let login = app.signed_in_user("walt@example.com", "pw1").await;
    let token = token_of(&login, "token");

    let first: Value = app.post_chirp(&token, "first").await.json().await.unwrap();
    app.post_chirp(&token, "second").await;

    let all: Vec<Value> = app
        .client
        .get(app.url("/api/chirps"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let bodies: Vec<&str> = all.iter().filter_map(|c| c["body"].as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);

    let response = app
        .client
        .get(app.url(&format!("/api/chirps/{}", token_of(&first, "id"))))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched, first);
}

#[tokio::test]
async fn get_chirp_with_bad_or_unknown_id() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/chirps/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());

    let response = app
        .client
        .get(app.url(&format!("/api/chirps/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn only_the_author_can_delete_a_chirp() {
    let app = spawn_app().await;
    let author = app.signed_in_user("walt@example.com", "pw1").await;
    let other = app.signed_in_user("jesse@example.com", "pw2").await;

    let chirp: Value = app
        .post_chirp(&token_of(&author, "token"), "mine")
        .await
        .json()
        .await
        .unwrap();
    let chirp_url = app.url(&format!("/api/chirps/{}", token_of(&chirp, "id")));

    let response = app
        .client
        .delete(&chirp_url)
        .bearer_auth(token_of(&other, "token"))
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());

    let response = app
        .client
        .delete(&chirp_url)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());

    let response = app
        .client
        .delete(&chirp_url)
        .bearer_auth(token_of(&author, "token"))
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app.client.get(&chirp_url).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

// --- Polka Webhook ---

async fn post_webhook(app: &common::TestApp, event: &str, user_id: &str) -> u16 {
    app.client
        .post(app.url("/api/polka/webhooks"))
        .json(&json!({ "event": event, "data": { "user_id": user_id } }))
        .send()
        .await
        .unwrap()
        .status()
        .as_u16()
}

#[tokio::test]
async fn webhook_upgrades_user() {
    let app = spawn_app().await;
    app.post_users("walt@example.com", "pw1").await;
    let login: Value = app
        .post_login("walt@example.com", "pw1")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(login["is_chirpy_red"], false);

    assert_eq!(204, post_webhook(&app, "user.upgraded", &token_of(&login, "id")).await);

    let login: Value = app
        .post_login("walt@example.com", "pw1")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(login["is_chirpy_red"], true);
}

#[tokio::test]
async fn webhook_ignores_other_events_and_rejects_unknown_users() {
    let app = spawn_app().await;

    assert_eq!(204, post_webhook(&app, "user.payment_failed", "whatever").await);
    assert_eq!(400, post_webhook(&app, "user.upgraded", "not-a-uuid").await);
    assert_eq!(
        404,
        post_webhook(&app, "user.upgraded", &uuid::Uuid::new_v4().to_string()).await
    );
}
