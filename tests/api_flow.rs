//! End-to-end tests of the user API over real HTTP.

use std::collections::HashSet;

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

async fn register(client: &reqwest::Client, server: &common::TestServer, user: &str, pw: &str) -> reqwest::Response {
    client
        .post(server.url("/api/users/register"))
        .json(&json!({ "username": user, "password": pw }))
        .send()
        .await
        .unwrap()
}

async fn login(client: &reqwest::Client, server: &common::TestServer, user: &str, pw: &str) -> reqwest::Response {
    client
        .post(server.url("/api/users/login"))
        .json(&json!({ "username": user, "password": pw }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_login_profile_logout() {
    let server = common::spawn_app(common::test_config()).await;
    let client = reqwest::Client::new();

    let res = register(&client, &server, "alice", "Secret1!").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"message": "User created"}));

    let res = login(&client, &server, "alice", "Secret1!").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    let token = body["token"].as_str().unwrap().to_string();
    assert!(!token.contains("alice"));

    let res = client
        .get(server.url("/api/users/alice/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let profile: Value = res.json().await.unwrap();
    assert_eq!(profile["username"], "alice");
    assert!(profile["id"].is_u64());

    let res = client
        .post(server.url("/api/users/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"message": "Logged out"}));

    let res = client
        .get(server.url("/api/users/alice/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Unauthorized"}));

    server.stop().await;
}

#[tokio::test]
async fn test_profile_requires_auth_and_existing_user() {
    let server = common::spawn_app(common::test_config()).await;
    let client = reqwest::Client::new();
    register(&client, &server, "carol", "pw").await;
    let token = login(&client, &server, "carol", "pw").await.json::<Value>().await.unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client.get(server.url("/api/users/carol/profile")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/api/users/carol/profile"))
        .header("Authorization", format!("Basic {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/api/users/nobody/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "User not found"}));

    server.stop().await;
}

#[tokio::test]
async fn test_duplicate_and_bad_credentials() {
    let server = common::spawn_app(common::test_config()).await;
    let client = reqwest::Client::new();

    assert_eq!(register(&client, &server, "bob", "Pass123!").await.status(), StatusCode::CREATED);
    let res = register(&client, &server, "bob", "Pass123!").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Username already exists"}));

    let wrong = login(&client, &server, "bob", "WrongPass").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong: Value = wrong.json().await.unwrap();

    let unknown = login(&client, &server, "ghost", "Pass123!").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown: Value = unknown.json().await.unwrap();

    assert_eq!(wrong, json!({"error": "Invalid username or password"}));
    assert_eq!(wrong, unknown);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_bodies() {
    let server = common::spawn_app(common::test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/users/register"))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Invalid JSON body"}));

    let res = client
        .post(server.url("/api/users/login"))
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await.unwrap(),
        json!({"error": "username and password required"})
    );

    server.stop().await;
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let server = common::spawn_app(common::test_config()).await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/nothing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Not Found"}));

    let res = client.delete(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["status"], "operational");

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_get_distinct_tokens() {
    let server = common::spawn_app(common::test_config()).await;
    let client = reqwest::Client::new();

    let users: Vec<String> = (0..10).map(|i| format!("user{i}")).collect();
    for user in &users {
        assert_eq!(register(&client, &server, user, "pw").await.status(), StatusCode::CREATED);
    }

    let url = server.url("/api/users/login");
    let tasks: Vec<_> = users
        .iter()
        .cloned()
        .map(|user| {
            let client = client.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let body: Value = client
                    .post(url)
                    .json(&json!({ "username": user, "password": "pw" }))
                    .send()
                    .await
                    .unwrap()
                    .json()
                    .await
                    .unwrap();
                (user, body["token"].as_str().unwrap().to_string())
            })
        })
        .collect();

    let mut tokens = HashSet::new();
    for task in tasks {
        let (user, token) = task.await.unwrap();
        let profile: Value = client
            .get(server.url(&format!("/api/users/{user}/profile")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(profile["username"], user);
        assert!(tokens.insert(token));
    }
    assert_eq!(tokens.len(), users.len());

    server.stop().await;
}
