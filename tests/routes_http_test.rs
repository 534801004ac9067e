// ABOUTME: HTTP integration tests for the full Leaky Bucket router
// ABOUTME: Exercises companies, token policies, signup, login, and user removal through axum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

//! HTTP integration tests
//!
//! Each test builds the complete router over a fresh in-memory database and
//! drives it in-process with `tower::ServiceExt::oneshot`.

mod common;
mod helpers;

use axum::Router;
use helpers::axum_test::AxumTestRequest;
use leaky_bucket_server::database_plugins::DatabaseProvider;
use serde_json::{json, Value};

async fn create_company(app: &Router, name: &str) -> String {
    let response = AxumTestRequest::post("/companies")
        .json(&json!({ "name": name }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_owned()
}

async fn create_policy(app: &Router, company_id: &str, max_tokens: u32) -> Value {
    let response = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": company_id, "maxTokens": max_tokens }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    response.json()
}

async fn signup(app: &Router, company_id: &str, email: &str) -> Value {
    let response = AxumTestRequest::post("/signup")
        .json(&json!({
            "name": "Ada Lovelace",
            "email": email,
            "password": "correct horse battery",
            "companyId": company_id,
        }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    response.json()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let (app, _) = common::create_test_app().await.unwrap();

    let health = AxumTestRequest::get("/health").send(app.clone()).await;
    assert_eq!(health.status(), 200);
    let body: Value = health.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "leaky-bucket-server");

    let ready = AxumTestRequest::get("/ready").send(app).await;
    assert_eq!(ready.status(), 200);
    let body: Value = ready.json();
    assert_eq!(body["database"], "SQLite");
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let (app, _) = common::create_test_app().await.unwrap();

    let generated = AxumTestRequest::get("/health").send(app.clone()).await;
    assert!(generated.header("x-request-id").is_some());

    let supplied = AxumTestRequest::get("/health")
        .header("x-request-id", "trace-me")
        .send(app)
        .await;
    assert_eq!(supplied.header("x-request-id").as_deref(), Some("trace-me"));
}

// ============================================================================
// Companies
// ============================================================================

#[tokio::test]
async fn test_create_company() {
    let (app, _) = common::create_test_app().await.unwrap();

    let response = AxumTestRequest::post("/companies")
        .json(&json!({ "companyName": "Acme" }))
        .send(app)
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["name"], "Acme");
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn test_create_company_rejects_blank_name() {
    let (app, _) = common::create_test_app().await.unwrap();

    let response = AxumTestRequest::post("/companies")
        .json(&json!({ "name": "   " }))
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_create_company_rejects_malformed_json() {
    let (app, _) = common::create_test_app().await.unwrap();

    let response = AxumTestRequest::post("/companies")
        .raw_json("{ not json")
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_list_companies_with_and_without_users() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;
    create_policy(&app, &company_id, 2).await;
    signup(&app, &company_id, "ada@example.com").await;
    create_company(&app, "Bare").await;

    let response = AxumTestRequest::get("/companies").send(app.clone()).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    let companies = body["companies"].as_array().unwrap();
    assert_eq!(companies.len(), 2);
    assert!(companies.iter().all(|c| c.get("users").is_none()));
    let acme = companies.iter().find(|c| c["id"] == company_id).unwrap();
    assert_eq!(acme["policy"]["max_tokens"], 2);
    let bare = companies.iter().find(|c| c["id"] != company_id).unwrap();
    assert!(bare["policy"].is_null());

    let response = AxumTestRequest::get("/companies?showUsers=true")
        .send(app)
        .await;
    let body: Value = response.json();
    let acme = body["companies"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == company_id)
        .unwrap()
        .clone();
    let users = acme["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "ada@example.com");
    assert_eq!(users[0]["tokens"].as_array().unwrap().len(), 2);
    assert!(users[0].get("password_hash").is_none());
}

// ============================================================================
// Token policies
// ============================================================================

#[tokio::test]
async fn test_create_policy_applies_defaults() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;

    let response = AxumTestRequest::post("/token-policies")
        .json(&json!({ "company_id": company_id }))
        .send(app)
        .await;

    assert_eq!(response.status(), 201);
    let body: Value = response.json();
    assert_eq!(body["max_tokens"], 10);
    assert_eq!(body["refill_cooldown_ms"], 3_600_000);
    assert_eq!(body["title"], "Hourly token policy");
}

#[tokio::test]
async fn test_create_policy_titles_from_cooldown() {
    let (app, _) = common::create_test_app().await.unwrap();
    let daily = create_company(&app, "Daily").await;
    let custom = create_company(&app, "Custom").await;

    let response = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": daily, "newTokenCooldown": 86_400_000u64 }))
        .send(app.clone())
        .await;
    let body: Value = response.json();
    assert_eq!(body["title"], "Daily token policy");

    let response = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": custom, "title": "Gold tier", "maxTokens": 50 }))
        .send(app)
        .await;
    let body: Value = response.json();
    assert_eq!(body["title"], "Gold tier");
    assert_eq!(body["max_tokens"], 50);
}

#[tokio::test]
async fn test_create_policy_rejections() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;

    let zero = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": company_id, "maxTokens": 0 }))
        .send(app.clone())
        .await;
    assert_eq!(zero.status(), 400);

    let unknown = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": uuid::Uuid::new_v4().to_string() }))
        .send(app.clone())
        .await;
    assert_eq!(unknown.status(), 404);

    let bad_id = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": "not-a-uuid" }))
        .send(app.clone())
        .await;
    assert_eq!(bad_id.status(), 400);

    create_policy(&app, &company_id, 3).await;
    let second = AxumTestRequest::post("/token-policies")
        .json(&json!({ "companyId": company_id }))
        .send(app)
        .await;
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn test_delete_policy() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;
    let policy = create_policy(&app, &company_id, 3).await;
    let uri = format!("/token-policies/{}", policy["id"].as_str().unwrap());

    let response = AxumTestRequest::delete(&uri).send(app.clone()).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let again = AxumTestRequest::delete(&uri).send(app.clone()).await;
    assert_eq!(again.status(), 404);

    let malformed = AxumTestRequest::delete("/token-policies/abc").send(app).await;
    assert_eq!(malformed.status(), 400);
}

// ============================================================================
// Signup and login
// ============================================================================

#[tokio::test]
async fn test_signup_issues_tokens() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;
    create_policy(&app, &company_id, 3).await;

    let body = signup(&app, &company_id, "Ada@Example.com").await;

    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["company_id"], company_id.as_str());
    assert!(body["user"].get("password_hash").is_none());
    let slots: Vec<u64> = body["tokens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["slot"].as_u64().unwrap())
        .collect();
    assert_eq!(slots, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_signup_without_policy_is_unauthorized() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;

    let response = AxumTestRequest::post("/signup")
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret",
            "company_id": company_id,
        }))
        .send(app)
        .await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "POLICY_MISSING");

    assert!(resources.database.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_validation_and_conflicts() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;
    create_policy(&app, &company_id, 1).await;

    let bad_email = AxumTestRequest::post("/signup")
        .json(&json!({
            "name": "Ada",
            "email": "not-an-email",
            "password": "secret",
            "companyId": company_id,
        }))
        .send(app.clone())
        .await;
    assert_eq!(bad_email.status(), 400);

    let unknown_company = AxumTestRequest::post("/signup")
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret",
            "companyId": uuid::Uuid::new_v4().to_string(),
        }))
        .send(app.clone())
        .await;
    assert_eq!(unknown_company.status(), 404);

    signup(&app, &company_id, "ada@example.com").await;
    let duplicate = AxumTestRequest::post("/signup")
        .json(&json!({
            "name": "Ada Again",
            "email": "ada@example.com",
            "password": "secret",
            "companyId": company_id,
        }))
        .send(app)
        .await;
    assert_eq!(duplicate.status(), 409);
}

#[tokio::test]
async fn test_login_issues_valid_jwt() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;
    create_policy(&app, &company_id, 1).await;
    let signed_up = signup(&app, &company_id, "ada@example.com").await;

    let response = AxumTestRequest::post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "correct horse battery" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();

    let claims = resources
        .auth_manager
        .validate_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, signed_up["user"]["id"].as_str().unwrap());
    assert_eq!(claims.company_id, company_id);
    assert!(body["expires_at"].is_string());

    let wrong = AxumTestRequest::post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "nope" }))
        .send(app.clone())
        .await;
    assert_eq!(wrong.status(), 401);

    let unknown = AxumTestRequest::post("/login")
        .json(&json!({ "email": "ghost@example.com", "password": "nope" }))
        .send(app)
        .await;
    assert_eq!(unknown.status(), 401);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_list_and_delete_users() {
    let (app, _) = common::create_test_app().await.unwrap();
    let company_id = create_company(&app, "Acme").await;
    create_policy(&app, &company_id, 3).await;
    let signed_up = signup(&app, &company_id, "ada@example.com").await;
    let user_id = signed_up["user"]["id"].as_str().unwrap().to_owned();

    let response = AxumTestRequest::get("/users").send(app.clone()).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["users"].as_array().unwrap().len(), 1);

    let response = AxumTestRequest::delete(&format!("/users/{user_id}"))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["user_id"], user_id.as_str());
    assert_eq!(body["tokens_removed"], 3);

    let again = AxumTestRequest::delete(&format!("/users/{user_id}"))
        .send(app.clone())
        .await;
    assert_eq!(again.status(), 404);

    let malformed = AxumTestRequest::delete("/users/42").send(app.clone()).await;
    assert_eq!(malformed.status(), 400);

    let response = AxumTestRequest::get("/users").send(app).await;
    let body: Value = response.json();
    assert!(body["users"].as_array().unwrap().is_empty());
}

// ============================================================================
// Singular paths
// ============================================================================

#[tokio::test]
async fn test_singular_paths_match_plural_routes() {
    let (app, _) = common::create_test_app().await.unwrap();

    let response = AxumTestRequest::post("/company")
        .json(&json!({ "companyName": "Acme" }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    let company: Value = response.json();
    let company_id = company["id"].as_str().unwrap().to_owned();

    let response = AxumTestRequest::get("/company?showUsers=true")
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["companies"].as_array().unwrap().len(), 1);

    let response = AxumTestRequest::post("/token-policy")
        .json(&json!({ "companyId": company_id, "maxTokens": 2, "newTokenCooldown": 60_000 }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 201);
    let policy: Value = response.json();
    assert_eq!(policy["max_tokens"], 2);

    let signed_up = signup(&app, &company_id, "ada@example.com").await;
    let user_id = signed_up["user"]["id"].as_str().unwrap().to_owned();

    let response = AxumTestRequest::get("/user").send(app.clone()).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["users"].as_array().unwrap().len(), 1);

    let response = AxumTestRequest::delete(&format!("/user/{user_id}"))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["tokens_removed"], 2);

    let policy_id = policy["id"].as_str().unwrap();
    let response = AxumTestRequest::delete(&format!("/token-policy/{policy_id}"))
        .send(app)
        .await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
}
