// ABOUTME: Integration tests for the SQLite storage layer
// ABOUTME: Covers companies, policies, users, tokens, slot uniqueness, and cascading removal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Leaky Bucket Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use leaky_bucket_server::{
    database_plugins::DatabaseProvider,
    errors::ErrorCode,
    models::{CompanyId, ListCompaniesOptions, NewToken, NewTokenPolicy, TokenPolicyId, UserId},
};

#[tokio::test]
async fn test_company_create_and_get() {
    let db = common::create_test_database().await.unwrap();

    let company = db.create_company("Acme").await.unwrap();
    let fetched = db.get_company(company.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, company.id);
    assert_eq!(fetched.name, "Acme");
    assert!(db.get_company(CompanyId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_companies_respects_options() {
    let db = common::create_test_database().await.unwrap();
    let (company, policy) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    common::create_bare_user(&db, &company, "a@example.com")
        .await
        .unwrap();
    db.create_company("No Policy").await.unwrap();

    let bare = db
        .list_companies(ListCompaniesOptions::default())
        .await
        .unwrap();
    assert_eq!(bare.len(), 2);
    assert!(bare.iter().all(|c| c.policy.is_none() && c.users.is_none()));

    let full = db
        .list_companies(ListCompaniesOptions::everything())
        .await
        .unwrap();
    let acme = full.iter().find(|c| c.company.id == company.id).unwrap();
    assert_eq!(acme.policy.as_ref().unwrap().id, policy.id);
    assert_eq!(acme.users().len(), 1);

    let other = full.iter().find(|c| c.company.id != company.id).unwrap();
    assert!(other.policy.is_none());
    assert_eq!(other.users.as_deref().map(<[_]>::len), Some(0));
}

#[tokio::test]
async fn test_company_details_includes_tokens() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    let user = common::create_bare_user(&db, &company, "a@example.com")
        .await
        .unwrap();
    for slot in [0, 2] {
        db.create_token(NewToken {
            user_id: user.id,
            company_id: company.id,
            slot,
        })
        .await
        .unwrap();
    }

    let details = db.get_company_details(company.id).await.unwrap().unwrap();
    let holder = &details.users()[0];
    assert_eq!(holder.user.id, user.id);
    assert_eq!(holder.occupied_slots().collect::<Vec<_>>(), vec![0, 2]);

    assert!(db
        .get_company_details(CompanyId::new())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_one_policy_per_company() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();

    let err = db
        .create_policy(NewTokenPolicy {
            company_id: company.id,
            title: "Second".into(),
            max_tokens: 5,
            refill_cooldown_ms: 60_000,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_policy_for_unknown_company_is_not_found() {
    let db = common::create_test_database().await.unwrap();

    let err = db
        .create_policy(NewTokenPolicy {
            company_id: CompanyId::new(),
            title: "Orphan".into(),
            max_tokens: 5,
            refill_cooldown_ms: 60_000,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_delete_policy() {
    let db = common::create_test_database().await.unwrap();
    let (company, policy) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();

    db.delete_policy(policy.id).await.unwrap();
    assert!(db.get_policy(policy.id).await.unwrap().is_none());
    assert!(db
        .get_policy_by_company(company.id)
        .await
        .unwrap()
        .is_none());

    let err = db.delete_policy(TokenPolicyId::new()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_mark_policy_refilled_stamps_time() {
    let db = common::create_test_database().await.unwrap();
    let (_, policy) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    assert!(policy.last_refilled_at.is_none());

    let now = Utc::now();
    db.mark_policy_refilled(policy.id, now).await.unwrap();

    let stamped = db.get_policy(policy.id).await.unwrap().unwrap();
    assert_eq!(
        stamped.last_refilled_at.map(|t| t.timestamp_millis()),
        Some(now.timestamp_millis())
    );
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    common::create_bare_user(&db, &company, "dup@example.com")
        .await
        .unwrap();

    let err = common::create_bare_user(&db, &company, "dup@example.com")
        .await
        .unwrap_err();
    let app_err = err
        .downcast_ref::<leaky_bucket_server::errors::AppError>()
        .unwrap();
    assert_eq!(app_err.code, ErrorCode::ResourceAlreadyExists);
}

#[tokio::test]
async fn test_get_user_by_email_and_list() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    let user = common::create_bare_user(&db, &company, "ada@example.com")
        .await
        .unwrap();

    let by_email = db.get_user_by_email("ada@example.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(user.id));
    assert!(db
        .get_user_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());

    let users = db.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].password_hash, user.password_hash);
}

#[tokio::test]
async fn test_slot_is_unique_per_user_and_company() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    let user = common::create_bare_user(&db, &company, "a@example.com")
        .await
        .unwrap();
    let other = common::create_bare_user(&db, &company, "b@example.com")
        .await
        .unwrap();

    let token = NewToken {
        user_id: user.id,
        company_id: company.id,
        slot: 0,
    };
    db.create_token(token).await.unwrap();

    let err = db.create_token(token).await.unwrap_err();
    assert!(err.is_conflict());

    db.create_token(NewToken {
        user_id: other.id,
        ..token
    })
    .await
    .unwrap();

    assert_eq!(db.count_tokens(user.id).await.unwrap(), 1);
    assert_eq!(db.count_tokens(other.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_and_delete_all_tokens() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    let user = common::create_bare_user(&db, &company, "a@example.com")
        .await
        .unwrap();
    for slot in [2, 0, 1] {
        db.create_token(NewToken {
            user_id: user.id,
            company_id: company.id,
            slot,
        })
        .await
        .unwrap();
    }

    let slots: Vec<u32> = db
        .list_tokens(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.slot)
        .collect();
    assert_eq!(slots, vec![0, 1, 2]);

    assert_eq!(db.delete_all_tokens(user.id).await.unwrap(), 3);
    assert_eq!(db.count_tokens(user.id).await.unwrap(), 0);
    assert_eq!(db.delete_all_tokens(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_user_removes_tokens() {
    let db = common::create_test_database().await.unwrap();
    let (company, _) = common::create_company_with_policy(&db, "Acme", 3)
        .await
        .unwrap();
    let user = common::create_bare_user(&db, &company, "a@example.com")
        .await
        .unwrap();
    for slot in 0..3 {
        db.create_token(NewToken {
            user_id: user.id,
            company_id: company.id,
            slot,
        })
        .await
        .unwrap();
    }

    assert_eq!(db.delete_user(user.id).await.unwrap(), 3);
    assert!(db.get_user(user.id).await.unwrap().is_none());
    assert_eq!(db.count_tokens(user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_unknown_user_is_not_found() {
    let db = common::create_test_database().await.unwrap();

    let err = db.delete_user(UserId::new()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let db = common::create_test_database().await.unwrap();
    db.create_company("Acme").await.unwrap();

    db.migrate().await.unwrap();

    let companies = db
        .list_companies(ListCompaniesOptions::default())
        .await
        .unwrap();
    assert_eq!(companies.len(), 1);
}
