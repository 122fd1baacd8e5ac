//! PostgreSQL user directory tests
//!
//! Run serially against `DATABASE_URL`; each test returns early when it is
//! not set.

mod common;

use std::collections::BTreeSet;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rolegate::backend::auth::users::{UserReader, UserWriter};
use rolegate::backend::error::BackendError;
use rolegate::shared::{DisplayName, Role, User};
use serial_test::serial;

use common::TestDatabase;

fn user(id: i64, name: &str, roles: &[Role]) -> User {
    User {
        id,
        email: format!("{}@example.com", id),
        name: DisplayName::new(name),
        password_digest: "digest".to_string(),
        roles: roles.iter().copied().collect(),
        created_at: 1_000,
        updated_at: 1_000,
    }
}

#[tokio::test]
#[serial]
async fn test_insert_then_get_returns_role_set() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();

    let id = directory
        .insert(&user(7, "seven", &[Role::Admin, Role::Basic]))
        .await
        .unwrap();
    assert_eq!(id, 7);

    let fetched = directory.get(7).await.unwrap().unwrap();
    assert_eq!(fetched.roles, BTreeSet::from([Role::Admin, Role::Basic]));
    assert_eq!(fetched.name.as_str(), "SEVEN");
    assert_eq!(fetched.password_digest, "digest");
    assert_eq!(db.count("users_roles").await, 2);
}

#[tokio::test]
#[serial]
async fn test_get_unknown_is_none() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    assert!(db.directory().get(404).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_empty_roles_leave_no_rows() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };

    let err = db.directory().insert(&user(7, "seven", &[])).await.unwrap_err();

    assert_matches!(err, BackendError::SharedError(_));
    assert_eq!(db.count("users").await, 0);
    assert_eq!(db.count("users_roles").await, 0);
}

#[tokio::test]
#[serial]
async fn test_duplicate_email_rolls_back() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();
    directory.insert(&user(1, "one", &[Role::Basic])).await.unwrap();

    let mut clash = user(2, "two", &[Role::Basic, Role::Normal]);
    clash.email = "1@example.com".to_string();
    let err = directory.insert(&clash).await.unwrap_err();

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    assert!(directory.get(2).await.unwrap().is_none());
    assert_eq!(db.count("users_roles").await, 1);
}

#[tokio::test]
#[serial]
async fn test_edit_replaces_roles_and_bumps_timestamp() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();
    directory
        .insert(&user(7, "seven", &[Role::Admin, Role::Normal]))
        .await
        .unwrap();

    let mut changed = user(7, "renamed", &[Role::Basic]);
    changed.email = "renamed@example.com".to_string();
    changed.updated_at = 2_000;
    let edited = directory.edit(&changed).await.unwrap();
    assert_eq!(edited.created_at, 1_000);

    let fetched = directory.get(7).await.unwrap().unwrap();
    assert_eq!(fetched.email, "renamed@example.com");
    assert_eq!(fetched.name.as_str(), "RENAMED");
    assert_eq!(fetched.roles, BTreeSet::from([Role::Basic]));
    assert!(fetched.updated_at > 1_000);
}

#[tokio::test]
#[serial]
async fn test_stale_stamp_still_moves_updated_at_forward() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();
    directory.insert(&user(7, "seven", &[Role::Normal])).await.unwrap();

    let same_second = user(7, "seven", &[Role::Basic]);
    let edited = directory.edit(&same_second).await.unwrap();
    assert_eq!(edited.created_at, 1_000);
    assert_eq!(edited.updated_at, 1_001);

    directory.change_password(&same_second).await.unwrap();
    let fetched = directory.get(7).await.unwrap().unwrap();
    assert_eq!(fetched.updated_at, 1_002);
}

#[tokio::test]
#[serial]
async fn test_edit_unknown_user_is_not_found() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };

    let err = db
        .directory()
        .edit(&user(99, "ghost", &[Role::Basic]))
        .await
        .unwrap_err();
    assert_matches!(err, BackendError::NotFoundError { .. });
    assert_eq!(db.count("users_roles").await, 0);
}

#[tokio::test]
#[serial]
async fn test_change_password_and_delete() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();
    directory.insert(&user(7, "seven", &[Role::Basic])).await.unwrap();

    let mut changed = user(7, "seven", &[Role::Basic]);
    changed.password_digest = "new-digest".to_string();
    changed.updated_at = 3_000;
    directory.change_password(&changed).await.unwrap();
    let fetched = directory.get(7).await.unwrap().unwrap();
    assert_eq!(fetched.password_digest, "new-digest");
    assert_eq!(fetched.updated_at, 3_000);

    directory.delete(7).await.unwrap();
    assert!(directory.get(7).await.unwrap().is_none());
    assert_eq!(db.count("users_roles").await, 0);

    assert_matches!(
        directory.delete(7).await,
        Err(BackendError::NotFoundError { .. })
    );
    assert_matches!(
        directory.change_password(&changed).await,
        Err(BackendError::NotFoundError { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_cursor_walk_visits_every_user_once() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();
    for id in 1..=23 {
        let roles: &[Role] = if id % 2 == 0 {
            &[Role::Normal]
        } else {
            &[Role::Basic, Role::Admin]
        };
        directory
            .insert(&user(id, &format!("member {}", id), roles))
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut cursor = 0;
    loop {
        let page = directory.find_with_cursor("", 10, cursor).await.unwrap();
        if page.is_empty() {
            break;
        }
        for u in &page {
            assert!(!u.roles.is_empty());
            assert!(u.password_digest.is_empty());
        }
        cursor = page.last().unwrap().id;
        seen.extend(page.into_iter().map(|u| u.id));
    }

    assert_eq!(seen, (1..=23).collect::<Vec<_>>());
}

#[tokio::test]
#[serial]
async fn test_search_is_case_insensitive_and_literal() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let directory = db.directory();
    directory.insert(&user(1, "alice", &[Role::Basic])).await.unwrap();
    directory.insert(&user(2, "bob_x", &[Role::Basic])).await.unwrap();
    directory.insert(&user(3, "bobby", &[Role::Basic])).await.unwrap();

    let found = directory.find_with_cursor("ali", 10, 0).await.unwrap();
    assert_eq!(found.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1]);

    let found = directory.find_with_cursor("B_", 10, 0).await.unwrap();
    assert_eq!(found.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);
}
