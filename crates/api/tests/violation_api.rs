//! HTTP-level integration tests for the admin violation workflow:
//! RBAC enforcement, the review step, action validation, stats, and the
//! block-users side effects.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, create_user, login, request};
use devicegate_core::violation::{Severity, ViolationAction};
use devicegate_db::models::violation::UpsertOpenViolation;
use devicegate_db::repositories::{DeviceBindingRepo, UserRepo, ViolationRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed an open violation directly in the store.
async fn seed_violation(pool: &PgPool, device_id: &str, account_ids: Vec<i64>) -> i64 {
    ViolationRepo::upsert_open(
        pool,
        &UpsertOpenViolation {
            device_id: device_id.to_string(),
            account_ids,
            content_ids: vec![1],
            severity: Severity::Low,
            ip_address: None,
        },
    )
    .await
    .expect("seeding violation should succeed")
    .id
}

async fn act(
    app: &axum::Router,
    token: &str,
    id: i64,
    body: serde_json::Value,
) -> axum::response::Response {
    request(
        app,
        Method::POST,
        &format!("/api/v1/admin/violations/{id}/act"),
        Some(token),
        &[],
        Some(body),
    )
    .await
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

/// Every workflow endpoint rejects non-admin users with 403 and
/// unauthenticated requests with 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_workflow_endpoints_require_admin(pool: PgPool) {
    create_user(&pool, "member1", "member", "pw-member-secret").await;
    let app = build_test_app(pool);
    let member = login(&app, "member1", "pw-member-secret").await;

    for (method, path) in [
        (Method::GET, "/api/v1/admin/violations"),
        (Method::GET, "/api/v1/admin/violations/stats"),
        (Method::POST, "/api/v1/admin/violations/1/review"),
    ] {
        let response = request(&app, method.clone(), path, Some(&member), &[], None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "member hit {path}");

        let response = request(&app, method, path, None, &[], None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "anonymous hit {path}");
    }

    let response = act(&app, &member, 1, serde_json::json!({ "action": "dismiss" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Review step
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_then_act(pool: PgPool) {
    create_user(&pool, "boss", "admin", "pw-admin-secret").await;
    let id = seed_violation(&pool, "dev-review", vec![1, 2]).await;

    let app = build_test_app(pool);
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let review_path = format!("/api/v1/admin/violations/{id}/review");
    let response = request(&app, Method::POST, &review_path, Some(&admin), &[], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "reviewed");

    // Re-reviewing is a no-op success.
    let response = request(&app, Method::POST, &review_path, Some(&admin), &[], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "reviewed");

    // A reviewed violation can still be dismissed.
    let response = act(&app, &admin, id, serde_json::json!({ "action": "dismiss" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "dismissed");

    // Reviewing a terminal violation conflicts.
    let response = request(&app, Method::POST, &review_path, Some(&admin), &[], None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_RESOLVED");
}

// ---------------------------------------------------------------------------
// Action validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_act_rejects_unknown_action(pool: PgPool) {
    create_user(&pool, "boss", "admin", "pw-admin-secret").await;
    let id = seed_violation(&pool, "dev-act", vec![1, 2]).await;

    let app = build_test_app(pool.clone());
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let response = act(&app, &admin, id, serde_json::json!({ "action": "escalate" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    // Nothing changed.
    let current = ViolationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(current.status, "pending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_act_on_missing_violation_is_404(pool: PgPool) {
    create_user(&pool, "boss", "admin", "pw-admin-secret").await;
    let app = build_test_app(pool);
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let response = act(&app, &admin, 424242, serde_json::json!({ "action": "dismiss" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_rejects_unknown_filter_values(pool: PgPool) {
    create_user(&pool, "boss", "admin", "pw-admin-secret").await;
    let app = build_test_app(pool);
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let response = request(
        &app,
        Method::GET,
        "/api/v1/admin/violations?status=escalated",
        Some(&admin),
        &[],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request(
        &app,
        Method::GET,
        "/api/v1/admin/violations?severity=catastrophic",
        Some(&admin),
        &[],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Block-users side effects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_block_users_deactivates_and_locks(pool: PgPool) {
    let u1 = create_user(&pool, "sharer1", "member", "pw-s1-secret").await;
    let u2 = create_user(&pool, "sharer2", "member", "pw-s2-secret").await;
    create_user(&pool, "boss", "admin", "pw-admin-secret").await;

    // Both accounts hold bindings on the shared device.
    for (account, content) in [(u1.id, 1), (u1.id, 2), (u2.id, 1)] {
        DeviceBindingRepo::register(
            &pool,
            &devicegate_db::models::device_binding::RegisterBinding {
                device_id: "dev-block".to_string(),
                account_id: account,
                content_id: content,
                ip_address: None,
            },
        )
        .await
        .unwrap();
    }
    let id = seed_violation(&pool, "dev-block", vec![u1.id, u2.id]).await;

    let app = build_test_app(pool.clone());
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let response = act(
        &app,
        &admin,
        id,
        serde_json::json!({ "action": "block_users", "note": "confirmed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let resolved = body_json(response).await;
    assert_eq!(resolved["data"]["status"], "resolved");
    assert_eq!(resolved["data"]["resolution_action"], "block_users");
    assert_eq!(resolved["data"]["resolution_note"], "confirmed");

    // Every binding of every involved account is deactivated.
    for (account, content) in [(u1.id, 1), (u1.id, 2), (u2.id, 1)] {
        assert!(DeviceBindingRepo::find_active(&pool, "dev-block", content, account)
            .await
            .unwrap()
            .is_none());
    }

    // Both accounts are locked in the account store.
    for account in [u1.id, u2.id] {
        let user = UserRepo::find_by_id(&pool, account).await.unwrap().unwrap();
        assert!(!user.is_active, "account {account} should be blocked");
    }

    // A second act fails with ALREADY_RESOLVED and changes nothing.
    let response = act(&app, &admin, id, serde_json::json!({ "action": "dismiss" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_RESOLVED");

    let current = ViolationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(current.status, "resolved");
    assert!(DeviceBindingRepo::find_active(&pool, "dev-block", 1, u1.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dismiss_leaves_bindings_untouched(pool: PgPool) {
    let u1 = create_user(&pool, "sharer1", "member", "pw-s1-secret").await;
    let u2 = create_user(&pool, "sharer2", "member", "pw-s2-secret").await;
    create_user(&pool, "boss", "admin", "pw-admin-secret").await;

    DeviceBindingRepo::register(
        &pool,
        &devicegate_db::models::device_binding::RegisterBinding {
            device_id: "dev-dismiss".to_string(),
            account_id: u1.id,
            content_id: 1,
            ip_address: None,
        },
    )
    .await
    .unwrap();
    let id = seed_violation(&pool, "dev-dismiss", vec![u1.id, u2.id]).await;

    let app = build_test_app(pool.clone());
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let response = act(&app, &admin, id, serde_json::json!({ "action": "dismiss" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Bindings and accounts are untouched.
    assert!(DeviceBindingRepo::find_active(&pool, "dev-dismiss", 1, u1.id)
        .await
        .unwrap()
        .is_some());
    let user = UserRepo::find_by_id(&pool, u1.id).await.unwrap().unwrap();
    assert!(user.is_active);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_rollup(pool: PgPool) {
    let boss = create_user(&pool, "boss", "admin", "pw-admin-secret").await;

    let a = seed_violation(&pool, "dev-s1", vec![1, 2]).await;
    let b = seed_violation(&pool, "dev-s2", vec![3, 4]).await;
    seed_violation(&pool, "dev-s3", vec![5, 6]).await;
    ViolationRepo::mark_reviewed(&pool, a).await.unwrap();
    ViolationRepo::resolve(&pool, b, ViolationAction::Dismiss, None, boss.id)
        .await
        .unwrap();

    let app = build_test_app(pool);
    let admin = login(&app, "boss", "pw-admin-secret").await;

    let response = request(
        &app,
        Method::GET,
        "/api/v1/admin/violations/stats",
        Some(&admin),
        &[],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["data"]["total"], 3);
    assert_eq!(stats["data"]["pending"], 1);
    assert_eq!(stats["data"]["reviewed"], 1);
    assert_eq!(stats["data"]["resolved"], 0);
    assert_eq!(stats["data"]["dismissed"], 1);
}
