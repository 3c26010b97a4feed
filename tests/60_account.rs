//! Credential-change endpoints: current-password verification, password
//! policy, and duplicate-email conflicts.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{json_request, send, FakeAccounts, Harness};

#[tokio::test]
async fn password_change_verifies_then_updates() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    let payload = json!({
        "currentPassword": "correct horse",
        "newPassword": "battery staple",
        "confirmPassword": "battery staple",
    });
    let (status, body) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-password", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(harness.accounts.current_password(), "battery staple");
}

#[tokio::test]
async fn wrong_current_password_is_a_401_and_changes_nothing() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    let payload = json!({
        "currentPassword": "wrong",
        "newPassword": "battery staple",
    });
    let (status, body) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-password", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Current password is incorrect");
    assert_eq!(harness.accounts.current_password(), "correct horse");
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    let payload = json!({
        "currentPassword": "correct horse",
        "newPassword": "short",
    });
    let (status, body) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-password", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too short"));
}

#[tokio::test]
async fn mismatched_confirmation_is_rejected() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    let payload = json!({
        "currentPassword": "correct horse",
        "newPassword": "battery staple",
        "confirmPassword": "battery stable",
    });
    let (status, _) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-password", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(harness.accounts.current_password(), "correct horse");
}

#[tokio::test]
async fn email_change_succeeds_without_reauthentication() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    let payload = json!({ "newEmail": "new-admin@example.org" });
    let (status, body) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-email", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        harness.accounts.emails_set.lock().unwrap().as_slice(),
        ["new-admin@example.org"]
    );
}

#[tokio::test]
async fn email_change_with_a_wrong_password_is_rejected() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    let payload = json!({
        "newEmail": "new-admin@example.org",
        "currentPassword": "wrong",
    });
    let (status, _) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-email", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(harness.accounts.emails_set.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let mut harness = Harness::new();
    harness.accounts = FakeAccounts::with_duplicate(
        "admin@example.org",
        "correct horse",
        "taken@example.org",
    );
    let cookie = harness.admin_cookie();

    let payload = json!({ "newEmail": "taken@example.org" });
    let (status, body) = send(
        harness.app(),
        json_request("POST", "/api/admin/auth/change-email", &cookie, &payload),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn invalid_email_addresses_are_rejected() {
    let harness = Harness::new();
    let cookie = harness.admin_cookie();

    for bad in ["no-at-sign", "@leading", "trailing@"] {
        let payload = json!({ "newEmail": bad });
        let (status, _) = send(
            harness.app(),
            json_request("POST", "/api/admin/auth/change-email", &cookie, &payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {:?}", bad);
    }
}
