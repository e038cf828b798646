use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use returnos_store::advisory::AdvisoryClient;
use returnos_store::draft_saver::DraftSaver;
use returnos_store::middleware::rate_limit::RateLimiter;
use returnos_store::repository::ReturnRepository;
use returnos_store::sqlite_repo::SqliteRepository;
use returnos_store::{build_app, db, AppState};

// -- Helpers ------------------------------------------------------------------

const DEBOUNCE_MS: u64 = 50;

async fn setup_app() -> axum::Router {
    setup_app_with_limit(10_000).await
}

async fn setup_app_with_limit(max_items: i64) -> axum::Router {
    let pool = db::init_pool("sqlite::memory:").await.unwrap();
    let repo: Arc<dyn ReturnRepository> = Arc::new(SqliteRepository::new(pool));
    let state = AppState {
        repo: repo.clone(),
        // No API key: the advisory path degrades without network access.
        advisory: AdvisoryClient::new(None, "http://127.0.0.1:9/unreachable".into()),
        draft_saver: DraftSaver::new(repo, DEBOUNCE_MS),
        rate_limiter: RateLimiter::new(100, 600),
        max_items_per_account: max_items,
        max_payload_bytes: 10_485_760,
        max_draft_bytes: 5_242_880,
    };
    build_app(state)
}

async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    session_token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body_str = body.map(|b| b.to_string());
    raw_request(app, method, uri, session_token, body_str, true).await
}

async fn raw_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    session_token: Option<&str>,
    body: Option<String>,
    json_content: bool,
) -> (StatusCode, Value) {
    let has_body = body.is_some();
    let body_str = body.unwrap_or_default();
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = session_token {
        builder = builder.header("x-session-token", token);
    }
    if has_body && json_content {
        builder = builder.header("content-type", "application/json");
    }

    let req = builder.body(Body::from(body_str)).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register an account and return its session token.
async fn register(app: &axum::Router, full_name: &str, email: &str, password: &str) -> String {
    let (status, body) = json_request(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "fullName": full_name, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["sessionToken"].as_str().unwrap().to_string()
}

fn item_json(id: &str, title: &str, timestamp: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "worn",
        "imageUrl": format!("data:image/png;base64,{id}"),
        "timestamp": timestamp
    })
}

async fn create_item(app: &axum::Router, token: &str, item: Value) {
    let (status, _) = json_request(app, "POST", "/api/v1/items", Some(token), Some(item)).await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn list_ids(app: &axum::Router, token: &str, uri: &str) -> Vec<String> {
    let (status, body) = json_request(app, "GET", uri, Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

// -- Accounts -----------------------------------------------------------------

#[tokio::test]
async fn test_register_then_login_same_user() {
    let app = setup_app().await;
    register(&app, "Jane Doe", "jane@x.com", "p1").await;

    let (status, body) = json_request(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "jane@x.com", "password": "p1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["fullName"], "Jane Doe");
    assert_eq!(body["user"]["email"], "jane@x.com");
    // Safe user only: the credential never appears on the wire.
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = setup_app().await;
    register(&app, "Jane Doe", "jane@x.com", "p1").await;

    // Same email, everything else different
    let (status, body) = json_request(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "fullName": "Other Name", "email": "jane@x.com", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already registered"));
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let app = setup_app().await;
    register(&app, "Jane Doe", "jane@x.com", "p1").await;

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "jane@x.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "p1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_resolves_until_logout() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    let (status, body) =
        json_request(&app, "GET", "/api/v1/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@x.com");

    let (status, _) =
        json_request(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) =
        json_request(&app, "GET", "/api/v1/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_or_malformed_session_token() {
    let app = setup_app().await;

    let (status, _) = json_request(&app, "GET", "/api/v1/items", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = json_request(&app, "GET", "/api/v1/items", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Items and trash lifecycle ------------------------------------------------

#[tokio::test]
async fn test_soft_delete_then_restore_roundtrip() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    let item = json!({
        "id": "T1",
        "title": "Shoe",
        "description": "worn",
        "imageUrl": "data:image/png;base64,AAAA",
        "timestamp": 1000
    });
    create_item(&app, &token, item.clone()).await;

    // Soft delete: active empties, trash holds T1
    let (status, _) =
        json_request(&app, "POST", "/api/v1/items/T1/trash", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(list_ids(&app, &token, "/api/v1/items").await.is_empty());
    assert_eq!(list_ids(&app, &token, "/api/v1/trash").await, vec!["T1"]);

    // Restore: back in active with every field intact, trash empties
    let (status, _) =
        json_request(&app, "POST", "/api/v1/trash/T1/restore", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = json_request(&app, "GET", "/api/v1/items", Some(&token), None).await;
    let restored = &body.as_array().unwrap()[0];
    assert_eq!(restored, &item);
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
}

#[tokio::test]
async fn test_soft_delete_unknown_id_is_noop() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    let (status, _) =
        json_request(&app, "POST", "/api/v1/items/missing/trash", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
}

#[tokio::test]
async fn test_restore_all_orders_descending_by_timestamp() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    create_item(&app, &token, item_json("A", "newest", 5000)).await;
    create_item(&app, &token, item_json("B", "oldest", 3000)).await;
    create_item(&app, &token, item_json("C", "middle", 4000)).await;

    // Trash the 5000 and 3000 items, leaving 4000 active
    for id in ["A", "B"] {
        let uri = format!("/api/v1/items/{id}/trash");
        let (status, _) = json_request(&app, "POST", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _) =
        json_request(&app, "POST", "/api/v1/trash/restore-all", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = json_request(&app, "GET", "/api/v1/items", Some(&token), None).await;
    let timestamps: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["timestamp"].as_i64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![5000, 4000, 3000]);
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
}

#[tokio::test]
async fn test_restore_all_on_empty_trash() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    let (status, _) =
        json_request(&app, "POST", "/api/v1/trash/restore-all", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
}

#[tokio::test]
async fn test_permanent_delete_touches_trash_only() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    create_item(&app, &token, item_json("KEEP", "kept", 2000)).await;
    create_item(&app, &token, item_json("GONE", "doomed", 1000)).await;
    let (status, _) =
        json_request(&app, "POST", "/api/v1/items/GONE/trash", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = json_request(&app, "DELETE", "/api/v1/trash/GONE", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["KEEP"]);
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
}

#[tokio::test]
async fn test_empty_trash() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    for (id, ts) in [("A", 1000), ("B", 2000)] {
        create_item(&app, &token, item_json(id, id, ts)).await;
        let uri = format!("/api/v1/items/{id}/trash");
        json_request(&app, "POST", &uri, Some(&token), None).await;
    }
    assert_eq!(list_ids(&app, &token, "/api/v1/trash").await.len(), 2);

    let (status, _) = json_request(&app, "DELETE", "/api/v1/trash", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
    assert!(list_ids(&app, &token, "/api/v1/items").await.is_empty());
}

#[tokio::test]
async fn test_maintenance_delete_bypasses_trash() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    let (status, _) = json_request(&app, "DELETE", "/api/v1/items/T1", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(list_ids(&app, &token, "/api/v1/items").await.is_empty());
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
}

#[tokio::test]
async fn test_update_item_replaces_fields() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    let updated = item_json("T1", "Boot", 1000);
    let (status, _) = json_request(
        &app,
        "PUT",
        "/api/v1/items/T1",
        Some(&token),
        Some(updated),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = json_request(&app, "GET", "/api/v1/items", Some(&token), None).await;
    assert_eq!(body[0]["title"], "Boot");
}

#[tokio::test]
async fn test_update_unknown_id_is_noop() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    let (status, _) = json_request(
        &app,
        "PUT",
        "/api/v1/items/missing",
        Some(&token),
        Some(item_json("missing", "ghost", 2000)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
}

#[tokio::test]
async fn test_item_limit_skips_write() {
    let app = setup_app_with_limit(1).await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;
    let (status, _) = json_request(
        &app,
        "POST",
        "/api/v1/items",
        Some(&token),
        Some(item_json("T2", "Boot", 2000)),
    )
    .await;
    assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
}

#[tokio::test]
async fn test_partitions_are_isolated() {
    let app = setup_app().await;
    let jane = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    let bob = register(&app, "Bob", "bob@x.com", "p2").await;

    create_item(&app, &jane, item_json("J1", "Jane's", 1000)).await;
    create_item(&app, &bob, item_json("B1", "Bob's", 2000)).await;

    assert_eq!(list_ids(&app, &jane, "/api/v1/items").await, vec!["J1"]);
    assert_eq!(list_ids(&app, &bob, "/api/v1/items").await, vec!["B1"]);

    // Bob trashing Jane's id must not move anything of Jane's
    let (status, _) = json_request(&app, "POST", "/api/v1/items/J1/trash", Some(&bob), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(list_ids(&app, &jane, "/api/v1/items").await, vec!["J1"]);
    assert!(list_ids(&app, &bob, "/api/v1/trash").await.is_empty());
}

// -- Portability --------------------------------------------------------------

#[tokio::test]
async fn test_export_import_is_idempotent() {
    let app = setup_app().await;
    let jane = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    create_item(&app, &jane, item_json("A", "first", 2000)).await;
    create_item(&app, &jane, item_json("B", "second", 1000)).await;
    json_request(&app, "POST", "/api/v1/items/B/trash", Some(&jane), None).await;

    let (status, bundle) =
        json_request(&app, "GET", "/api/v1/backup/export", Some(&jane), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bundle["signature"], "ReturnOS-Secure-Backup");
    assert_eq!(bundle["appVersion"], "1.0.0");
    assert_eq!(bundle["items"].as_array().unwrap().len(), 1);
    assert_eq!(bundle["trash"].as_array().unwrap().len(), 1);

    // Import into a fresh account on "another device"
    let other = register(&app, "Jane Doe", "jane@other.com", "p1").await;
    let (status, result) = json_request(
        &app,
        "POST",
        "/api/v1/backup/import",
        Some(&other),
        Some(bundle.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);
    assert_eq!(result["count"], 1);
    assert_eq!(list_ids(&app, &other, "/api/v1/items").await, vec!["A"]);
    assert_eq!(list_ids(&app, &other, "/api/v1/trash").await, vec!["B"]);

    // Second import of the identical bundle adds nothing
    let (status, result) = json_request(
        &app,
        "POST",
        "/api/v1/backup/import",
        Some(&other),
        Some(bundle),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);
    assert_eq!(result["count"], 0);
    assert_eq!(list_ids(&app, &other, "/api/v1/items").await.len(), 1);
    assert_eq!(list_ids(&app, &other, "/api/v1/trash").await.len(), 1);
}

#[tokio::test]
async fn test_import_resorts_active_set() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("LOCAL", "local", 4000)).await;

    let bundle = json!({
        "email": "jane@x.com",
        "exportDate": "2026-08-30T00:00:00.000Z",
        "items": [item_json("NEW", "imported newest", 5000), item_json("OLD", "imported oldest", 3000)],
        "trash": [],
        "appVersion": "1.0.0",
        "signature": "ReturnOS-Secure-Backup"
    });

    let (status, result) = json_request(
        &app,
        "POST",
        "/api/v1/backup/import",
        Some(&token),
        Some(bundle),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["count"], 2);
    assert_eq!(
        list_ids(&app, &token, "/api/v1/items").await,
        vec!["NEW", "LOCAL", "OLD"]
    );
}

#[tokio::test]
async fn test_import_never_duplicates_across_active_and_trash() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    // The bundle claims T1 is trashed; locally it is active. The id
    // already exists in the union, so the trash entry is skipped.
    let bundle = json!({
        "email": "jane@x.com",
        "exportDate": "2026-08-30T00:00:00.000Z",
        "items": [],
        "trash": [item_json("T1", "Shoe", 1000)],
        "appVersion": "1.0.0",
        "signature": "ReturnOS-Secure-Backup"
    });

    let (status, result) = json_request(
        &app,
        "POST",
        "/api/v1/backup/import",
        Some(&token),
        Some(bundle),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
    assert!(list_ids(&app, &token, "/api/v1/trash").await.is_empty());
}

#[tokio::test]
async fn test_import_bad_signature_mutates_nothing() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    let bundle = json!({
        "email": "jane@x.com",
        "exportDate": "2026-08-30T00:00:00.000Z",
        "items": [item_json("EVIL", "smuggled", 9000)],
        "trash": [],
        "appVersion": "1.0.0",
        "signature": "Not-A-Real-Backup"
    });

    let (status, result) = json_request(
        &app,
        "POST",
        "/api/v1/backup/import",
        Some(&token),
        Some(bundle),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], false);
    assert_eq!(result["count"], 0);
    assert_eq!(result["message"], "Invalid backup file format.");
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
}

#[tokio::test]
async fn test_import_unparseable_body_fails_softly() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    let (status, result) = raw_request(
        &app,
        "POST",
        "/api/v1/backup/import",
        Some(&token),
        Some("this is not json {".into()),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], false);
    assert_eq!(result["message"], "Failed to parse backup file.");
}

#[tokio::test]
async fn test_import_binary_body_fails_softly() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;
    create_item(&app, &token, item_json("T1", "Shoe", 1000)).await;

    // A PNG picked by mistake instead of a backup file: not UTF-8 at all
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/backup/import")
        .header("x-session-token", &token)
        .body(Body::from(vec![0x89u8, 0x50, 0x4E, 0x47, 0xFF, 0xFE]))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let result: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(result["success"], false);
    assert_eq!(result["message"], "Failed to parse backup file.");
    assert_eq!(list_ids(&app, &token, "/api/v1/items").await, vec!["T1"]);
}

// -- Drafts -------------------------------------------------------------------

#[tokio::test]
async fn test_draft_burst_persists_latest_once() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    for title in ["a", "ab", "abc"] {
        let (status, body) = json_request(
            &app,
            "PUT",
            "/api/v1/draft",
            Some(&token),
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"], true);
    }

    // Nothing flushed before the debounce window closes
    let (_, body) = json_request(&app, "GET", "/api/v1/draft", Some(&token), None).await;
    assert!(body.is_null());

    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 5)).await;

    let (_, body) = json_request(&app, "GET", "/api/v1/draft", Some(&token), None).await;
    assert_eq!(body["title"], "abc");
}

#[tokio::test]
async fn test_draft_clear_cancels_pending_save() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    json_request(
        &app,
        "PUT",
        "/api/v1/draft",
        Some(&token),
        Some(json!({ "title": "doomed" })),
    )
    .await;
    let (status, _) = json_request(&app, "DELETE", "/api/v1/draft", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 5)).await;

    let (_, body) = json_request(&app, "GET", "/api/v1/draft", Some(&token), None).await;
    assert!(body.is_null());
}

#[tokio::test]
async fn test_oversized_draft_is_skipped() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    // Seed a small draft, then attempt an oversized overwrite
    json_request(
        &app,
        "PUT",
        "/api/v1/draft",
        Some(&token),
        Some(json!({ "title": "small" })),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 5)).await;

    let huge = "x".repeat(6 * 1024 * 1024);
    let (status, body) = json_request(
        &app,
        "PUT",
        "/api/v1/draft",
        Some(&token),
        Some(json!({ "imageData": huge })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], false);

    tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 5)).await;

    // Previous draft survives untouched
    let (_, body) = json_request(&app, "GET", "/api/v1/draft", Some(&token), None).await;
    assert_eq!(body["title"], "small");
}

// -- Advisory and health ------------------------------------------------------

#[tokio::test]
async fn test_advisory_without_key_degrades() {
    let app = setup_app().await;
    let token = register(&app, "Jane Doe", "jane@x.com", "p1").await;

    let (status, body) = json_request(
        &app,
        "POST",
        "/api/v1/advisory/analyze",
        Some(&token),
        Some(json!({ "imageBase64": "AAAA", "mimeType": "image/png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Manual Entry Required");
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app().await;
    let (status, body) = json_request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
