#![allow(clippy::unwrap_used)]

mod common;

use axum::http::{Method, StatusCode, header};
use serde_json::json;

use crate::common::{
    FILES_BASE_URL, build_test_app, create_agency, create_user, request, send, send_raw,
};

#[tokio::test]
async fn test_list_users_sorted_by_last_name() {
    let (state, app) = build_test_app().await;
    let ada = create_user(&state, "Ada", None, true, true).await;
    let (status, _) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/users/{}", ada.id),
            Some(ada.id),
            Some(json!({"last_name": "Zimmer"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    create_user(&state, "Bob", None, false, false).await;

    let (status, users) = send(&app, request(Method::GET, "/users", Some(ada.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["last_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Worker", "Zimmer"]);
}

#[tokio::test]
async fn test_approval_requires_admin() {
    let (state, app) = build_test_app().await;
    let admin = create_user(&state, "Ada", None, true, true).await;
    let worker = create_user(&state, "Carol", None, false, false).await;
    let uri = format!("/users/{}", worker.id);

    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &uri,
            Some(worker.id),
            Some(json!({"approved": true, "first_name": "Caroline"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Caroline");
    assert_eq!(body["approved"], false);

    let (status, body) = send(
        &app,
        request(Method::PATCH, &uri, Some(admin.id), Some(json!({"approved": true}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approved"], true);
}

#[tokio::test]
async fn test_worker_cannot_edit_or_remove_others() {
    let (state, app) = build_test_app().await;
    let alice = create_user(&state, "Alice", None, false, true).await;
    let carol = create_user(&state, "Carol", None, false, false).await;
    let uri = format!("/users/{}", carol.id);

    let (status, body) = send(
        &app,
        request(Method::PATCH, &uri, Some(alice.id), Some(json!({"last_name": "X"}))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(alice.id), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_removes_users_without_grants() {
    let (state, app) = build_test_app().await;
    let north = create_agency(&state, "North").await;
    let admin = create_user(&state, "Ada", Some(north.id), true, true).await;
    let busy = create_user(&state, "Bob", Some(north.id), false, false).await;
    let idle = create_user(&state, "Ivy", Some(north.id), false, false).await;

    let grant = json!({"people": [{"keep": {"first_name": "Jane", "last_name": "Doe"}}]});
    let (status, _) = send(&app, request(Method::POST, "/grants", Some(busy.id), Some(grant))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        request(Method::DELETE, &format!("/users/{}", busy.id), Some(admin.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "user_has_grants");

    let uri = format!("/users/{}", idle.id);
    let (status, body) = send(&app, request(Method::DELETE, &uri, Some(admin.id), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, request(Method::DELETE, &uri, Some(admin.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_upload_belongs_to_current_user() {
    let (state, app) = build_test_app().await;
    let alice = create_user(&state, "Alice", None, false, false).await;

    let (status, upload) = send(&app, request(Method::GET, "/uploads/new", Some(alice.id), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(upload["owner_type"], "User");
    assert_eq!(upload["owner_id"], alice.id);
    assert!(upload["file_name"].is_null());
}

#[tokio::test]
async fn test_download_redirects_to_expiring_link() {
    let (state, app) = build_test_app().await;
    let alice = create_user(&state, "Alice", None, false, false).await;

    let payload = json!({
        "owner": {"type": "user", "id": alice.id},
        "file_name": "lease.pdf",
        "storage_key": "leases/lease.pdf"
    });
    let (status, upload) = send(&app, request(Method::POST, "/uploads", Some(alice.id), Some(payload))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = upload["id"].as_i64().unwrap();

    let response = send_raw(
        &app,
        request(Method::GET, &format!("/uploads/{id}/download"), Some(alice.id), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with(&format!("{FILES_BASE_URL}/leases/lease.pdf?expires=")));
}

#[tokio::test]
async fn test_download_without_stored_file_fails() {
    let (state, app) = build_test_app().await;
    let alice = create_user(&state, "Alice", None, false, false).await;
    let (_, upload) = send(&app, request(Method::GET, "/uploads/new", Some(alice.id), None)).await;
    let id = upload["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(Method::GET, &format!("/uploads/{id}/download"), Some(alice.id), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation");

    let (status, _) = send(&app, request(Method::GET, "/uploads/999/download", Some(alice.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grant_uploads_are_listed_for_visible_grants() {
    let (state, app) = build_test_app().await;
    let north = create_agency(&state, "North").await;
    let alice = create_user(&state, "Alice", Some(north.id), false, false).await;
    let carol = create_user(&state, "Carol", Some(north.id), false, false).await;

    let grant = json!({"people": [{"keep": {"first_name": "Jane", "last_name": "Doe"}}]});
    let (_, created) = send(&app, request(Method::POST, "/grants", Some(alice.id), Some(grant))).await;
    let grant_id = created["id"].as_i64().unwrap();

    let payload = json!({
        "owner": {"type": "agency", "id": north.id},
        "grant_id": grant_id,
        "file_name": "id.png"
    });
    let (status, _) = send(&app, request(Method::POST, "/uploads", Some(alice.id), Some(payload))).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/grants/{grant_id}/uploads");
    let (status, uploads) = send(&app, request(Method::GET, &uri, Some(alice.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uploads[0]["file_name"], "id.png");
    assert_eq!(uploads[0]["owner_type"], "Agency");

    let (status, _) = send(&app, request(Method::GET, &uri, Some(carol.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploads_respect_grant_visibility() {
    let (state, app) = build_test_app().await;
    let north = create_agency(&state, "North").await;
    let alice = create_user(&state, "Alice", Some(north.id), false, false).await;
    let carol = create_user(&state, "Carol", Some(north.id), false, false).await;

    let grant = json!({"people": [{"keep": {"first_name": "Jane", "last_name": "Doe"}}]});
    let (_, created) = send(&app, request(Method::POST, "/grants", Some(alice.id), Some(grant))).await;
    let grant_id = created["id"].as_i64().unwrap();

    let onto_hidden_grant = json!({
        "owner": {"type": "user", "id": carol.id},
        "grant_id": grant_id,
        "file_name": "x.pdf",
        "storage_key": "k/x.pdf"
    });
    let (status, _) = send(
        &app,
        request(Method::POST, "/uploads", Some(carol.id), Some(onto_hidden_grant)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let as_alice = json!({
        "owner": {"type": "user", "id": alice.id},
        "file_name": "x.pdf",
        "storage_key": "k/x.pdf"
    });
    let (status, body) = send(&app, request(Method::POST, "/uploads", Some(carol.id), Some(as_alice))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let attached = json!({
        "owner": {"type": "user", "id": alice.id},
        "grant_id": grant_id,
        "file_name": "lease.pdf",
        "storage_key": "k/lease.pdf"
    });
    let (status, upload) = send(&app, request(Method::POST, "/uploads", Some(alice.id), Some(attached))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/uploads/{}/download", upload["id"]);

    let (status, _) = send(&app, request(Method::GET, &uri, Some(carol.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = send_raw(&app, request(Method::GET, &uri, Some(alice.id), None)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let loose = json!({
        "owner": {"type": "user", "id": alice.id},
        "file_name": "id.pdf",
        "storage_key": "k/id.pdf"
    });
    let (_, upload) = send(&app, request(Method::POST, "/uploads", Some(alice.id), Some(loose))).await;
    let uri = format!("/uploads/{}/download", upload["id"]);
    let (status, _) = send(&app, request(Method::GET, &uri, Some(carol.id), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_worker_cannot_move_into_another_agency() {
    let (state, app) = build_test_app().await;
    let north = create_agency(&state, "North").await;
    let south = create_agency(&state, "South").await;
    let alice = create_user(&state, "Alice", Some(north.id), false, true).await;
    let bob = create_user(&state, "Bob", Some(south.id), false, false).await;

    let grant = json!({"people": [{"keep": {"first_name": "Jane", "last_name": "Doe"}}]});
    let (status, _) = send(&app, request(Method::POST, "/grants", Some(bob.id), Some(grant))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        request(
            Method::PATCH,
            &format!("/users/{}", alice.id),
            Some(alice.id),
            Some(json!({"agency_id": south.id})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agency_id"], north.id);

    let (_, list) = send(&app, request(Method::GET, "/grants", Some(alice.id), None)).await;
    assert_eq!(list, json!([]));
}
