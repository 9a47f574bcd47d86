mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{
    body_string, files_collection_path, location, objects_path, TestApp, BUCKET, ID_TOKEN, UID,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const BOUNDARY: &str = "----files-frontend-test-boundary";

fn multipart_request(cookie: &str, file_name: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{b}--\r\n",
        b = BOUNDARY,
        name = file_name,
        content = content,
    );

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_stores_object_and_records_metadata() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    Mock::given(method("POST"))
        .and(path(objects_path()))
        .and(query_param("uploadType", "media"))
        .and(header_eq("Authorization", format!("Firebase {}", ID_TOKEN).as_str()))
        .and(header_eq("Content-Type", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("users/{}/generated-notes.txt", UID),
            "bucket": BUCKET,
            "contentType": "text/plain",
            "size": "11",
            "timeCreated": "2024-05-01T12:00:00.000Z",
            "downloadTokens": "tok-notes"
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    Mock::given(method("POST"))
        .and(path(files_collection_path()))
        .and(header_eq("Authorization", format!("Bearer {}", ID_TOKEN).as_str()))
        .and(body_partial_json(json!({
            "fields": {
                "name": { "stringValue": "notes.txt" },
                "contentType": { "stringValue": "text/plain" },
                "size": { "integerValue": "11" },
                "storagePath": { "stringValue": format!("users/{}/generated-notes.txt", UID) },
                "downloadToken": { "stringValue": "tok-notes" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .send(multipart_request(&cookie, "notes.txt", "hello world"))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn rejected_token_sends_user_back_to_login() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    Mock::given(method("POST"))
        .and(path(objects_path()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.backend)
        .await;

    let response = app
        .send(multipart_request(&cookie, "notes.txt", "hello world"))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?redirect=%2Fupload");

    // The session was cleared along with the rejected token.
    let response = app.get("/upload", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn failed_metadata_write_removes_stored_object() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;
    let stored_name = format!("users/{}/generated-notes.txt", UID);

    Mock::given(method("POST"))
        .and(path(objects_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": stored_name,
            "bucket": BUCKET,
            "size": "11"
        })))
        .expect(1)
        .mount(&app.backend)
        .await;

    Mock::given(method("POST"))
        .and(path(files_collection_path()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.backend)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/users%2F{}%2Fgenerated-notes.txt", objects_path(), UID)))
        .and(header_eq("Authorization", format!("Firebase {}", ID_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .send(multipart_request(&cookie, "notes.txt", "hello world"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response).await.contains("Upload failed"));
}

#[tokio::test]
async fn failed_cleanup_still_reports_original_error() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    Mock::given(method("POST"))
        .and(path(objects_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": format!("users/{}/generated-notes.txt", UID),
            "bucket": BUCKET
        })))
        .mount(&app.backend)
        .await;

    Mock::given(method("POST"))
        .and(path(files_collection_path()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.backend)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .send(multipart_request(&cookie, "notes.txt", "hello world"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn storage_outage_rerenders_form_with_error() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    Mock::given(method("POST"))
        .and(path(objects_path()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.backend)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app
        .send(multipart_request(&cookie, "notes.txt", "hello world"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_string(response).await.contains("Upload failed"));
}

#[tokio::test]
async fn empty_file_is_rejected_before_storage() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    Mock::given(method("POST"))
        .and(path(objects_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app.send(multipart_request(&cookie, "empty.txt", "")).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_string(response).await.contains("non-empty file"));
}

#[tokio::test]
async fn dashboard_lists_recorded_files_newest_first() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    let document = |id: &str, name: &str, uploaded_at: &str| {
        json!({
            "name": format!("projects/p/databases/(default)/documents/users/{}/files/{}", UID, id),
            "fields": {
                "name": { "stringValue": name },
                "contentType": { "stringValue": "text/plain" },
                "size": { "integerValue": "2048" },
                "storagePath": { "stringValue": format!("users/{}/{}-{}", UID, id, name) },
                "downloadToken": { "stringValue": format!("tok-{}", id) },
                "uploadedAt": { "timestampValue": uploaded_at }
            }
        })
    };

    Mock::given(method("GET"))
        .and(path(files_collection_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                document("f1", "older.txt", "2024-01-01T00:00:00Z"),
                document("f2", "newer.txt", "2024-06-01T00:00:00Z"),
                { "name": "projects/p/databases/(default)/documents/users/x/files/broken" }
            ]
        })))
        .mount(&app.backend)
        .await;

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let newer = body.find("newer.txt").expect("newer file listed");
    let older = body.find("older.txt").expect("older file listed");
    assert!(newer < older);
    assert!(body.contains("2.0 KB"));
    assert!(body.contains("alt=media&amp;token=tok-f2"));
    assert!(body.contains("alt=media&amp;token=tok-f1"));
    assert!(!body.contains("broken"));
}

#[tokio::test]
async fn dashboard_survives_database_outage() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_in().await;

    Mock::given(method("GET"))
        .and(path(files_collection_path()))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.backend)
        .await;

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("could not be loaded"));
}
