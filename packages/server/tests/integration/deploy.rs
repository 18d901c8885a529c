use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn rejects_an_invalid_owner_id() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::DEPLOY,
            &json!({
                "sourceLocation": "https://example.com/repo.git",
                "ownerId": "../escape",
                "projectId": "blog",
            }),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn rejects_an_empty_project_id() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::DEPLOY,
            &json!({
                "sourceLocation": "https://example.com/repo.git",
                "ownerId": "alice",
                "projectId": "",
            }),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unfetchable_source_reports_deploy_failed_without_detail() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::DEPLOY,
            &json!({
                "sourceLocation": "/nonexistent/siteforge-test-repo.git",
                "ownerId": "alice",
                "projectId": "blog",
            }),
        )
        .await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body["code"], "DEPLOY_FAILED");
    // Internal detail stays in the logs.
    assert!(!res.text.contains("nonexistent"));
}

#[tokio::test]
async fn legacy_deploy_path_still_validates() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            "/deploy",
            &json!({
                "sourceLocation": "https://example.com/repo.git",
                "ownerId": "bad owner!",
                "projectId": "blog",
            }),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
