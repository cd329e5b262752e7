//! Route-level tests for the actions handler, driven through tower.

use std::sync::Arc;

use api_adapters::handlers::{router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use domains::models::{Board, Post};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use services::pipeline::{ModerationPipeline, PipelineLimits};
use storage_adapters::{MemDispatcher, MemStore};
use tower::ServiceExt;

fn post_fixture(board: &str, post_id: u64, thread: Option<u64>) -> Post {
    Post {
        board: board.into(),
        post_id,
        thread,
        message: "hello".into(),
        date: Utc::now(),
        password: None,
        files: vec![],
        sticky: 0,
        reports: vec![],
        global_reports: vec![],
    }
}

fn app() -> (Arc<MemStore>, Router) {
    let store = Arc::new(MemStore::new());
    store.insert_board(Board::new("b", "Random"));
    store.insert_post(post_fixture("b", 1, None));
    store.insert_post(post_fixture("b", 2, Some(1)));

    let dispatcher = Arc::new(MemDispatcher::new(store.clone(), "test-secret"));
    let pipeline = Arc::new(ModerationPipeline::new(
        store.clone(),
        store.clone(),
        dispatcher,
        PipelineLimits::default(),
    ));
    let state = Arc::new(AppState {
        pipeline,
        boards: store.clone(),
        ip_hash_secret: "test-secret".into(),
    });
    (store, router(state))
}

async fn submit(app: Router, board: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post(format!("/forms/board/{board}/actions"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn empty_selection_is_bad_request() {
    let (_store, app) = app();
    let (status, body) = submit(app, "b", json!({ "report": true })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Must select at least one post");
    assert_eq!(body["redirect"], "/b/");
}

#[tokio::test]
async fn unknown_board_is_not_found() {
    let (_store, app) = app();
    let (status, body) = submit(app, "zz", json!({ "checkedposts": [1], "report": true })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Board does not exist");
}

#[tokio::test]
async fn anonymous_report_succeeds() {
    let (store, app) = app();
    let (status, body) = submit(
        app,
        "b",
        json!({
            "checkedposts": [2],
            "report": true,
            "report_reason": "spam"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reported 1 posts");

    let reported = store
        .board_posts("b")
        .into_iter()
        .find(|post| post.post_id == 2)
        .unwrap();
    assert_eq!(reported.reports.len(), 1);
    assert_eq!(reported.reports[0].reason, "spam");
}

#[tokio::test]
async fn anonymous_delete_blocked_by_board_settings() {
    let (_store, app) = app();
    let (status, body) = submit(app, "b", json!({ "checkedposts": [2], "delete": true })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User post deletion is disabled on this board");
}
