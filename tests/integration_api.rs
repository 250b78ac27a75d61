//! API Integration Tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use saldo_ledger::api::routes::CreateTransactionRequest;
use serde_json::{json, Value};
use tower::util::ServiceExt;

mod common;

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn list(app: &Router) -> Value {
    let response = app.clone().oneshot(get("/transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    common::body_json(response).await
}

#[tokio::test]
async fn test_empty_ledger_lists_nothing() {
    let (_, engine) = common::memory_engine();
    let app = common::app(engine);

    assert_eq!(list(&app).await, json!([]));
}

#[tokio::test]
async fn test_append_and_list_e2e() {
    let (_, engine) = common::memory_engine();
    let app = common::app(engine);

    // 1. Debit 1000
    let response = app
        .clone()
        .oneshot(post_json(&json!({
            "date": "2024-06-28",
            "description": "Salary",
            "debit": 1000.00,
            "credit": null
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Debit failed");
    let created = common::body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["balance"], 1000.0);
    assert!(created["credit"].is_null());

    // 2. Credit 400, amount as a string
    let request = CreateTransactionRequest {
        date: "2024-06-29".to_string(),
        description: "Rent".to_string(),
        debit: None,
        credit: Some(dec!(400).into()),
    };
    let response = app
        .clone()
        .oneshot(post_json(&serde_json::to_value(&request).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Credit failed");

    // 3. Debit 250
    let response = app
        .clone()
        .oneshot(post_json(&json!({
            "date": "2024-06-30",
            "description": "Refund",
            "debit": 250
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Second debit failed");

    // 4. Verify order and balances
    let rows = list(&app).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["date"], "2024-06-28");
    assert_eq!(rows[1]["description"], "Rent");
    assert_eq!(rows[1]["credit"], 400.0);
    let balances: Vec<f64> = rows.iter().map(|r| r["balance"].as_f64().unwrap()).collect();
    assert_eq!(balances, vec![1000.0, 600.0, 850.0]);

    // 5. Balance endpoint
    let response = app.clone().oneshot(get("/balance")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["balance"], 850.0);
    assert_eq!(json["last_id"], 3);
    assert_eq!(json["opening_balance"], 0.0);
}

#[tokio::test]
async fn test_invalid_entries_rejected_with_code() {
    let (store, engine) = common::memory_engine();
    let app = common::app(engine);

    let cases = [
        (
            json!({"date": "2024-06-28", "description": "x", "debit": 1, "credit": 1}),
            "both_debit_and_credit",
        ),
        (
            json!({"date": "2024-06-28", "description": "x", "debit": null, "credit": null}),
            "missing_amount",
        ),
        (
            json!({"date": "28-06-2024", "description": "x", "debit": 1}),
            "invalid_date",
        ),
        (
            json!({"date": "2024-06-28", "description": "   ", "debit": 1}),
            "blank_description",
        ),
        (
            json!({"date": "2024-06-28", "description": "x".repeat(256), "debit": 1}),
            "description_too_long",
        ),
        (
            json!({"date": "2024-06-28", "description": "x", "credit": -5}),
            "negative_amount",
        ),
        (
            json!({"date": "2024-06-28", "description": "x", "credit": "abc"}),
            "invalid_amount",
        ),
        (
            json!({"date": "2024-06-28", "debit": 1}),
            "blank_description",
        ),
        (
            json!({"description": "x", "debit": 1}),
            "invalid_date",
        ),
        (json!({"data": "dummy"}), "blank_description"),
        (
            json!({"date": 20240628, "description": "x", "debit": 1}),
            "invalid_request",
        ),
    ];

    for (body, code) in cases {
        let response = app.clone().oneshot(post_json(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = common::body_json(response).await;
        assert_eq!(json["error_code"], code, "{body}");
    }

    assert!(store.is_empty());
    assert_eq!(list(&app).await, json!([]));
}

#[tokio::test]
async fn test_storage_failure_maps_to_bad_gateway() {
    let (store, engine) = common::flaky_engine();
    let app = common::app(engine);

    let entry = json!({"date": "2024-06-28", "description": "Salary", "debit": 1000});
    let response = app.clone().oneshot(post_json(&entry)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let before = list(&app).await;

    store.fail_next_appends(1);
    let response = app.clone().oneshot(post_json(&entry)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = common::body_json(response).await;
    assert_eq!(json["error_code"], "storage_unavailable");

    assert_eq!(list(&app).await, before);
}

#[tokio::test]
async fn test_contention_maps_to_conflict() {
    let (_, engine) = common::contended_engine();
    let app = common::app(engine);

    let entry = json!({"date": "2024-06-28", "description": "Salary", "debit": 1000});
    let response = app.clone().oneshot(post_json(&entry)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = common::body_json(response).await;
    assert_eq!(json["error_code"], "append_contention");

    assert_eq!(list(&app).await, json!([]));
}

#[tokio::test]
async fn test_large_balance_keeps_every_digit() {
    let (_, engine) = common::memory_engine();
    let app = common::app(engine);

    let entry = json!({"date": "2024-06-28", "description": "Reserve", "debit": "123456789012.12345678"});
    let response = app.clone().oneshot(post_json(&entry)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get("/balance")).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains(r#""balance":123456789012.12345678"#), "{body}");
}

#[tokio::test]
async fn test_get_single_and_paged() {
    let (_, engine) = common::memory_engine();
    let app = common::app(engine);

    for i in 1..=3 {
        let body = json!({"date": "2024-06-28", "description": format!("#{i}"), "debit": 10});
        let response = app.clone().oneshot(post_json(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.clone().oneshot(get("/transactions/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["description"], "#2");
    assert_eq!(json["balance"], 20.0);

    let response = app.clone().oneshot(get("/transactions/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = common::body_json(response).await;
    assert_eq!(json["error_code"], "transaction_not_found");

    let response = app
        .clone()
        .oneshot(get("/transactions?after_id=1&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], 2);

    let response = app
        .clone()
        .oneshot(get("/transactions?after_id=7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error_code"], "unknown_cursor");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts() {
    let (_, engine) = common::memory_engine();
    let app = common::app(engine);

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let body = json!({"date": "2024-06-28", "description": format!("#{i}"), "debit": 1});
                app.oneshot(post_json(&body)).await.unwrap().status()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let rows = list(&app).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 50);
    assert_eq!(rows[49]["id"], 50);
    assert_eq!(rows[49]["balance"], 50.0);
}
