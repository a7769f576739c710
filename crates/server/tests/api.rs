use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, USER_ID_HEADER, app};

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    app(ServerState::new(engine))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER.clone(), user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, user: &str, body: Value) -> Value {
    let (status, expense) = call(app, Method::POST, "/expenses", Some(user), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{expense}");
    expense
}

async fn user_created(app: &Router, id: &str, first: &str, last: &str) {
    let (status, _) = call(
        app,
        Method::POST,
        "/webhooks/users",
        None,
        Some(json!({
            "type": "user.created",
            "data": { "id": id, "first_name": first, "last_name": last }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let app = test_app().await;

    let (status, body) = call(&app, Method::GET, "/expenses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "unauthorized" }));

    let (status, _) = call(
        &app,
        Method::POST,
        "/expenses",
        None,
        Some(json!({ "name": "Dinner", "amount": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_adapted_expense() {
    let app = test_app().await;
    user_created(&app, "u1", "Ada", "Lovelace").await;

    let expense = create(
        &app,
        "u1",
        json!({
            "name": "Dinner",
            "amount": 42.5,
            "description": "Friday",
            "paid": true,
            "participantIds": ["u1", "u2", "u2"]
        }),
    )
    .await;

    assert_eq!(expense["name"], "Dinner");
    assert_eq!(expense["amount"], "42.50");
    assert_eq!(expense["description"], "Friday");
    assert_eq!(expense["paid"], true);
    assert_eq!(expense["participantIds"], json!(["u1", "u2"]));
    assert_eq!(
        expense["users"],
        json!([
            { "userId": "u1", "name": "Ada Lovelace" },
            { "userId": "u2", "name": "u2" }
        ])
    );
}

#[tokio::test]
async fn create_rejects_missing_or_malformed_fields() {
    let app = test_app().await;

    for body in [
        json!({ "amount": 10 }),
        json!({ "name": "  ", "amount": 10 }),
        json!({ "name": "Dinner" }),
        json!({ "name": "Dinner", "amount": "ten" }),
    ] {
        let (status, error) = call(&app, Method::POST, "/expenses", Some("u1"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{error}");
        assert!(error["error"].is_string());
    }

    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u1"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn list_reflects_directory_updates() {
    let app = test_app().await;
    create(
        &app,
        "u1",
        json!({ "name": "Rent", "amount": "900", "participantIds": ["u2"] }),
    )
    .await;

    let (status, listed) = call(&app, Method::GET, "/expenses", Some("u2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["users"][0]["name"], "u1");

    user_created(&app, "u1", "Ada", "Lovelace").await;
    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u2"), None).await;
    assert_eq!(listed[0]["users"][0]["name"], "Ada Lovelace");

    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u3"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn wrong_typed_fields_are_bad_requests() {
    let app = test_app().await;
    let expense = create(&app, "u1", json!({ "name": "Dinner", "amount": 40 })).await;

    let cases = [
        (Method::POST, json!({ "name": "Dinner", "amount": true })),
        (Method::POST, json!({ "name": "Dinner", "amount": 10, "paid": "yes" })),
        (Method::POST, json!({ "name": "Dinner", "amount": 10, "participantIds": "u2" })),
        (Method::POST, json!({ "name": ["Dinner"], "amount": 10 })),
        (Method::PUT, json!({ "id": 5, "name": "Dinner", "amount": 10 })),
        (
            Method::PUT,
            json!({ "id": expense["id"], "name": "Dinner", "amount": { "cents": 10 } }),
        ),
        (Method::DELETE, json!({ "id": 5 })),
        (Method::DELETE, json!("nope")),
    ];
    for (method, body) in cases {
        let (status, error) = call(&app, method, "/expenses", Some("u1"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{error}");
        assert!(error["error"].is_string(), "{error}");
    }

    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u1"), None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["amount"], "40.00");
}

#[tokio::test]
async fn missing_or_unreadable_body_is_a_bad_request() {
    let app = test_app().await;

    let (status, error) = call(&app, Method::DELETE, "/expenses", Some("u1"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/expenses")
        .header(USER_ID_HEADER.clone(), "u1")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(error["error"].is_string());

    let (status, error) = call(
        &app,
        Method::POST,
        "/webhooks/users",
        None,
        Some(json!({ "type": "user.created", "data": { "id": 7 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn list_is_in_creation_order() {
    let app = test_app().await;

    let mut created = Vec::new();
    for name in ["Rent", "Power", "Water"] {
        let expense = create(
            &app,
            "u1",
            json!({ "name": name, "amount": 10, "participantIds": ["u3", "u2"] }),
        )
        .await;
        created.push(expense["id"].clone());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let (status, listed) = call(&app, Method::GET, "/expenses", Some("u2"), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed_ids: Vec<Value> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].clone())
        .collect();
    assert_eq!(listed_ids, created);
    for expense in listed.as_array().unwrap() {
        assert_eq!(expense["participantIds"], json!(["u1", "u3", "u2"]));
    }
}

#[tokio::test]
async fn update_requires_id() {
    let app = test_app().await;

    let (status, body) = call(
        &app,
        Method::PUT,
        "/expenses",
        Some("u1"),
        Some(json!({ "name": "Dinner", "amount": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "expense id is required");

    let (status, _) = call(
        &app,
        Method::PUT,
        "/expenses",
        Some("u1"),
        Some(json!({ "id": "nope", "name": "Dinner", "amount": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_by_outsider_is_forbidden() {
    let app = test_app().await;
    let expense = create(
        &app,
        "u1",
        json!({ "name": "Dinner", "amount": 40, "participantIds": ["u2"] }),
    )
    .await;

    let (status, _) = call(
        &app,
        Method::PUT,
        "/expenses",
        Some("u3"),
        Some(json!({
            "id": expense["id"],
            "name": "Mine now",
            "amount": 1,
            "participantIds": ["u3"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u1"), None).await;
    assert_eq!(listed[0]["name"], "Dinner");
    assert_eq!(listed[0]["participantIds"], json!(["u1", "u2"]));
}

#[tokio::test]
async fn update_replaces_participants() {
    let app = test_app().await;
    let expense = create(
        &app,
        "u1",
        json!({ "name": "Trip", "amount": 100, "participantIds": ["u2", "u3"] }),
    )
    .await;

    let (status, updated) = call(
        &app,
        Method::PUT,
        "/expenses",
        Some("u2"),
        Some(json!({
            "id": expense["id"],
            "name": "Trip",
            "amount": "120,00",
            "paid": true,
            "participantIds": ["u4"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["amount"], "120.00");
    assert_eq!(updated["participantIds"], json!(["u2", "u4"]));

    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u1"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn delete_leaves_then_removes() {
    let app = test_app().await;
    let expense = create(
        &app,
        "u1",
        json!({ "name": "Dinner", "amount": 40, "participantIds": ["u2"] }),
    )
    .await;
    let delete = |user: &'static str| {
        let app = app.clone();
        let id = expense["id"].clone();
        async move {
            call(
                &app,
                Method::DELETE,
                "/expenses",
                Some(user),
                Some(json!({ "id": id })),
            )
            .await
        }
    };

    let (status, body) = delete("u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u2"), None).await;
    assert_eq!(listed[0]["participantIds"], json!(["u2"]));

    // an outsider's delete is a no-op
    let (status, _) = delete("u3").await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u2"), None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, _) = delete("u2").await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = call(&app, Method::GET, "/expenses", Some("u2"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn delete_requires_id() {
    let app = test_app().await;

    let (status, body) = call(&app, Method::DELETE, "/expenses", Some("u1"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "expense id is required");
}

#[tokio::test]
async fn identity_events_populate_directory() {
    let app = test_app().await;

    user_created(&app, "u2", "Alan", "Turing").await;
    let (status, _) = call(
        &app,
        Method::POST,
        "/webhooks/users",
        None,
        Some(json!({ "type": "user.created", "data": { "id": "u1", "firstName": "Ada" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::POST,
        "/webhooks/users",
        None,
        Some(json!({ "type": "session.created", "data": { "id": "s1" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, users) = call(&app, Method::GET, "/users", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        users,
        json!([
            { "id": "u1", "firstName": "Ada", "lastName": "" },
            { "id": "u2", "firstName": "Alan", "lastName": "Turing" }
        ])
    );
}

#[tokio::test]
async fn user_created_without_data_is_rejected() {
    let app = test_app().await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/webhooks/users",
        None,
        Some(json!({ "type": "user.created" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
