//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use vorca_api::{build_router, AppState, Claims};
use vorca_db::{Database, DbConfig};

const SECRET: &str = "api-test-secret";

fn token(id: &str, role: &str) -> String {
    let claims = Claims {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        role: role.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_router(AppState::new(db, SECRET))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    role: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header(
            "authorization",
            format!("Bearer {}", token(&role.to_lowercase(), role)),
        );
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
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates Kemang + Setiabudi and a latte homed at Kemang.
async fn seed(app: &Router) -> (String, String, String) {
    let (status, kmg) = call(
        app,
        Method::POST,
        "/api/v1/locations",
        Some("OWNER"),
        Some(json!({ "name": "Kemang", "code": "KMG" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, stb) = call(
        app,
        Method::POST,
        "/api/v1/locations",
        Some("OWNER"),
        Some(json!({ "name": "Setiabudi", "code": "STB" })),
    )
    .await;

    let (status, latte) = call(
        app,
        Method::POST,
        "/api/v1/products",
        Some("MANAGER"),
        Some(json!({
            "sku": "BN-LT-001",
            "name": "Latte",
            "price": 32000,
            "locationId": kmg["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{latte}");

    (
        kmg["id"].as_str().unwrap().to_string(),
        stb["id"].as_str().unwrap().to_string(),
        latte["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/api/v1/inventory", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/api/v1/inventory")
        .header("authorization", "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_returns_totals_and_decrements_stock() {
    let app = app().await;
    let (kmg, _, latte) = seed(&app).await;

    let (status, sale) = call(
        &app,
        Method::POST,
        "/api/v1/sales",
        Some("CASHIER"),
        Some(json!({
            "locationId": kmg,
            "items": [{ "productId": latte, "quantity": 2, "unitPrice": 28000 }],
            "paymentMethod": "CASH",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["subtotal"], 56000);
    assert_eq!(sale["tax"], 6160);
    assert_eq!(sale["total"], 62160);
    assert_eq!(sale["status"], "COMPLETED");
    assert_eq!(sale["items"][0]["lineNo"], 1);
    assert!(sale["invoiceNumber"].as_str().unwrap().starts_with("INV-"));

    let (status, levels) = call(
        &app,
        Method::GET,
        &format!("/api/v1/inventory?locationId={}", kmg),
        Some("CASHIER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(levels[0]["quantity"], -2);
    assert_eq!(levels[0]["sku"], "BN-LT-001");

    let sale_id = sale["id"].as_str().unwrap();
    let (status, fetched) = call(
        &app,
        Method::GET,
        &format!("/api/v1/sales/{}", sale_id),
        Some("CASHIER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["invoiceNumber"], sale["invoiceNumber"]);

    let (status, summary) = call(
        &app,
        Method::GET,
        "/api/v1/sales/analytics/summary",
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalTransactions"], 1);
    assert_eq!(summary["totalRevenue"], 62160);
    assert_eq!(summary["topLocation"], "Kemang");
}

#[tokio::test]
async fn empty_cart_is_400() {
    let app = app().await;
    let (kmg, _, _) = seed(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/sales",
        Some("CASHIER"),
        Some(json!({ "locationId": kmg, "items": [], "paymentMethod": "CARD" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, sales) = call(&app, Method::GET, "/api/v1/sales", Some("CASHIER"), None).await;
    assert_eq!(sales.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app().await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/sales",
        Some("CASHIER"),
        Some(json!({ "locationId": "x", "paymentMethod": "BARTER", "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn cashier_adjustment_is_403() {
    let app = app().await;
    let (kmg, _, latte) = seed(&app).await;

    let body = json!({
        "productId": latte,
        "locationId": kmg,
        "quantity": 5,
        "reason": "DAMAGE",
    });
    let (status, err) = call(
        &app,
        Method::POST,
        "/api/v1/inventory/adjustments",
        Some("CASHIER"),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["code"], "FORBIDDEN");

    let (status, applied) = call(
        &app,
        Method::POST,
        "/api/v1/inventory/adjustments",
        Some("MANAGER"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(applied["inventory"]["quantity"], 5);
    assert_eq!(applied["adjustment"]["reason"], "DAMAGE");
}

#[tokio::test]
async fn transfer_lifecycle_over_http() {
    let app = app().await;
    let (kmg, stb, latte) = seed(&app).await;

    call(
        &app,
        Method::POST,
        "/api/v1/inventory/adjustments",
        Some("MANAGER"),
        Some(json!({
            "productId": latte,
            "locationId": kmg,
            "quantity": 20,
            "reason": "STOCK_TAKE",
        })),
    )
    .await;

    let (status, transfer) = call(
        &app,
        Method::POST,
        "/api/v1/inventory/transfers",
        Some("MANAGER"),
        Some(json!({
            "fromLocationId": kmg,
            "toLocationId": stb,
            "items": [{ "productId": latte, "quantity": 5 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{transfer}");
    assert_eq!(transfer["status"], "PENDING");
    let id = transfer["id"].as_str().unwrap().to_string();

    // Completing a pending transfer is refused
    let (status, err) = call(
        &app,
        Method::PATCH,
        &format!("/api/v1/inventory/transfers/{}/complete", id),
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "INVALID_STATE");

    let (status, approved) = call(
        &app,
        Method::PATCH,
        &format!("/api/v1/inventory/transfers/{}/approve", id),
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "IN_TRANSIT");

    let (status, completed) = call(
        &app,
        Method::PATCH,
        &format!("/api/v1/inventory/transfers/{}/complete", id),
        Some("OWNER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "COMPLETED");
    assert_eq!(completed["items"][0]["receivedQuantity"], 5);

    let (_, source) = call(
        &app,
        Method::GET,
        &format!("/api/v1/inventory/reconcile?productId={}&locationId={}", latte, kmg),
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(source["quantity"], 15);
    assert_eq!(source["ledgerSum"], 15);

    let (_, completed_list) = call(
        &app,
        Method::GET,
        "/api/v1/inventory/transfers?status=COMPLETED",
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(completed_list.as_array().unwrap().len(), 1);

    let (status, _) = call(
        &app,
        Method::GET,
        "/api/v1/inventory/transfers/does-not-exist",
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_crud_and_conflicts() {
    let app = app().await;
    let (kmg, _, latte) = seed(&app).await;

    // Duplicate SKU
    let (status, err) = call(
        &app,
        Method::POST,
        "/api/v1/products",
        Some("OWNER"),
        Some(json!({ "sku": "BN-LT-001", "name": "Latte 2", "price": 1000, "locationId": kmg })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "CONFLICT");

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/products/{}", latte),
        Some("MANAGER"),
        Some(json!({ "price": 34000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 34000);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/products/{}", latte),
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/v1/products/{}", latte),
        Some("MANAGER"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Managers cannot open locations
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/locations",
        Some("MANAGER"),
        Some(json!({ "name": "Senopati", "code": "SNP" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
