use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use electro_storefront::{
    app::{build_router, demo_gateway},
    config::AppConfig,
    gateway::{Gateway, MemoryGateway},
    models::Role,
    state::AppState,
    store::fallback,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn config() -> AppConfig {
    AppConfig {
        database_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-secret".into(),
        jwt_ttl_hours: 1,
        request_body_limit: 64 * 1024,
        concurrency_limit: 16,
        provider_secret: Some("provider-secret".into()),
    }
}

fn app(gateway: MemoryGateway) -> Router {
    let config = config();
    build_router(AppState::new(gateway, &config), &config)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, token);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_and_login(app: &Router, email: &str) -> String {
    let (status, _) = call(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "full_name": "Flow Shopper",
            "password": "secret1",
            "confirm_password": "secret1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn shopper_browses_fills_cart_and_checks_out() {
    let app = app(demo_gateway());
    let token = register_and_login(&app, "flow@example.com").await;

    let (status, featured) = call(&app, "GET", "/api/products/featured", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(featured["data"]["items"].as_array().unwrap().len(), 6);

    let ac = fallback::product_id(1);
    let tv = fallback::product_id(2);
    call(&app, "POST", "/api/cart", Some(&token), Some(json!({ "product_id": ac }))).await;
    let (status, cart) = call(
        &app,
        "POST",
        "/api/cart",
        Some(&token),
        Some(json!({ "product_id": tv, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["data"]["total_items"], 3);
    assert_eq!(cart["data"]["total_amount"], "115000");

    let (status, placed) = call(
        &app,
        "POST",
        "/api/orders/checkout",
        Some(&token),
        Some(json!({
            "phone": "01700000000",
            "shipping_address": "Gulshan 2, Dhaka",
            "payment_method": "nagad"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["data"]["order"]["status"], "pending");
    assert_eq!(placed["data"]["order"]["total_amount"], "115000");

    let (_, cart) = call(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 0);

    let (_, orders) = call(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(orders["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn negative_quantity_drops_the_cart_line() {
    let app = app(demo_gateway());
    let token = register_and_login(&app, "patch@example.com").await;
    let body = json!({ "product_id": fallback::product_id(3), "quantity": 2 });
    let (_, cart) = call(&app, "POST", "/api/cart", Some(&token), Some(body)).await;
    let line = cart["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, cart) = call(
        &app,
        "PATCH",
        &format!("/api/cart/{line}"),
        Some(&token),
        Some(json!({ "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart["data"]["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["data"]["total_items"], 0);
}

#[tokio::test]
async fn checkout_with_empty_cart_is_a_bad_request() {
    let app = app(demo_gateway());
    let token = register_and_login(&app, "empty@example.com").await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/orders/checkout",
        Some(&token),
        Some(json!({ "phone": "017", "shipping_address": "Dhaka" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = app(demo_gateway());
    let (status, _) = call(&app, "GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "GET", "/api/wishlist", Some("Bearer not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn offline_catalog_serves_samples_flagged_as_fallback() {
    let gateway = demo_gateway();
    gateway.set_offline(true);
    let app = app(gateway);

    let uri = "/api/categories/televisions/products";
    let (status, body) = call(&app, "GET", uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["fallback"], true);
    assert_eq!(body["data"]["category"]["slug"], "televisions");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wishlist_toggle_round_trip() {
    let app = app(demo_gateway());
    let token = register_and_login(&app, "wish@example.com").await;
    let fridge = fallback::product_id(5);

    let uri = format!("/api/wishlist/{fridge}/toggle");
    let (_, body) = call(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(body["data"]["saved"], true);

    let (_, list) = call(&app, "GET", "/api/wishlist", Some(&token), None).await;
    assert_eq!(list["data"]["count"], 1);

    let (_, body) = call(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(body["data"]["saved"], false);
}

#[tokio::test]
async fn back_office_is_gated_by_role() {
    let gateway = demo_gateway();
    let app = app(gateway.clone());
    let token = register_and_login(&app, "clerk@example.com").await;

    let (status, _) = call(&app, "GET", "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = gateway
        .credentials_by_email("clerk@example.com")
        .await
        .unwrap()
        .unwrap();
    gateway.set_role(stored.profile.id, Role::Staff).await.unwrap();

    // the stored role is checked, so the same token now opens the back office
    let (status, stats) = call(&app, "GET", "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["total_products"], 6);

    let (status, _) = call(&app, "GET", "/api/admin/staff", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    gateway.set_role(stored.profile.id, Role::User).await.unwrap();
    let (status, _) = call(&app, "GET", "/api/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn provider_users_exchange_for_a_local_token() {
    let app = app(demo_gateway());
    let user = json!({
        "id": "user_2xyz",
        "email_addresses": [{ "email_address": "nadia@example.com" }],
        "full_name": "Nadia Islam",
        "public_metadata": { "role": "user" }
    });

    let (status, _) = call(&app, "POST", "/api/auth/external", None, Some(user.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/external")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-provider-secret", "provider-secret")
        .body(Body::from(user.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, me) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "nadia@example.com");

    let mut closed = config();
    closed.provider_secret = None;
    let closed = build_router(AppState::new(demo_gateway(), &closed), &closed);
    let (status, _) = call(&closed, "POST", "/api/auth/external", None, Some(user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_paths_fall_through_to_not_found() {
    let app = app(MemoryGateway::new());
    let (status, body) = call(&app, "GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/nope");
}
