use axum::extract::State;
use electro_storefront::{
    app::demo_gateway, config::AppConfig, routes::health::health_check, state::AppState,
};

#[tokio::test]
async fn health_check_returns_ok() {
    let config = AppConfig {
        database_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        request_body_limit: 1024 * 1024,
        concurrency_limit: 16,
        provider_secret: None,
    };
    let state = AppState::new(demo_gateway(), &config);

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.backend, "memory");
}
