//! API 集成测试
//!
//! 不需要数据库的用例使用惰性连接池（请求在触库前就被拒绝）。
//! 标记 #[ignore] 的用例需要真实的 PostgreSQL，通过 TEST_DATABASE_URL 指定。

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    let config = common::create_test_config();
    chirpy::routes::create_router(common::create_test_state(config))
}

fn request(method: Method, uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/api/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/api/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn test_create_chirp_without_credentials() {
    let app = test_app();

    let response = app
        .oneshot(request(Method::POST, "/api/chirps", json!({"body": "hi"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Authentication failed");
}

#[tokio::test]
async fn test_create_chirp_with_expired_token() {
    let config = common::create_test_config();
    let state = common::create_test_state(config.clone());
    let app = chirpy::routes::create_router(state.clone());

    let token = state
        .jwt_service
        .issue(&uuid::Uuid::new_v4(), chrono::Duration::seconds(-10))
        .unwrap();

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/chirps",
            json!({"body": "hi"}),
            Some(&format!("Bearer {token}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    // 具体失败原因不泄露给客户端
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Authentication failed");
}

#[tokio::test]
async fn test_create_chirp_with_garbage_bearer_value() {
    let app = test_app();

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/chirps",
            json!({"body": "hi"}),
            Some("Bearer not-a-jwt"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_without_header() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/api/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_rejects_wrong_api_key() {
    let app = test_app();

    let payload = json!({
        "event": "user.upgraded",
        "data": {"user_id": uuid::Uuid::new_v4().to_string()}
    });

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            payload,
            Some("ApiKey wrong-key"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_rejects_malformed_key_header() {
    let app = test_app();

    let payload = json!({
        "event": "user.upgraded",
        "data": {"user_id": uuid::Uuid::new_v4().to_string()}
    });

    // 头格式必须恰好是 `ApiKey <key>` 两段
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            payload,
            Some("ApiKey test-polka-key extra"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_wrong_key_wins_over_undecodable_payload() {
    let app = test_app();

    // data 字段缺失，负载无法解析成功；Key 检查必须先行
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            json!({"event": "user.upgraded"}),
            Some("ApiKey wrong-key"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_undecodable_payload_with_valid_key() {
    let app = test_app();

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            json!({"event": "user.upgraded"}),
            Some("ApiKey test-polka-key"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fileserver_hits_counted() {
    let config = common::create_test_config();
    let state = common::create_test_state(config);
    let app = chirpy::routes::create_router(state.clone());

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(Request::get("/app/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );
    }

    let response = app
        .oneshot(Request::get("/admin/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("visited 2 times"));
}

#[tokio::test]
async fn test_reset_clears_hit_counter() {
    let config = common::create_test_config();
    let state = common::create_test_state(config);
    let app = chirpy::routes::create_router(state.clone());

    let _ = app
        .clone()
        .oneshot(Request::get("/app/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // production 平台下 reset 只清零计数器，不触库
    let response = app
        .oneshot(Request::post("/admin/reset").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hits: 0");
}

// ---------------------------------------------------------------------------
// 以下用例需要真实的 PostgreSQL（TEST_DATABASE_URL）
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_login_refresh_revoke_flow() {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let app = chirpy::routes::create_router(common::create_test_state_with_pool(config, pool));

    // 注册
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/users",
            json!({"email": "alice@example.com", "password": "hunter2hunter2"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body_json(response).await;
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("hashed_password").is_none());

    // 错误密码
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/login",
            json!({"email": "alice@example.com", "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 登录
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/login",
            json!({"email": "alice@example.com", "password": "hunter2hunter2"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();
    assert!(login["token"].as_str().unwrap().contains('.'));
    // 固定 32 字节随机值的 hex 编码
    assert_eq!(refresh_token.len(), 64);

    // 刷新（不轮换：旧刷新令牌依然有效）
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/refresh",
                json!({}),
                Some(&format!("Bearer {refresh_token}")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["token"].as_str().unwrap().contains('.'));
    }

    // 撤销
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/revoke",
            json!({}),
            Some(&format!("Bearer {refresh_token}")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // 撤销后刷新被拒绝
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/refresh",
            json!({}),
            Some(&format!("Bearer {refresh_token}")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 重复撤销是幂等的
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/revoke",
            json!({}),
            Some(&format!("Bearer {refresh_token}")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_chirp_ownership() {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let app = chirpy::routes::create_router(common::create_test_state_with_pool(config, pool));

    let mut tokens = Vec::new();
    for email in ["owner@example.com", "intruder@example.com"] {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/users",
                json!({"email": email, "password": "password-123"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/login",
                json!({"email": email, "password": "password-123"}),
                None,
            ))
            .await
            .unwrap();
        let login = body_json(response).await;
        tokens.push(login["token"].as_str().unwrap().to_string());
    }

    // owner 发布消息
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/chirps",
            json!({"body": "mine"}),
            Some(&format!("Bearer {}", tokens[0])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let chirp = body_json(response).await;
    let chirp_id = chirp["id"].as_str().unwrap().to_string();

    // 他人删除被拒绝，消息仍在
    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/chirps/{chirp_id}"),
            json!({}),
            Some(&format!("Bearer {}", tokens[1])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/chirps/{chirp_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 作者删除成功
    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/chirps/{chirp_id}"),
            json!({}),
            Some(&format!("Bearer {}", tokens[0])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get(format!("/api/chirps/{chirp_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_refresh_with_expired_token() {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let user_id = common::create_test_user(&pool, "stale@example.com", "password-123").await;

    // 直接写入一条过期的刷新令牌行
    let token = "a".repeat(64);
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token, user_id, expires_at)
        VALUES ($1, $2, NOW() - INTERVAL '1 day')
        "#,
    )
    .bind(&token)
    .bind(user_id)
    .execute(&pool)
    .await
    .unwrap();

    // 存储层区分过期与撤销/未知
    let store = chirpy::services::RefreshTokenStore::new(pool.clone(), 3600);
    assert!(matches!(
        store.validate(&token).await,
        Err(chirpy::error::AppError::Refresh(
            chirpy::services::refresh_store::RefreshTokenError::Expired
        ))
    ));

    let app = chirpy::routes::create_router(common::create_test_state_with_pool(config, pool));

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/refresh",
            json!({}),
            Some(&format!("Bearer {token}")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_webhook_upgrade() {
    let config = common::create_test_config();
    let pool = common::setup_test_db(&config).await;
    let user_id = common::create_test_user(&pool, "red@example.com", "password-123").await;
    let app = chirpy::routes::create_router(common::create_test_state_with_pool(config, pool));

    // 未知事件直接确认
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            json!({"event": "user.downgraded", "data": {"user_id": user_id.to_string()}}),
            Some("ApiKey test-polka-key"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // 未知用户
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            json!({"event": "user.upgraded", "data": {"user_id": uuid::Uuid::new_v4().to_string()}}),
            Some("ApiKey test-polka-key"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 升级成功
    let response = app
        .oneshot(request(
            Method::POST,
            "/api/polka/webhooks",
            json!({"event": "user.upgraded", "data": {"user_id": user_id.to_string()}}),
            Some("ApiKey test-polka-key"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
