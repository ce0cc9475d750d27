//! Shared helpers for router-level tests.
#![allow(dead_code)]

use std::collections::HashMap;

use axum::{Router, body::Body, http::Request, response::Response};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use jwt_guard::{app, config::Config};

pub const SECRET: &str = "integration-test-secret";

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("JWT_SECRET".into(), SECRET.into());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(|key| env.get(key).cloned()).unwrap()
}

pub fn test_app_with(extra: &[(&str, &str)]) -> Router {
    let config = test_config(extra);
    let state = app::build_state(&config);
    app::build_router(state, &config)
}

pub fn test_app() -> Router {
    test_app_with(&[])
}

pub fn sign(claims: &Value, secret: &str) -> String {
    sign_with(claims, secret, Algorithm::HS256)
}

pub fn sign_with(claims: &Value, secret: &str, alg: Algorithm) -> String {
    jsonwebtoken::encode(
        &Header::new(alg),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub async fn get(app: Router, uri: &str, authorization: Option<&str>) -> Response {
    let mut req = Request::builder().uri(uri).method("GET");
    if let Some(value) = authorization {
        req = req.header("authorization", value);
    }

    app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn body_json(res: Response) -> Value {
    let body = axum::body::to_bytes(res.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
