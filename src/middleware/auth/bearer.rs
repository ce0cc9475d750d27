//! bearer token（HS256/384/512 JWT）検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を取り出し、共有シークレットで署名検証する
//! - 成功時は decode した claims をそのまま `AuthCtx` として handler に渡す
//! - 失敗時の原因 (ヘッダ欠落 / 形式不正 / 署名不一致 / 期限切れ ...) は log にだけ残し、
//!   クライアントには一律 401 を返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
}

/// Pull the candidate token out of `Authorization: Bearer <token>`.
///
/// The scheme prefix is matched literally (case and single space included).
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::MissingHeader)?
        .to_str()
        .map_err(|_| BearerError::MalformedHeader)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(BearerError::MalformedHeader)?;

    if token.is_empty() {
        return Err(BearerError::MalformedHeader);
    }

    Ok(token)
}

/// 保護したい Router に bearer 認証を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/me", get(me));
/// let protected = middleware::auth::bearer::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, bearer_middleware))
}

async fn bearer_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "bearer token extraction failed");
            return Err(err.into());
        }
    };

    let claims = match state.jwt.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = %err, "bearer token verification failed");
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}
