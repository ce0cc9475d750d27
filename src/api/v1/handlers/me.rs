/*
 * Responsibility
 * - GET /me
 * - middleware が検証済みの claims をそのまま返す (加工しない)
 */
use axum::Json;

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::services::auth::Claims;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Claims> {
    tracing::debug!(sub = ?ctx.subject(), "authenticated request");
    Json(ctx.claims)
}
