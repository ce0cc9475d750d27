/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、/me は bearer 認証の内側に置く
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{health::health, me::me};
use crate::middleware::auth::bearer;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health));

    let protected = bearer::apply(Router::new().route("/me", get(me)), state);

    public.merge(protected)
}
