/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - ex: jwt: JwtVerifier (起動時に一度だけ組み立てて、以後は read-only)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::JwtVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(jwt: Arc<JwtVerifier>) -> Self {
        Self { jwt }
    }
}
