/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 */

use crate::services::auth::Claims;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `claims` は検証済み token の payload そのもの (フィールドの追加・削除・改名はしない)
/// - 解釈 (role による認可など) は handler 側の責務
#[derive(Debug, Clone, PartialEq)]
pub struct AuthCtx {
    pub claims: Claims,
}

impl AuthCtx {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    /// `sub` if present and a string; only a convenience for logs.
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(|v| v.as_str())
    }
}
