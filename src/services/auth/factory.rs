/// Factory: build `JwtVerifier` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::JwtVerifier;

pub fn build_jwt_verifier(config: &Config) -> Arc<JwtVerifier> {
    let verifier = JwtVerifier::new(
        &config.jwt_secret,
        config.jwt_issuer.as_deref(),
        &config.jwt_audience,
        config.jwt_leeway_seconds,
    );

    Arc::new(verifier)
}
