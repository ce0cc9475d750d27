use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::config::MAX_JWT_LEEWAY_SECONDS;

/// Decoded token payload, passed through to handlers untouched.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// HMAC family only; a shared secret cannot verify anything else.
const ALLOWED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

// Errors returned by bearer-token verification.
// The HTTP layer collapses every variant into 401; the distinction is for logs only.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("signature does not match")]
    InvalidSignature,
    #[error("algorithm not allowed")]
    DisallowedAlgorithm,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("issuer mismatch")]
    InvalidIssuer,
    #[error("audience mismatch")]
    InvalidAudience,
    #[error("missing required claim '{0}'")]
    MissingClaim(String),
    #[error("malformed token: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm => Self::DisallowedAlgorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::MissingRequiredClaim(name) => Self::MissingClaim(name.clone()),
            _ => Self::Malformed(e),
        }
    }
}

/// Shared-secret (HS256/384/512) bearer-token verifier.
///
/// - Built once at startup and shared read-only across requests.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// `exp` / `nbf` are checked only when the token carries them.
    /// `iss` / `aud` are required and checked only when configured.
    pub fn new(
        secret: &str,
        issuer: Option<&str>,
        audience: &[String],
        leeway_seconds: u64,
    ) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // clamp: a leeway beyond the current Unix time underflows inside jsonwebtoken
        validation.leeway = leeway_seconds.min(MAX_JWT_LEEWAY_SECONDS);

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }

        if audience.is_empty() {
            // otherwise a token carrying any `aud` would be rejected
            validation.validate_aud = false;
        } else {
            validation.set_audience(audience);
            validation.required_spec_claims.insert("aud".to_string());
        }

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify the signature and registered claims, then return the payload as-is.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";
    const HS256: Algorithm = Algorithm::HS256;

    fn sign(claims: &serde_json::Value, secret: &str, alg: Algorithm) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(SECRET, None, &[], 0)
    }

    #[test]
    fn returns_claims_unchanged() {
        let claims = json!({"sub": "user-1", "role": "admin"});
        let token = sign(&claims, SECRET, Algorithm::HS256);

        let decoded = verifier().verify(&token).unwrap();

        assert_eq!(serde_json::Value::Object(decoded), claims);
    }

    #[test]
    fn verification_is_repeatable() {
        let token = sign(&json!({"sub": "user-1", "n": 1}), SECRET, Algorithm::HS256);
        let v = verifier();

        assert_eq!(v.verify(&token).unwrap(), v.verify(&token).unwrap());
    }

    #[test]
    fn accepts_every_hmac_variant() {
        let claims = json!({"sub": "user-1"});
        for alg in ALLOWED_ALGORITHMS {
            let token = sign(&claims, SECRET, alg);
            assert!(verifier().verify(&token).is_ok(), "{alg:?}");
        }
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = sign(&json!({"sub": "user-1"}), "another-secret", Algorithm::HS256);

        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidSignature), "{err:?}");
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "abc", "a.b", "a.b.c", "...."] {
            let err = verifier().verify(token).unwrap_err();
            assert!(matches!(err, JwtError::Malformed(_)), "{token}: {err:?}");
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign(&json!({"sub": "user-1", "exp": now() - 600}), SECRET, HS256);

        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, JwtError::Expired), "{err:?}");
    }

    #[test]
    fn leeway_covers_small_clock_skew() {
        let token = sign(&json!({"sub": "user-1", "exp": now() - 10}), SECRET, HS256);

        assert!(JwtVerifier::new(SECRET, None, &[], 120).verify(&token).is_ok());
    }

    #[test]
    fn oversized_leeway_is_clamped_instead_of_underflowing() {
        let v = JwtVerifier::new(SECRET, None, &[], u64::MAX);

        let ancient = sign(&json!({"sub": "user-1", "exp": 1000}), SECRET, HS256);
        assert!(matches!(v.verify(&ancient).unwrap_err(), JwtError::Expired));

        let fresh = sign(&json!({"sub": "user-1", "exp": now() + 600}), SECRET, HS256);
        assert!(v.verify(&fresh).is_ok());
    }

    #[test]
    fn future_nbf_is_rejected() {
        let token = sign(&json!({"sub": "user-1", "nbf": now() + 600}), SECRET, HS256);

        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, JwtError::NotYetValid), "{err:?}");
    }

    #[test]
    fn token_audience_is_ignored_when_not_configured() {
        let token = sign(&json!({"sub": "user-1", "aud": "somewhere"}), SECRET, HS256);

        assert!(verifier().verify(&token).is_ok());
    }

    #[test]
    fn configured_issuer_must_match_and_be_present() {
        let v = JwtVerifier::new(SECRET, Some("https://issuer.example"), &[], 0);

        let good = sign(
            &json!({"sub": "user-1", "iss": "https://issuer.example"}),
            SECRET,
            Algorithm::HS256,
        );
        assert!(v.verify(&good).is_ok());

        let other = sign(&json!({"sub": "user-1", "iss": "https://evil.example"}), SECRET, HS256);
        assert!(matches!(v.verify(&other).unwrap_err(), JwtError::InvalidIssuer));

        let missing = sign(&json!({"sub": "user-1"}), SECRET, Algorithm::HS256);
        assert!(matches!(v.verify(&missing).unwrap_err(), JwtError::MissingClaim(c) if c == "iss"));
    }

    #[test]
    fn configured_audience_must_match() {
        let v = JwtVerifier::new(SECRET, None, &["api".to_string()], 0);

        let good = sign(&json!({"sub": "user-1", "aud": ["web", "api"]}), SECRET, Algorithm::HS256);
        assert!(v.verify(&good).is_ok());

        let other = sign(&json!({"sub": "user-1", "aud": "web"}), SECRET, Algorithm::HS256);
        assert!(matches!(v.verify(&other).unwrap_err(), JwtError::InvalidAudience));
    }

    #[test]
    fn debug_output_hides_key() {
        let out = format!("{:?}", JwtVerifier::new("super-secret-value", None, &[], 0));
        assert!(!out.contains("super-secret-value"));
    }
}
