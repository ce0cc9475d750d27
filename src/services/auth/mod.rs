pub mod factory;
pub mod jwt;

pub use factory::build_jwt_verifier;
pub use jwt::{Claims, JwtError, JwtVerifier};
