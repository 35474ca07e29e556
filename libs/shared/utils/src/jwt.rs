use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{JwtClaims, JwtHeader, User};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Invalid token format")]
    Malformed,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Invalid claims format")]
    BadClaims,

    #[error("Token expired")]
    Expired,
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        debug!("Failed to decode token segment: {}", e);
        TokenError::Malformed
    })
}

/// Validates an HS256 token and returns the caller it identifies.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let mut parts = token.split('.');
    let (header_b64, claims_b64, signature_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(c), Some(s), None) => (h, c, s),
        _ => return Err(TokenError::Malformed),
    };

    let header: JwtHeader = serde_json::from_slice(&decode_segment(header_b64)?)
        .map_err(|_| TokenError::Malformed)?;
    if header.alg != "HS256" {
        return Err(TokenError::UnsupportedAlgorithm(header.alg));
    }

    let signature = decode_segment(signature_b64)?;
    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| TokenError::MissingSecret)?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());
    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err(TokenError::BadSignature);
    }

    let claims: JwtClaims = serde_json::from_slice(&decode_segment(claims_b64)?)
        .map_err(|e| {
            debug!("Failed to parse claims: {}", e);
            TokenError::BadClaims
        })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp().max(0) as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err(TokenError::Expired);
        }
    }

    let created_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        role: claims.effective_role(),
        id: claims.sub,
        email: claims.email,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn test_valid_admin_token() {
        let admin = TestUser::admin("owner@studio.pe");
        let token = JwtTestUtils::create_test_token(&admin, SECRET, Some(1));

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, admin.id);
        assert!(user.is_admin());
    }

    #[test]
    fn test_expired_token() {
        let admin = TestUser::admin("owner@studio.pe");
        let token = JwtTestUtils::create_expired_token(&admin, SECRET);

        assert_eq!(validate_token(&token, SECRET).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret() {
        let admin = TestUser::admin("owner@studio.pe");
        let token = JwtTestUtils::create_invalid_signature_token(&admin);

        assert_eq!(validate_token(&token, SECRET).unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn test_malformed_and_unconfigured() {
        assert_eq!(
            validate_token(&JwtTestUtils::create_malformed_token(), SECRET).unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(validate_token("a.b.c", "").unwrap_err(), TokenError::MissingSecret);
    }
}
