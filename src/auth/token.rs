use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

/// Token lifetime: an absolute expiry 24 hours after issuance.
const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Error type for token verification.
///
/// The three kinds are deliberately distinct: a tampered signature, an
/// outdated but otherwise well-formed token, and bytes that do not decode
/// into the expected claim shape are different client situations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature does not match the configured key.
    #[error("invalid token")]
    Invalid,

    /// Token is past its expiry instant.
    #[error("token has expired")]
    Expired,

    /// Token cannot be parsed into the expected claim shape.
    #[error("malformed token")]
    Malformed,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
    /// Role embedded at issuance. Trusted verbatim on verification; a
    /// promotion or demotion takes effect for a session only once its
    /// token expires and the user logs in again.
    pub role: Role,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Issues and verifies signed identity tokens.
///
/// The signing key is process-wide configuration loaded once at startup;
/// rotating it invalidates every outstanding token. There is no revocation
/// list — validity is purely signature plus expiry.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Produces a signed token embedding the user's id and role, expiring
    /// 24 hours from now.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, crate::error::AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::hours(TOKEN_LIFETIME_HOURS))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            role,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            crate::error::AppError::InternalServerError(format!("failed to sign token: {}", e))
        })
    }

    /// Verifies a token string and decodes its claims.
    ///
    /// Returns the embedded identity and role verbatim on success;
    /// `TokenError::Expired` past the expiry instant, `TokenError::Invalid`
    /// on a signature mismatch, and `TokenError::Malformed` for anything
    /// that does not decode into [`Claims`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::Invalid,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_for_token_tests";

    #[test]
    fn test_token_issuance_and_verification() {
        let service = TokenService::new(TEST_SECRET);
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, Role::Admin).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_token_expiration() {
        let service = TokenService::new(TEST_SECRET);

        let expiration = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims_expired = Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            exp: expiration,
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        match service.verify(&expired_token) {
            Err(TokenError::Expired) => {}
            Ok(_) => panic!("token should have been invalid due to expiration"),
            Err(e) => panic!("unexpected error kind for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let service = TokenService::new(TEST_SECRET);
        let other_service = TokenService::new(b"a_completely_different_secret");

        let token = other_service.issue(Uuid::new_v4(), Role::User).unwrap();

        match service.verify(&token) {
            Err(TokenError::Invalid) => {}
            Ok(_) => panic!("token should have been invalid due to signature mismatch"),
            Err(e) => panic!("unexpected error kind for bad signature: {:?}", e),
        }
    }

    #[test]
    fn test_malformed_token() {
        let service = TokenService::new(TEST_SECRET);

        match service.verify("not-a-jwt-at-all") {
            Err(TokenError::Malformed) => {}
            Ok(_) => panic!("garbage should not verify"),
            Err(e) => panic!("unexpected error kind for garbage token: {:?}", e),
        }
    }

    #[test]
    fn test_role_survives_roundtrip() {
        let service = TokenService::new(TEST_SECRET);
        let user_id = Uuid::new_v4();

        for role in [Role::User, Role::Admin] {
            let token = service.issue(user_id, role).unwrap();
            let claims = service.verify(&token).unwrap();
            assert_eq!(claims.role, role);
        }
    }
}
