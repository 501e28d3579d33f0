//! Session token issue and verification (HS256).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::error;
use uuid::Uuid;

use super::TokenError;
use crate::models::auth::{Claims, Role, TokenPair, TokenUse};

/// Validity window of both tokens in a pair: 500 hours.
pub const TOKEN_VALIDITY_HOURS: i64 = 500;

/// Signs and verifies session tokens with one symmetric key.
///
/// Built once at start-up from configuration and shared read-only.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    audience: Vec<String>,
    validity: Duration,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("audience", &self.audience)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], audience: Vec<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            audience,
            validity: Duration::hours(TOKEN_VALIDITY_HOURS),
        }
    }

    /// Audience written into every issued token.
    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    /// Issue an access/refresh pair for `subject_id`, valid from now.
    pub fn issue(&self, subject_id: i64, role: Role) -> Result<TokenPair, TokenError> {
        self.issue_at(subject_id, role, Utc::now())
    }

    /// Issue a pair as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: i64,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let claims = |token_use| Claims {
            sub: subject_id,
            role,
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.validity).timestamp(),
            token_use,
            jti: Uuid::new_v4().to_string(),
        };
        let access_token = self.sign(&claims(TokenUse::Access)).inspect_err(|e| {
            error!(subject_id, error = %e, "error generating access token");
        })?;
        let refresh_token = self.sign(&claims(TokenUse::Refresh)).inspect_err(|e| {
            error!(subject_id, error = %e, "error generating refresh token");
        })?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Sign an arbitrary claim set.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Only HS256 is accepted. A token whose expiry is at or before the
    /// current second is [`TokenError::Expired`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Audience is informational; every consumer shares one key.
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            })?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-signing-key", vec!["bookapp".to_string()])
    }

    #[test]
    fn access_token_round_trips_claims() {
        let signer = signer();
        let pair = signer.issue(42, Role::Admin).unwrap();
        let claims = signer.verify(&pair.access_token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.aud, vec!["bookapp".to_string()]);
        assert_eq!(claims.token_use, TokenUse::Access);
        assert_eq!(claims.exp - claims.iat, TOKEN_VALIDITY_HOURS * 3600);
    }

    #[test]
    fn refresh_token_is_marked() {
        let signer = signer();
        let pair = signer.issue(7, Role::User).unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);
        let again = signer.issue(7, Role::User).unwrap();
        assert_ne!(pair.refresh_token, again.refresh_token);
        let claims = signer.verify(&pair.refresh_token).unwrap();
        assert_eq!(claims.token_use, TokenUse::Refresh);
        assert_eq!(claims.sub, 7);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let signer = signer();
        let long_ago = Utc::now() - Duration::hours(TOKEN_VALIDITY_HOURS + 1);
        let pair = signer.issue_at(1, Role::User, long_ago).unwrap();
        assert_eq!(signer.verify(&pair.access_token), Err(TokenError::Expired));
    }

    #[test]
    fn token_expiring_this_second_is_expired() {
        let signer = signer();
        let now = Utc::now().timestamp();
        let token = signer
            .sign(&Claims {
                sub: 1,
                role: Role::User,
                aud: vec![],
                iat: now - 10,
                exp: now,
                token_use: TokenUse::Access,
                jti: String::new(),
            })
            .unwrap();
        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_key_is_an_invalid_signature() {
        let pair = signer().issue(1, Role::Superadmin).unwrap();
        let other = TokenSigner::new(b"another-key", vec![]);
        assert_eq!(
            other.verify(&pair.access_token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_is_an_invalid_signature() {
        let signer = signer();
        let user = signer.issue(1, Role::User).unwrap().access_token;
        let admin = signer.issue(1, Role::Superadmin).unwrap().access_token;
        let user_parts: Vec<&str> = user.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);
        assert_eq!(signer.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_and_unsigned_tokens_are_rejected() {
        let signer = signer();
        assert!(matches!(
            signer.verify("not.a.token"),
            Err(TokenError::Malformed(_))
        ));
        // {"alg":"none","typ":"JWT"} . {"sub":1,"role":"superadmin"} . (no signature)
        let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
                        eyJzdWIiOjEsInJvbGUiOiJzdXBlcmFkbWluIn0.";
        assert!(signer.verify(unsigned).is_err());
    }
}
