//! Request-authorization gate.
//!
//! Every request resolves a role from its `Authorization` header and is then
//! checked against the access policy:
//!
//! - no credential (absent, blank, `null` or a Basic header) resolves to
//!   [`Role::Unauthorized`];
//! - an expired token answers 401 with a "token expired" body so the client
//!   refreshes instead of re-authenticating;
//! - any other token failure, or a policy denial, answers 403 with no body.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use bookapp_core::auth::TokenError;
use bookapp_core::auth::jwt::TokenSigner;
use bookapp_core::auth::policy::{PolicyEnforcer, PolicyError};
use bookapp_core::models::auth::{Claims, Role, TokenUse};
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Verified claims of the caller, stored in request extensions for allowed
/// requests that presented a token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

/// Claims of the caller, if the request carried a valid token.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Claims>);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.clone()),
        ))
    }
}

impl Caller {
    /// Plain users may only act on their own account; staff roles may act
    /// on any.
    pub fn ensure_self(&self, user_id: i64) -> Result<(), AppError> {
        match &self.0 {
            Some(claims) if claims.role == Role::User && claims.sub != user_id => {
                debug!(caller = claims.sub, target = user_id, "acting on another account");
                Err(AppError::Forbidden)
            }
            _ => Ok(()),
        }
    }
}

/// What the `Authorization` header carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    Anonymous,
    Bearer(&'a str),
}

/// Classify a raw `Authorization` header value.
///
/// `Bearer <token>` and a bare token are both accepted; the scheme is
/// case-insensitive.
pub fn credential(header: Option<&str>) -> Credential<'_> {
    let Some(value) = header.map(str::trim) else {
        return Credential::Anonymous;
    };
    if value.is_empty() || value == "null" {
        return Credential::Anonymous;
    }
    let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
    if scheme.eq_ignore_ascii_case("Basic") {
        return Credential::Anonymous;
    }
    let token = if scheme.eq_ignore_ascii_case("Bearer") {
        rest.trim()
    } else {
        value
    };
    if token.is_empty() {
        Credential::Anonymous
    } else {
        Credential::Bearer(token)
    }
}

/// Why a request was refused with 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Unparsable token, or a refresh token used as an access token.
    Malformed(String),
    InvalidSignature,
    /// The role has no rule for this path and method.
    Policy,
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed { role: Role, claims: Option<Claims> },
    RefreshRequired,
    Denied { role: Option<Role>, reason: DenyReason },
}

/// Decide whether a request may proceed.
pub fn decide(
    tokens: &TokenSigner,
    policy: &PolicyEnforcer,
    header: Option<&str>,
    path: &str,
    method: &str,
) -> Result<GateDecision, PolicyError> {
    let claims = match credential(header) {
        Credential::Anonymous => None,
        Credential::Bearer(token) => match tokens.verify(token) {
            Ok(claims) if claims.token_use == TokenUse::Refresh => {
                return Ok(GateDecision::Denied {
                    role: Some(claims.role),
                    reason: DenyReason::Malformed("refresh token used as access token".into()),
                });
            }
            Ok(claims) => Some(claims),
            Err(TokenError::Expired) => return Ok(GateDecision::RefreshRequired),
            Err(TokenError::InvalidSignature) => {
                return Ok(GateDecision::Denied {
                    role: None,
                    reason: DenyReason::InvalidSignature,
                });
            }
            Err(e) => {
                return Ok(GateDecision::Denied {
                    role: None,
                    reason: DenyReason::Malformed(e.to_string()),
                });
            }
        },
    };

    let role = claims.as_ref().map_or(Role::Unauthorized, |c| c.role);
    if policy.enforce(role, path, method)? {
        Ok(GateDecision::Allowed { role, claims })
    } else {
        Ok(GateDecision::Denied {
            role: Some(role),
            reason: DenyReason::Policy,
        })
    }
}

/// Axum middleware wrapping every route with [`decide`].
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let path = request.uri().path();
    let method = request.method().as_str();

    match decide(&state.tokens, &state.policy, header, path, method)? {
        GateDecision::Allowed { role, claims } => {
            debug!(%role, %path, %method, "request allowed");
            if let Some(claims) = claims {
                request.extensions_mut().insert(AuthenticatedUser(claims));
            }
            Ok(next.run(request).await)
        }
        GateDecision::RefreshRequired => {
            debug!(%path, %method, "expired token");
            Err(AppError::TokenExpired)
        }
        GateDecision::Denied { role, reason } => {
            debug!(role = ?role, ?reason, %path, %method, "request denied");
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use bookapp_core::auth::jwt::TOKEN_VALIDITY_HOURS;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"gate-test-key", vec!["bookapp".into()])
    }

    async fn policy() -> PolicyEnforcer {
        PolicyEnforcer::with_default_rules().await.unwrap()
    }

    fn claims(sub: i64, role: Role) -> Claims {
        Claims {
            sub,
            role,
            aud: vec![],
            iat: 0,
            exp: 0,
            token_use: TokenUse::Access,
            jti: String::new(),
        }
    }

    #[test]
    fn users_may_only_act_on_themselves() {
        assert!(Caller(Some(claims(3, Role::User))).ensure_self(3).is_ok());
        assert!(matches!(
            Caller(Some(claims(3, Role::User))).ensure_self(4),
            Err(AppError::Forbidden)
        ));
        assert!(Caller(Some(claims(1, Role::Admin))).ensure_self(4).is_ok());
        assert!(Caller(None).ensure_self(4).is_ok());
    }

    #[test]
    fn credential_parsing() {
        assert_eq!(credential(None), Credential::Anonymous);
        assert_eq!(credential(Some("")), Credential::Anonymous);
        assert_eq!(credential(Some("  ")), Credential::Anonymous);
        assert_eq!(credential(Some("null")), Credential::Anonymous);
        assert_eq!(credential(Some("Basic Ym9va2FwcDpwdw==")), Credential::Anonymous);
        assert_eq!(credential(Some("Bearer ")), Credential::Anonymous);
        assert_eq!(credential(Some("Bearer abc.def.ghi")), Credential::Bearer("abc.def.ghi"));
        assert_eq!(credential(Some("abc.def.ghi")), Credential::Bearer("abc.def.ghi"));
        assert_eq!(credential(Some("bearer abc.def.ghi")), Credential::Bearer("abc.def.ghi"));
    }

    #[test]
    fn only_the_basic_scheme_is_anonymous() {
        assert_eq!(credential(Some("Basic")), Credential::Anonymous);
        assert_eq!(
            credential(Some("Bearer eyJhbGciOiJIUzI1NiJ9.QmFzaWMgdXNlcg.c2ln")),
            Credential::Bearer("eyJhbGciOiJIUzI1NiJ9.QmFzaWMgdXNlcg.c2ln")
        );
        assert_eq!(
            credential(Some("Bearer tokenWithBasicInside")),
            Credential::Bearer("tokenWithBasicInside")
        );
        assert_eq!(
            credential(Some("BasicLookingToken")),
            Credential::Bearer("BasicLookingToken")
        );
    }

    #[tokio::test]
    async fn anonymous_request_uses_unauthorized_role() {
        let decision = decide(&signer(), &policy().await, None, "/v1/book/search", "GET").unwrap();
        assert_eq!(
            decision,
            GateDecision::Allowed {
                role: Role::Unauthorized,
                claims: None
            }
        );

        let decision = decide(&signer(), &policy().await, None, "/v1/book", "POST").unwrap();
        assert_eq!(
            decision,
            GateDecision::Denied {
                role: Some(Role::Unauthorized),
                reason: DenyReason::Policy
            }
        );
    }

    #[tokio::test]
    async fn expired_token_requires_refresh_even_where_role_would_be_denied() {
        let tokens = signer();
        let issued = Utc::now() - Duration::hours(TOKEN_VALIDITY_HOURS + 1);
        let pair = tokens.issue_at(1, Role::User, issued).unwrap();
        let header = format!("Bearer {}", pair.access_token);

        for (path, method) in [("/v1/book/1", "GET"), ("/v1/book", "POST")] {
            let decision = decide(&tokens, &policy().await, Some(&header), path, method).unwrap();
            assert_eq!(decision, GateDecision::RefreshRequired);
        }
    }

    #[tokio::test]
    async fn foreign_signature_is_denied() {
        let forged = TokenSigner::new(b"someone-else", vec![])
            .issue(1, Role::Superadmin)
            .unwrap();
        let decision = decide(
            &signer(),
            &policy().await,
            Some(&forged.access_token),
            "/v1/book/1",
            "GET",
        )
        .unwrap();
        assert_eq!(
            decision,
            GateDecision::Denied {
                role: None,
                reason: DenyReason::InvalidSignature
            }
        );
    }

    #[tokio::test]
    async fn garbage_token_is_denied_not_anonymous() {
        let decision = decide(
            &signer(),
            &policy().await,
            Some("Bearer not-a-token"),
            "/v1/book/1",
            "GET",
        )
        .unwrap();
        assert!(matches!(
            decision,
            GateDecision::Denied {
                reason: DenyReason::Malformed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_credential() {
        let tokens = signer();
        let pair = tokens.issue(5, Role::Admin).unwrap();
        let decision = decide(
            &tokens,
            &policy().await,
            Some(&pair.refresh_token),
            "/v1/book/1",
            "GET",
        )
        .unwrap();
        assert!(matches!(
            decision,
            GateDecision::Denied {
                reason: DenyReason::Malformed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn valid_token_carries_claims() {
        let tokens = signer();
        let pair = tokens.issue(9, Role::Admin).unwrap();
        let header = format!("Bearer {}", pair.access_token);
        match decide(&tokens, &policy().await, Some(&header), "/v1/book", "POST").unwrap() {
            GateDecision::Allowed { role, claims } => {
                assert_eq!(role, Role::Admin);
                assert_eq!(claims.map(|c| c.sub), Some(9));
            }
            other => panic!("expected allow, got {other:?}"),
        }
    }
}
