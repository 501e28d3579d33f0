//! Account flows: registration, login and token refresh.

use bookapp_core::auth::TokenError;
use bookapp_core::auth::jwt::TokenSigner;
use bookapp_core::auth::password::{hash_password, verify_password};
use bookapp_core::models::auth::{Role, TokenPair, TokenUse};
use bookapp_core::models::user::{LoginRequest, NewUser, SessionResponse, User, UserUpdate};
use bookapp_core::storage::{Storage, UserField};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, BAD_CREDENTIALS};

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Issue a token pair for `user_id` and remember its refresh half.
async fn start_session(
    storage: &Storage,
    tokens: &TokenSigner,
    user_id: i64,
    role: Role,
) -> AppResult<TokenPair> {
    let pair = tokens.issue(user_id, role)?;
    storage
        .users
        .store_refresh_token(user_id, &pair.refresh_token)
        .await?;
    Ok(pair)
}

/// Create an account of role `role`.
///
/// The body's `role_id` must name `role`; a taken login is a conflict.
pub async fn register(
    storage: &Storage,
    tokens: &TokenSigner,
    body: &NewUser,
    role: Role,
) -> AppResult<SessionResponse> {
    let expected = role
        .role_id()
        .ok_or_else(|| AppError::Internal(format!("role {role} has no account id")))?;
    if body.role_id != expected {
        return Err(AppError::Validation(format!("role_id must be {expected}")));
    }
    require("full_name", &body.full_name)?;
    require("login", &body.login)?;
    require("password", &body.password)?;

    if storage.users.exists(UserField::Login, &body.login).await? {
        return Err(AppError::Conflict("This login already exists".into()));
    }

    let password_hash = hash_password(&body.password)?;
    let user = storage.users.create(body, &password_hash).await?;
    let pair = start_session(storage, tokens, user.id, role).await?;
    info!(user_id = user.id, %role, "account registered");

    Ok(SessionResponse {
        user,
        role_id: expected,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })
}

/// Authenticate `body` as one of `allowed` roles.
///
/// Unknown logins, wrong passwords and accounts of another role all answer
/// with the same message.
pub async fn login(
    storage: &Storage,
    tokens: &TokenSigner,
    body: &LoginRequest,
    allowed: &[Role],
) -> AppResult<SessionResponse> {
    let bad_credentials = || AppError::Validation(BAD_CREDENTIALS.into());

    let creds = storage
        .users
        .find_by_login(&body.login)
        .await?
        .ok_or_else(bad_credentials)?;

    if !verify_password(&body.password, &creds.password)? {
        warn!(login = %body.login, "wrong password");
        return Err(bad_credentials());
    }

    let role = Role::from_role_id(creds.role_id);
    if !allowed.contains(&role) {
        warn!(login = %body.login, %role, "login through another role's endpoint");
        return Err(bad_credentials());
    }

    let pair = start_session(storage, tokens, creds.id, role).await?;
    info!(user_id = creds.id, %role, "logged in");

    Ok(SessionResponse {
        user: User {
            id: creds.id,
            full_name: creds.full_name,
            avatar_url: creds.avatar_url,
            login: creds.login,
        },
        role_id: creds.role_id,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })
}

/// Exchange the latest refresh token for a new pair. Each refresh token
/// works once: the stored token is swapped only if it still matches.
pub async fn refresh(
    storage: &Storage,
    tokens: &TokenSigner,
    refresh_token: &str,
) -> AppResult<TokenPair> {
    let invalid = || AppError::Unauthorized("Invalid refresh token".into());

    let claims = match tokens.verify(refresh_token) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => return Err(AppError::TokenExpired),
        Err(TokenError::Signing(msg)) => return Err(AppError::Internal(msg)),
        Err(_) => return Err(invalid()),
    };
    if claims.token_use != TokenUse::Refresh {
        return Err(invalid());
    }

    let pair = tokens.issue(claims.sub, claims.role)?;
    let rotated = storage
        .users
        .rotate_refresh_token(claims.sub, refresh_token, &pair.refresh_token)
        .await?;
    if !rotated {
        warn!(user_id = claims.sub, "stale refresh token presented");
        return Err(invalid());
    }
    info!(user_id = claims.sub, "session refreshed");
    Ok(pair)
}

/// Update an account, re-hashing its password.
pub async fn update_account(storage: &Storage, body: &UserUpdate) -> AppResult<User> {
    require("full_name", &body.full_name)?;
    require("login", &body.login)?;
    require("password", &body.password)?;
    let password_hash = hash_password(&body.password)?;
    Ok(storage.users.update(body, &password_hash).await?)
}
