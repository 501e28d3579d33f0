//! Integration tests for registration, login and refresh-token rotation
//! against an in-memory account store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use bookapp_api::{AppState, config::ApiConfig};
use bookapp_core::auth::policy::PolicyEnforcer;
use bookapp_core::models::user::{NewUser, User, UserCredentials, UserProfile, UserUpdate};
use bookapp_core::storage::{Storage, StorageError, UserField, UserRepo};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

struct Account {
    creds: UserCredentials,
    refresh_token: Option<String>,
}

#[derive(Default)]
struct MemoryUsers {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryUsers {
    fn public(creds: &UserCredentials) -> User {
        User {
            id: creds.id,
            full_name: creds.full_name.clone(),
            avatar_url: creds.avatar_url.clone(),
            login: creds.login.clone(),
        }
    }
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn create(&self, user: &NewUser, password_hash: &str) -> Result<User, StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.creds.login == user.login) {
            return Err(StorageError::Conflict("users_login_key".into()));
        }
        let creds = UserCredentials {
            id: accounts.len() as i64 + 1,
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            login: user.login.clone(),
            password: password_hash.to_string(),
            role_id: user.role_id,
        };
        let public = Self::public(&creds);
        accounts.push(Account {
            creds,
            refresh_token: None,
        });
        Ok(public)
    }

    async fn get(&self, id: i64) -> Result<UserProfile, StorageError> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter()
            .find(|a| a.creds.id == id)
            .ok_or(StorageError::NotFound)?;
        Ok(UserProfile {
            user: Self::public(&account.creds),
            liked_books: Vec::new(),
        })
    }

    async fn update(&self, user: &UserUpdate, password_hash: &str) -> Result<User, StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.creds.id == user.id)
            .ok_or(StorageError::NotFound)?;
        account.creds.full_name = user.full_name.clone();
        account.creds.login = user.login.clone();
        account.creds.password = password_hash.to_string();
        Ok(Self::public(&account.creds))
    }

    async fn delete(&self, id: i64, role_id: i32) -> Result<(), StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| !(a.creds.id == id && a.creds.role_id == role_id));
        if accounts.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserCredentials>, StorageError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|a| a.creds.login == login)
            .map(|a| a.creds.clone()))
    }

    async fn exists(&self, field: UserField, value: &str) -> Result<bool, StorageError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(match field {
            UserField::Login => accounts.iter().any(|a| a.creds.login == value),
        })
    }

    async fn list_admins(&self) -> Result<Vec<User>, StorageError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| a.creds.role_id == 2)
            .map(|a| Self::public(&a.creds))
            .collect())
    }

    async fn store_refresh_token(&self, id: i64, token: &str) -> Result<(), StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.creds.id == id)
            .ok_or(StorageError::NotFound)?;
        account.refresh_token = Some(token.to_string());
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<bool, StorageError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|a| a.creds.id == id) {
            Some(account) if account.refresh_token.as_deref() == Some(current) => {
                account.refresh_token = Some(new.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

async fn app() -> Router {
    let config = ApiConfig {
        signing_key: "account-test-key".into(),
        ..ApiConfig::default()
    };
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.pg_connection_url)
        .expect("lazy pool");
    let mut storage = Storage::postgres(pool);
    storage.users = Arc::new(MemoryUsers::default());
    let policy = PolicyEnforcer::with_default_rules()
        .await
        .expect("default policy");
    bookapp_api::router(AppState::new(storage, config, policy))
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

fn registration(login: &str) -> Value {
    json!({
        "role_id": 3,
        "full_name": "Reader One",
        "login": login,
        "password": "hunter22"
    })
}

#[tokio::test]
async fn register_returns_account_and_tokens() {
    let app = app().await;

    let (status, json) = post(&app, "/v1/client/register", registration("reader")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["id"], 1);
    assert_eq!(json["data"]["login"], "reader");
    assert_eq!(json["data"]["role_id"], 3);
    assert!(json["data"]["access_token"].is_string());
    assert!(json["data"]["refresh_token"].is_string());
    assert!(json["data"].get("password").is_none());
}

#[tokio::test]
async fn duplicate_login_is_a_conflict() {
    let app = app().await;
    post(&app, "/v1/client/register", registration("reader")).await;

    let (status, json) = post(&app, "/v1/client/register", registration("reader")).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["data"], "This login already exists");
}

#[tokio::test]
async fn registration_rejects_another_role_id() {
    let app = app().await;
    let mut body = registration("sneaky");
    body["role_id"] = json!(1);

    let (status, json) = post(&app, "/v1/client/register", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["data"], "role_id must be 3");
}

#[tokio::test]
async fn login_checks_password() {
    let app = app().await;
    post(&app, "/v1/client/register", registration("reader")).await;

    let (status, json) = post(
        &app,
        "/v1/client/login",
        json!({"login": "reader", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["data"], "Incorrect login or password");

    let (status, json) = post(
        &app,
        "/v1/client/login",
        json!({"login": "reader", "password": "hunter22"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], 1);
}

#[tokio::test]
async fn users_cannot_sign_in_as_admins() {
    let app = app().await;
    post(&app, "/v1/client/register", registration("reader")).await;

    let (status, json) = post(
        &app,
        "/v1/admin/login",
        json!({"login": "reader", "password": "hunter22"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["data"], "Incorrect login or password");
}

#[tokio::test]
async fn refresh_tokens_rotate_and_work_once() {
    let app = app().await;
    let (_, json) = post(&app, "/v1/client/register", registration("reader")).await;
    let first = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let (status, json) = post(&app, "/v1/client/refresh", json!({"refresh_token": first})).await;
    assert_eq!(status, StatusCode::OK);
    let second = json["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    let (status, json) = post(&app, "/v1/client/refresh", json!({"refresh_token": first})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["data"], "Invalid refresh token");

    let (status, _) = post(&app, "/v1/client/refresh", json!({"refresh_token": second})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let app = app().await;
    let (_, json) = post(&app, "/v1/client/register", registration("reader")).await;
    let access = json["data"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = post(&app, "/v1/client/refresh", json!({"refresh_token": access})).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn concurrent_refreshes_redeem_a_token_once() {
    let app = app().await;
    let (_, json) = post(&app, "/v1/client/register", registration("reader")).await;
    let token = json["data"]["refresh_token"].as_str().unwrap().to_string();

    let body = json!({"refresh_token": token});
    let (a, b) = tokio::join!(
        post(&app, "/v1/client/refresh", body.clone()),
        post(&app, "/v1/client/refresh", body.clone()),
    );

    let mut statuses = [a.0.as_u16(), b.0.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 401]);
}
