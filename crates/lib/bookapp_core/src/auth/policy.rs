//! Role/path/method access policy backed by a casbin enforcer.
//!
//! Rules are `p, <role>, <path pattern>, <method>` lines. Path patterns use
//! casbin's `keyMatch2` (`:param` matches one segment, a trailing `/*`
//! matches any suffix); a method of `*` matches every method. Anything
//! without a matching rule is denied.

use std::path::Path;

use casbin::{CoreApi, DefaultModel, Enforcer};
use string_adapter::StringAdapter;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::auth::Role;

const POLICY_MODEL: &str = include_str!("../../policy/model.conf");

/// Rule set shipped with the crate.
pub const DEFAULT_POLICY: &str = include_str!("../../policy/policy.csv");

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Policy engine error: {0}")]
    Engine(#[from] casbin::Error),
}

/// Loaded access policy. Immutable after load.
pub struct PolicyEnforcer {
    enforcer: Enforcer,
}

impl PolicyEnforcer {
    /// Build an enforcer from rule text.
    pub async fn from_rules(rules: &str) -> Result<Self, PolicyError> {
        let model = DefaultModel::from_str(POLICY_MODEL).await?;
        let enforcer = Enforcer::new(model, StringAdapter::new(rules)).await?;
        debug!("policy rules loaded");
        Ok(Self { enforcer })
    }

    /// Build an enforcer from the embedded rule set.
    pub async fn with_default_rules() -> Result<Self, PolicyError> {
        Self::from_rules(DEFAULT_POLICY).await
    }

    /// Build an enforcer from a rule file on disk.
    pub async fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let rules = tokio::fs::read_to_string(path).await?;
        let enforcer = Self::from_rules(&rules).await?;
        info!(path = %path.display(), "policy loaded from file");
        Ok(enforcer)
    }

    /// Whether `role` may call `method` on `path`.
    pub fn enforce(&self, role: Role, path: &str, method: &str) -> Result<bool, PolicyError> {
        Ok(self.enforcer.enforce((role.as_str(), path, method))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn default_policy() -> PolicyEnforcer {
        PolicyEnforcer::with_default_rules()
            .await
            .expect("embedded policy loads")
    }

    #[tokio::test]
    async fn anonymous_callers_may_browse_and_sign_in() {
        let p = default_policy().await;
        let r = Role::Unauthorized;
        assert!(p.enforce(r, "/", "GET").unwrap());
        assert!(p.enforce(r, "/v1/book/search", "GET").unwrap());
        assert!(p.enforce(r, "/v1/book/17", "GET").unwrap());
        assert!(p.enforce(r, "/v1/category/list", "GET").unwrap());
        assert!(p.enforce(r, "/v1/client/register", "POST").unwrap());
        assert!(p.enforce(r, "/v1/client/login", "POST").unwrap());

        assert!(!p.enforce(r, "/v1/book", "POST").unwrap());
        assert!(!p.enforce(r, "/v1/comment", "POST").unwrap());
        assert!(!p.enforce(r, "/v1/client/3", "GET").unwrap());
    }

    #[tokio::test]
    async fn users_may_comment_and_like_but_not_edit_catalogue() {
        let p = default_policy().await;
        let r = Role::User;
        assert!(p.enforce(r, "/v1/comment", "POST").unwrap());
        assert!(p.enforce(r, "/v1/comment/9", "DELETE").unwrap());
        assert!(p.enforce(r, "/v1/book/like", "POST").unwrap());
        assert!(p.enforce(r, "/v1/client/3", "GET").unwrap());

        assert!(!p.enforce(r, "/v1/book", "POST").unwrap());
        assert!(!p.enforce(r, "/v1/book/5", "DELETE").unwrap());
        assert!(!p.enforce(r, "/v1/statistic", "GET").unwrap());
        assert!(!p.enforce(r, "/v1/client/register", "POST").unwrap());
    }

    #[tokio::test]
    async fn admins_manage_catalogue_but_not_admins() {
        let p = default_policy().await;
        let r = Role::Admin;
        assert!(p.enforce(r, "/v1/book", "POST").unwrap());
        assert!(p.enforce(r, "/v1/book", "PUT").unwrap());
        assert!(p.enforce(r, "/v1/author/4", "DELETE").unwrap());
        assert!(p.enforce(r, "/v1/statistic/week/bookcount", "GET").unwrap());

        assert!(!p.enforce(r, "/v1/admin", "POST").unwrap());
        assert!(!p.enforce(r, "/v1/admin/2", "DELETE").unwrap());
    }

    #[tokio::test]
    async fn superadmin_matches_everything() {
        let p = default_policy().await;
        let r = Role::Superadmin;
        assert!(p.enforce(r, "/v1/admin", "POST").unwrap());
        assert!(p.enforce(r, "/v1/admin/2", "DELETE").unwrap());
        assert!(p.enforce(r, "/v1/book", "POST").unwrap());
    }

    #[tokio::test]
    async fn unknown_role_is_denied_everywhere() {
        let p = default_policy().await;
        assert!(!p.enforce(Role::Unknown, "/", "GET").unwrap());
        assert!(!p.enforce(Role::Unknown, "/v1/book/1", "GET").unwrap());
    }

    #[tokio::test]
    async fn method_must_match_rule() {
        let p = PolicyEnforcer::from_rules("p, user, /v1/book/:id, GET\n")
            .await
            .unwrap();
        assert!(p.enforce(Role::User, "/v1/book/1", "GET").unwrap());
        assert!(!p.enforce(Role::User, "/v1/book/1", "DELETE").unwrap());
        assert!(!p.enforce(Role::User, "/v1/book/1/extra", "GET").unwrap());
    }
}
