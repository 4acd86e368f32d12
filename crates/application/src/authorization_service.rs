//! Token validation and scope expansion.
//!
//! Runs on the hot authentication path: side-effect free, one pass over the
//! user's roles, and it fails closed — any resolution fault becomes a
//! non-valid result instead of an error.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use careline_core::{
    AppError, AppResult, CompanyId, Credentials, HoldingId, RoleProjection, UserId,
};
use careline_domain::{Company, RightsTable, UserRecord};
use chrono::Utc;
use uuid::Uuid;

/// Decoded bearer token, as handed over by the transport layer.
///
/// Signature verification and decoding happen before this point; the engine
/// only cares about the subject claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedToken {
    /// Subject claim carrying the user id, if present.
    pub subject: Option<String>,
}

/// Outcome of token validation. Never an error: resolution faults are
/// reported as a non-valid result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthValidation {
    /// Whether the token resolved to credentials.
    pub is_valid: bool,
    /// Resolved credentials when valid.
    pub credentials: Option<Credentials>,
}

/// Repository port for identity lookups.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Finds a user record by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Finds a company by id.
    async fn find_company(&self, company_id: CompanyId) -> AppResult<Option<Company>>;

    /// Lists every company belonging to a holding.
    async fn companies_for_holding(&self, holding_id: HoldingId) -> AppResult<Vec<CompanyId>>;
}

/// Application service resolving decoded tokens into expanded credentials.
#[derive(Clone)]
pub struct AuthorizationService {
    rights: Arc<RightsTable>,
    repository: Arc<dyn IdentityRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service over a rights table and a
    /// repository implementation.
    #[must_use]
    pub fn new(rights: Arc<RightsTable>, repository: Arc<dyn IdentityRepository>) -> Self {
        Self { rights, repository }
    }

    /// Resolves a decoded token into credentials.
    ///
    /// Fails closed: any resolution fault (missing subject, unknown user,
    /// store failure) is logged and reported as `is_valid: false`.
    pub async fn validate(&self, token: &DecodedToken) -> AuthValidation {
        match self.resolve_credentials(token).await {
            Ok(credentials) => AuthValidation {
                is_valid: true,
                credentials: Some(credentials),
            },
            Err(error) => {
                tracing::warn!(%error, "token validation failed");
                AuthValidation {
                    is_valid: false,
                    credentials: None,
                }
            }
        }
    }

    async fn resolve_credentials(&self, token: &DecodedToken) -> AppResult<Credentials> {
        let subject = token
            .subject
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("token carries no user id".to_owned()))?;
        let user_id = Uuid::from_str(subject)
            .map(UserId::from_uuid)
            .map_err(|error| AppError::Unauthorized(format!("invalid user id in token: {error}")))?;

        let user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(format!("unknown user '{user_id}'")))?;

        let now = Utc::now();
        let company_id = user.current_company(now);
        let holding_id = user.current_holding(now);

        let company = match company_id {
            Some(company_id) => self.repository.find_company(company_id).await?,
            None => None,
        };

        let scope = self.expand_scope(&user, company.as_ref(), company_id, holding_id).await?;

        Ok(Credentials::new(
            user_id,
            user.identity.clone(),
            user.email.clone().map(String::from),
            company_id,
            holding_id,
            role_projection(&user),
            scope,
        ))
    }

    async fn expand_scope(
        &self,
        user: &UserRecord,
        company: Option<&Company>,
        company_id: Option<CompanyId>,
        holding_id: Option<HoldingId>,
    ) -> AppResult<BTreeSet<String>> {
        let subscriptions = company.map(|company| company.subscriptions);
        let mut scope = BTreeSet::new();

        for role in user.roles.populated() {
            scope.insert(role.as_str().to_owned());
            for permission in self.rights.permissions_for(role, subscriptions.as_ref()) {
                scope.insert(permission.to_owned());
            }
        }

        scope.insert(format!("user:read-{}", user.user_id));
        scope.insert(format!("user:edit-{}", user.user_id));

        if let Some(company_id) = company_id {
            scope.insert(format!("company-{company_id}"));
        }
        if let Some(holding_id) = holding_id {
            for owned in self.repository.companies_for_holding(holding_id).await? {
                scope.insert(format!("company-{owned}"));
            }
        }
        for customer_id in &user.customers {
            scope.insert(format!("customer-{customer_id}"));
        }

        Ok(scope)
    }
}

fn role_projection(user: &UserRecord) -> RoleProjection {
    RoleProjection {
        client: user.roles.client.map(|role| role.as_str().to_owned()),
        vendor: user.roles.vendor.map(|role| role.as_str().to_owned()),
        holding: user.roles.holding.map(|role| role.as_str().to_owned()),
    }
}
