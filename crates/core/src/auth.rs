use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{CompanyId, HoldingId, UserId};

/// Role-name-only projection of a user's role slots.
///
/// Each slot corresponds to one tenancy axis; unpopulated slots stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProjection {
    /// Client-interface role name, if any.
    pub client: Option<String>,
    /// Vendor-interface role name, if any.
    pub vendor: Option<String>,
    /// Holding-interface role name, if any.
    pub holding: Option<String>,
}

/// Fully resolved per-request authorization result.
///
/// Recomputed on every authenticated request from persisted user, role and
/// company state; never persisted itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    user_id: UserId,
    identity: String,
    email: Option<String>,
    company_id: Option<CompanyId>,
    holding_id: Option<HoldingId>,
    role: RoleProjection,
    scope: BTreeSet<String>,
}

impl Credentials {
    /// Creates credentials from resolved authorization data.
    #[must_use]
    pub fn new(
        user_id: UserId,
        identity: impl Into<String>,
        email: Option<String>,
        company_id: Option<CompanyId>,
        holding_id: Option<HoldingId>,
        role: RoleProjection,
        scope: BTreeSet<String>,
    ) -> Self {
        Self {
            user_id,
            identity: identity.into(),
            email,
            company_id,
            holding_id,
            role,
            scope,
        }
    }

    /// Returns the authenticated user's identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display identity of the user.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.identity.as_str()
    }

    /// Returns the email, if the user record holds one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the user's currently-active company, if any.
    #[must_use]
    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    /// Returns the user's currently-active holding, if any.
    #[must_use]
    pub fn holding_id(&self) -> Option<HoldingId> {
        self.holding_id
    }

    /// Returns the role-name projection per slot.
    #[must_use]
    pub fn role(&self) -> &RoleProjection {
        &self.role
    }

    /// Returns the deduplicated scope set.
    #[must_use]
    pub fn scope(&self) -> &BTreeSet<String> {
        &self.scope
    }

    /// Returns whether the scope set contains the given token.
    #[must_use]
    pub fn has_scope(&self, token: &str) -> bool {
        self.scope.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::UserId;

    use super::{Credentials, RoleProjection};

    #[test]
    fn scope_membership_is_exact() {
        let scope: BTreeSet<String> =
            BTreeSet::from(["contracts:edit".to_owned(), "events:read".to_owned()]);
        let credentials = Credentials::new(
            UserId::new(),
            "Jane Doe",
            None,
            None,
            None,
            RoleProjection::default(),
            scope,
        );

        assert!(credentials.has_scope("contracts:edit"));
        assert!(!credentials.has_scope("contracts"));
    }
}
