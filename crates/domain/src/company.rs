//! Company and sector reference types.

use std::fmt::{Display, Formatter};

use careline_core::{CompanyId, HoldingId, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rights::Subscription;

/// Identifier of an organizational sector within a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorId(Uuid);

impl SectorId {
    /// Creates a random sector identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a sector identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SectorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SectorId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Feature bundles a company has enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFlags {
    /// Staff administration bundle (contracts, pay, billing).
    pub erp: bool,
}

impl SubscriptionFlags {
    /// Returns whether the given subscription is enabled.
    #[must_use]
    pub fn has(&self, subscription: Subscription) -> bool {
        match subscription {
            Subscription::Erp => self.erp,
        }
    }
}

/// A tenant company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company identifier.
    pub company_id: CompanyId,
    /// Display name.
    pub name: NonEmptyString,
    /// Holding the company belongs to, if any.
    pub holding_id: Option<HoldingId>,
    /// Enabled feature bundles.
    pub subscriptions: SubscriptionFlags,
}
