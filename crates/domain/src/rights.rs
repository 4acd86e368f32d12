//! Static role and permission reference data.
//!
//! The rights table is process-wide configuration: built once at startup,
//! read-only afterwards. Permissions are `"<resource>:<action>"` strings,
//! optionally gated behind a company subscription for client-interface roles.

use std::collections::HashMap;
use std::str::FromStr;

use careline_core::AppError;
use serde::{Deserialize, Serialize};

use crate::company::SubscriptionFlags;

/// Tenancy axis a role belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    /// Care-company side (home-care operations).
    Client,
    /// Training-vendor side.
    Vendor,
    /// Holding side (umbrella over several companies).
    Holding,
}

/// Platform roles, each tied to exactly one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    /// Client-company administrator.
    ClientAdmin,
    /// Client-company coach.
    Coach,
    /// Client-company planning referent.
    PlanningReferent,
    /// Care auxiliary employed by a client company.
    Auxiliary,
    /// Care auxiliary not yet attached to a company.
    AuxiliaryWithoutCompany,
    /// Customer-side helper account.
    Helper,
    /// Vendor administrator.
    VendorAdmin,
    /// Vendor training organiser.
    TrainingOrganiser,
    /// Vendor trainer.
    Trainer,
    /// Holding administrator.
    HoldingAdmin,
}

impl RoleName {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientAdmin => "client_admin",
            Self::Coach => "coach",
            Self::PlanningReferent => "planning_referent",
            Self::Auxiliary => "auxiliary",
            Self::AuxiliaryWithoutCompany => "auxiliary_without_company",
            Self::Helper => "helper",
            Self::VendorAdmin => "vendor_admin",
            Self::TrainingOrganiser => "training_organiser",
            Self::Trainer => "trainer",
            Self::HoldingAdmin => "holding_admin",
        }
    }

    /// Returns the tenancy axis this role governs.
    #[must_use]
    pub fn interface(&self) -> Interface {
        match self {
            Self::ClientAdmin
            | Self::Coach
            | Self::PlanningReferent
            | Self::Auxiliary
            | Self::AuxiliaryWithoutCompany
            | Self::Helper => Interface::Client,
            Self::VendorAdmin | Self::TrainingOrganiser | Self::Trainer => Interface::Vendor,
            Self::HoldingAdmin => Interface::Holding,
        }
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "client_admin" => Ok(Self::ClientAdmin),
            "coach" => Ok(Self::Coach),
            "planning_referent" => Ok(Self::PlanningReferent),
            "auxiliary" => Ok(Self::Auxiliary),
            "auxiliary_without_company" => Ok(Self::AuxiliaryWithoutCompany),
            "helper" => Ok(Self::Helper),
            "vendor_admin" => Ok(Self::VendorAdmin),
            "training_organiser" => Ok(Self::TrainingOrganiser),
            "trainer" => Ok(Self::Trainer),
            "holding_admin" => Ok(Self::HoldingAdmin),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// A user's role slots, one per tenancy axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    /// Client-interface role slot.
    pub client: Option<RoleName>,
    /// Vendor-interface role slot.
    pub vendor: Option<RoleName>,
    /// Holding-interface role slot.
    pub holding: Option<RoleName>,
}

impl RoleAssignments {
    /// Iterates over the populated role slots.
    pub fn populated(&self) -> impl Iterator<Item = RoleName> {
        self.client
            .into_iter()
            .chain(self.vendor)
            .chain(self.holding)
    }
}

/// Company feature bundles gating parts of the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subscription {
    /// Staff administration bundle (contracts, pay, billing).
    Erp,
}

/// One permission and the roles allowed to hold it.
#[derive(Debug)]
pub struct Right {
    /// Permission string, `"<resource>:<action>"`.
    pub permission: &'static str,
    /// Roles the permission is assigned to.
    pub roles: &'static [RoleName],
    /// Subscription required for client-interface roles, if any.
    pub subscription: Option<Subscription>,
}

use RoleName::{
    Auxiliary, AuxiliaryWithoutCompany, ClientAdmin, Coach, Helper, HoldingAdmin,
    PlanningReferent, Trainer, TrainingOrganiser, VendorAdmin,
};

static RIGHTS: &[Right] = &[
    Right {
        permission: "users:list",
        roles: &[
            ClientAdmin,
            Coach,
            PlanningReferent,
            VendorAdmin,
            TrainingOrganiser,
            HoldingAdmin,
        ],
        subscription: None,
    },
    Right {
        permission: "users:edit",
        roles: &[ClientAdmin, Coach, VendorAdmin, TrainingOrganiser, HoldingAdmin],
        subscription: None,
    },
    Right {
        permission: "events:read",
        roles: &[ClientAdmin, Coach, PlanningReferent, Auxiliary],
        subscription: None,
    },
    Right {
        permission: "events:edit",
        roles: &[ClientAdmin, Coach, PlanningReferent],
        subscription: None,
    },
    Right {
        permission: "customers:read",
        roles: &[ClientAdmin, Coach, PlanningReferent, Auxiliary, Helper],
        subscription: None,
    },
    Right {
        permission: "customers:edit",
        roles: &[ClientAdmin, Coach, PlanningReferent],
        subscription: None,
    },
    Right {
        permission: "customers:administrative:edit",
        roles: &[ClientAdmin, Coach],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "contracts:read",
        roles: &[ClientAdmin, Coach],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "contracts:edit",
        roles: &[ClientAdmin, Coach],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "pay:read",
        roles: &[ClientAdmin, Coach],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "pay:edit",
        roles: &[ClientAdmin],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "paydocuments:edit",
        roles: &[ClientAdmin, Coach],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "bills:read",
        roles: &[ClientAdmin, Coach],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "bills:edit",
        roles: &[ClientAdmin],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "exports:read",
        roles: &[ClientAdmin, Coach, VendorAdmin, TrainingOrganiser],
        subscription: None,
    },
    Right {
        permission: "exports:edit",
        roles: &[ClientAdmin],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "config:read",
        roles: &[ClientAdmin, Coach, HoldingAdmin],
        subscription: None,
    },
    Right {
        permission: "config:edit",
        roles: &[ClientAdmin],
        subscription: Some(Subscription::Erp),
    },
    Right {
        permission: "courses:read",
        roles: &[
            ClientAdmin,
            Coach,
            VendorAdmin,
            TrainingOrganiser,
            Trainer,
            HoldingAdmin,
        ],
        subscription: None,
    },
    Right {
        permission: "courses:edit",
        roles: &[VendorAdmin, TrainingOrganiser, Trainer],
        subscription: None,
    },
    Right {
        permission: "courses:create",
        roles: &[VendorAdmin, TrainingOrganiser],
        subscription: None,
    },
    Right {
        permission: "attendances:read",
        roles: &[
            ClientAdmin,
            Coach,
            VendorAdmin,
            TrainingOrganiser,
            Trainer,
            HoldingAdmin,
        ],
        subscription: None,
    },
    Right {
        permission: "attendances:edit",
        roles: &[VendorAdmin, TrainingOrganiser, Trainer],
        subscription: None,
    },
    Right {
        permission: "questionnaires:read",
        roles: &[VendorAdmin, TrainingOrganiser, Trainer],
        subscription: None,
    },
    Right {
        permission: "questionnaires:edit",
        roles: &[VendorAdmin, TrainingOrganiser],
        subscription: None,
    },
    Right {
        permission: "companies:create",
        roles: &[VendorAdmin, TrainingOrganiser],
        subscription: None,
    },
    Right {
        permission: "companies:read",
        roles: &[VendorAdmin, TrainingOrganiser, HoldingAdmin],
        subscription: None,
    },
    Right {
        permission: "companies:edit",
        roles: &[VendorAdmin, HoldingAdmin],
        subscription: None,
    },
    Right {
        permission: "holdings:read",
        roles: &[VendorAdmin, HoldingAdmin],
        subscription: None,
    },
    Right {
        permission: "holdings:edit",
        roles: &[VendorAdmin],
        subscription: None,
    },
    Right {
        permission: "scripts:run",
        roles: &[VendorAdmin, AuxiliaryWithoutCompany],
        subscription: None,
    },
];

/// Role-indexed view over the static rights list.
#[derive(Debug)]
pub struct RightsTable {
    by_role: HashMap<RoleName, Vec<&'static Right>>,
}

impl RightsTable {
    /// Builds the standard table from the static rights list.
    #[must_use]
    pub fn standard() -> Self {
        let mut by_role: HashMap<RoleName, Vec<&'static Right>> = HashMap::new();
        for right in RIGHTS {
            for role in right.roles {
                by_role.entry(*role).or_default().push(right);
            }
        }

        Self { by_role }
    }

    /// Returns the permissions granted to a role, applying subscription gating.
    ///
    /// Client-interface roles lose subscription-gated permissions unless the
    /// company's corresponding flag is enabled; with no company at all, no
    /// gated permission is granted. Vendor and holding roles are ungated.
    #[must_use]
    pub fn permissions_for(
        &self,
        role: RoleName,
        subscriptions: Option<&SubscriptionFlags>,
    ) -> Vec<&'static str> {
        let Some(rights) = self.by_role.get(&role) else {
            return Vec::new();
        };

        rights
            .iter()
            .filter(|right| match right.subscription {
                Some(required) if role.interface() == Interface::Client => {
                    subscriptions.is_some_and(|flags| flags.has(required))
                }
                _ => true,
            })
            .map(|right| right.permission)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::company::SubscriptionFlags;

    use super::{Interface, RightsTable, RoleName, Subscription};

    #[test]
    fn role_roundtrip_storage_value() {
        let role = RoleName::PlanningReferent;
        let restored = RoleName::from_str(role.as_str());
        assert_eq!(restored.unwrap_or(RoleName::Helper), role);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(RoleName::from_str("superuser").is_err());
    }

    #[test]
    fn every_role_maps_to_one_interface() {
        assert_eq!(RoleName::Auxiliary.interface(), Interface::Client);
        assert_eq!(RoleName::Trainer.interface(), Interface::Vendor);
        assert_eq!(RoleName::HoldingAdmin.interface(), Interface::Holding);
    }

    #[test]
    fn gated_permission_needs_subscription_for_client_role() {
        let table = RightsTable::standard();

        let without = table.permissions_for(RoleName::ClientAdmin, None);
        assert!(!without.contains(&"pay:edit"));
        assert!(without.contains(&"events:edit"));

        let flags = SubscriptionFlags { erp: true };
        let with = table.permissions_for(RoleName::ClientAdmin, Some(&flags));
        assert!(with.contains(&"pay:edit"));
    }

    #[test]
    fn disabled_subscription_grants_nothing_gated() {
        let table = RightsTable::standard();
        let flags = SubscriptionFlags { erp: false };
        let permissions = table.permissions_for(RoleName::Coach, Some(&flags));
        assert!(!permissions.iter().any(|permission| {
            super::RIGHTS
                .iter()
                .any(|right| right.permission == *permission && right.subscription.is_some())
        }));
    }

    #[test]
    fn vendor_role_is_never_gated() {
        let table = RightsTable::standard();
        let permissions = table.permissions_for(RoleName::VendorAdmin, None);
        assert!(permissions.contains(&"companies:create"));
    }

    #[test]
    fn erp_flag_has_a_stable_name() {
        assert_eq!(
            serde_json::to_string(&Subscription::Erp).unwrap_or_default(),
            "\"erp\""
        );
    }
}
