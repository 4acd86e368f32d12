//! Domain types and pure business rules for Careline.

#![forbid(unsafe_code)]

/// Company and sector reference types.
pub mod company;
/// Employment contracts and versions.
pub mod contract;
/// Static role and permission reference data.
pub mod rights;
/// Calendar arithmetic shared by the contract engine.
pub mod time;
/// User records, memberships and validation rules.
pub mod user;

pub use company::{Company, SectorId, SubscriptionFlags};
pub use contract::{
    Contract, ContractEndReason, ContractId, ContractInfo, ContractVersion, DateRange,
    DocumentRef, SignedBy, VersionEdition, VersionId, VersionSignature, VersionUpdate,
    contract_info, format_version_edition,
};
pub use rights::{Interface, Right, RightsTable, RoleAssignments, RoleName, Subscription};
pub use time::{DayCounts, MonthDayRatio, day_counts_between};
pub use user::{
    CompanyMembership, CustomerId, EmailAddress, HoldingMembership, UserRecord, pick_current,
};
