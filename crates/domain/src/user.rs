//! User records, memberships and validation rules.

use std::fmt::{Display, Formatter};

use careline_core::{AppError, AppResult, CompanyId, HoldingId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::company::SectorId;
use crate::contract::ContractId;
use crate::rights::RoleAssignments;

/// Identifier of a care customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a random customer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a customer identifier from an existing UUID value.
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

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CustomerId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one
    /// `@`, local part and domain are non-empty, domain contains at least one
    /// `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Anything with a validity window, used for membership history rows.
pub trait TimeBounded {
    /// Start of the validity window.
    fn start_date(&self) -> DateTime<Utc>;
    /// End of the validity window, open-ended when absent.
    fn end_date(&self) -> Option<DateTime<Utc>>;
}

/// Time-bounded membership of a user in a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyMembership {
    /// The company joined.
    pub company_id: CompanyId,
    /// When the membership starts.
    pub start_date: DateTime<Utc>,
    /// When the membership ends, if it does.
    pub end_date: Option<DateTime<Utc>>,
}

impl TimeBounded for CompanyMembership {
    fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }
}

/// Time-bounded membership of a user in a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingMembership {
    /// The holding joined.
    pub holding_id: HoldingId,
    /// When the membership starts.
    pub start_date: DateTime<Utc>,
    /// When the membership ends, if it does.
    pub end_date: Option<DateTime<Utc>>,
}

impl TimeBounded for HoldingMembership {
    fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }
}

/// Picks the membership active at `now` from a time-bounded history.
///
/// A row qualifies when its start date is not in the future and its end date
/// is absent or strictly later than `now`.
#[must_use]
pub fn pick_current<M: TimeBounded>(history: &[M], now: DateTime<Utc>) -> Option<&M> {
    history
        .iter()
        .find(|row| row.start_date() <= now && row.end_date().is_none_or(|end| end > now))
}

/// Store projection of a platform user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// User identifier.
    pub user_id: UserId,
    /// Display identity (full name).
    pub identity: String,
    /// Login email, if recorded.
    pub email: Option<EmailAddress>,
    /// Role slots.
    pub roles: RoleAssignments,
    /// Company membership history (unordered).
    pub company_history: Vec<CompanyMembership>,
    /// Holding membership history.
    pub holding_history: Vec<HoldingMembership>,
    /// Customers a helper account is linked to.
    pub customers: Vec<CustomerId>,
    /// Organizational sector, if assigned.
    pub sector_id: Option<SectorId>,
    /// Contracts the user holds.
    pub contract_ids: Vec<ContractId>,
    /// Date from which the employee counts as inactive, if any.
    pub inactivity_date: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Creates a minimal record with empty histories.
    #[must_use]
    pub fn new(user_id: UserId, identity: impl Into<String>) -> Self {
        Self {
            user_id,
            identity: identity.into(),
            email: None,
            roles: RoleAssignments::default(),
            company_history: Vec::new(),
            holding_history: Vec::new(),
            customers: Vec::new(),
            sector_id: None,
            contract_ids: Vec::new(),
            inactivity_date: None,
        }
    }

    /// Returns the company the user belongs to at `now`, if any.
    #[must_use]
    pub fn current_company(&self, now: DateTime<Utc>) -> Option<CompanyId> {
        pick_current(&self.company_history, now).map(|row| row.company_id)
    }

    /// Returns the holding the user belongs to at `now`, if any.
    #[must_use]
    pub fn current_holding(&self, now: DateTime<Utc>) -> Option<HoldingId> {
        pick_current(&self.holding_history, now).map(|row| row.holding_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn day(offset: i64) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0) {
            chrono::offset::LocalResult::Single(base) => base + Duration::days(offset),
            _ => panic!("invalid test date"),
        }
    }

    #[test]
    fn valid_email_is_accepted_and_lowercased() {
        let email = EmailAddress::new("USER@Example.COM");
        assert_eq!(
            email.map(|value| value.as_str().to_owned()).ok(),
            Some("user@example.com".to_owned())
        );
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("noatsign").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn pick_current_skips_ended_membership() {
        let old_company = CompanyId::new();
        let new_company = CompanyId::new();
        let history = vec![
            CompanyMembership {
                company_id: old_company,
                start_date: day(-100),
                end_date: Some(day(-10)),
            },
            CompanyMembership {
                company_id: new_company,
                start_date: day(-9),
                end_date: None,
            },
        ];

        let current = pick_current(&history, day(0));
        assert_eq!(current.map(|row| row.company_id), Some(new_company));
    }

    #[test]
    fn pick_current_ignores_future_membership() {
        let history = vec![CompanyMembership {
            company_id: CompanyId::new(),
            start_date: day(5),
            end_date: None,
        }];

        assert!(pick_current(&history, day(0)).is_none());
    }

    #[test]
    fn pick_current_treats_end_date_as_exclusive() {
        let history = vec![CompanyMembership {
            company_id: CompanyId::new(),
            start_date: day(-5),
            end_date: Some(day(0)),
        }];

        assert!(pick_current(&history, day(0)).is_none());
    }

    #[test]
    fn empty_history_yields_no_company() {
        let user = UserRecord::new(UserId::new(), "Jane Doe");
        assert!(user.current_company(day(0)).is_none());
    }
}
