//! Employment contracts and their time-sliced versions.
//!
//! A contract holds an ordered, non-empty list of versions. The last version
//! is the only one allowed to be open (no end date); every earlier version
//! ends exactly one day before its successor starts, at end of day.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use careline_core::{AppError, AppResult, CompanyId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{DayCounts, MonthDayRatio, day_counts_between, previous_day_end};
use crate::user::CustomerId;

/// Identifier of a contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(Uuid);

/// Identifier of a contract version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(Uuid);

macro_rules! impl_contract_id {
    ($name:ident) => {
        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
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

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

impl_contract_id!(ContractId);
impl_contract_id!(VersionId);

/// Reference to a stored contract document file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// Storage identifier of the file.
    pub file_id: String,
    /// Shareable link to the file.
    pub link: String,
}

/// Which parties have signed a version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBy {
    /// The employee signed.
    pub auxiliary: bool,
    /// The other party signed.
    pub other: bool,
}

/// E-signature state attached to a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSignature {
    /// Provider-side document handle.
    pub eversign_id: String,
    /// Signature-collection state, absent until someone signs.
    pub signed_by: Option<SignedBy>,
}

impl VersionSignature {
    /// Creates a fresh handle-only signature (no collection state yet).
    #[must_use]
    pub fn handle(eversign_id: impl Into<String>) -> Self {
        Self {
            eversign_id: eversign_id.into(),
            signed_by: None,
        }
    }
}

/// A time-sliced snapshot of employment terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractVersion {
    /// Version identifier.
    pub version_id: VersionId,
    /// When the terms take effect.
    pub start_date: DateTime<Utc>,
    /// When the terms stop applying; open when absent.
    pub end_date: Option<DateTime<Utc>>,
    /// Contracted weekly hours.
    pub weekly_hours: f64,
    /// Gross hourly rate.
    pub gross_hourly_rate: f64,
    /// E-signature state, if a signature was requested.
    pub signature: Option<VersionSignature>,
    /// Live contract document, if uploaded.
    pub document: Option<DocumentRef>,
    /// Superseded documents, append-only.
    pub auxiliary_archives: Vec<DocumentRef>,
}

impl ContractVersion {
    /// Creates an open version with the given terms.
    #[must_use]
    pub fn open(start_date: DateTime<Utc>, weekly_hours: f64, gross_hourly_rate: f64) -> Self {
        Self {
            version_id: VersionId::new(),
            start_date,
            end_date: None,
            weekly_hours,
            gross_hourly_rate,
            signature: None,
            document: None,
            auxiliary_archives: Vec::new(),
        }
    }
}

/// Why a contract ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractEndReason {
    /// The employee resigned.
    EmployeeResignation,
    /// The employer terminated the contract.
    EmployerTermination,
    /// Both parties agreed to end it.
    MutualAgreement,
    /// A fixed-term contract expired.
    ContractExpiry,
    /// The employee retired.
    Retirement,
    /// Any other reason, detailed in `other_misc`.
    Other,
}

impl ContractEndReason {
    /// Returns a stable storage value for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployeeResignation => "employee_resignation",
            Self::EmployerTermination => "employer_termination",
            Self::MutualAgreement => "mutual_agreement",
            Self::ContractExpiry => "contract_expiry",
            Self::Retirement => "retirement",
            Self::Other => "other",
        }
    }
}

impl FromStr for ContractEndReason {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "employee_resignation" => Ok(Self::EmployeeResignation),
            "employer_termination" => Ok(Self::EmployerTermination),
            "mutual_agreement" => Ok(Self::MutualAgreement),
            "contract_expiry" => Ok(Self::ContractExpiry),
            "retirement" => Ok(Self::Retirement),
            "other" => Ok(Self::Other),
            _ => Err(AppError::Validation(format!(
                "unknown contract end reason '{value}'"
            ))),
        }
    }
}

/// One employee's continuous employment relationship with a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Contract identifier.
    pub contract_id: ContractId,
    /// Employing company.
    pub company_id: CompanyId,
    /// Employed user.
    pub user_id: UserId,
    /// Funding customer for customer-funded contracts.
    pub customer_id: Option<CustomerId>,
    /// Overall start, always equal to the first version's start.
    pub start_date: DateTime<Utc>,
    /// Overall end, set when the contract is ended.
    pub end_date: Option<DateTime<Utc>>,
    /// Why the contract ended.
    pub end_reason: Option<ContractEndReason>,
    /// When the ending was notified.
    pub end_notification_date: Option<DateTime<Utc>>,
    /// Free-text detail for `Other` end reasons.
    pub other_misc: Option<String>,
    /// Ordered versions; the array index orders them chronologically.
    pub versions: Vec<ContractVersion>,
}

impl Contract {
    /// Creates a contract from its first version.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        user_id: UserId,
        customer_id: Option<CustomerId>,
        first_version: ContractVersion,
    ) -> Self {
        Self {
            contract_id: ContractId::new(),
            company_id,
            user_id,
            customer_id,
            start_date: first_version.start_date,
            end_date: None,
            end_reason: None,
            end_notification_date: None,
            other_misc: None,
            versions: vec![first_version],
        }
    }

    /// Returns whether the contract has been ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.end_date.is_some()
    }

    /// Returns the last version, if any.
    #[must_use]
    pub fn last_version(&self) -> Option<&ContractVersion> {
        self.versions.last()
    }

    /// Returns the position of a version by identifier.
    #[must_use]
    pub fn version_index(&self, version_id: VersionId) -> Option<usize> {
        self.versions
            .iter()
            .position(|version| version.version_id == version_id)
    }

    /// Checks the version-chain invariants.
    ///
    /// Nothing in the data model enforces chronological order beyond
    /// convention, so every mutating operation re-asserts it before
    /// persisting. A breach means a corrupted document.
    pub fn assert_chronological(&self) -> AppResult<()> {
        let Some(first) = self.versions.first() else {
            return Err(AppError::Internal(format!(
                "contract '{}' has no versions",
                self.contract_id
            )));
        };

        if self.start_date != first.start_date {
            return Err(AppError::Internal(format!(
                "contract '{}' start date diverges from its first version",
                self.contract_id
            )));
        }

        for pair in self.versions.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if next.start_date <= current.start_date {
                return Err(AppError::Internal(format!(
                    "contract '{}' versions are out of chronological order",
                    self.contract_id
                )));
            }
            match current.end_date {
                None => {
                    return Err(AppError::Internal(format!(
                        "contract '{}' has an open version before its last",
                        self.contract_id
                    )));
                }
                Some(end) => {
                    if end < current.start_date || end != previous_day_end(next.start_date) {
                        return Err(AppError::Internal(format!(
                            "contract '{}' has a version end date outside its slot",
                            self.contract_id
                        )));
                    }
                }
            }
        }

        if let (Some(end), Some(last)) = (self.end_date, self.versions.last())
            && end < last.start_date
        {
            return Err(AppError::Internal(format!(
                "contract '{}' ends before its last version starts",
                self.contract_id
            )));
        }

        Ok(())
    }
}

/// Requested changes to an existing version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionUpdate {
    /// New start date, if it moves.
    pub start_date: Option<DateTime<Utc>>,
    /// New weekly hours, if they change.
    pub weekly_hours: Option<f64>,
    /// New gross hourly rate, if it changes.
    pub gross_hourly_rate: Option<f64>,
    /// Fresh signature handle, when the version is re-signed.
    pub signature: Option<VersionSignature>,
}

/// Set/unset/push document produced by [`format_version_edition`].
///
/// Pure data: the repository applies unset keys first, then set and push
/// keys, so a nested path is never set and unset in the same write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionEdition {
    /// New start date for the edited version.
    pub start_date: Option<DateTime<Utc>>,
    /// New weekly hours.
    pub weekly_hours: Option<f64>,
    /// New gross hourly rate.
    pub gross_hourly_rate: Option<f64>,
    /// Fresh handle-only signature to set.
    pub signature: Option<VersionSignature>,
    /// Remove the whole signature sub-object.
    pub unset_signature: bool,
    /// Remove previously-recorded signing flags.
    pub unset_signed_by: bool,
    /// Superseded document to push into the archives.
    pub archive_document: Option<DocumentRef>,
    /// Remove the live document field.
    pub unset_document: bool,
    /// Mirror the start-date change onto the contract itself (first version).
    pub contract_start_date: Option<DateTime<Utc>>,
    /// Re-derive the previous version's end date (later versions).
    pub previous_version_end_date: Option<DateTime<Utc>>,
}

/// Derives the persistence payload for a version edition.
///
/// Pure transformation driven by value changes only; company and permission
/// concerns are handled before this point.
#[must_use]
pub fn format_version_edition(
    old: &ContractVersion,
    update: &VersionUpdate,
    version_index: usize,
) -> VersionEdition {
    let mut edition = VersionEdition {
        weekly_hours: update.weekly_hours,
        gross_hourly_rate: update.gross_hourly_rate,
        ..VersionEdition::default()
    };

    match &update.signature {
        Some(signature) => {
            // A re-signed version restarts signature collection.
            edition.signature = Some(VersionSignature::handle(signature.eversign_id.clone()));
            edition.unset_signed_by = true;
        }
        None => edition.unset_signature = true,
    }

    if let Some(document) = &old.document {
        // Documents are superseded, never overwritten in place.
        edition.archive_document = Some(document.clone());
        edition.unset_document = true;
    }

    if let Some(new_start) = update.start_date
        && new_start != old.start_date
    {
        edition.start_date = Some(new_start);
        if version_index == 0 {
            edition.contract_start_date = Some(new_start);
        } else {
            edition.previous_version_end_date = Some(previous_day_end(new_start));
        }
    }

    edition
}

/// Inclusive query window over contract versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
}

/// Aggregated hours over a query window, consumed by payroll computation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContractInfo {
    /// Pro-rated contracted hours over the window.
    pub contract_hours: f64,
    /// Hours attributable to public holidays in the window.
    pub holidays_hours: f64,
    /// Worked-day-ratio units accumulated over the window.
    pub worked_days_ratio: f64,
}

/// Aggregates contracted hours for the versions overlapping a window.
///
/// Each overlapping version is clipped to the window, tallied through the
/// calendar utilities, and pro-rated against the month-level day counts.
#[must_use]
pub fn contract_info(
    versions: &[ContractVersion],
    query: DateRange,
    month_ratio: MonthDayRatio,
) -> ContractInfo {
    let mut info = ContractInfo::default();
    if month_ratio.business_days == 0 {
        return info;
    }

    for version in versions {
        let window_start = version.start_date.max(query.start);
        let window_end = version.end_date.unwrap_or(query.end).min(query.end);
        if window_end < window_start {
            continue;
        }

        let counts: DayCounts = day_counts_between(window_start, window_end);
        let ratio = f64::from(counts.business_days) / f64::from(month_ratio.business_days);

        info.worked_days_ratio += ratio;
        info.contract_hours += version.weekly_hours * ratio;
        info.holidays_hours += version.weekly_hours / 6.0 * f64::from(counts.holidays);
    }

    info
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn day(offset: i64) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0) {
            chrono::offset::LocalResult::Single(base) => base + Duration::days(offset),
            _ => panic!("invalid test date"),
        }
    }

    fn two_version_contract() -> Contract {
        let mut first = ContractVersion::open(day(0), 24.0, 12.5);
        first.end_date = Some(previous_day_end(day(30)));
        let second = ContractVersion::open(day(30), 30.0, 13.0);

        let mut contract = Contract::new(CompanyId::new(), UserId::new(), None, first);
        contract.versions.push(second);
        contract
    }

    #[test]
    fn chronological_contract_passes_the_invariant() {
        let contract = two_version_contract();
        assert!(contract.assert_chronological().is_ok());
    }

    #[test]
    fn open_version_before_last_is_rejected() {
        let mut contract = two_version_contract();
        contract.versions[0].end_date = None;
        assert!(contract.assert_chronological().is_err());
    }

    #[test]
    fn misaligned_sibling_end_date_is_rejected() {
        let mut contract = two_version_contract();
        contract.versions[0].end_date = Some(day(20));
        assert!(contract.assert_chronological().is_err());
    }

    #[test]
    fn diverging_contract_start_is_rejected() {
        let mut contract = two_version_contract();
        contract.start_date = day(-3);
        assert!(contract.assert_chronological().is_err());
    }

    #[test]
    fn contract_end_before_last_version_start_is_rejected() {
        let mut contract = two_version_contract();
        contract.end_date = Some(day(10));
        assert!(contract.assert_chronological().is_err());
    }

    #[test]
    fn edition_with_signature_resets_collection_state() {
        let old = ContractVersion::open(day(0), 24.0, 12.5);
        let update = VersionUpdate {
            signature: Some(VersionSignature::handle("doc-hash")),
            ..VersionUpdate::default()
        };

        let edition = format_version_edition(&old, &update, 1);
        assert_eq!(
            edition.signature,
            Some(VersionSignature::handle("doc-hash"))
        );
        assert!(edition.unset_signed_by);
        assert!(!edition.unset_signature);
    }

    #[test]
    fn edition_without_signature_unsets_the_sub_object() {
        let old = ContractVersion::open(day(0), 24.0, 12.5);
        let edition = format_version_edition(&old, &VersionUpdate::default(), 1);
        assert!(edition.unset_signature);
        assert!(edition.signature.is_none());
    }

    #[test]
    fn edition_archives_the_previous_document() {
        let mut old = ContractVersion::open(day(0), 24.0, 12.5);
        old.document = Some(DocumentRef {
            file_id: "file-1".to_owned(),
            link: "https://example.com/file-1".to_owned(),
        });

        let edition = format_version_edition(&old, &VersionUpdate::default(), 0);
        assert_eq!(
            edition.archive_document.as_ref().map(|doc| doc.file_id.as_str()),
            Some("file-1")
        );
        assert!(edition.unset_document);
    }

    #[test]
    fn first_version_start_move_mirrors_onto_contract() {
        let old = ContractVersion::open(day(0), 24.0, 12.5);
        let update = VersionUpdate {
            start_date: Some(day(2)),
            ..VersionUpdate::default()
        };

        let edition = format_version_edition(&old, &update, 0);
        assert_eq!(edition.contract_start_date, Some(day(2)));
        assert!(edition.previous_version_end_date.is_none());
    }

    #[test]
    fn later_version_start_move_rederives_the_chain() {
        let old = ContractVersion::open(day(30), 30.0, 13.0);
        let update = VersionUpdate {
            start_date: Some(day(40)),
            ..VersionUpdate::default()
        };

        let edition = format_version_edition(&old, &update, 1);
        assert_eq!(
            edition.previous_version_end_date,
            Some(previous_day_end(day(40)))
        );
        assert!(edition.contract_start_date.is_none());
    }

    #[test]
    fn unchanged_start_date_stays_untouched() {
        let old = ContractVersion::open(day(0), 24.0, 12.5);
        let update = VersionUpdate {
            start_date: Some(day(0)),
            ..VersionUpdate::default()
        };

        let edition = format_version_edition(&old, &update, 0);
        assert!(edition.start_date.is_none());
        assert!(edition.contract_start_date.is_none());
    }

    #[test]
    fn contract_info_pro_rates_a_clipped_window() {
        // Monday 2024-03-04 onwards; the version is open.
        let version = ContractVersion::open(day(0), 20.0, 12.0);
        // Monday through Thursday: four business days, no holidays.
        let query = DateRange {
            start: day(0),
            end: day(3),
        };
        let month_ratio = MonthDayRatio {
            business_days: 10,
            holidays: 0,
        };

        let info = contract_info(&[version], query, month_ratio);
        assert!((info.contract_hours - 8.0).abs() < 1e-9);
        assert!((info.worked_days_ratio - 0.4).abs() < 1e-9);
        assert!(info.holidays_hours.abs() < 1e-9);
    }

    #[test]
    fn contract_info_spans_multiple_versions() {
        let contract = two_version_contract();
        // Window covering the switch between versions.
        let query = DateRange {
            start: day(28),
            end: day(31),
        };
        let month_ratio = MonthDayRatio {
            business_days: 20,
            holidays: 0,
        };

        let info = contract_info(&contract.versions, query, month_ratio);
        // Both clipped windows contribute; ratios stay positive and bounded.
        assert!(info.worked_days_ratio > 0.0);
        assert!(info.contract_hours > 0.0);
    }

    #[test]
    fn contract_info_ignores_non_overlapping_versions() {
        let version = ContractVersion::open(day(100), 20.0, 12.0);
        let query = DateRange {
            start: day(0),
            end: day(3),
        };
        let month_ratio = MonthDayRatio {
            business_days: 10,
            holidays: 0,
        };

        let info = contract_info(&[version], query, month_ratio);
        assert_eq!(info, ContractInfo::default());
    }

    #[test]
    fn contract_info_counts_holiday_hours() {
        // 2024-05-01 is a public holiday (Labour Day, a Wednesday).
        let start = match Utc.with_ymd_and_hms(2024, 4, 29, 0, 0, 0) {
            chrono::offset::LocalResult::Single(moment) => moment,
            _ => panic!("invalid test date"),
        };
        let version = ContractVersion::open(start, 18.0, 12.0);
        let query = DateRange {
            start,
            end: start + Duration::days(4),
        };
        let month_ratio = MonthDayRatio {
            business_days: 22,
            holidays: 1,
        };

        let info = contract_info(&[version], query, month_ratio);
        assert!((info.holidays_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn end_reason_roundtrip_storage_value() {
        let reason = ContractEndReason::MutualAgreement;
        let restored = ContractEndReason::from_str(reason.as_str());
        assert_eq!(restored.unwrap_or(ContractEndReason::Other), reason);
    }
}
