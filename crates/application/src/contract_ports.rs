//! Ports and input shapes for the contract lifecycle engine.
//!
//! Every collaborator the engine talks to — the document store, the planning
//! subsystem, sector histories, the e-signature provider, file storage — is
//! a trait taking and returning plain data. Adapters live in the
//! infrastructure crate; tests use hand-written fakes.

use async_trait::async_trait;
use careline_core::{AppResult, CompanyId, UserId};
use careline_domain::{
    Contract, ContractEndReason, ContractId, ContractVersion, CustomerId, RoleName, SectorId,
    UserRecord, VersionEdition, VersionId,
};
use chrono::{DateTime, Utc};

/// Input for creating a contract with its first version.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateContractInput {
    /// Employee to contract.
    pub user_id: UserId,
    /// Funding customer for customer-funded contracts.
    pub customer_id: Option<CustomerId>,
    /// First version start.
    pub start_date: DateTime<Utc>,
    /// Contracted weekly hours.
    pub weekly_hours: f64,
    /// Gross hourly rate.
    pub gross_hourly_rate: f64,
    /// E-signature request parameters, when a signature is wanted upfront.
    pub signature: Option<SignatureRequestParams>,
}

/// Input for appending a version to a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionInput {
    /// New version start; the previous version ends the day before.
    pub start_date: DateTime<Utc>,
    /// Contracted weekly hours.
    pub weekly_hours: f64,
    /// Gross hourly rate.
    pub gross_hourly_rate: f64,
    /// E-signature request parameters, if any.
    pub signature: Option<SignatureRequestParams>,
}

/// Input for editing an existing version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionUpdateInput {
    /// New start date, if it moves.
    pub start_date: Option<DateTime<Utc>>,
    /// New weekly hours, if they change.
    pub weekly_hours: Option<f64>,
    /// New gross hourly rate, if it changes.
    pub gross_hourly_rate: Option<f64>,
    /// E-signature request parameters, when the version is re-signed.
    pub signature: Option<SignatureRequestParams>,
}

/// Input for ending a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct EndContractInput {
    /// When the contract ends (end-of-day semantics).
    pub end_date: DateTime<Utc>,
    /// Why it ends.
    pub end_reason: ContractEndReason,
    /// When the ending was notified.
    pub end_notification_date: DateTime<Utc>,
    /// Free-text detail for `Other` reasons.
    pub other_misc: Option<String>,
}

/// Contract-level end update applied by the store.
///
/// The store mirrors `end_date` onto the last version in the same document
/// write.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractEndUpdate {
    /// Contract end date.
    pub end_date: DateTime<Utc>,
    /// End reason.
    pub end_reason: ContractEndReason,
    /// Notification date.
    pub end_notification_date: DateTime<Utc>,
    /// Free-text detail.
    pub other_misc: Option<String>,
}

/// One signer on an e-signature request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSigner {
    /// Signer display name.
    pub name: String,
    /// Signer email.
    pub email: String,
}

/// Parameters for an e-signature request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRequestParams {
    /// Document title shown to signers.
    pub title: String,
    /// Provider-side template to instantiate.
    pub template_id: String,
    /// Parties asked to sign.
    pub signers: Vec<SignatureSigner>,
}

/// Payload returned by the signature provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRequestResult {
    /// Provider payload, either a document handle or a typed error.
    pub data: SignatureData,
}

/// Provider payload variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureData {
    /// The request was accepted; the hash identifies the document.
    Document {
        /// Provider-side document hash.
        document_hash: String,
    },
    /// The provider rejected the request.
    Error {
        /// Provider error type.
        error_type: String,
    },
}

/// Port for the e-signature provider.
#[async_trait]
pub trait SignatureClient: Send + Sync {
    /// Creates a signature request with the provider.
    async fn generate_signature_request(
        &self,
        params: &SignatureRequestParams,
    ) -> AppResult<SignatureRequestResult>;
}

/// Port for stored-file management. Deletions are best-effort.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Deletes a stored file.
    async fn delete_file(&self, file_id: &str) -> AppResult<()>;
}

/// Port for employee-record side effects of contract changes.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user record by id.
    async fn find(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Pushes a contract onto the user's contract list.
    async fn attach_contract(&self, user_id: UserId, contract_id: ContractId) -> AppResult<()>;

    /// Pulls a contract from the user's contract list.
    async fn detach_contract(&self, user_id: UserId, contract_id: ContractId) -> AppResult<()>;

    /// Sets or clears the user's inactivity date.
    async fn set_inactivity_date(
        &self,
        user_id: UserId,
        inactivity_date: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Assigns a client-interface role to the user.
    async fn assign_client_role(&self, user_id: UserId, role: RoleName) -> AppResult<()>;

    /// Lists mandatory fields still missing for contract creation.
    async fn missing_contract_info(&self, user_id: UserId) -> AppResult<Vec<String>>;
}

/// Port for the contract document store.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    /// Finds a contract within a company scope.
    async fn find(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
    ) -> AppResult<Option<Contract>>;

    /// Lists an employee's contracts with a company.
    async fn list_for_user(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> AppResult<Vec<Contract>>;

    /// Lists every contract of a company.
    async fn list_for_company(&self, company_id: CompanyId) -> AppResult<Vec<Contract>>;

    /// Persists a new contract.
    async fn insert(&self, contract: Contract) -> AppResult<Contract>;

    /// Applies a contract end, mirroring the end date onto the last version.
    async fn apply_end(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        end: ContractEndUpdate,
    ) -> AppResult<Contract>;

    /// Appends a version, closing the previous one the day before its start.
    async fn push_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        version: ContractVersion,
    ) -> AppResult<Contract>;

    /// Applies a version edition: unset keys first, then set and push keys.
    async fn apply_version_edition(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        version_id: VersionId,
        edition: VersionEdition,
    ) -> AppResult<Contract>;

    /// Pops the last version and reopens the one before it.
    async fn remove_last_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
    ) -> AppResult<Contract>;

    /// Deletes a contract document entirely.
    async fn delete(&self, company_id: CompanyId, contract_id: ContractId) -> AppResult<()>;
}

/// Filter for counting planned events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCountFilter {
    /// Company scope.
    pub company_id: CompanyId,
    /// Employee the events are assigned to.
    pub user_id: UserId,
    /// Inclusive lower bound, if any.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound, if any.
    pub to: Option<DateTime<Utc>>,
    /// Restrict the count to intervention events.
    pub interventions_only: bool,
}

/// Port for the scheduling subsystem. Mutating calls are idempotent
/// (unassign-if-assigned semantics).
#[async_trait]
pub trait PlanningRepository: Send + Sync {
    /// Counts events matching a filter.
    async fn count_events_between(&self, filter: &EventCountFilter) -> AppResult<u64>;

    /// Unassigns the employee from interventions after the contract end.
    async fn unassign_interventions_on_contract_end(&self, contract: &Contract)
    -> AppResult<()>;

    /// Removes recurring-event repetitions tied to the contract.
    async fn remove_repetitions_on_contract_end(&self, contract: &Contract) -> AppResult<()>;

    /// Removes non-intervention events after the contract end.
    async fn remove_non_intervention_events_on_contract_end(
        &self,
        contract: &Contract,
    ) -> AppResult<()>;

    /// Reconciles absences extending past the contract end.
    async fn update_absences_on_contract_end(
        &self,
        user_id: UserId,
        end_date: DateTime<Utc>,
    ) -> AppResult<()>;
}

/// Port for employee sector-assignment history.
#[async_trait]
pub trait SectorHistoryRepository: Send + Sync {
    /// Opens a history entry when a contract is created.
    async fn create_history_on_contract_creation(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        sector_id: SectorId,
        start_date: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Moves the open entry when the first version's start date changes.
    async fn update_history_on_contract_update(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        new_start_date: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Retires the entry opened for a deleted contract.
    async fn update_history_on_contract_deletion(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> AppResult<()>;

    /// Closes the open entry at the contract end date.
    async fn update_end_date(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        end_date: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Removes the employee's sector-referent assignment.
    async fn unassign_referent_on_contract_end(&self, user_id: UserId) -> AppResult<()>;
}
