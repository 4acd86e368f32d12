//! Contract lifecycle engine.
//!
//! Operations validate eagerly, persist the primary write, then issue
//! cascading side effects sequentially. Cascades are best-effort: a step
//! failure is logged and never rolls back the committed contract change.

mod versions;


use std::sync::Arc;

use careline_core::{AppError, AppResult, CompanyId, UserId};
use careline_domain::time::end_of_following_month;
use careline_domain::{Contract, ContractId, ContractVersion, RoleName, VersionSignature};
use chrono::{DateTime, Utc};

use crate::contract_ports::{
    ContractEndUpdate, ContractRepository, CreateContractInput, EndContractInput, FileStorage,
    PlanningRepository, SectorHistoryRepository, SignatureClient, SignatureData,
    SignatureRequestParams, UserRepository,
};

/// Application service driving the contract state machine.
#[derive(Clone)]
pub struct ContractService {
    contracts: Arc<dyn ContractRepository>,
    users: Arc<dyn UserRepository>,
    planning: Arc<dyn PlanningRepository>,
    sector_histories: Arc<dyn SectorHistoryRepository>,
    signatures: Arc<dyn SignatureClient>,
    files: Arc<dyn FileStorage>,
}

impl ContractService {
    /// Creates a new contract service from its collaborator ports.
    #[must_use]
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        users: Arc<dyn UserRepository>,
        planning: Arc<dyn PlanningRepository>,
        sector_histories: Arc<dyn SectorHistoryRepository>,
        signatures: Arc<dyn SignatureClient>,
        files: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            contracts,
            users,
            planning,
            sector_histories,
            signatures,
            files,
        }
    }

    /// Lists contracts within a company scope, optionally for one employee.
    pub async fn list_contracts(
        &self,
        company_id: CompanyId,
        user_id: Option<UserId>,
    ) -> AppResult<Vec<Contract>> {
        match user_id {
            Some(user_id) => self.contracts.list_for_user(company_id, user_id).await,
            None => self.contracts.list_for_company(company_id).await,
        }
    }

    /// Creates a contract with its first version.
    ///
    /// Rejected when the employee already has an open contract with the
    /// company, when the new start does not come strictly after the latest
    /// ended one, or when the employee record is missing mandatory fields.
    pub async fn create_contract(
        &self,
        company_id: CompanyId,
        input: CreateContractInput,
    ) -> AppResult<Contract> {
        let user = self
            .users
            .find(input.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("unknown user '{}'", input.user_id)))?;

        let existing = self
            .contracts
            .list_for_user(company_id, input.user_id)
            .await?;
        if existing.iter().any(|contract| contract.end_date.is_none()) {
            return Err(AppError::Conflict(
                "employee already has an open contract with this company".to_owned(),
            ));
        }
        if let Some(latest_end) = existing.iter().filter_map(|contract| contract.end_date).max()
            && input.start_date <= latest_end
        {
            return Err(AppError::Conflict(
                "new contract must start after the previous one ended".to_owned(),
            ));
        }

        let missing = self.users.missing_contract_info(input.user_id).await?;
        if !missing.is_empty() {
            return Err(AppError::Conflict(format!(
                "employee record is missing mandatory information: {}",
                missing.join(", ")
            )));
        }

        let mut version =
            ContractVersion::open(input.start_date, input.weekly_hours, input.gross_hourly_rate);
        if let Some(params) = &input.signature {
            version.signature = Some(self.request_signature(params).await?);
        }

        let contract = Contract::new(company_id, input.user_id, input.customer_id, version);
        contract.assert_chronological()?;
        let contract = self.contracts.insert(contract).await?;

        self.users
            .attach_contract(user.user_id, contract.contract_id)
            .await?;
        self.users.set_inactivity_date(user.user_id, None).await?;
        if user.roles.vendor.is_none() && user.roles.client != Some(RoleName::Auxiliary) {
            self.users
                .assign_client_role(user.user_id, RoleName::Auxiliary)
                .await?;
        }
        if let Some(sector_id) = user.sector_id {
            self.sector_histories
                .create_history_on_contract_creation(
                    company_id,
                    user.user_id,
                    sector_id,
                    contract.start_date,
                )
                .await?;
        }

        Ok(contract)
    }

    /// Ends a contract and runs the planning/sector/inactivity cascade.
    ///
    /// The end write commits first; cascade steps run afterwards in a fixed
    /// order and never undo it.
    pub async fn end_contract(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        input: EndContractInput,
    ) -> AppResult<Contract> {
        let contract = self
            .contracts
            .find(company_id, contract_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("unknown contract '{contract_id}'")))?;
        contract.assert_chronological()?;

        let last = contract.last_version().ok_or_else(|| {
            AppError::Internal(format!("contract '{contract_id}' has no versions"))
        })?;
        if input.end_date < last.start_date {
            return Err(AppError::Conflict(
                "end date is before the last version's start date".to_owned(),
            ));
        }

        let ended = self
            .contracts
            .apply_end(
                company_id,
                contract_id,
                ContractEndUpdate {
                    end_date: input.end_date,
                    end_reason: input.end_reason,
                    end_notification_date: input.end_notification_date,
                    other_misc: input.other_misc,
                },
            )
            .await?;

        best_effort(
            "unassign_interventions",
            self.planning.unassign_interventions_on_contract_end(&ended),
        )
        .await;
        best_effort(
            "remove_repetitions",
            self.planning.remove_repetitions_on_contract_end(&ended),
        )
        .await;
        best_effort(
            "remove_non_intervention_events",
            self.planning
                .remove_non_intervention_events_on_contract_end(&ended),
        )
        .await;
        best_effort(
            "update_absences",
            self.planning
                .update_absences_on_contract_end(ended.user_id, input.end_date),
        )
        .await;
        best_effort(
            "unassign_sector_referent",
            self.sector_histories
                .unassign_referent_on_contract_end(ended.user_id),
        )
        .await;
        best_effort(
            "update_inactivity",
            self.refresh_inactivity_date(company_id, ended.user_id, input.end_date),
        )
        .await;
        best_effort(
            "close_sector_history",
            self.sector_histories
                .update_end_date(company_id, ended.user_id, input.end_date),
        )
        .await;

        Ok(ended)
    }

    /// Sets the inactivity date when the employee's last open contract ended.
    ///
    /// The date is the end of the month following the contract end; it is
    /// only set while no open contract remains.
    async fn refresh_inactivity_date(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        end_date: DateTime<Utc>,
    ) -> AppResult<()> {
        let contracts = self.contracts.list_for_user(company_id, user_id).await?;
        let open = contracts
            .iter()
            .filter(|contract| contract.end_date.is_none())
            .count();
        if open == 0 {
            self.users
                .set_inactivity_date(user_id, Some(end_of_following_month(end_date)))
                .await?;
        }

        Ok(())
    }

    /// Turns a provider signature response into a handle-only signature.
    async fn request_signature(
        &self,
        params: &SignatureRequestParams,
    ) -> AppResult<VersionSignature> {
        let result = self.signatures.generate_signature_request(params).await?;
        match result.data {
            SignatureData::Document { document_hash } => {
                Ok(VersionSignature::handle(document_hash))
            }
            SignatureData::Error { error_type } => Err(AppError::Dependency(format!(
                "signature provider rejected the request: {error_type}"
            ))),
        }
    }
}

/// Awaits a cascade step, logging failures instead of propagating them.
///
/// The primary write is already durable when a step runs, and every step
/// no-ops safely when re-run; nothing here rolls back.
async fn best_effort<F>(step: &'static str, outcome: F)
where
    F: Future<Output = AppResult<()>>,
{
    if let Err(error) = outcome.await {
        tracing::warn!(step, %error, "best-effort cascade step failed");
    }
}
