use std::collections::HashMap;

use async_trait::async_trait;
use careline_application::{ContractEndUpdate, ContractRepository};
use careline_core::{AppError, AppResult, CompanyId, UserId};
use careline_domain::time::previous_day_end;
use careline_domain::{Contract, ContractId, ContractVersion, VersionEdition, VersionId};
use tokio::sync::RwLock;

/// In-memory contract document store.
#[derive(Debug, Default)]
pub struct InMemoryContractRepository {
    contracts: RwLock<HashMap<ContractId, Contract>>,
}

impl InMemoryContractRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(contract_id: ContractId) -> AppError {
    AppError::NotFound(format!("unknown contract '{contract_id}'"))
}

#[async_trait]
impl ContractRepository for InMemoryContractRepository {
    async fn find(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
    ) -> AppResult<Option<Contract>> {
        Ok(self
            .contracts
            .read()
            .await
            .get(&contract_id)
            .filter(|contract| contract.company_id == company_id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> AppResult<Vec<Contract>> {
        let contracts = self.contracts.read().await;
        let mut listed: Vec<Contract> = contracts
            .values()
            .filter(|contract| {
                contract.company_id == company_id && contract.user_id == user_id
            })
            .cloned()
            .collect();
        listed.sort_by_key(|contract| contract.start_date);
        Ok(listed)
    }

    async fn list_for_company(&self, company_id: CompanyId) -> AppResult<Vec<Contract>> {
        let contracts = self.contracts.read().await;
        let mut listed: Vec<Contract> = contracts
            .values()
            .filter(|contract| contract.company_id == company_id)
            .cloned()
            .collect();
        listed.sort_by_key(|contract| contract.start_date);
        Ok(listed)
    }

    async fn insert(&self, contract: Contract) -> AppResult<Contract> {
        let mut contracts = self.contracts.write().await;
        if contracts.contains_key(&contract.contract_id) {
            return Err(AppError::Conflict(format!(
                "contract '{}' already exists",
                contract.contract_id
            )));
        }

        contracts.insert(contract.contract_id, contract.clone());
        Ok(contract)
    }

    async fn apply_end(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        end: ContractEndUpdate,
    ) -> AppResult<Contract> {
        let mut contracts = self.contracts.write().await;
        let contract = contracts
            .get_mut(&contract_id)
            .filter(|contract| contract.company_id == company_id)
            .ok_or_else(|| not_found(contract_id))?;

        contract.end_date = Some(end.end_date);
        contract.end_reason = Some(end.end_reason);
        contract.end_notification_date = Some(end.end_notification_date);
        contract.other_misc = end.other_misc;
        if let Some(last) = contract.versions.last_mut() {
            last.end_date = Some(end.end_date);
        }

        Ok(contract.clone())
    }

    async fn push_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        version: ContractVersion,
    ) -> AppResult<Contract> {
        let mut contracts = self.contracts.write().await;
        let contract = contracts
            .get_mut(&contract_id)
            .filter(|contract| contract.company_id == company_id)
            .ok_or_else(|| not_found(contract_id))?;

        if let Some(last) = contract.versions.last_mut() {
            last.end_date = Some(previous_day_end(version.start_date));
        }
        contract.versions.push(version);

        Ok(contract.clone())
    }

    async fn apply_version_edition(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        version_id: VersionId,
        edition: VersionEdition,
    ) -> AppResult<Contract> {
        let mut contracts = self.contracts.write().await;
        let contract = contracts
            .get_mut(&contract_id)
            .filter(|contract| contract.company_id == company_id)
            .ok_or_else(|| not_found(contract_id))?;
        let index = contract
            .version_index(version_id)
            .ok_or_else(|| AppError::NotFound(format!("unknown version '{version_id}'")))?;

        // Unset keys are applied before set and push keys, mirroring the
        // two-write discipline a document store would need.
        {
            let version = &mut contract.versions[index];
            if edition.unset_signature {
                version.signature = None;
            }
            if edition.unset_signed_by
                && let Some(signature) = version.signature.as_mut()
            {
                signature.signed_by = None;
            }
            if edition.unset_document {
                version.document = None;
            }
        }
        {
            let version = &mut contract.versions[index];
            if let Some(start_date) = edition.start_date {
                version.start_date = start_date;
            }
            if let Some(weekly_hours) = edition.weekly_hours {
                version.weekly_hours = weekly_hours;
            }
            if let Some(gross_hourly_rate) = edition.gross_hourly_rate {
                version.gross_hourly_rate = gross_hourly_rate;
            }
            if let Some(signature) = edition.signature {
                version.signature = Some(signature);
            }
            if let Some(document) = edition.archive_document {
                version.auxiliary_archives.push(document);
            }
        }
        if let Some(start_date) = edition.contract_start_date {
            contract.start_date = start_date;
        }
        if index > 0
            && let Some(end_date) = edition.previous_version_end_date
        {
            contract.versions[index - 1].end_date = Some(end_date);
        }

        Ok(contract.clone())
    }

    async fn remove_last_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
    ) -> AppResult<Contract> {
        let mut contracts = self.contracts.write().await;
        let contract = contracts
            .get_mut(&contract_id)
            .filter(|contract| contract.company_id == company_id)
            .ok_or_else(|| not_found(contract_id))?;

        contract.versions.pop();
        if let Some(last) = contract.versions.last_mut() {
            last.end_date = None;
        }

        Ok(contract.clone())
    }

    async fn delete(&self, company_id: CompanyId, contract_id: ContractId) -> AppResult<()> {
        let mut contracts = self.contracts.write().await;
        let matches = contracts
            .get(&contract_id)
            .is_some_and(|contract| contract.company_id == company_id);
        if matches {
            contracts.remove(&contract_id);
        }

        Ok(())
    }
}
