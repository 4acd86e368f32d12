use std::collections::HashMap;

use async_trait::async_trait;
use careline_application::{IdentityRepository, UserRepository};
use careline_core::{AppResult, CompanyId, HoldingId, UserId};
use careline_domain::{Company, ContractId, RoleName, UserRecord};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// In-memory user and company directory.
///
/// Backs both the authorization engine's identity lookups and the contract
/// engine's employee-record side effects.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
    companies: RwLock<HashMap<CompanyId, Company>>,
    holdings: RwLock<HashMap<HoldingId, Vec<CompanyId>>>,
    missing_info: RwLock<HashMap<UserId, Vec<String>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user record.
    pub async fn upsert_user(&self, user: UserRecord) {
        self.users.write().await.insert(user.user_id, user);
    }

    /// Inserts or replaces a company.
    pub async fn upsert_company(&self, company: Company) {
        self.companies
            .write()
            .await
            .insert(company.company_id, company);
    }

    /// Declares the companies a holding owns.
    pub async fn set_holding_companies(
        &self,
        holding_id: HoldingId,
        companies: Vec<CompanyId>,
    ) {
        self.holdings.write().await.insert(holding_id, companies);
    }

    /// Declares mandatory fields still missing on an employee record.
    pub async fn set_missing_contract_info(&self, user_id: UserId, missing: Vec<String>) {
        self.missing_info.write().await.insert(user_id, missing);
    }
}

#[async_trait]
impl IdentityRepository for InMemoryUserRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_company(&self, company_id: CompanyId) -> AppResult<Option<Company>> {
        Ok(self.companies.read().await.get(&company_id).cloned())
    }

    async fn companies_for_holding(&self, holding_id: HoldingId) -> AppResult<Vec<CompanyId>> {
        Ok(self
            .holdings
            .read()
            .await
            .get(&holding_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn attach_contract(&self, user_id: UserId, contract_id: ContractId) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id)
            && !user.contract_ids.contains(&contract_id)
        {
            user.contract_ids.push(contract_id);
        }

        Ok(())
    }

    async fn detach_contract(&self, user_id: UserId, contract_id: ContractId) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.contract_ids.retain(|stored| *stored != contract_id);
        }

        Ok(())
    }

    async fn set_inactivity_date(
        &self,
        user_id: UserId,
        inactivity_date: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.inactivity_date = inactivity_date;
        }

        Ok(())
    }

    async fn assign_client_role(&self, user_id: UserId, role: RoleName) -> AppResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&user_id) {
            user.roles.client = Some(role);
        }

        Ok(())
    }

    async fn missing_contract_info(&self, user_id: UserId) -> AppResult<Vec<String>> {
        Ok(self
            .missing_info
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attach_and_detach_contract_roundtrip() {
        let repository = InMemoryUserRepository::new();
        let user_id = UserId::new();
        repository
            .upsert_user(UserRecord::new(user_id, "Jane Doe"))
            .await;

        let contract_id = ContractId::new();
        assert!(repository.attach_contract(user_id, contract_id).await.is_ok());
        assert!(repository.attach_contract(user_id, contract_id).await.is_ok());

        let user = repository.find(user_id).await.ok().flatten();
        assert_eq!(user.map(|user| user.contract_ids.len()), Some(1));

        assert!(repository.detach_contract(user_id, contract_id).await.is_ok());
        let user = repository.find(user_id).await.ok().flatten();
        assert_eq!(user.map(|user| user.contract_ids.len()), Some(0));
    }

    #[tokio::test]
    async fn missing_info_defaults_to_empty() {
        let repository = InMemoryUserRepository::new();
        let missing = repository.missing_contract_info(UserId::new()).await;
        assert_eq!(missing.map(|fields| fields.len()).ok(), Some(0));
    }
}
