use async_trait::async_trait;
use careline_application::SectorHistoryRepository;
use careline_core::{AppResult, CompanyId, UserId};
use careline_domain::SectorId;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// One temporal sector assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorHistoryEntry {
    /// Company scope.
    pub company_id: CompanyId,
    /// Assigned employee.
    pub user_id: UserId,
    /// Sector assigned to.
    pub sector_id: SectorId,
    /// Assignment start.
    pub start_date: DateTime<Utc>,
    /// Assignment end; open while absent.
    pub end_date: Option<DateTime<Utc>>,
}

/// In-memory sector-history store.
#[derive(Debug, Default)]
pub struct InMemorySectorHistoryRepository {
    entries: RwLock<Vec<SectorHistoryEntry>>,
    referents: RwLock<Vec<UserId>>,
}

impl InMemorySectorHistoryRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an employee as sector referent.
    pub async fn assign_referent(&self, user_id: UserId) {
        self.referents.write().await.push(user_id);
    }

    /// Returns a copy of the history entries.
    pub async fn entries(&self) -> Vec<SectorHistoryEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SectorHistoryRepository for InMemorySectorHistoryRepository {
    async fn create_history_on_contract_creation(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        sector_id: SectorId,
        start_date: DateTime<Utc>,
    ) -> AppResult<()> {
        self.entries.write().await.push(SectorHistoryEntry {
            company_id,
            user_id,
            sector_id,
            start_date,
            end_date: None,
        });

        Ok(())
    }

    async fn update_history_on_contract_update(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        new_start_date: DateTime<Utc>,
    ) -> AppResult<()> {
        for entry in self.entries.write().await.iter_mut() {
            if entry.company_id == company_id
                && entry.user_id == user_id
                && entry.end_date.is_none()
            {
                entry.start_date = new_start_date;
            }
        }

        Ok(())
    }

    async fn update_history_on_contract_deletion(
        &self,
        company_id: CompanyId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.entries.write().await.retain(|entry| {
            !(entry.company_id == company_id
                && entry.user_id == user_id
                && entry.end_date.is_none())
        });

        Ok(())
    }

    async fn update_end_date(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        end_date: DateTime<Utc>,
    ) -> AppResult<()> {
        for entry in self.entries.write().await.iter_mut() {
            if entry.company_id == company_id
                && entry.user_id == user_id
                && entry.end_date.is_none()
            {
                entry.end_date = Some(end_date);
            }
        }

        Ok(())
    }

    async fn unassign_referent_on_contract_end(&self, user_id: UserId) -> AppResult<()> {
        self.referents
            .write()
            .await
            .retain(|referent| *referent != user_id);

        Ok(())
    }
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

    #[tokio::test]
    async fn closing_twice_changes_nothing_further() {
        let repository = InMemorySectorHistoryRepository::new();
        let company_id = CompanyId::new();
        let user_id = UserId::new();
        assert!(
            repository
                .create_history_on_contract_creation(company_id, user_id, SectorId::new(), day(0))
                .await
                .is_ok()
        );

        assert!(repository.update_end_date(company_id, user_id, day(10)).await.is_ok());
        assert!(repository.update_end_date(company_id, user_id, day(20)).await.is_ok());

        let entries = repository.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].end_date, Some(day(10)));
    }
}
