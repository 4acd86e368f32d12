use async_trait::async_trait;
use careline_application::{EventCountFilter, PlanningRepository};
use careline_core::{AppResult, CompanyId, UserId};
use careline_domain::Contract;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// One scheduled event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEvent {
    /// Company scope.
    pub company_id: CompanyId,
    /// Assigned employee.
    pub user_id: UserId,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Whether the event is a customer intervention.
    pub intervention: bool,
    /// Whether the employee is still assigned.
    pub assigned: bool,
}

/// In-memory planning subsystem.
#[derive(Debug, Default)]
pub struct InMemoryPlanningRepository {
    events: RwLock<Vec<PlannedEvent>>,
    repetitions: RwLock<Vec<UserId>>,
    absence_ends: RwLock<Vec<(UserId, DateTime<Utc>)>>,
}

impl InMemoryPlanningRepository {
    /// Creates an empty planning store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an event.
    pub async fn add_event(&self, event: PlannedEvent) {
        self.events.write().await.push(event);
    }

    /// Registers a recurring-event repetition for an employee.
    pub async fn add_repetition(&self, user_id: UserId) {
        self.repetitions.write().await.push(user_id);
    }

    /// Registers an absence ending at the given date.
    pub async fn add_absence(&self, user_id: UserId, end_date: DateTime<Utc>) {
        self.absence_ends.write().await.push((user_id, end_date));
    }

    /// Returns a copy of the scheduled events.
    pub async fn events(&self) -> Vec<PlannedEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl PlanningRepository for InMemoryPlanningRepository {
    async fn count_events_between(&self, filter: &EventCountFilter) -> AppResult<u64> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| {
                event.company_id == filter.company_id
                    && event.user_id == filter.user_id
                    && filter.from.is_none_or(|from| event.date >= from)
                    && filter.to.is_none_or(|to| event.date < to)
                    && (!filter.interventions_only || event.intervention)
            })
            .count() as u64)
    }

    async fn unassign_interventions_on_contract_end(
        &self,
        contract: &Contract,
    ) -> AppResult<()> {
        let end_date = contract.end_date.unwrap_or_else(Utc::now);
        for event in self.events.write().await.iter_mut() {
            if event.user_id == contract.user_id && event.intervention && event.date > end_date {
                event.assigned = false;
            }
        }

        Ok(())
    }

    async fn remove_repetitions_on_contract_end(&self, contract: &Contract) -> AppResult<()> {
        self.repetitions
            .write()
            .await
            .retain(|user_id| *user_id != contract.user_id);

        Ok(())
    }

    async fn remove_non_intervention_events_on_contract_end(
        &self,
        contract: &Contract,
    ) -> AppResult<()> {
        let end_date = contract.end_date.unwrap_or_else(Utc::now);
        self.events.write().await.retain(|event| {
            !(event.user_id == contract.user_id && !event.intervention && event.date > end_date)
        });

        Ok(())
    }

    async fn update_absences_on_contract_end(
        &self,
        user_id: UserId,
        end_date: DateTime<Utc>,
    ) -> AppResult<()> {
        for (absent_user, absence_end) in self.absence_ends.write().await.iter_mut() {
            if *absent_user == user_id && *absence_end > end_date {
                *absence_end = end_date;
            }
        }

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
    async fn count_applies_bounds_and_kind() {
        let repository = InMemoryPlanningRepository::new();
        let company_id = CompanyId::new();
        let user_id = UserId::new();

        for (offset, intervention) in [(-5, true), (2, true), (2, false)] {
            repository
                .add_event(PlannedEvent {
                    company_id,
                    user_id,
                    date: day(offset),
                    intervention,
                    assigned: true,
                })
                .await;
        }

        let counted = repository
            .count_events_between(&EventCountFilter {
                company_id,
                user_id,
                from: None,
                to: Some(day(0)),
                interventions_only: true,
            })
            .await;
        assert_eq!(counted.ok(), Some(1));
    }
}
