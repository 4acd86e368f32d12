use std::sync::Arc;

use careline_core::{CompanyId, NonEmptyString, UserId};
use careline_domain::{
    Company, CompanyMembership, RoleName, SectorId, SubscriptionFlags, UserRecord,
};
use careline_infrastructure::InMemoryUserRepository;
use chrono::{Duration, Utc};
use tracing::info;

/// Seeds a demo company and users so the API is drivable out of the box.
///
/// The bearer token of this API is the user id; the seeded admin id is
/// logged at startup for that purpose.
pub async fn seed(directory: &Arc<InMemoryUserRepository>) {
    let company_id = CompanyId::new();
    let Ok(name) = NonEmptyString::new("Demo Care Company") else {
        return;
    };
    directory
        .upsert_company(Company {
            company_id,
            name,
            holding_id: None,
            subscriptions: SubscriptionFlags { erp: true },
        })
        .await;

    let admin_id = UserId::new();
    let mut admin = UserRecord::new(admin_id, "Demo Admin");
    admin.roles.client = Some(RoleName::ClientAdmin);
    admin.company_history.push(CompanyMembership {
        company_id,
        start_date: Utc::now() - Duration::days(1),
        end_date: None,
    });
    directory.upsert_user(admin).await;

    let auxiliary_id = UserId::new();
    let mut auxiliary = UserRecord::new(auxiliary_id, "Demo Auxiliary");
    auxiliary.roles.client = Some(RoleName::Auxiliary);
    auxiliary.sector_id = Some(SectorId::new());
    auxiliary.company_history.push(CompanyMembership {
        company_id,
        start_date: Utc::now() - Duration::days(1),
        end_date: None,
    });
    directory.upsert_user(auxiliary).await;

    info!(%company_id, %admin_id, %auxiliary_id, "dev seed ready; use the admin id as bearer token");
}
