//! Version-level operations of the contract engine.

use careline_core::{AppError, AppResult, CompanyId};
use careline_domain::{
    Contract, ContractId, ContractVersion, VersionId, VersionUpdate, format_version_edition,
};
use chrono::{DateTime, Utc};

use crate::contract_ports::{EventCountFilter, VersionInput, VersionUpdateInput};

use super::{ContractService, best_effort};

impl ContractService {
    /// Appends a new open version to a contract.
    ///
    /// The previous last version is closed the day before the new start, so
    /// the chain stays gapless and overlap-free by construction.
    pub async fn create_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        input: VersionInput,
    ) -> AppResult<Contract> {
        let contract = self
            .contracts
            .find(company_id, contract_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("unknown contract '{contract_id}'")))?;
        contract.assert_chronological()?;

        if contract.is_ended() {
            return Err(AppError::Conflict(
                "cannot add a version to an ended contract".to_owned(),
            ));
        }
        if let Some(last) = contract.last_version()
            && input.start_date <= last.start_date
        {
            return Err(AppError::Conflict(
                "new version must start after the current one".to_owned(),
            ));
        }

        let mut version =
            ContractVersion::open(input.start_date, input.weekly_hours, input.gross_hourly_rate);
        if let Some(params) = &input.signature {
            version.signature = Some(self.request_signature(params).await?);
        }

        let updated = self
            .contracts
            .push_version(company_id, contract_id, version)
            .await?;
        updated.assert_chronological()?;

        Ok(updated)
    }

    /// Decides whether a version may be edited.
    ///
    /// Versions of ended contracts are frozen. Later versions of an active
    /// contract can always change; the first version is locked down once
    /// intervention history exists before its (possibly new) start date.
    pub async fn can_update_version(
        &self,
        contract: &Contract,
        new_start_date: DateTime<Utc>,
        version_index: usize,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        if contract.is_ended() {
            return Ok(false);
        }
        if version_index > 0 {
            return Ok(true);
        }

        let planned = self
            .planning
            .count_events_between(&EventCountFilter {
                company_id,
                user_id: contract.user_id,
                from: None,
                to: Some(new_start_date),
                interventions_only: true,
            })
            .await?;

        Ok(planned == 0)
    }

    /// Edits a version in place.
    pub async fn update_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        version_id: VersionId,
        input: VersionUpdateInput,
    ) -> AppResult<Contract> {
        let contract = self
            .contracts
            .find(company_id, contract_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("unknown contract '{contract_id}'")))?;
        contract.assert_chronological()?;

        let version_index = contract.version_index(version_id).ok_or_else(|| {
            AppError::NotFound(format!("unknown version '{version_id}'"))
        })?;
        let old = &contract.versions[version_index];
        let new_start_date = input.start_date.unwrap_or(old.start_date);

        if !self
            .can_update_version(&contract, new_start_date, version_index, company_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "version update is not permitted".to_owned(),
            ));
        }
        ensure_start_date_fits(&contract, version_index, new_start_date)?;

        if version_index == 0 && new_start_date != old.start_date {
            // Reflect the new inception date before touching the document.
            self.sector_histories
                .update_history_on_contract_update(company_id, contract.user_id, new_start_date)
                .await?;
        }

        let mut update = VersionUpdate {
            start_date: input.start_date,
            weekly_hours: input.weekly_hours,
            gross_hourly_rate: input.gross_hourly_rate,
            signature: None,
        };
        if let Some(params) = &input.signature {
            update.signature = Some(self.request_signature(params).await?);
        }

        let edition = format_version_edition(old, &update, version_index);
        let updated = self
            .contracts
            .apply_version_edition(company_id, contract_id, version_id, edition)
            .await?;
        updated.assert_chronological()?;

        Ok(updated)
    }

    /// Deletes the last version of a contract.
    ///
    /// Deleting the only version deletes the whole contract, which is only
    /// allowed while no intervention has been planned since its start.
    pub async fn delete_version(
        &self,
        company_id: CompanyId,
        contract_id: ContractId,
        version_id: VersionId,
    ) -> AppResult<()> {
        let contract = self
            .contracts
            .find(company_id, contract_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("unknown contract '{contract_id}'")))?;
        if contract.versions.is_empty() {
            return Ok(());
        }

        let version_index = contract.version_index(version_id).ok_or_else(|| {
            AppError::NotFound(format!("unknown version '{version_id}'"))
        })?;
        if version_index != contract.versions.len() - 1 {
            return Err(AppError::Forbidden(
                "only the last version of a contract can be deleted".to_owned(),
            ));
        }
        let removed = contract.versions[version_index].clone();

        if contract.versions.len() > 1 {
            let updated = self
                .contracts
                .remove_last_version(company_id, contract_id)
                .await?;
            updated.assert_chronological()?;
        } else {
            let planned = self
                .planning
                .count_events_between(&EventCountFilter {
                    company_id,
                    user_id: contract.user_id,
                    from: Some(contract.start_date),
                    to: Some(Utc::now()),
                    interventions_only: true,
                })
                .await?;
            if planned > 0 {
                return Err(AppError::Forbidden(
                    "contract has planned interventions and cannot be deleted".to_owned(),
                ));
            }

            self.contracts.delete(company_id, contract_id).await?;
            self.users
                .detach_contract(contract.user_id, contract_id)
                .await?;
            self.sector_histories
                .update_history_on_contract_deletion(company_id, contract.user_id)
                .await?;
        }

        if let Some(document) = removed.document {
            best_effort(
                "delete_version_document",
                self.files.delete_file(&document.file_id),
            )
            .await;
        }

        Ok(())
    }
}

/// Rejects start dates that would leave the chain unsortable.
fn ensure_start_date_fits(
    contract: &Contract,
    version_index: usize,
    new_start_date: DateTime<Utc>,
) -> AppResult<()> {
    if version_index > 0 && new_start_date <= contract.versions[version_index - 1].start_date {
        return Err(AppError::Conflict(
            "version cannot start before its predecessor".to_owned(),
        ));
    }
    if version_index + 1 < contract.versions.len()
        && new_start_date >= contract.versions[version_index + 1].start_date
    {
        return Err(AppError::Conflict(
            "version cannot start after its successor".to_owned(),
        ));
    }

    Ok(())
}
