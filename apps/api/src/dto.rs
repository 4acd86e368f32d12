use careline_application::{
    CreateContractInput, EndContractInput, SignatureRequestParams, SignatureSigner, VersionInput,
    VersionUpdateInput,
};
use careline_core::UserId;
use careline_domain::{Contract, ContractEndReason, ContractVersion, CustomerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerDto {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequestDto {
    pub title: String,
    pub template_id: String,
    pub signers: Vec<SignerDto>,
}

impl From<SignatureRequestDto> for SignatureRequestParams {
    fn from(value: SignatureRequestDto) -> Self {
        Self {
            title: value.title,
            template_id: value.template_id,
            signers: value
                .signers
                .into_iter()
                .map(|signer| SignatureSigner {
                    name: signer.name,
                    email: signer.email,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractRequest {
    pub user: Uuid,
    pub customer: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub weekly_hours: f64,
    pub gross_hourly_rate: f64,
    pub signature: Option<SignatureRequestDto>,
}

impl From<CreateContractRequest> for CreateContractInput {
    fn from(value: CreateContractRequest) -> Self {
        Self {
            user_id: UserId::from_uuid(value.user),
            customer_id: value.customer.map(CustomerId::from_uuid),
            start_date: value.start_date,
            weekly_hours: value.weekly_hours,
            gross_hourly_rate: value.gross_hourly_rate,
            signature: value.signature.map(SignatureRequestParams::from),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndContractRequest {
    pub end_date: DateTime<Utc>,
    pub end_reason: ContractEndReason,
    pub end_notification_date: DateTime<Utc>,
    pub other_misc: Option<String>,
}

impl From<EndContractRequest> for EndContractInput {
    fn from(value: EndContractRequest) -> Self {
        Self {
            end_date: value.end_date,
            end_reason: value.end_reason,
            end_notification_date: value.end_notification_date,
            other_misc: value.other_misc,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub start_date: DateTime<Utc>,
    pub weekly_hours: f64,
    pub gross_hourly_rate: f64,
    pub signature: Option<SignatureRequestDto>,
}

impl From<CreateVersionRequest> for VersionInput {
    fn from(value: CreateVersionRequest) -> Self {
        Self {
            start_date: value.start_date,
            weekly_hours: value.weekly_hours,
            gross_hourly_rate: value.gross_hourly_rate,
            signature: value.signature.map(SignatureRequestParams::from),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVersionRequest {
    pub start_date: Option<DateTime<Utc>>,
    pub weekly_hours: Option<f64>,
    pub gross_hourly_rate: Option<f64>,
    pub signature: Option<SignatureRequestDto>,
}

impl From<UpdateVersionRequest> for VersionUpdateInput {
    fn from(value: UpdateVersionRequest) -> Self {
        Self {
            start_date: value.start_date,
            weekly_hours: value.weekly_hours,
            gross_hourly_rate: value.gross_hourly_rate,
            signature: value.signature.map(SignatureRequestParams::from),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListContractsQuery {
    pub user: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub weekly_hours: f64,
    pub gross_hourly_rate: f64,
    pub eversign_id: Option<String>,
    pub document_link: Option<String>,
}

impl From<&ContractVersion> for VersionResponse {
    fn from(version: &ContractVersion) -> Self {
        Self {
            id: version.version_id.as_uuid(),
            start_date: version.start_date,
            end_date: version.end_date,
            weekly_hours: version.weekly_hours,
            gross_hourly_rate: version.gross_hourly_rate,
            eversign_id: version
                .signature
                .as_ref()
                .map(|signature| signature.eversign_id.clone()),
            document_link: version.document.as_ref().map(|document| document.link.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResponse {
    pub id: Uuid,
    pub company: Uuid,
    pub user: Uuid,
    pub customer: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub end_reason: Option<ContractEndReason>,
    pub versions: Vec<VersionResponse>,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.contract_id.as_uuid(),
            company: contract.company_id.as_uuid(),
            user: contract.user_id.as_uuid(),
            customer: contract.customer_id.map(|customer| customer.as_uuid()),
            start_date: contract.start_date,
            end_date: contract.end_date,
            end_reason: contract.end_reason,
            versions: contract.versions.iter().map(VersionResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_request_accepts_snake_case_reasons() {
        let payload = serde_json::json!({
            "endDate": "2024-06-30T00:00:00Z",
            "endReason": "employee_resignation",
            "endNotificationDate": "2024-05-31T00:00:00Z",
        });

        let request: Result<EndContractRequest, _> = serde_json::from_value(payload);
        assert_eq!(
            request.map(|request| request.end_reason).ok(),
            Some(ContractEndReason::EmployeeResignation)
        );
    }

    #[test]
    fn contract_response_carries_the_signature_handle() {
        let mut version = careline_domain::ContractVersion::open(Utc::now(), 24.0, 12.5);
        version.signature = Some(careline_domain::VersionSignature::handle("doc-hash"));
        let contract = Contract::new(
            careline_core::CompanyId::new(),
            UserId::new(),
            None,
            version,
        );

        let response = ContractResponse::from(contract);
        assert_eq!(
            response.versions[0].eversign_id.as_deref(),
            Some("doc-hash")
        );
    }
}
