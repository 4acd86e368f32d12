use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use careline_core::{Credentials, UserId};
use careline_domain::{ContractId, VersionId};
use uuid::Uuid;

use crate::dto::{
    ContractResponse, CreateContractRequest, CreateVersionRequest, EndContractRequest,
    ListContractsQuery, UpdateVersionRequest,
};
use crate::error::ApiResult;
use crate::middleware::{require_scope, requester_company};
use crate::state::AppState;

pub async fn list_contracts_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Query(query): Query<ListContractsQuery>,
) -> ApiResult<Json<Vec<ContractResponse>>> {
    require_scope(&credentials, "contracts:read")?;
    let company_id = requester_company(&credentials)?;

    let contracts = state
        .contract_service
        .list_contracts(company_id, query.user.map(UserId::from_uuid))
        .await?
        .into_iter()
        .map(ContractResponse::from)
        .collect();

    Ok(Json(contracts))
}

pub async fn create_contract_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Json(payload): Json<CreateContractRequest>,
) -> ApiResult<(StatusCode, Json<ContractResponse>)> {
    require_scope(&credentials, "contracts:edit")?;
    let company_id = requester_company(&credentials)?;

    let contract = state
        .contract_service
        .create_contract(company_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ContractResponse::from(contract))))
}

pub async fn end_contract_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<EndContractRequest>,
) -> ApiResult<Json<ContractResponse>> {
    require_scope(&credentials, "contracts:edit")?;
    let company_id = requester_company(&credentials)?;

    let contract = state
        .contract_service
        .end_contract(company_id, ContractId::from_uuid(contract_id), payload.into())
        .await?;

    Ok(Json(ContractResponse::from(contract)))
}

pub async fn create_version_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<CreateVersionRequest>,
) -> ApiResult<(StatusCode, Json<ContractResponse>)> {
    require_scope(&credentials, "contracts:edit")?;
    let company_id = requester_company(&credentials)?;

    let contract = state
        .contract_service
        .create_version(company_id, ContractId::from_uuid(contract_id), payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ContractResponse::from(contract))))
}

pub async fn update_version_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path((contract_id, version_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateVersionRequest>,
) -> ApiResult<Json<ContractResponse>> {
    require_scope(&credentials, "contracts:edit")?;
    let company_id = requester_company(&credentials)?;

    let contract = state
        .contract_service
        .update_version(
            company_id,
            ContractId::from_uuid(contract_id),
            VersionId::from_uuid(version_id),
            payload.into(),
        )
        .await?;

    Ok(Json(ContractResponse::from(contract)))
}

pub async fn delete_version_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    Path((contract_id, version_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_scope(&credentials, "contracts:edit")?;
    let company_id = requester_company(&credentials)?;

    state
        .contract_service
        .delete_version(
            company_id,
            ContractId::from_uuid(contract_id),
            VersionId::from_uuid(version_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
