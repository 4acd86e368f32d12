//! Careline API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use careline_application::{AuthorizationService, ContractService, SignatureClient};
use careline_core::AppError;
use careline_domain::RightsTable;
use careline_infrastructure::{
    ConsoleFileStorage, ConsoleSignatureClient, EversignSignatureClient,
    InMemoryContractRepository, InMemoryPlanningRepository, InMemorySectorHistoryRepository,
    InMemoryUserRepository,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api_config::{ApiConfig, SignatureProviderConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let directory = Arc::new(InMemoryUserRepository::new());
    let contracts = Arc::new(InMemoryContractRepository::new());
    let planning = Arc::new(InMemoryPlanningRepository::new());
    let sector_histories = Arc::new(InMemorySectorHistoryRepository::new());
    let signature_client: Arc<dyn SignatureClient> = match &config.signature_provider {
        SignatureProviderConfig::Console => Arc::new(ConsoleSignatureClient::new()),
        SignatureProviderConfig::Eversign(eversign) => Arc::new(EversignSignatureClient::new(
            eversign.base_url.clone(),
            eversign.access_key.clone(),
        )),
    };

    if config.dev_seed {
        dev_seed::seed(&directory).await;
    }

    let authorization_service =
        AuthorizationService::new(Arc::new(RightsTable::standard()), directory.clone());
    let contract_service = ContractService::new(
        contracts,
        directory.clone(),
        planning,
        sector_histories,
        signature_client,
        Arc::new(ConsoleFileStorage::new()),
    );

    let app_state = AppState {
        authorization_service,
        contract_service,
    };

    let protected_routes = Router::new()
        .route(
            "/contracts",
            get(handlers::contracts::list_contracts_handler)
                .post(handlers::contracts::create_contract_handler),
        )
        .route(
            "/contracts/{contract_id}",
            put(handlers::contracts::end_contract_handler),
        )
        .route(
            "/contracts/{contract_id}/versions",
            post(handlers::contracts::create_version_handler),
        )
        .route(
            "/contracts/{contract_id}/versions/{version_id}",
            put(handlers::contracts::update_version_handler)
                .delete(handlers::contracts::delete_version_handler),
        )
        .route_layer(from_fn_with_state(app_state.clone(), middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "careline-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
