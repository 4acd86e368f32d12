use careline_application::{AuthorizationService, ContractService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub contract_service: ContractService,
}
