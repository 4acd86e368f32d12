//! Application services and ports for Careline.

#![forbid(unsafe_code)]

/// Authorization engine resolving tokens into credentials.
pub mod authorization_service;
/// Collaborator ports consumed by the contract engine.
pub mod contract_ports;
/// Contract lifecycle engine.
pub mod contract_service;

pub use authorization_service::{
    AuthValidation, AuthorizationService, DecodedToken, IdentityRepository,
};
pub use contract_ports::{
    ContractEndUpdate, ContractRepository, CreateContractInput, EndContractInput,
    EventCountFilter, FileStorage, PlanningRepository, SectorHistoryRepository,
    SignatureClient, SignatureData, SignatureRequestParams, SignatureRequestResult,
    SignatureSigner, UserRepository, VersionInput, VersionUpdateInput,
};
pub use contract_service::ContractService;
