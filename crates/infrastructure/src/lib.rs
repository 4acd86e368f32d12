//! Infrastructure adapters for Careline.
//!
//! The document store, the planning subsystem and sector histories ship as
//! in-memory adapters backing the default dev profile and the test suites.
//! The e-signature port has two adapters: a console provider fabricating
//! deterministic document hashes, and the Eversign HTTP client.

#![forbid(unsafe_code)]

/// Console file-storage adapter (logs deletions).
pub mod console_file_storage;
/// Console e-signature adapter (deterministic hashes).
pub mod console_signature_client;
/// Eversign HTTP e-signature adapter.
pub mod eversign_signature_client;
/// In-memory contract document store.
pub mod in_memory_contract_repository;
/// In-memory planning subsystem.
pub mod in_memory_planning_repository;
/// In-memory sector-history store.
pub mod in_memory_sector_history_repository;
/// In-memory user and company directory.
pub mod in_memory_user_repository;

pub use console_file_storage::ConsoleFileStorage;
pub use console_signature_client::ConsoleSignatureClient;
pub use eversign_signature_client::EversignSignatureClient;
pub use in_memory_contract_repository::InMemoryContractRepository;
pub use in_memory_planning_repository::{InMemoryPlanningRepository, PlannedEvent};
pub use in_memory_sector_history_repository::{
    InMemorySectorHistoryRepository, SectorHistoryEntry,
};
pub use in_memory_user_repository::InMemoryUserRepository;
