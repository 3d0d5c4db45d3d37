//! depot: a permit-bounded stockroom shared by a supplier and a customer.
//!
//! The store serializes access through a counting permit gate, gates pickups
//! on working hours, and supports an explicit close-then-cancel shutdown
//! driven by the orchestrator.

pub mod clock;
pub mod customer;
pub mod orchestrator;
pub mod permit;
pub mod store;
pub mod supplier;

pub use clock::{Clock, FixedClock, SystemClock, WorkingHours};
pub use customer::{Customer, CustomerReport};
pub use orchestrator::{OrchestratorConfig, OrchestratorError, RunSummary};
pub use permit::{Permit, PermitGate};
pub use store::{AddOutcome, Store, StoreError, StoreSnapshot, TakeOutcome};
pub use supplier::{Supplier, SupplierReport};

/// Depot version from Cargo.toml
pub const DEPOT_VERSION: &str = env!("CARGO_PKG_VERSION");
