//! Infrastructure layer: stores, registry lookup, configuration, rate-limit
//! policy, and the verification gate that composes them.

pub mod config;
pub mod rate_limit;
pub mod registry;
pub mod store;
pub mod verification_gate;

pub use config::{ConfigError, EngineConfig, Environment};
pub use rate_limit::{InvalidRate, Period, Rate, RateDecision, RateLimitPolicy, RateScope};
pub use registry::{MockRegistry, RegistryError, RegistryLookup};
pub use store::{
    AccountStore, CatalogSnapshot, CatalogStore, InMemoryAccountStore, InMemoryCatalogStore,
    StoreError,
};
pub use verification_gate::{GateError, VerificationGate, VerificationOutcome};
