//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → interaction.rs (resolve addresses and ABIs)
//!     → InteractionConfig (immutable)
//!     → ProviderFactory::set_config, shared via Arc with new adapters
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → apply_updates swaps the factory's config
//!     → adapters created afterwards observe it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod interaction;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use interaction::{ContractConfig, InteractionConfig};
pub use loader::{load_config, load_interaction_config, ConfigError};
pub use schema::{DispatchConfig, NonceConfig, ObservabilityConfig, TransactionConfig};
