//! Vela Types - Type model and unification engine
//!
//! This library provides the type layer of the Vela compiler:
//! - The immutable type representation, including constrained variables,
//!   choice types for overloads, and polymorphic types
//! - Robinson-style unification with a per-session binding store
//! - Generic integers that unify across widths of one signedness
//! - Deterministic debug dumps of the binding store

/// Vela type engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod config;
pub mod dump;
pub mod error;
pub mod span;
pub mod types;
pub mod unifier;


// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, UnifierConfig, DEFAULT_MAX_DEPTH};
pub use dump::{BindingEntry, BindingsDump, BINDINGS_DUMP_VERSION};
pub use error::{error_codes, Position, TypeError, TypeResult};
pub use span::Span;
pub use types::{Primitive, Sign, Type, TypeVar, VarId};
pub use unifier::Unifier;
