//! Version model and its bump/reset state machine
//!
//! A version is a [`chain::VersionChain`] of [`part::Part`]s rendered in
//! declaration order, e.g. `major.minor.patch-pre.prenum`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  PartSpec   │────▶│    Part     │────▶│VersionChain │
//! │ (key, kind) │     │  (value)    │     │(bump/reset) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  PartKind   │
//! │(number, id) │
//! └─────────────┘
//! ```
//!
//! Bumping a part advances its value and resets every part after it. A reset
//! clears a part unless a set ancestor `requires` it, in which case the part
//! takes its start value.
//!
//! # Modules
//!
//! - [`chain`]: Ordered chain of parts, validation and batch operations
//! - [`part`]: Part configuration and runtime value
//! - [`kind`]: Number and identifier value rules
//! - [`error`]: Configuration and lookup errors

pub mod chain;
pub mod error;
pub mod kind;
pub mod part;

pub use chain::VersionChain;
pub use error::{ConfigError, LookupError};
pub use kind::{IdentifierRules, NumberRules, PartKind, PartValue};
pub use part::{Part, PartSpec};
