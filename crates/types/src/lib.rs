//! Shared types for the Arbor node registry.
//!
//! Node identifiers, caller identities, labels, stored records and the audit
//! events emitted by the registry live here so that adapters can depend on
//! them without pulling in the registry itself.

pub mod event;
pub mod id;
pub mod label;
pub mod record;

pub use event::*;
pub use id::*;
pub use label::*;
pub use record::*;
