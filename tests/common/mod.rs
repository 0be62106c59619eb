//! Shared test utilities for advodir integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Stores are in-memory (or in-memory SQLite) so every
//! harness is hermetic.

pub mod assertions;
pub mod builders;
pub mod fakes;
pub mod fixtures;
pub mod test_server;

pub use assertions::*;
pub use builders::*;
pub use fakes::*;
pub use fixtures::*;
pub use test_server::*;
