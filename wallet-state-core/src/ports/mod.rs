//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The store and the
//! persistence adapter depend only on these traits, not on concrete
//! implementations.

mod storage;

pub use storage::Storage;
