//! Alexandria Application Library
//!
//! Wires the catalog service, access policy, and storage into transport
//! modules mounted by the HTTP layer.

pub mod modules;

pub use modules::ModuleDeps;
