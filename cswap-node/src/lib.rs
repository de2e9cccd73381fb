//! Library surface for the `cswap-node` binary.
//!
//! Config parsing and the scenario runner live here so the integration tests
//! and doctests can drive them without going through the CLI.

pub mod config;
pub mod scenario;
