//! Secretscope command-line library
//!
//! Loads secret declarations from TOML into an in-memory store and answers
//! listing and effective-set queries. Used by the `secretscope` binary and
//! by tests.

mod catalog;
mod config;

pub use catalog::{render, BuildFilter, Catalog, TierSelector};
pub use config::{config_path, RepoDecl, ScopeConfig, SecretDecl, DEFAULT_CONFIG_PATH};
