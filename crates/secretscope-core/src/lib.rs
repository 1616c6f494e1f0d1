//! Scoped secrets for build pipelines
//!
//! Secrets are declared at one of three scopes, and the same name may be
//! declared at several of them:
//!
//! - **Repository**: visible to builds of one repository
//! - **Organization**: visible to every repository of an owner
//! - **Global**: visible to every build
//!
//! When a build asks for its secrets, the candidates from all three scopes
//! are reduced to one secret per name with precedence
//! `Repository > Organization > Global`.
//!
//! # Example
//!
//! ```rust,ignore
//! use secretscope_core::{MemorySecretStore, Repo, SecretDraft, SecretService};
//!
//! let service = SecretService::new(MemorySecretStore::new());
//! let repo = Repo::new(1, 10, "acme/api");
//!
//! service.create_global_secret(SecretDraft::new("token", "g1")).await?;
//! service.create_repo_secret(&repo, SecretDraft::new("token", "r1")).await?;
//!
//! let secrets = service.list_build_secrets(&repo).await?;
//! assert_eq!(secrets[0].value, "r1");
//! ```

mod error;
mod memory;
mod model;
pub mod resolver;
mod service;
mod store;

pub use error::{Result, SecretError};
pub use memory::MemorySecretStore;
pub use model::{
    OrgId, PipelineEvent, Repo, RepoId, ScopeTier, Secret, SecretDraft, SecretId, SecretScope,
};
pub use resolver::{resolve, resolve_refs};
pub use service::SecretService;
pub use store::SecretStore;
