//! Persistence abstraction for secret records
//!
//! The store owns the records; the rest of the crate only reads what it
//! returns. Backends guarantee name uniqueness within a single scope and
//! nothing across scopes.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{OrgId, Repo, RepoId, Secret};

/// Trait for secret persistence backends
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Find a repository secret by name
    async fn find_repo_secret(&self, repo: RepoId, name: &str) -> Result<Secret>;

    /// Find an organization secret by name
    async fn find_org_secret(&self, org: OrgId, name: &str) -> Result<Secret>;

    /// Find a global secret by name
    async fn find_global_secret(&self, name: &str) -> Result<Secret>;

    /// List secrets for a repository
    ///
    /// # Arguments
    /// * `repo` - The repository, carrying its owning organization
    /// * `include_inherited` - Also return the organization's and all global secrets
    async fn list_repo_secrets(&self, repo: &Repo, include_inherited: bool)
        -> Result<Vec<Secret>>;

    /// List secrets declared for an organization
    async fn list_org_secrets(&self, org: OrgId) -> Result<Vec<Secret>>;

    /// List all global secrets
    async fn list_global_secrets(&self) -> Result<Vec<Secret>>;

    /// Persist a new secret in the scope it is tagged with
    ///
    /// # Returns
    /// The stored record with its assigned id
    async fn create(&self, secret: Secret) -> Result<Secret>;

    /// Replace an existing secret, matched by id
    async fn update(&self, secret: Secret) -> Result<Secret>;

    /// Remove a secret, matched by id
    async fn delete(&self, secret: &Secret) -> Result<()>;
}
