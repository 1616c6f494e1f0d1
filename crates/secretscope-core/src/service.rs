//! Per-scope secret operations on top of a [`SecretStore`]
//!
//! Every operation forwards to the store. The only one with logic of its own
//! is [`SecretService::list_build_secrets`], which runs the candidate set
//! through precedence resolution.

use crate::error::Result;
use crate::model::{OrgId, Repo, Secret, SecretDraft, SecretScope};
use crate::resolver;
use crate::store::SecretStore;

/// Secret service for repository, organization and global scopes
#[derive(Debug)]
pub struct SecretService<S> {
    store: S,
}

impl<S: SecretStore> SecretService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get a reference to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Effective secrets for a build of `repo`.
    ///
    /// Fetches the repository's own, organization and global secrets and
    /// keeps one per name by precedence. A failed fetch is returned as is.
    pub async fn list_build_secrets(&self, repo: &Repo) -> Result<Vec<Secret>> {
        let candidates = self.store.list_repo_secrets(repo, true).await?;
        let candidate_count = candidates.len();
        let effective = resolver::resolve(candidates);
        tracing::debug!(
            repo = %repo.full_name,
            candidates = candidate_count,
            effective = effective.len(),
            "Resolved build secrets"
        );
        Ok(effective)
    }

    // Repository scope

    pub async fn find_repo_secret(&self, repo: &Repo, name: &str) -> Result<Secret> {
        self.store.find_repo_secret(repo.id, name).await
    }

    pub async fn list_repo_secrets(&self, repo: &Repo) -> Result<Vec<Secret>> {
        self.store.list_repo_secrets(repo, false).await
    }

    pub async fn create_repo_secret(&self, repo: &Repo, draft: SecretDraft) -> Result<Secret> {
        self.store
            .create(draft.into_secret(SecretScope::Repository(repo.id)))
            .await
    }

    pub async fn update_repo_secret(&self, _repo: &Repo, secret: Secret) -> Result<Secret> {
        self.store.update(secret).await
    }

    pub async fn delete_repo_secret(&self, repo: &Repo, name: &str) -> Result<()> {
        let secret = self.store.find_repo_secret(repo.id, name).await?;
        self.store.delete(&secret).await
    }

    // Organization scope

    pub async fn find_org_secret(&self, org: OrgId, name: &str) -> Result<Secret> {
        self.store.find_org_secret(org, name).await
    }

    pub async fn list_org_secrets(&self, org: OrgId) -> Result<Vec<Secret>> {
        self.store.list_org_secrets(org).await
    }

    pub async fn create_org_secret(&self, org: OrgId, draft: SecretDraft) -> Result<Secret> {
        self.store
            .create(draft.into_secret(SecretScope::Organization(org)))
            .await
    }

    pub async fn update_org_secret(&self, _org: OrgId, secret: Secret) -> Result<Secret> {
        self.store.update(secret).await
    }

    pub async fn delete_org_secret(&self, org: OrgId, name: &str) -> Result<()> {
        let secret = self.store.find_org_secret(org, name).await?;
        self.store.delete(&secret).await
    }

    // Global scope

    pub async fn find_global_secret(&self, name: &str) -> Result<Secret> {
        self.store.find_global_secret(name).await
    }

    pub async fn list_global_secrets(&self) -> Result<Vec<Secret>> {
        self.store.list_global_secrets().await
    }

    pub async fn create_global_secret(&self, draft: SecretDraft) -> Result<Secret> {
        self.store.create(draft.into_secret(SecretScope::Global)).await
    }

    pub async fn update_global_secret(&self, secret: Secret) -> Result<Secret> {
        self.store.update(secret).await
    }

    pub async fn delete_global_secret(&self, name: &str) -> Result<()> {
        let secret = self.store.find_global_secret(name).await?;
        self.store.delete(&secret).await
    }
}
