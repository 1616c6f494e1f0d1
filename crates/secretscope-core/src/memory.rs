//! In-memory secret store
//!
//! Records live in a map keyed by id, so listings come back in creation
//! order. Suitable for tests and for the command-line front end, which loads
//! its declarations from a file on every run.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Result, SecretError};
use crate::model::{OrgId, Repo, RepoId, Secret, SecretId, SecretScope};
use crate::store::SecretStore;

/// Secret store backed by process memory
#[derive(Debug)]
pub struct MemorySecretStore {
    records: RwLock<BTreeMap<SecretId, Secret>>,
    next_id: AtomicU64,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored secrets across all scopes
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, scope: SecretScope, name: &str) -> Result<Secret> {
        self.records
            .read()
            .values()
            .find(|s| s.scope() == scope && s.name == name)
            .cloned()
            .ok_or_else(|| SecretError::not_found(scope, name))
    }

    fn list(&self, filter: impl Fn(&SecretScope) -> bool) -> Vec<Secret> {
        self.records
            .read()
            .values()
            .filter(|s| filter(&s.scope()))
            .cloned()
            .collect()
    }
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether another record already uses `name` within `scope`
fn name_taken(
    records: &BTreeMap<SecretId, Secret>,
    scope: SecretScope,
    name: &str,
    except: Option<SecretId>,
) -> bool {
    records
        .values()
        .any(|s| s.scope() == scope && s.name == name && s.id != except)
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn find_repo_secret(&self, repo: RepoId, name: &str) -> Result<Secret> {
        self.find(SecretScope::Repository(repo), name)
    }

    async fn find_org_secret(&self, org: OrgId, name: &str) -> Result<Secret> {
        self.find(SecretScope::Organization(org), name)
    }

    async fn find_global_secret(&self, name: &str) -> Result<Secret> {
        self.find(SecretScope::Global, name)
    }

    async fn list_repo_secrets(
        &self,
        repo: &Repo,
        include_inherited: bool,
    ) -> Result<Vec<Secret>> {
        let secrets = self.list(|scope| match scope {
            SecretScope::Repository(id) => *id == repo.id,
            SecretScope::Organization(id) => include_inherited && *id == repo.org_id,
            SecretScope::Global => include_inherited,
        });
        tracing::debug!(
            repo = %repo.full_name,
            include_inherited,
            count = secrets.len(),
            "Listed repository secrets"
        );
        Ok(secrets)
    }

    async fn list_org_secrets(&self, org: OrgId) -> Result<Vec<Secret>> {
        Ok(self.list(|scope| *scope == SecretScope::Organization(org)))
    }

    async fn list_global_secrets(&self) -> Result<Vec<Secret>> {
        Ok(self.list(|scope| *scope == SecretScope::Global))
    }

    async fn create(&self, mut secret: Secret) -> Result<Secret> {
        secret.validate()?;

        let mut records = self.records.write();
        if name_taken(&records, secret.scope(), &secret.name, None) {
            return Err(SecretError::already_exists(secret.scope(), secret.name));
        }

        let id = SecretId(self.next_id.fetch_add(1, Ordering::Relaxed));
        secret.id = Some(id);
        records.insert(id, secret.clone());

        tracing::debug!(id = id.0, name = %secret.name, scope = %secret.scope(), "Created secret");
        Ok(secret)
    }

    async fn update(&self, secret: Secret) -> Result<Secret> {
        let Some(id) = secret.id else {
            return Err(SecretError::not_found(secret.scope(), secret.name));
        };
        secret.validate()?;

        let mut records = self.records.write();
        let stored_scope = match records.get(&id) {
            Some(stored) => stored.scope(),
            None => return Err(SecretError::not_found(secret.scope(), secret.name)),
        };
        if stored_scope != secret.scope() {
            return Err(SecretError::ScopeMismatch {
                expected: stored_scope.to_string(),
                found: secret.scope().to_string(),
            });
        }
        if name_taken(&records, stored_scope, &secret.name, Some(id)) {
            return Err(SecretError::already_exists(stored_scope, secret.name));
        }

        records.insert(id, secret.clone());
        tracing::debug!(id = id.0, name = %secret.name, "Updated secret");
        Ok(secret)
    }

    async fn delete(&self, secret: &Secret) -> Result<()> {
        let removed = secret.id.and_then(|id| self.records.write().remove(&id));
        match removed {
            Some(_) => {
                tracing::debug!(name = %secret.name, scope = %secret.scope(), "Deleted secret");
                Ok(())
            }
            None => Err(SecretError::not_found(secret.scope(), &secret.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> Repo {
        Repo::new(1, 10, "acme/api")
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let store = MemorySecretStore::new();
        let a = store.create(Secret::global("a", "1")).await.unwrap();
        let b = store.create(Secret::global("b", "2")).await.unwrap();
        assert_eq!(a.id, Some(SecretId(1)));
        assert_eq!(b.id, Some(SecretId(2)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_name_unique_within_scope_only() {
        let store = MemorySecretStore::new();
        store
            .create(Secret::repository(RepoId(1), "token", "r1"))
            .await
            .unwrap();
        store
            .create(Secret::organization(OrgId(10), "token", "o1"))
            .await
            .unwrap();
        store.create(Secret::global("token", "g1")).await.unwrap();

        let err = store
            .create(Secret::global("token", "g2"))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid() {
        let store = MemorySecretStore::new();
        let err = store.create(Secret::global("bad-name", "x")).await.unwrap_err();
        assert!(matches!(err, SecretError::Invalid { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_scope() {
        let store = MemorySecretStore::new();
        store
            .create(Secret::organization(OrgId(10), "token", "o1"))
            .await
            .unwrap();

        let found = store.find_org_secret(OrgId(10), "token").await.unwrap();
        assert_eq!(found.value, "o1");

        let err = store.find_org_secret(OrgId(11), "token").await.unwrap_err();
        assert!(err.is_not_found());
        let err = store.find_global_secret("token").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_repo_secrets_inherited() {
        let store = MemorySecretStore::new();
        store.create(Secret::global("g", "1")).await.unwrap();
        store
            .create(Secret::organization(OrgId(10), "o", "1"))
            .await
            .unwrap();
        store
            .create(Secret::organization(OrgId(99), "other_org", "1"))
            .await
            .unwrap();
        store
            .create(Secret::repository(RepoId(1), "r", "1"))
            .await
            .unwrap();
        store
            .create(Secret::repository(RepoId(2), "other_repo", "1"))
            .await
            .unwrap();

        let own: Vec<_> = store
            .list_repo_secrets(&repo(), false)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(own, vec!["r"]);

        let all: Vec<_> = store
            .list_repo_secrets(&repo(), true)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(all, vec!["g", "o", "r"]);
    }

    #[tokio::test]
    async fn test_update() {
        let store = MemorySecretStore::new();
        let mut secret = store
            .create(Secret::repository(RepoId(1), "token", "old"))
            .await
            .unwrap();
        secret.value = "new".to_string();
        store.update(secret).await.unwrap();

        let found = store.find_repo_secret(RepoId(1), "token").await.unwrap();
        assert_eq!(found.value, "new");
    }

    #[tokio::test]
    async fn test_update_requires_existing_record() {
        let store = MemorySecretStore::new();
        let err = store
            .update(Secret::global("token", "x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_cannot_change_scope() {
        let store = MemorySecretStore::new();
        let stored = store
            .create(Secret::repository(RepoId(1), "token", "x"))
            .await
            .unwrap();

        let mut moved = Secret::global("token", "x");
        moved.id = stored.id;
        let err = store.update(moved).await.unwrap_err();
        assert!(matches!(err, SecretError::ScopeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_update_rename_collision() {
        let store = MemorySecretStore::new();
        store.create(Secret::global("a", "1")).await.unwrap();
        let mut b = store.create(Secret::global("b", "2")).await.unwrap();
        b.name = "a".to_string();
        let err = store.update(b).await.unwrap_err();
        assert!(matches!(err, SecretError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemorySecretStore::new();
        let secret = store.create(Secret::global("token", "x")).await.unwrap();
        store.delete(&secret).await.unwrap();
        assert!(store.is_empty());

        let err = store.delete(&secret).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
