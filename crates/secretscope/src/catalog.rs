//! Declared secrets loaded into a service, plus the queries the CLI runs

use anyhow::{anyhow, Context};
use secretscope_core::{
    MemorySecretStore, OrgId, PipelineEvent, Repo, RepoId, Secret, SecretDraft, SecretScope,
    SecretService,
};

use crate::config::ScopeConfig;

/// Which single tier to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierSelector {
    Repository(u64),
    Organization(u64),
    Global,
}

/// Narrows an effective set to what one pipeline step may receive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFilter {
    /// Event that triggered the pipeline
    pub event: Option<PipelineEvent>,
    /// Image the step runs
    pub image: Option<String>,
}

impl BuildFilter {
    fn admits(&self, secret: &Secret) -> bool {
        self.event.map_or(true, |event| secret.matches_event(event))
            && self
                .image
                .as_deref()
                .map_or(true, |image| secret.matches_image(image))
    }
}

/// Declarations loaded into an in-memory secret service
pub struct Catalog {
    service: SecretService<MemorySecretStore>,
    repos: Vec<Repo>,
}

impl Catalog {
    /// Load every declared secret through the service of its scope
    pub async fn load(config: ScopeConfig) -> anyhow::Result<Self> {
        let repos = config.repos()?;
        let service = SecretService::new(MemorySecretStore::new());

        for decl in config.secrets {
            let scope = decl.scope()?;
            let name = decl.name.clone();
            let draft = SecretDraft::from(decl);
            let created = match scope {
                SecretScope::Repository(id) => {
                    let repo = repos.iter().find(|r| r.id == id).ok_or_else(|| {
                        anyhow!(
                            "Secret '{}' references repository {} which is not declared",
                            name,
                            id
                        )
                    })?;
                    service.create_repo_secret(repo, draft).await
                }
                SecretScope::Organization(org) => {
                    if !repos.iter().any(|r| r.org_id == org) {
                        tracing::warn!(
                            "Secret '{}' belongs to organization {} which owns no declared repository",
                            name,
                            org
                        );
                    }
                    service.create_org_secret(org, draft).await
                }
                SecretScope::Global => service.create_global_secret(draft).await,
            };
            created.with_context(|| format!("Failed to load secret '{}' ({})", name, scope))?;
        }

        tracing::debug!(
            repos = repos.len(),
            secrets = service.store().len(),
            "Catalog loaded"
        );
        Ok(Self { service, repos })
    }

    pub fn repos(&self) -> &[Repo] {
        &self.repos
    }

    /// Number of loaded secrets across all scopes
    pub fn secret_count(&self) -> usize {
        self.service.store().len()
    }

    fn repo(&self, id: u64) -> anyhow::Result<&Repo> {
        self.repos
            .iter()
            .find(|r| r.id == RepoId(id))
            .ok_or_else(|| anyhow!("Repository {} is not declared", id))
    }

    /// Effective secrets for a build of repository `id`.
    ///
    /// The `filter` is applied after precedence, so a secret shadowed by a
    /// restricted higher-tier secret never reappears.
    pub async fn effective(&self, id: u64, filter: &BuildFilter) -> anyhow::Result<Vec<Secret>> {
        let repo = self.repo(id)?;
        let mut secrets = self.service.list_build_secrets(repo).await?;
        secrets.retain(|s| filter.admits(s));
        Ok(secrets)
    }

    /// Secrets declared at exactly one tier
    pub async fn list(&self, tier: TierSelector) -> anyhow::Result<Vec<Secret>> {
        let secrets = match tier {
            TierSelector::Repository(id) => self.service.list_repo_secrets(self.repo(id)?).await?,
            TierSelector::Organization(org) => self.service.list_org_secrets(OrgId(org)).await?,
            TierSelector::Global => self.service.list_global_secrets().await?,
        };
        Ok(secrets)
    }
}

/// Pretty JSON for a listing, values removed unless `show_values`
pub fn render(secrets: &[Secret], show_values: bool) -> anyhow::Result<String> {
    let json = if show_values {
        serde_json::to_string_pretty(secrets)?
    } else {
        let redacted: Vec<Secret> = secrets.iter().map(Secret::redacted).collect();
        serde_json::to_string_pretty(&redacted)?
    };
    Ok(json)
}
