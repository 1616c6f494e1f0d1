//! Secret declarations loaded from TOML
//!
//! The declarations file is located in this order (first found wins):
//! 1. `--config` argument
//! 2. Environment variable (SECRETSCOPE_CONFIG)
//! 3. `secretscope.toml` in the working directory
//!
//! ```toml
//! [[repos]]
//! id = 1
//! org_id = 10
//! full_name = "acme/api"
//!
//! [[secrets]]            # repository scope
//! repo = 1
//! name = "token"
//! value = "r1"
//! events = ["push", "tag"]
//!
//! [[secrets]]            # organization scope
//! org = 10
//! name = "token"
//! value = "o1"
//!
//! [[secrets]]            # global scope
//! name = "token"
//! value = "g1"
//! ```

use std::env;
use std::fmt;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use secretscope_core::{OrgId, PipelineEvent, Repo, RepoId, SecretDraft, SecretScope};

/// Environment variable prefix
const ENV_PREFIX: &str = "SECRETSCOPE";

/// Declarations file used when nothing else is given
pub const DEFAULT_CONFIG_PATH: &str = "secretscope.toml";

/// Top-level declarations file
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeConfig {
    /// Repositories builds can be resolved for
    pub repos: Vec<RepoDecl>,

    /// Secrets at any scope
    pub secrets: Vec<SecretDecl>,
}

/// A repository and its owning organization
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoDecl {
    pub id: u64,
    pub org_id: u64,
    pub full_name: String,
}

/// One secret declaration.
///
/// Setting `repo` declares it for that repository, `org` for that
/// organization, neither makes it global. Unknown keys are rejected so a
/// misspelled owner key cannot turn a scoped secret into a global one.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretDecl {
    pub repo: Option<u64>,
    pub org: Option<u64>,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub events: Vec<PipelineEvent>,
}

impl SecretDecl {
    /// Scope this declaration belongs to
    pub fn scope(&self) -> anyhow::Result<SecretScope> {
        match (self.repo, self.org) {
            (Some(repo), Some(org)) => bail!(
                "Secret '{}' sets both repo = {} and org = {}; pick one",
                self.name,
                repo,
                org
            ),
            (Some(repo), None) => Ok(SecretScope::Repository(RepoId(repo))),
            (None, Some(org)) => Ok(SecretScope::Organization(OrgId(org))),
            (None, None) => Ok(SecretScope::Global),
        }
    }
}

impl From<SecretDecl> for SecretDraft {
    fn from(decl: SecretDecl) -> Self {
        SecretDraft {
            name: decl.name,
            value: decl.value,
            images: decl.images,
            events: decl.events,
        }
    }
}

impl fmt::Debug for SecretDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDecl")
            .field("repo", &self.repo)
            .field("org", &self.org)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("images", &self.images)
            .field("events", &self.events)
            .finish()
    }
}

impl From<&RepoDecl> for Repo {
    fn from(decl: &RepoDecl) -> Self {
        Repo::new(decl.id, decl.org_id, decl.full_name.clone())
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

/// Pick the declarations file: argument > env > default
pub fn config_path(arg: Option<String>) -> String {
    choose_config_path(arg, get_env("CONFIG"))
}

fn choose_config_path(arg: Option<String>, from_env: Option<String>) -> String {
    arg.or(from_env).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

impl ScopeConfig {
    /// Load declarations from a TOML file.
    ///
    /// A missing file is not an error and yields no declarations.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("No declarations at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!(
            repos = config.repos.len(),
            secrets = config.secrets.len(),
            "Loaded declarations from {}",
            path.display()
        );
        Ok(config)
    }

    /// Parse declarations from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Declared repositories as build contexts
    pub fn repos(&self) -> anyhow::Result<Vec<Repo>> {
        let mut repos: Vec<Repo> = Vec::with_capacity(self.repos.len());
        for decl in &self.repos {
            if repos.iter().any(|r| r.id.0 == decl.id) {
                bail!("Repository id {} is declared more than once", decl.id);
            }
            repos.push(decl.into());
        }
        Ok(repos)
    }
}
