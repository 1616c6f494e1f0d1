//! Secret records and the scopes they are declared in

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SecretError;

/// Repository identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(pub u64);

/// Organization (owner) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(pub u64);

/// Store-assigned secret identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretId(pub u64);

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository together with the organization that owns it.
///
/// This is the build context secrets are resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: RepoId,
    pub org_id: OrgId,
    pub full_name: String,
}

impl Repo {
    pub fn new(id: u64, org_id: u64, full_name: impl Into<String>) -> Self {
        Self {
            id: RepoId(id),
            org_id: OrgId(org_id),
            full_name: full_name.into(),
        }
    }
}

/// Where a secret is declared, with the owner it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "owner", rename_all = "lowercase")]
pub enum SecretScope {
    Repository(RepoId),
    Organization(OrgId),
    Global,
}

impl SecretScope {
    /// Precedence tier of this scope
    pub fn tier(&self) -> ScopeTier {
        match self {
            SecretScope::Repository(_) => ScopeTier::Repository,
            SecretScope::Organization(_) => ScopeTier::Organization,
            SecretScope::Global => ScopeTier::Global,
        }
    }
}

impl fmt::Display for SecretScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretScope::Repository(id) => write!(f, "repository {}", id),
            SecretScope::Organization(id) => write!(f, "organization {}", id),
            SecretScope::Global => f.write_str("global"),
        }
    }
}

/// Precedence tiers, highest first.
///
/// The derived ordering follows precedence: `Repository < Organization < Global`
/// in `Ord` terms, so sorting ascending puts the winning tier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeTier {
    Repository,
    Organization,
    Global,
}

impl ScopeTier {
    /// Tiers in the order they are visited during resolution
    pub const PRECEDENCE: [ScopeTier; 3] = [
        ScopeTier::Repository,
        ScopeTier::Organization,
        ScopeTier::Global,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeTier::Repository => "repository",
            ScopeTier::Organization => "organization",
            ScopeTier::Global => "global",
        }
    }
}

impl fmt::Display for ScopeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline events a secret can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineEvent {
    Push,
    PullRequest,
    Tag,
    Deployment,
    Cron,
    Manual,
}

impl PipelineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineEvent::Push => "push",
            PipelineEvent::PullRequest => "pull_request",
            PipelineEvent::Tag => "tag",
            PipelineEvent::Deployment => "deployment",
            PipelineEvent::Cron => "cron",
            PipelineEvent::Manual => "manual",
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineEvent {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(PipelineEvent::Push),
            "pull_request" => Ok(PipelineEvent::PullRequest),
            "tag" => Ok(PipelineEvent::Tag),
            "deployment" => Ok(PipelineEvent::Deployment),
            "cron" => Ok(PipelineEvent::Cron),
            "manual" => Ok(PipelineEvent::Manual),
            other => Err(SecretError::invalid(
                "event",
                format!("unknown pipeline event '{}'", other),
            )),
        }
    }
}

/// Scope-less secret input.
///
/// The service turns a draft into a [`Secret`] tagged with the scope of the
/// tier it was submitted to.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDraft {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub events: Vec<PipelineEvent>,
}

impl SecretDraft {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Attach the draft to a scope
    pub fn into_secret(self, scope: SecretScope) -> Secret {
        Secret {
            id: None,
            scope,
            name: self.name,
            value: self.value,
            images: self.images,
            events: self.events,
        }
    }
}

impl fmt::Debug for SecretDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDraft")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("images", &self.images)
            .field("events", &self.events)
            .finish()
    }
}

/// A named credential declared in exactly one scope.
///
/// `name` is unique within its scope only; the same name may be declared at
/// several scopes at once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SecretId>,
    scope: SecretScope,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// Images allowed to receive the secret, empty means any
    #[serde(default)]
    pub images: Vec<String>,
    /// Events allowed to receive the secret, empty means any
    #[serde(default)]
    pub events: Vec<PipelineEvent>,
}

impl Secret {
    pub fn new(scope: SecretScope, name: impl Into<String>, value: impl Into<String>) -> Self {
        SecretDraft::new(name, value).into_secret(scope)
    }

    pub fn repository(repo: RepoId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(SecretScope::Repository(repo), name, value)
    }

    pub fn organization(org: OrgId, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(SecretScope::Organization(org), name, value)
    }

    pub fn global(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(SecretScope::Global, name, value)
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = PipelineEvent>) -> Self {
        self.events = events.into_iter().collect();
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn scope(&self) -> SecretScope {
        self.scope
    }

    pub fn tier(&self) -> ScopeTier {
        self.scope.tier()
    }

    /// Whether the secret may be exposed to a pipeline triggered by `event`
    pub fn matches_event(&self, event: PipelineEvent) -> bool {
        self.events.is_empty() || self.events.contains(&event)
    }

    /// Whether the secret may be exposed to a step running `image`.
    ///
    /// Tags are ignored when the allowed entry has none, so `alpine` admits
    /// `alpine:3.20`.
    pub fn matches_image(&self, image: &str) -> bool {
        if self.images.is_empty() {
            return true;
        }
        let untagged = strip_tag(image);
        self.images
            .iter()
            .any(|allowed| allowed == image || (strip_tag(allowed) == allowed && allowed == untagged))
    }

    /// Copy of the record without its value
    pub fn redacted(&self) -> Secret {
        Secret {
            value: String::new(),
            ..self.clone()
        }
    }

    /// Check name, value and image constraints
    pub fn validate(&self) -> Result<(), SecretError> {
        validate_name(&self.name)?;
        if self.value.is_empty() {
            return Err(SecretError::invalid("value", "must not be empty"));
        }
        for image in &self.images {
            if image.is_empty() || image.chars().any(char::is_whitespace) {
                return Err(SecretError::invalid(
                    "image",
                    format!("'{}' is not a valid image reference", image),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("images", &self.images)
            .field("events", &self.events)
            .finish()
    }
}

/// Names become environment variables in the build, so they follow the
/// `[A-Za-z_][A-Za-z0-9_]*` shape.
fn validate_name(name: &str) -> Result<(), SecretError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(SecretError::invalid("name", "must not be empty"));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(SecretError::invalid(
            "name",
            format!("'{}' must start with a letter or underscore", name),
        ));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SecretError::invalid(
            "name",
            format!("'{}' may only contain letters, digits and underscores", name),
        ));
    }
    Ok(())
}

/// Strip a `:tag` suffix, leaving registry ports (`host:5000/img`) alone
fn strip_tag(image: &str) -> &str {
    match image.rfind(':') {
        Some(idx) if !image[idx..].contains('/') => &image[..idx],
        _ => image,
    }
}
