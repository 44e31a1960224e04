//! Profile store — layered YAML profiles behind a TTL cache.
//!
//! Sources are read in a fixed order: every base/template directory in the
//! configured order, then the custom directory, then the flat fallback
//! directory. A profile whose id was already loaded is replaced wholesale
//! by the later one. Within a directory, files are read in name order.
//!
//! Only `*.yaml` / `*.yml` files directly inside a source directory are
//! considered; names starting with `_` are ignored. The file stem is the
//! profile id. Missing directories contribute nothing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use codeward_core::io::{self, RetryPolicy};
use codeward_core::{
    Clock, InvalidProfilePolicy, NotFoundError, Profile, ProfileDocument, ProfileSummary, Result,
    ValidationError,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;

/// Where profiles are read from.
#[derive(Debug, Clone, Default)]
pub struct ProfileSources {
    pub base: Vec<PathBuf>,
    pub custom: Option<PathBuf>,
    pub fallback: Option<PathBuf>,
}

impl ProfileSources {
    fn ordered(&self) -> Vec<(SourceKind, &Path)> {
        let mut dirs: Vec<(SourceKind, &Path)> = self
            .base
            .iter()
            .map(|d| (SourceKind::Base, d.as_path()))
            .collect();
        if let Some(custom) = &self.custom {
            dirs.push((SourceKind::Custom, custom));
        }
        if let Some(fallback) = &self.fallback {
            dirs.push((SourceKind::Fallback, fallback));
        }
        dirs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Base,
    Custom,
    Fallback,
}

/// A profile document that failed validation and was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedProfile {
    pub id: String,
    pub source: SourceKind,
    pub reason: String,
}

/// What the last load produced.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub loaded: BTreeMap<String, SourceKind>,
    pub rejected: Vec<RejectedProfile>,
    pub loaded_at: DateTime<Utc>,
}

/// One complete, immutable profile table.
struct ProfileTable {
    profiles: BTreeMap<String, Arc<Profile>>,
    origins: BTreeMap<String, SourceKind>,
    rejected: Vec<RejectedProfile>,
    loaded_at: DateTime<Utc>,
}

/// Parse and canonicalize one profile document.
pub fn parse_profile(id: &str, yaml: &str) -> std::result::Result<Profile, ValidationError> {
    let document: ProfileDocument =
        serde_yaml::from_str(yaml).map_err(|e| ValidationError::Profile {
            id: id.to_string(),
            reason: e.to_string(),
        })?;
    if !document.extra.is_empty() {
        let sections: Vec<&str> = document.extra.keys().map(String::as_str).collect();
        debug!(profile = %id, sections = ?sections, "Ignoring unmodelled profile sections");
    }
    document.into_profile(id)
}

fn profile_id(file_name: &str) -> Option<&str> {
    if file_name.starts_with('_') {
        return None;
    }
    file_name
        .strip_suffix(".yaml")
        .or_else(|| file_name.strip_suffix(".yml"))
        .filter(|stem| !stem.is_empty())
}

/// Loads, layers and caches profiles.
pub struct ProfileStore {
    sources: ProfileSources,
    policy: InvalidProfilePolicy,
    retry: RetryPolicy,
    cache: TtlCache<ProfileTable>,
}

impl ProfileStore {
    pub fn new(sources: ProfileSources, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sources,
            policy: InvalidProfilePolicy::default(),
            retry: RetryPolicy::default(),
            cache: TtlCache::new("profiles", ttl, clock),
        }
    }

    pub fn with_policy(mut self, policy: InvalidProfilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn policy(&self) -> InvalidProfilePolicy {
        self.policy
    }

    /// Look up one profile by id.
    pub async fn get_profile(&self, id: &str) -> Result<Arc<Profile>> {
        let table = self.table().await?;
        table
            .profiles
            .get(id)
            .cloned()
            .ok_or_else(|| NotFoundError::Profile(id.to_string()).into())
    }

    /// All profiles, sorted by id.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileSummary>> {
        let table = self.table().await?;
        Ok(table
            .profiles
            .values()
            .map(|p| ProfileSummary::from(p.as_ref()))
            .collect())
    }

    pub async fn load_report(&self) -> Result<LoadReport> {
        let table = self.table().await?;
        Ok(LoadReport {
            loaded: table.origins.clone(),
            rejected: table.rejected.clone(),
            loaded_at: table.loaded_at,
        })
    }

    /// Drop the cached table; the next read goes back to disk.
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    async fn table(&self) -> Result<Arc<ProfileTable>> {
        self.cache.get_or_load(|| self.load_table()).await
    }

    async fn load_table(&self) -> Result<ProfileTable> {
        let mut table = ProfileTable {
            profiles: BTreeMap::new(),
            origins: BTreeMap::new(),
            rejected: Vec::new(),
            loaded_at: Utc::now(),
        };

        for (kind, dir) in self.sources.ordered() {
            self.load_dir(dir, kind, &mut table).await?;
        }

        info!(
            profiles = table.profiles.len(),
            rejected = table.rejected.len(),
            "Profiles loaded"
        );
        Ok(table)
    }

    async fn load_dir(&self, dir: &Path, kind: SourceKind, table: &mut ProfileTable) -> Result<()> {
        let Some(entries) = io::list_dir(&self.retry, dir).await? else {
            debug!(dir = %dir.display(), "Profile directory missing, treated as empty");
            return Ok(());
        };

        for entry in entries.iter().filter(|e| !e.is_dir) {
            let Some(id) = profile_id(&entry.name) else {
                continue;
            };
            let text = io::read_to_string(&self.retry, &entry.path).await?;

            match parse_profile(id, &text) {
                Ok(profile) => {
                    if let Some(previous) = table.origins.insert(id.to_string(), kind) {
                        debug!(id, ?previous, replacement = ?kind, "Profile replaced");
                    }
                    table.profiles.insert(id.to_string(), Arc::new(profile));
                }
                Err(e) => match self.policy {
                    InvalidProfilePolicy::Abort => return Err(e.into()),
                    InvalidProfilePolicy::Skip => {
                        warn!(id, error = %e, "Skipping invalid profile");
                        table.rejected.push(RejectedProfile {
                            id: id.to_string(),
                            source: kind,
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }
        Ok(())
    }
}
