//! Storage boundary.
//!
//! Persistence itself lives outside the core; this module only fixes the shape of the
//! adapter and the owner-then-default lookup order used when resolving badge names.

use crate::config::BadgeConfig;
use crate::model::{BadgeReference, VectorFragment};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBadge {
    pub scope: String,
    pub name: String,
    /// Recorded extension without the dot (`svg` for everything normalized by this crate).
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl StoredBadge {
    pub fn into_fragment(self) -> Result<VectorFragment> {
        let markup = String::from_utf8(self.bytes).map_err(|e| Error::MalformedMarkup {
            message: format!("badge \"{}\" is not valid UTF-8: {e}", self.name),
        })?;
        VectorFragment::parse(markup)
    }
}

pub trait BadgeStore: Send + Sync {
    /// Fetches `name` from exactly one scope; no fallback.
    fn fetch(&self, scope: &str, name: &str) -> Result<Option<StoredBadge>>;

    /// Persists markup as `<scope>/<name>.svg`.
    fn put(&self, scope: &str, name: &str, markup: &str) -> Result<()>;

    /// Deletes `name` from `scope`; `false` when nothing was stored there.
    fn remove(&self, scope: &str, name: &str) -> Result<bool>;

    /// Badge names in `scope`, sorted.
    fn list(&self, scope: &str) -> Result<Vec<String>>;

    fn contains(&self, scope: &str, name: &str) -> Result<bool> {
        Ok(self.fetch(scope, name)?.is_some())
    }
}

/// Looks `reference` up in its owner scope first, then in the default scope.
pub fn resolve_badge(
    store: &dyn BadgeStore,
    reference: &BadgeReference,
    config: &BadgeConfig,
) -> Result<StoredBadge> {
    if let Some(owner) = reference.owner.as_deref() {
        if !config.is_default_scope(owner) {
            if let Some(found) = store.fetch(owner, &reference.name)? {
                return Ok(found);
            }
            tracing::debug!(owner, name = %reference.name, "falling back to default scope");
        }
    }
    store
        .fetch(&config.default_scope, &reference.name)?
        .ok_or_else(|| Error::FragmentNotFound {
            name: reference.name.clone(),
        })
}

/// Resolves every reference, failing on the first missing badge.
pub fn resolve_fragments(
    store: &dyn BadgeStore,
    references: &[BadgeReference],
    config: &BadgeConfig,
) -> Result<Vec<VectorFragment>> {
    references
        .iter()
        .map(|reference| resolve_badge(store, reference, config)?.into_fragment())
        .collect()
}

/// In-process store keyed by `(scope, name)`.
#[derive(Debug, Default)]
pub struct MemoryBadgeStore {
    entries: RwLock<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryBadgeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BadgeStore for MemoryBadgeStore {
    fn fetch(&self, scope: &str, name: &str) -> Result<Option<StoredBadge>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(&(scope.to_string(), name.to_string()))
            .map(|bytes| StoredBadge {
                scope: scope.to_string(),
                name: name.to_string(),
                extension: "svg".to_string(),
                bytes: bytes.clone(),
            }))
    }

    fn put(&self, scope: &str, name: &str, markup: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            (scope.to_string(), name.to_string()),
            markup.as_bytes().to_vec(),
        );
        Ok(())
    }

    fn remove(&self, scope: &str, name: &str) -> Result<bool> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .remove(&(scope.to_string(), name.to_string()))
            .is_some())
    }

    fn list(&self, scope: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .keys()
            .filter(|(s, _)| s == scope)
            .map(|(_, name)| name.clone())
            .collect())
    }
}
