use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tessera::{BadgeStore, Error, Result, StoredBadge};

const EXTENSION: &str = "svg";

/// Badge store laid out as `<root>/<scope>/<name>.svg`.
#[derive(Debug, Clone)]
pub struct FsBadgeStore {
    root: PathBuf,
}

impl FsBadgeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope_dir(&self, scope: &str) -> Result<PathBuf> {
        Ok(self.root.join(segment(scope)?))
    }

    pub fn path_of(&self, scope: &str, name: &str) -> Result<PathBuf> {
        Ok(self
            .scope_dir(scope)?
            .join(format!("{}.{EXTENSION}", segment(name)?)))
    }
}

// Keeps every lookup inside the store root.
fn segment(value: &str) -> Result<&str> {
    let ok = !value.is_empty()
        && !value.starts_with('.')
        && !value.contains(['/', '\\', '\0']);
    if ok {
        Ok(value)
    } else {
        Err(Error::InvalidName {
            message: format!("\"{value}\" is not a valid path segment"),
        })
    }
}

impl BadgeStore for FsBadgeStore {
    fn fetch(&self, scope: &str, name: &str) -> Result<Option<StoredBadge>> {
        let path = self.path_of(scope, name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(StoredBadge {
                scope: scope.to_string(),
                name: name.to_string(),
                extension: EXTENSION.to_string(),
                bytes,
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, scope: &str, name: &str, markup: &str) -> Result<()> {
        let path = self.path_of(scope, name)?;
        std::fs::create_dir_all(self.scope_dir(scope)?)?;
        std::fs::write(&path, markup)?;
        tracing::debug!(path = %path.display(), bytes = markup.len(), "wrote badge");
        Ok(())
    }

    fn remove(&self, scope: &str, name: &str) -> Result<bool> {
        match std::fs::remove_file(self.path_of(scope, name)?) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn list(&self, scope: &str) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(self.scope_dir(scope)?) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
