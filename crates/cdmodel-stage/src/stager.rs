//! Directory mirroring with ignore patterns

use cdmodel_core::config::{Config, ConfigError, IgnoreMatcher};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Staging errors
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Source directory not found: {0}")]
    MissingSource(String),

    #[error("Source {source_dir} and destination {destination} overlap")]
    Overlap { source_dir: String, destination: String },

    #[error("IO error at {0}: {1}")]
    Io(String, String),

    #[error("Failed to walk source tree: {0}")]
    Walk(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn io_error(path: &Path, e: std::io::Error) -> StageError {
    StageError::Io(path.display().to_string(), e.to_string())
}

/// Outcome of a staging run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    /// Number of files copied
    pub files_copied: usize,

    /// Number of directories created below the destination root
    pub directories_created: usize,

    /// Source-relative paths left out, in walk order
    pub ignored: Vec<PathBuf>,
}

/// Copies a source tree into a destination, replacing whatever was there
pub struct Stager {
    source: PathBuf,
    destination: PathBuf,
    matcher: IgnoreMatcher,
}

impl Stager {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, matcher: IgnoreMatcher) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            matcher,
        }
    }

    /// Build a stager from the `[staging]` section, resolving paths against the project root
    pub fn from_config(config: &Config) -> Result<Self, StageError> {
        Ok(Self::new(
            config.resolve_path(&config.staging.source),
            config.resolve_path(&config.staging.destination),
            config.staging.matcher()?,
        ))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Remove the destination if present, then mirror the source into it
    pub fn copy_and_overwrite(&self) -> Result<StageSummary, StageError> {
        if !self.source.is_dir() {
            return Err(StageError::MissingSource(self.source.display().to_string()));
        }

        let source = std::fs::canonicalize(&self.source).map_err(|e| io_error(&self.source, e))?;
        let destination = canonical_path(&self.destination)?;
        if destination.starts_with(&source) || source.starts_with(&destination) {
            return Err(StageError::Overlap {
                source_dir: self.source.display().to_string(),
                destination: self.destination.display().to_string(),
            });
        }

        tracing::info!(
            source = %self.source.display(),
            destination = %self.destination.display(),
            "staging schema documents"
        );

        if self.destination.exists() {
            std::fs::remove_dir_all(&self.destination).map_err(|e| io_error(&self.destination, e))?;
        }
        std::fs::create_dir_all(&self.destination).map_err(|e| io_error(&self.destination, e))?;

        let mut summary = StageSummary::default();
        let mut ignored = Vec::new();

        let walker = WalkDir::new(&self.source)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                match self.matcher.matching_pattern(&name) {
                    Some(pattern) => {
                        tracing::debug!(path = %entry.path().display(), pattern, "ignored");
                        ignored.push(entry.path().to_path_buf());
                        false
                    }
                    None => true,
                }
            });

        for entry in walker {
            let entry = entry.map_err(|e| StageError::Walk(e.to_string()))?;
            let relative = entry
                .path()
                .strip_prefix(&self.source)
                .map_err(|e| StageError::Walk(e.to_string()))?;
            let target = self.destination.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target).map_err(|e| io_error(&target, e))?;
                summary.directories_created += 1;
            } else if entry.file_type().is_file() {
                std::fs::copy(entry.path(), &target).map_err(|e| io_error(&target, e))?;
                summary.files_copied += 1;
            } else {
                tracing::warn!(path = %entry.path().display(), "skipping entry that is neither file nor directory");
            }
        }

        summary.ignored = ignored
            .into_iter()
            .filter_map(|p| p.strip_prefix(&self.source).ok().map(Path::to_path_buf))
            .collect();

        tracing::info!(
            files = summary.files_copied,
            directories = summary.directories_created,
            ignored = summary.ignored.len(),
            "staging complete"
        );

        Ok(summary)
    }
}

/// Resolve `path` through its nearest existing ancestor
///
/// The existing part is canonicalized, so symlinks and `..` are resolved; the
/// missing remainder is appended lexically.
fn canonical_path(path: &Path) -> Result<PathBuf, StageError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_err(|e| io_error(path, e))?.join(path)
    };

    let existing = absolute
        .ancestors()
        .find(|ancestor| ancestor.exists())
        .ok_or_else(|| StageError::Io(path.display().to_string(), "no existing ancestor".to_string()))?;

    let mut resolved = std::fs::canonicalize(existing).map_err(|e| io_error(existing, e))?;
    let remainder = absolute.strip_prefix(existing).map_err(|e| StageError::Io(path.display().to_string(), e.to_string()))?;

    for component in remainder.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            _ => {}
        }
    }

    Ok(resolved)
}

/// Regular files directly inside the folder formed by joining `parts`
///
/// A missing folder yields an empty list. Paths are returned joined with the
/// folder, sorted by name.
pub fn list_files_in_folder<P: AsRef<Path>>(parts: &[P]) -> Result<Vec<PathBuf>, StageError> {
    let folder: PathBuf = parts.iter().map(|p| p.as_ref()).collect();

    if !folder.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&folder).map_err(|e| io_error(&folder, e))? {
        let entry = entry.map_err(|e| io_error(&folder, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_is_reported() {
        let stager = Stager::new(
            "/nonexistent/schemaDocuments",
            "/nonexistent/resources",
            IgnoreMatcher::new::<&str>(&[]).unwrap(),
        );
        assert!(matches!(stager.copy_and_overwrite(), Err(StageError::MissingSource(_))));
    }

    #[test]
    fn nested_destination_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stager = Stager::new(dir.path(), dir.path().join("resources"), IgnoreMatcher::new::<&str>(&[]).unwrap());
        assert!(matches!(stager.copy_and_overwrite(), Err(StageError::Overlap { .. })));
    }

    #[test]
    fn same_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stager = Stager::new(dir.path(), dir.path(), IgnoreMatcher::new::<&str>(&[]).unwrap());
        assert!(matches!(stager.copy_and_overwrite(), Err(StageError::Overlap { .. })));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn canonical_path_resolves_missing_remainder() {
        let dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(dir.path()).unwrap();

        let resolved = canonical_path(&dir.path().join("new/../dist/docs")).unwrap();
        assert_eq!(resolved, root.join("dist/docs"));
    }

    #[test]
    fn list_missing_folder_is_empty() {
        assert!(list_files_in_folder(&["/nonexistent", "folder"]).unwrap().is_empty());
    }
}
