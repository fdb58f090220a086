//! Persisted recent-searches list.
//!
//! A small move-to-front list capped at 8 stored entries, of which the
//! UI surfaces at most 4. Persisted as a JSON array; a missing file is an
//! empty list, a corrupt file is an empty list with a warning, and save
//! failures never fail the operation that triggered them.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use loci_core::defaults::{
    ENV_RECENTS_PATH, RECENTS_DISPLAY_MAX, RECENTS_FILE, RECENTS_STORED_MAX,
};
use loci_core::{RecentSearchEntry, Result};

/// Recent-search list with JSON file persistence.
pub struct RecentSearches {
    entries: Vec<RecentSearchEntry>,
    path: PathBuf,
}

impl RecentSearches {
    /// Load the list from the given file.
    ///
    /// A missing file yields an empty list; an unreadable or corrupt file
    /// yields an empty list and a warning.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<RecentSearchEntry>>(&bytes) {
                Ok(mut entries) => {
                    entries.truncate(RECENTS_STORED_MAX);
                    entries
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Corrupt recent-searches file, starting empty"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read recent-searches file, starting empty"
                );
                Vec::new()
            }
        };

        debug!(
            path = %path.display(),
            entry_count = entries.len(),
            "Loaded recent searches"
        );
        Self { entries, path }
    }

    /// Load from the environment-configured path, or the platform data dir.
    pub async fn load_default() -> Self {
        Self::load(default_path()).await
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a search at the front of the list.
    ///
    /// The label is trimmed; blank labels are ignored. An existing entry
    /// with the same label (case-insensitive) is removed first, so a repeat
    /// search moves to the front without growing the list.
    pub async fn add(&mut self, label: &str, sublabel: Option<&str>) {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return;
        }

        let lowered = trimmed.to_lowercase();
        self.entries
            .retain(|entry| entry.label.to_lowercase() != lowered);

        let mut entry = RecentSearchEntry::new(trimmed);
        if let Some(sublabel) = sublabel {
            entry = entry.with_sublabel(sublabel);
        }
        self.entries.insert(0, entry);
        self.entries.truncate(RECENTS_STORED_MAX);

        self.save().await;
    }

    /// The display head of the list: at most 4 entries, newest first.
    pub fn recent(&self) -> &[RecentSearchEntry] {
        let len = self.entries.len().min(RECENTS_DISPLAY_MAX);
        &self.entries[..len]
    }

    /// The full stored list, at most 8 entries.
    pub fn all(&self) -> &[RecentSearchEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the list and persist the empty state.
    pub async fn clear(&mut self) {
        self.entries.clear();
        self.save().await;
    }

    /// Persist the current list, logging instead of failing.
    async fn save(&self) {
        if let Err(e) = self.write_file().await {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to save recent searches"
            );
        }
    }

    /// Atomic write: temp file + rename.
    async fn write_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec(&self.entries)?;
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

/// Resolve the recents file path: env override, then XDG data dir.
fn default_path() -> PathBuf {
    if let Ok(path) = std::env::var(ENV_RECENTS_PATH) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local").join("share")
        });

    data_home.join("loci").join(RECENTS_FILE)
}

// ==========================================================================
// Tests
// ==========================================================================
