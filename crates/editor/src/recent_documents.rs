// Chunk: docs/chunks/editor_config - Config and recent-documents persistence
//!
//! Recently opened documents.
//!
//! Stored at `<data_dir>/shadow-edit/recent.json`, most recent first. Loading
//! degrades to an empty list on any problem; saving is atomic (temp file then
//! rename) so a crash mid-write cannot corrupt the list.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::APP_DIR_NAME;

const RECENT_FILENAME: &str = "recent.json";

/// Bump on breaking changes to the file format.
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RecentFile {
    schema_version: u32,
    paths: Vec<PathBuf>,
}

/// Returns the default store location, if the platform has a data directory.
pub fn recent_file_path() -> Option<PathBuf> {
    Some(dirs::data_dir()?.join(APP_DIR_NAME).join(RECENT_FILENAME))
}

#[derive(Debug)]
pub struct RecentDocuments {
    paths: VecDeque<PathBuf>,
    limit: usize,
    store: Option<PathBuf>,
}

impl RecentDocuments {
    /// An in-memory list that is never persisted.
    pub fn in_memory(limit: usize) -> Self {
        Self {
            paths: VecDeque::new(),
            limit,
            store: None,
        }
    }

    /// Loads from `store`, starting empty if it is missing or unreadable.
    pub fn load(store: PathBuf, limit: usize) -> Self {
        let mut recent = Self {
            paths: VecDeque::new(),
            limit,
            store: Some(store),
        };
        if let Some(paths) = recent.store.as_deref().and_then(read_store) {
            recent.paths = paths.into_iter().take(limit).collect();
        }
        recent
    }

    /// Moves `path` to the front, dropping the oldest entry past the limit.
    pub fn add(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
        self.paths.push_front(path.to_path_buf());
        self.paths.truncate(self.limit);
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Persists the list. A no-op for in-memory lists.
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.store else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let file = RecentFile {
            schema_version: SCHEMA_VERSION,
            paths: self.paths.iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

fn read_store(path: &Path) -> Option<Vec<PathBuf>> {
    if !path.exists() {
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read recent documents");
            return None;
        }
    };

    let file: RecentFile = match serde_json::from_str(&contents) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to parse recent documents");
            return None;
        }
    };

    if file.schema_version != SCHEMA_VERSION {
        tracing::warn!(
            expected = SCHEMA_VERSION,
            found = file.schema_version,
            "recent documents schema version mismatch"
        );
        return None;
    }

    Some(file.paths)
}
