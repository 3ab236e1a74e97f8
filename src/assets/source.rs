use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{ReelError, ReelResult};

/// Backing store the frame loader fetches encoded image bytes from.
///
/// Fetches run on worker threads, so implementations must be shareable.
pub trait FrameSource: Send + Sync {
    /// Fetch the encoded bytes at `rel_path` (a `/`-separated relative path).
    fn fetch(&self, rel_path: &str) -> ReelResult<Vec<u8>>;
}

/// Reads frames from a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameSource for DirSource {
    fn fetch(&self, rel_path: &str) -> ReelResult<Vec<u8>> {
        let norm = normalize_rel_path(rel_path)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read frame bytes from '{}'", path.display()))
            .map_err(ReelError::from)
    }
}

/// Serves frames from memory. Used by tests and by hosts that bundle their sequence.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rel_path: &str, bytes: Vec<u8>) -> ReelResult<()> {
        self.files.insert(normalize_rel_path(rel_path)?, bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for MemorySource {
    fn fetch(&self, rel_path: &str) -> ReelResult<Vec<u8>> {
        let norm = normalize_rel_path(rel_path)?;
        self.files
            .get(&norm)
            .cloned()
            .ok_or_else(|| ReelError::asset(format!("no frame resource at '{norm}'")))
    }
}

/// Collapse a `/`-separated frame path into its canonical form, the key both sources use.
///
/// Empty and `.` segments are dropped. Absolute paths, parent traversals (`..`) and paths
/// with no file name are rejected.
pub fn normalize_rel_path(rel_path: &str) -> ReelResult<String> {
    if rel_path.starts_with('/') {
        return Err(ReelError::validation(format!(
            "frame path '{rel_path}' must be relative"
        )));
    }

    let segments = rel_path
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .map(|seg| match seg {
            ".." => Err(ReelError::validation(format!(
                "frame path '{rel_path}' leaves the source root"
            ))),
            seg => Ok(seg),
        })
        .collect::<ReelResult<Vec<_>>>()?;

    if segments.is_empty() {
        return Err(ReelError::validation(format!(
            "frame path '{rel_path}' has no file name"
        )));
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
