//! Per-job resource registry.
//!
//! Every handle a job opens is registered here and released exactly once
//! when the job ends, whether it succeeded or not. The registry also owns
//! the job's scratch directory (caption text files).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::backend::MediaBackend;
use crate::clip::HandleId;
use crate::error::MediaResult;

pub struct JobResources {
    backend: Arc<dyn MediaBackend>,
    handles: Vec<HandleId>,
    scratch: Option<TempDir>,
    text_files: usize,
}

impl JobResources {
    /// Create a registry with a fresh scratch directory under `work_dir`
    /// (the system temp directory when `None`).
    pub fn new(backend: Arc<dyn MediaBackend>, work_dir: Option<&Path>) -> MediaResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("stackcut-");
        let scratch = match work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };
        debug!(scratch = %scratch.path().display(), "Created job scratch directory");
        Ok(Self {
            backend,
            handles: Vec::new(),
            scratch: Some(scratch),
            text_files: 0,
        })
    }

    /// Register an opened handle for release at job end.
    pub fn track(&mut self, handle: HandleId) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }

    /// Handles still awaiting release.
    pub fn handles(&self) -> &[HandleId] {
        &self.handles
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    /// Write caption text to a new file in the scratch directory.
    pub async fn write_text(&mut self, contents: &str) -> MediaResult<PathBuf> {
        let dir = self.scratch_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Scratch directory already removed")
        })?;
        let path = dir.join(format!("text_{}.txt", self.text_files));
        tokio::fs::write(&path, contents).await?;
        self.text_files += 1;
        Ok(path)
    }

    /// Release every registered handle and remove the scratch directory.
    ///
    /// Errors are logged and suppressed; returns the number of handles
    /// released without error.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for handle in self.handles.drain(..) {
            match self.backend.release(handle) {
                Ok(()) => released += 1,
                Err(e) => warn!(handle = %handle, kind = e.kind(), "Failed to release handle: {}", e),
            }
        }
        if let Some(scratch) = self.scratch.take() {
            let path = scratch.path().to_path_buf();
            if let Err(e) = scratch.close() {
                warn!(scratch = %path.display(), "Failed to remove scratch directory: {}", e);
            }
        }
        released
    }
}

impl Drop for JobResources {
    fn drop(&mut self) {
        if !self.handles.is_empty() || self.scratch.is_some() {
            self.release_all();
        }
    }
}

/// Remove a partially written output file, ignoring a missing one.
pub fn discard_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "Failed to remove partial output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::FakeBackend;

    #[tokio::test]
    async fn test_release_all_releases_each_handle_once() {
        let backend = Arc::new(FakeBackend::new());
        let mut resources = JobResources::new(backend.clone(), None).unwrap();
        resources.track(HandleId(1));
        resources.track(HandleId(2));
        resources.track(HandleId(1));

        assert_eq!(resources.release_all(), 2);
        assert_eq!(resources.release_all(), 0);
        assert_eq!(backend.released(), vec![HandleId(1), HandleId(2)]);
    }

    #[tokio::test]
    async fn test_drop_releases_and_removes_scratch() {
        let work = tempfile::TempDir::new().unwrap();
        let backend = Arc::new(FakeBackend::new());
        let scratch;
        {
            let mut resources = JobResources::new(backend.clone(), Some(work.path())).unwrap();
            resources.track(HandleId(7));
            let text = resources.write_text("line one\nline two").await.unwrap();
            assert_eq!(std::fs::read_to_string(&text).unwrap(), "line one\nline two");
            scratch = resources.scratch_dir().unwrap().to_path_buf();
            assert!(scratch.starts_with(work.path()));
        }
        assert_eq!(backend.released(), vec![HandleId(7)]);
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_text_files_are_distinct() {
        let mut resources = JobResources::new(Arc::new(FakeBackend::new()), None).unwrap();
        let a = resources.write_text("a").await.unwrap();
        let b = resources.write_text("b").await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_discard_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.mp4");
        std::fs::write(&out, b"partial").unwrap();
        discard_output(&out);
        assert!(!out.exists());
        discard_output(&out);
    }
}
