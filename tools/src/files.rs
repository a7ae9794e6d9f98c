//! File collaborator used by every generator
//!
//! `LocalFileWriter` writes through a temp file and rename so a reader never
//! sees a half-written artifact, and serializes concurrent writes to the same
//! path. Two dispatches targeting one path resolve as last write wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::FileError;

/// Directories never descended into while listing
const SKIPPED_DIRS: [&str; 3] = ["node_modules", ".git", "dist"];

#[async_trait]
pub trait FileWriter: Send + Sync {
    async fn ensure_directory(&self, path: &Path) -> Result<PathBuf, FileError>;

    /// Write `content` to `path`, creating parent directories. Returns the resolved path.
    async fn write_file(&self, path: &Path, content: &str) -> Result<PathBuf, FileError>;

    async fn file_exists(&self, path: &Path) -> bool;

    /// Where `path` lands on disk; listings are reported under this prefix
    fn resolve_path(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }

    async fn read_file(&self, path: &Path) -> Result<String, FileError>;

    /// Files under `path`, sorted. `extensions` filters by file-name suffix
    /// (`".component.ts"`, `"scss"`).
    async fn list_files_recursively(
        &self,
        path: &Path,
        extensions: Option<&[&str]>,
    ) -> Result<Vec<PathBuf>, FileError>;
}

/// File system backed writer rooted at a workspace directory
pub struct LocalFileWriter {
    root: PathBuf,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl LocalFileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths are taken relative to the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks.entry(path.to_path_buf()).or_default().clone()
    }
}

#[async_trait]
impl FileWriter for LocalFileWriter {
    async fn ensure_directory(&self, path: &Path) -> Result<PathBuf, FileError> {
        let dir = self.resolve(path);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| FileError::new("create directory", &dir, e))?;
        Ok(dir)
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<PathBuf, FileError> {
        let target = self.resolve(path);
        let lock = self.lock_for(&target);
        let result = {
            let _guard = lock.lock().await;
            write_atomic(&target, content).await
        };
        drop(lock);
        // Only the map holds it once no writer is waiting on this path
        self.locks.remove_if(&target, |_, l| Arc::strong_count(l) == 1);
        result.map(|()| target)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        self.resolve(path)
    }

    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(self.resolve(path))
            .await
            .unwrap_or(false)
    }

    async fn read_file(&self, path: &Path) -> Result<String, FileError> {
        let target = self.resolve(path);
        tokio::fs::read_to_string(&target)
            .await
            .map_err(|e| FileError::new("read", &target, e))
    }

    async fn list_files_recursively(
        &self,
        path: &Path,
        extensions: Option<&[&str]>,
    ) -> Result<Vec<PathBuf>, FileError> {
        let dir = self.resolve(path);
        let suffixes: Option<Vec<String>> = extensions.map(|exts| {
            exts.iter()
                .map(|e| {
                    if e.starts_with('.') {
                        e.to_string()
                    } else {
                        format!(".{e}")
                    }
                })
                .collect()
        });

        let walk_dir = dir.clone();
        let listed = tokio::task::spawn_blocking(move || walk(&walk_dir, suffixes.as_deref()))
            .await
            .map_err(|e| FileError::new("list", &dir, std::io::Error::other(e)))?;
        listed.map_err(|e| FileError::new("list", &dir, e))
    }
}

fn walk(dir: &Path, suffixes: Option<&[String]>) -> std::io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a directory",
        ));
    }

    let mut files = Vec::new();
    let entries = WalkDir::new(dir).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !SKIPPED_DIRS.iter().any(|skip| entry.file_name() == *skip)
    });
    for entry in entries {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let keep = match suffixes {
            Some(suffixes) => suffixes.iter().any(|s| name.ends_with(s.as_str())),
            None => true,
        };
        if keep {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Temp file in the target's directory, then rename over it
async fn write_atomic(target: &Path, content: &str) -> Result<(), FileError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::new("create directory", parent, e))?;
    }

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = target.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| FileError::new("write", &tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, target).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(FileError::new("write", target, e));
    }

    debug!("Wrote {} ({} bytes)", target.display(), content.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let writer = LocalFileWriter::new(dir.path());

        let written = writer
            .write_file(Path::new("a/b/c.ts"), "export {};\n")
            .await
            .unwrap();
        assert_eq!(written, dir.path().join("a/b/c.ts"));
        assert!(writer.file_exists(Path::new("a/b/c.ts")).await);
        assert_eq!(
            writer.read_file(&written).await.unwrap(),
            "export {};\n"
        );
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let writer = LocalFileWriter::new(dir.path());
        writer.write_file(Path::new("x.ts"), "1").await.unwrap();
        writer.write_file(Path::new("x.ts"), "2").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x.ts"]);
        assert_eq!(writer.read_file(Path::new("x.ts")).await.unwrap(), "2");
    }

    #[tokio::test]
    async fn test_concurrent_writes_same_path_leave_one_whole_file() {
        let dir = TempDir::new().unwrap();
        let writer = Arc::new(LocalFileWriter::new(dir.path()));

        let mut tasks = Vec::new();
        for i in 0..16u8 {
            let writer = Arc::clone(&writer);
            tasks.push(tokio::spawn(async move {
                let body = char::from(b'a' + i).to_string().repeat(4096);
                writer.write_file(Path::new("same.ts"), &body).await
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        let content = writer.read_file(Path::new("same.ts")).await.unwrap();
        let first = content.chars().next().unwrap();
        assert_eq!(content.len(), 4096);
        assert!(content.chars().all(|c| c == first));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(writer.locks.is_empty());
    }

    #[tokio::test]
    async fn test_path_locks_released_after_write() {
        let dir = TempDir::new().unwrap();
        let writer = LocalFileWriter::new(dir.path());
        for i in 0..8 {
            writer
                .write_file(Path::new(&format!("f{i}.ts")), "x")
                .await
                .unwrap();
        }
        assert!(writer.locks.is_empty());

        // A failed write releases its lock too
        std::fs::write(dir.path().join("blocker"), "").unwrap();
        writer
            .write_file(Path::new("blocker/inner.ts"), "x")
            .await
            .unwrap_err();
        assert!(writer.locks.is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let writer = LocalFileWriter::new(dir.path());
        let err = writer.read_file(Path::new("missing.ts")).await.unwrap_err();
        assert_eq!(err.op, "read");
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_filters_and_skips() {
        let dir = TempDir::new().unwrap();
        let writer = LocalFileWriter::new(dir.path());
        for path in [
            "src/app/a.component.ts",
            "src/app/a.component.html",
            "src/app/b.service.ts",
            "node_modules/lib/c.component.ts",
            "dist/d.component.ts",
        ] {
            writer.write_file(Path::new(path), "").await.unwrap();
        }

        let all = writer
            .list_files_recursively(Path::new("."), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let components = writer
            .list_files_recursively(Path::new("."), Some(&[".component.ts"]))
            .await
            .unwrap();
        assert_eq!(components, vec![dir.path().join("src/app/a.component.ts")]);

        let ts = writer
            .list_files_recursively(Path::new("src"), Some(&["ts"]))
            .await
            .unwrap();
        assert_eq!(ts.len(), 2);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let writer = LocalFileWriter::new(dir.path());
        let err = writer
            .list_files_recursively(Path::new("nope"), None)
            .await
            .unwrap_err();
        assert_eq!(err.op, "list");
    }
}
