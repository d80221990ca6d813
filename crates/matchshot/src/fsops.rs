//! Filesystem operations used to stage stable, new and diff images

use std::io::ErrorKind;
use std::path::Path;
use async_trait::async_trait;
use tracing::debug;

use crate::error::{MatchError, MatchResult};

/// Asynchronous file mutations the matcher relies on
#[async_trait]
pub trait FileOps: Send + Sync {
    /// Create a directory and its parents. Succeeds if it already exists.
    async fn mkdir(&self, path: &Path) -> MatchResult<()>;

    /// Create an empty file, or bump the modification time of an existing one
    async fn touch(&self, path: &Path) -> MatchResult<()>;

    async fn rename(&self, from: &Path, to: &Path) -> MatchResult<()>;

    async fn copy(&self, from: &Path, to: &Path) -> MatchResult<()>;

    /// Remove a file. Succeeds if it does not exist.
    async fn unlink(&self, path: &Path) -> MatchResult<()>;

    async fn exists(&self, path: &Path) -> bool;
}

/// [`FileOps`] over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileOps;

#[async_trait]
impl FileOps for LocalFileOps {
    async fn mkdir(&self, path: &Path) -> MatchResult<()> {
        debug!("mkdir {}", path.display());
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| MatchError::file_op("mkdir", path, e))
    }

    async fn touch(&self, path: &Path) -> MatchResult<()> {
        debug!("touch {}", path.display());
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| MatchError::file_op("touch", path, e))?;

        let file = file.into_std().await;
        tokio::task::spawn_blocking(move || file.set_modified(std::time::SystemTime::now()))
            .await
            .map_err(|e| MatchError::file_op("touch", path, std::io::Error::new(ErrorKind::Other, e)))?
            .map_err(|e| MatchError::file_op("touch", path, e))
    }

    async fn rename(&self, from: &Path, to: &Path) -> MatchResult<()> {
        debug!("rename {} -> {}", from.display(), to.display());
        match tokio::fs::rename(from, to).await {
            Ok(()) => Ok(()),
            // Screenshots often live on a different volume than the stable set.
            Err(e) if is_cross_device(&e) => {
                self.copy(from, to).await?;
                self.unlink(from).await
            }
            Err(e) => Err(MatchError::file_op("rename", from, e)),
        }
    }

    async fn copy(&self, from: &Path, to: &Path) -> MatchResult<()> {
        debug!("copy {} -> {}", from.display(), to.display());
        tokio::fs::copy(from, to)
            .await
            .map(|_| ())
            .map_err(|e| MatchError::file_op("copy", from, e))
    }

    async fn unlink(&self, path: &Path) -> MatchResult<()> {
        debug!("unlink {}", path.display());
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MatchError::file_op("unlink", path, e)),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

#[cfg(unix)]
fn is_cross_device(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(nix::errno::Errno::EXDEV as i32)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &std::io::Error) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mkdir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b");

        LocalFileOps.mkdir(&dir).await.unwrap();
        LocalFileOps.mkdir(&dir).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_unlink_missing_is_ok() {
        let tmp = TempDir::new().unwrap();
        LocalFileOps.unlink(&tmp.path().join("nope.png")).await.unwrap();
    }

    #[tokio::test]
    async fn test_rename_and_exists() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("from.png");
        let to = tmp.path().join("to.png");
        std::fs::write(&from, b"png").unwrap();

        LocalFileOps.rename(&from, &to).await.unwrap();

        assert!(!LocalFileOps.exists(&from).await);
        assert!(LocalFileOps.exists(&to).await);
        assert_eq!(std::fs::read(&to).unwrap(), b"png");
    }

    #[cfg(unix)]
    #[test]
    fn test_cross_device_detection() {
        let exdev = std::io::Error::from_raw_os_error(nix::errno::Errno::EXDEV as i32);
        assert!(is_cross_device(&exdev));

        let enoent = std::io::Error::from_raw_os_error(nix::errno::Errno::ENOENT as i32);
        assert!(!is_cross_device(&enoent));
        assert!(!is_cross_device(&std::io::Error::new(ErrorKind::Other, "boom")));
    }

    #[tokio::test]
    async fn test_rename_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFileOps
            .rename(&tmp.path().join("gone.png"), &tmp.path().join("to.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::FileOp { op: "rename", .. }));
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFileOps
            .copy(&tmp.path().join("missing.png"), &tmp.path().join("out.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::FileOp { op: "copy", .. }));
    }

    #[tokio::test]
    async fn test_touch_creates_and_keeps_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("marker");

        LocalFileOps.touch(&path).await.unwrap();
        assert!(path.is_file());

        std::fs::write(&path, b"keep").unwrap();
        LocalFileOps.touch(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }
}
