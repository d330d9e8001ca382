use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
    Other,
}

/// Non-blocking filesystem primitives used by the traversal.
///
/// Each call resolves exactly once.
pub trait FileSystem: Send + Sync + 'static {
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<NodeKind>> + Send;

    /// Full paths of the direct children of a directory.
    fn list(&self, path: &Path) -> impl Future<Output = io::Result<Vec<PathBuf>>> + Send;

    fn read(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;

    /// Identity of a node with every symlink resolved; two paths naming the
    /// same directory yield the same value.
    fn canonicalize(&self, path: &Path) -> impl Future<Output = io::Result<PathBuf>> + Send;
}

/// The real filesystem through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileSystem for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn stat(&self, path: &Path) -> io::Result<NodeKind> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(if metadata.is_dir() {
            NodeKind::Directory
        } else if metadata.is_file() {
            NodeKind::File
        } else {
            NodeKind::Other
        })
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            children.push(entry.path());
        }
        Ok(children)
    }

    async fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        tokio::fs::canonicalize(path).await
    }
}
