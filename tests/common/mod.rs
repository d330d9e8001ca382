#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use treelint::{CheckEvent, FileCheckResult, FileSystem, NodeKind, Summary};

pub const CLEAN_JS: &str = "var total = 1;\nconsole.log(total);\n";
pub const DIRTY_JS: &str = "if (a == b) {\n    run();\n}\n";

#[derive(Debug, Clone)]
enum Node {
    File(String),
    UnreadableFile,
    Dir,
    UnreadableDir,
    Special,
    Unstatable,
    Link(PathBuf),
}

/// In-memory tree with failure injection and optional per-path latency, so
/// sibling completions arrive out of listing order.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: BTreeMap<PathBuf, Node>,
    children: BTreeMap<PathBuf, Vec<PathBuf>>,
    jitter: bool,
    lists: AtomicUsize,
    stats: AtomicUsize,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn file(self, path: &str, content: &str) -> Self {
        self.insert(PathBuf::from(path), Node::File(content.to_string()))
    }

    pub fn unreadable_file(self, path: &str) -> Self {
        self.insert(PathBuf::from(path), Node::UnreadableFile)
    }

    pub fn dir(self, path: &str) -> Self {
        self.insert(PathBuf::from(path), Node::Dir)
    }

    pub fn unreadable_dir(self, path: &str) -> Self {
        self.insert(PathBuf::from(path), Node::UnreadableDir)
    }

    pub fn special(self, path: &str) -> Self {
        self.insert(PathBuf::from(path), Node::Special)
    }

    pub fn unstatable(self, path: &str) -> Self {
        self.insert(PathBuf::from(path), Node::Unstatable)
    }

    /// Symlink at `path` pointing to `target`.
    pub fn link(self, path: &str, target: &str) -> Self {
        self.insert(PathBuf::from(path), Node::Link(PathBuf::from(target)))
    }

    /// Number of successful directory listings served.
    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Number of stat calls served.
    pub fn stats(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    /// Replace link prefixes until none is left. `None` past the nesting
    /// limit, like ELOOP.
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let mut current = path.to_path_buf();
        for _ in 0..40 {
            let link = current.ancestors().find_map(|prefix| match self.nodes.get(prefix) {
                Some(Node::Link(target)) => Some((prefix.to_path_buf(), target.clone())),
                _ => None,
            });
            match link {
                Some((prefix, target)) => {
                    let rest = current.strip_prefix(&prefix).ok()?.to_path_buf();
                    current = if rest.as_os_str().is_empty() {
                        target
                    } else {
                        target.join(rest)
                    };
                }
                None => return Some(current),
            }
        }
        None
    }

    fn node(&self, path: &Path) -> Option<&Node> {
        self.resolve(path).and_then(|resolved| self.nodes.get(&resolved))
    }

    fn insert(mut self, path: PathBuf, node: Node) -> Self {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let parent = parent.to_path_buf();
            if !self.nodes.contains_key(&parent) {
                self = self.insert(parent.clone(), Node::Dir);
            }
            let siblings = self.children.entry(parent).or_default();
            if !siblings.contains(&path) {
                siblings.push(path.clone());
            }
        }
        self.nodes.insert(path, node);
        self
    }

    async fn latency(&self, path: &Path) {
        if self.jitter {
            let millis = (path.as_os_str().len() % 7) as u64;
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

impl FileSystem for MemoryFs {
    async fn exists(&self, path: &Path) -> bool {
        self.latency(path).await;
        self.node(path).is_some()
    }

    async fn stat(&self, path: &Path) -> io::Result<NodeKind> {
        self.latency(path).await;
        self.stats.fetch_add(1, Ordering::SeqCst);
        match self.node(path) {
            Some(Node::File(_)) | Some(Node::UnreadableFile) => Ok(NodeKind::File),
            Some(Node::Dir) | Some(Node::UnreadableDir) => Ok(NodeKind::Directory),
            Some(Node::Special) => Ok(NodeKind::Other),
            Some(Node::Unstatable) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "stat denied")),
            Some(Node::Link(_)) | None => Err(io::Error::new(io::ErrorKind::NotFound, "no such node")),
        }
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.latency(path).await;
        let resolved = self
            .resolve(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "too many links"))?;
        match self.nodes.get(&resolved) {
            Some(Node::Dir) => {
                self.lists.fetch_add(1, Ordering::SeqCst);
                let children = self.children.get(&resolved).cloned().unwrap_or_default();
                // Children are named under the path as given, like readdir
                Ok(children
                    .iter()
                    .filter_map(|child| child.file_name())
                    .map(|name| path.join(name))
                    .collect())
            }
            Some(Node::UnreadableDir) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "list denied")),
            _ => Err(io::Error::new(io::ErrorKind::Other, "not a directory")),
        }
    }

    async fn read(&self, path: &Path) -> io::Result<String> {
        self.latency(path).await;
        match self.node(path) {
            Some(Node::File(content)) => Ok(content.clone()),
            _ => Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied")),
        }
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.resolve(path)
            .filter(|resolved| self.nodes.contains_key(resolved))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot resolve"))
    }
}

/// Drain every event sent so far, asserting that exactly one terminal
/// summary arrived and that it came last.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<CheckEvent>) -> (Vec<FileCheckResult>, Summary) {
    let mut files = Vec::new();
    let mut summaries = Vec::new();

    while let Ok(event) = rx.try_recv() {
        match event {
            CheckEvent::File(result) => {
                assert!(summaries.is_empty(), "per-node event after the terminal summary");
                files.push(result);
            }
            CheckEvent::Complete(summary) => summaries.push(summary),
        }
    }

    assert_eq!(summaries.len(), 1, "expected exactly one terminal summary");
    (files, summaries.remove(0))
}
