use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;

use crate::config::OptionOverrides;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Script or JSON data the engine analyzes directly
    Source,
    /// Web page; analyzed with document-context rules
    Markup,
    /// Never handed to the engine
    Unsupported,
}

impl FileKind {
    pub fn is_supported(&self) -> bool {
        !matches!(self, FileKind::Unsupported)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub path: PathBuf,
    pub kind: FileKind,
    pub overrides: OptionOverrides,
}

static SOURCE_FILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(js|json)$").unwrap()
});

static MARKUP_FILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.html?$").unwrap()
});

/// Decides whether a path is handed to the engine and with which
/// option overrides.
///
/// Classification is pure: markup documents get `browser` and `document` as an
/// override value instead of a change to any shared options object.
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    extra_source_extensions: Vec<String>,
}

impl PathClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat additional extensions (without the dot) as source.
    pub fn with_source_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra_source_extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, path: &Path) -> Classification {
        let kind = self.kind_of(path);
        let overrides = match kind {
            FileKind::Markup => OptionOverrides {
                browser: Some(true),
                document: Some(true),
            },
            _ => OptionOverrides::default(),
        };

        Classification {
            path: path.to_path_buf(),
            kind,
            overrides,
        }
    }

    pub fn kind_of(&self, path: &Path) -> FileKind {
        let filename = path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");

        if SOURCE_FILE_REGEX.is_match(filename) {
            return FileKind::Source;
        }

        if MARKUP_FILE_REGEX.is_match(filename) {
            return FileKind::Markup;
        }

        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension {
            Some(ext) if self.extra_source_extensions.contains(&ext) => FileKind::Source,
            _ => FileKind::Unsupported,
        }
    }

    pub fn is_markup(&self, path: &Path) -> bool {
        self.kind_of(path) == FileKind::Markup
    }
}
