use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_INDENT: u32 = 4;
pub const DEFAULT_MAXERR: u32 = 50;
pub const DEFAULT_CONCURRENCY: usize = 64;
pub const DEFAULT_WATCHDOG: Duration = Duration::from_secs(30);

/// Options handed to the engine on every call.
///
/// A traversal shares one immutable value; per-file overrides produce a
/// separate copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintOptions {
    /// Assume browser globals
    pub browser: bool,
    /// Source is a web page: only embedded scripts are analyzed. Set per
    /// call from the path classification, never read from configuration.
    #[serde(skip)]
    pub document: bool,
    pub indent: u32,
    pub maxerr: u32,
    pub maxlen: Option<u32>,
    /// Predefined global names
    pub predef: Vec<String>,
    /// Every other boolean switch (`evil`, `debug`, `white`, `eqeq`, ...)
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            browser: false,
            document: false,
            indent: DEFAULT_INDENT,
            maxerr: DEFAULT_MAXERR,
            maxlen: None,
            predef: Vec::new(),
            flags: BTreeMap::new(),
        }
    }
}

impl LintOptions {
    pub fn flag(&self, name: &str) -> bool {
        match name {
            "browser" => self.browser,
            _ => self.flags.get(name).copied().unwrap_or(false),
        }
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        match name {
            "browser" => self.browser = value,
            _ => {
                self.flags.insert(name.to_string(), value);
            }
        }
    }

    /// Options for a single call with the classifier's overrides applied.
    pub fn with_overrides(&self, overrides: &OptionOverrides) -> Cow<'_, LintOptions> {
        if overrides.is_empty() {
            return Cow::Borrowed(self);
        }

        let mut options = self.clone();
        if let Some(browser) = overrides.browser {
            options.browser = browser;
        }
        if let Some(document) = overrides.document {
            options.document = document;
        }
        Cow::Owned(options)
    }

    /// Switches that differ from the defaults, for display.
    pub fn overridden(&self) -> Vec<(String, String)> {
        let defaults = LintOptions::default();
        let mut changed = Vec::new();

        if self.browser != defaults.browser {
            changed.push(("browser".to_string(), self.browser.to_string()));
        }
        if self.indent != defaults.indent {
            changed.push(("indent".to_string(), self.indent.to_string()));
        }
        if self.maxerr != defaults.maxerr {
            changed.push(("maxerr".to_string(), self.maxerr.to_string()));
        }
        if let Some(maxlen) = self.maxlen {
            changed.push(("maxlen".to_string(), maxlen.to_string()));
        }
        for (name, value) in &self.flags {
            changed.push((name.clone(), value.to_string()));
        }
        if !self.predef.is_empty() {
            changed.push(("predef".to_string(), self.predef.join(", ")));
        }

        changed
    }
}

/// Per-file adjustments decided by the path classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub browser: Option<bool>,
    pub document: Option<bool>,
}

impl OptionOverrides {
    pub fn is_empty(&self) -> bool {
        self.browser.is_none() && self.document.is_none()
    }
}

/// Load options from a JSON or TOML file, chosen by extension.
pub fn load_options_file(path: &Path) -> Result<LintOptions> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content).map_err(|e| Error::OptionsParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::OptionsParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Consolidates options from an options file and individual switches.
///
/// The file is applied first, then enabled flags, disabled flags, indent,
/// maxerr, maxlen and finally the predefined globals.
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    file: Option<PathBuf>,
    enable: Vec<String>,
    disable: Vec<String>,
    indent: Option<u32>,
    maxerr: Option<u32>,
    maxlen: Option<u32>,
    globals: Vec<String>,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: Option<PathBuf>) -> Self {
        self.file = path;
        self
    }

    pub fn enable(mut self, names: &[String]) -> Self {
        self.enable.extend(names.iter().cloned());
        self
    }

    pub fn disable(mut self, names: &[String]) -> Self {
        self.disable.extend(names.iter().cloned());
        self
    }

    pub fn indent(mut self, indent: Option<u32>) -> Self {
        self.indent = indent;
        self
    }

    pub fn maxerr(mut self, maxerr: Option<u32>) -> Self {
        self.maxerr = maxerr;
        self
    }

    pub fn maxlen(mut self, maxlen: Option<u32>) -> Self {
        self.maxlen = maxlen;
        self
    }

    pub fn globals(mut self, names: &[String]) -> Self {
        self.globals.extend(names.iter().cloned());
        self
    }

    /// An unreadable options file is reported and the defaults are used.
    pub fn build(self) -> LintOptions {
        let mut options = match &self.file {
            Some(path) => match load_options_file(path) {
                Ok(loaded) => {
                    info!("Loaded lint options from {}", path.display());
                    loaded
                }
                Err(e) => {
                    warn!("Failed to load options file: {}", e);
                    LintOptions::default()
                }
            },
            None => LintOptions::default(),
        };

        for name in &self.enable {
            options.set_flag(name, true);
        }
        for name in &self.disable {
            options.set_flag(name, false);
        }
        if let Some(indent) = self.indent {
            options.indent = indent;
        }
        if let Some(maxerr) = self.maxerr {
            options.maxerr = maxerr;
        }
        if let Some(maxlen) = self.maxlen {
            options.maxlen = Some(maxlen);
        }
        if !self.globals.is_empty() {
            options.predef = self.globals;
        }

        options
    }
}

/// Runtime knobs for the concurrent traversal.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Maximum number of files read and analyzed at once
    pub concurrency: usize,
    /// Warn when a run shows no progress for this long
    pub watchdog: Option<Duration>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            watchdog: Some(DEFAULT_WATCHDOG),
        }
    }
}
