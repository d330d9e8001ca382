use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::{Analysis, Engine, UnusedName, Warning};
use crate::config::LintOptions;

static EVAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\beval\s*\(").unwrap()
});

static DEBUGGER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bdebugger\b").unwrap()
});

static DECLARATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:var|let|const)\s+([A-Za-z_$][\w$]*)").unwrap()
});

static PARAMETERS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfunction\b[^(]*\(([^)]*)\)").unwrap()
});

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_$][\w$]*").unwrap()
});

static SCRIPT_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<script\b").unwrap()
});

static SCRIPT_CLOSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</script\s*>").unwrap()
});

/// Line-oriented rule engine bundled with the binary.
///
/// JSON documents are validated with `serde_json`; everything else goes
/// through a small set of textual rules. In document context (`document`)
/// only the bodies of `<script>` blocks are scanned.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicEngine;

impl BasicEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for BasicEngine {
    fn analyze(&self, source: &str, options: &LintOptions) -> Analysis {
        let lines: Vec<&str> = source.lines().collect();
        let loc = lines.len();

        if looks_like_json(source) && !options.document {
            return analyze_json(source, loc);
        }

        let scanned = if options.document && SCRIPT_OPEN_REGEX.is_match(source) {
            script_lines(&lines)
        } else {
            (1..=loc).collect()
        };

        let mut warnings = Vec::new();
        let mut scanned_loc = loc;

        for &line_no in &scanned {
            let line = lines[line_no - 1];
            check_line(line, line_no, options, &mut warnings);

            if options.maxerr > 0 && warnings.len() >= options.maxerr as usize {
                let percent = if loc > 0 { line_no * 100 / loc } else { 100 };
                warnings.push(Warning {
                    line: line_no,
                    character: 1,
                    reason: format!("Too many errors. ({}% scanned).", percent),
                    evidence: String::new(),
                });
                scanned_loc = line_no;
                break;
            }
        }

        let unused = find_unused(&lines, &scanned, options);

        Analysis {
            passed: warnings.is_empty(),
            warnings,
            unused,
            loc,
            scanned_loc,
            json: false,
        }
    }

    fn edition(&self) -> &str {
        concat!("treelint-basic ", env!("CARGO_PKG_VERSION"))
    }
}

fn looks_like_json(source: &str) -> bool {
    matches!(source.trim_start().chars().next(), Some('{') | Some('['))
}

fn analyze_json(source: &str, loc: usize) -> Analysis {
    let warnings = match serde_json::from_str::<serde_json::Value>(source) {
        Ok(_) => Vec::new(),
        Err(e) => {
            let evidence = source
                .lines()
                .nth(e.line().saturating_sub(1))
                .unwrap_or("")
                .trim_end()
                .to_string();
            vec![Warning {
                line: e.line(),
                character: e.column(),
                reason: format!("Bad JSON: {}", e),
                evidence,
            }]
        }
    };

    Analysis {
        passed: warnings.is_empty(),
        warnings,
        unused: Vec::new(),
        loc,
        scanned_loc: loc,
        json: true,
    }
}

/// 1-based numbers of the lines strictly inside `<script>` blocks.
fn script_lines(lines: &[&str]) -> Vec<usize> {
    let mut inside = false;
    let mut scanned = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let opens = SCRIPT_OPEN_REGEX.is_match(line);
        let closes = SCRIPT_CLOSE_REGEX.is_match(line);

        if inside {
            if closes {
                inside = false;
            } else {
                scanned.push(idx + 1);
            }
        } else if opens && !closes {
            inside = true;
        }
    }

    scanned
}

fn check_line(line: &str, line_no: usize, options: &LintOptions, warnings: &mut Vec<Warning>) {
    let mut warn = |character: usize, reason: String| {
        warnings.push(Warning {
            line: line_no,
            character,
            reason,
            evidence: line.trim_end().to_string(),
        });
    };

    if let Some(maxlen) = options.maxlen {
        if line.chars().count() > maxlen as usize {
            warn(maxlen as usize + 1, "Line too long.".to_string());
        }
    }

    if !options.flag("white") {
        let indentation: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        if indentation.contains('\t') {
            warn(1, "Use spaces, not tabs.".to_string());
        } else if !line.trim().is_empty() && !is_comment_continuation(line) {
            let width = indentation.chars().count();
            if options.indent > 0 && width % options.indent as usize != 0 {
                warn(
                    width + 1,
                    format!("Expected indentation of a multiple of {} spaces.", options.indent),
                );
            }
        }

        if line.ends_with(' ') || line.ends_with('\t') {
            warn(line.trim_end().chars().count() + 1, "Unexpected trailing space.".to_string());
        }
    }

    if !options.flag("eqeq") {
        if let Some((character, op)) = loose_equality(line) {
            let strict = if op == "==" { "===" } else { "!==" };
            warn(character, format!("Expected '{}' and instead saw '{}'.", strict, op));
        }
    }

    if !options.flag("evil") {
        if let Some(m) = EVAL_REGEX.find(line) {
            warn(m.start() + 1, "eval is evil.".to_string());
        }
    }

    if !options.flag("debug") {
        if let Some(m) = DEBUGGER_REGEX.find(line) {
            warn(m.start() + 1, "Unexpected 'debugger'.".to_string());
        }
    }
}

fn is_comment_continuation(line: &str) -> bool {
    line.trim_start().starts_with('*')
}

/// First `==` or `!=` that is not part of `===`, `!==`, `<=` or `>=`.
fn loose_equality(line: &str) -> Option<(usize, &'static str)> {
    let bytes = line.as_bytes();
    let mut i = 0;

    while i + 1 < bytes.len() {
        let (first, second) = (bytes[i], bytes[i + 1]);
        if second == b'=' && (first == b'=' || first == b'!') {
            if bytes.get(i + 2) == Some(&b'=') {
                i += 3;
                continue;
            }
            let prev = if i > 0 { bytes[i - 1] } else { b' ' };
            if first == b'=' && matches!(prev, b'=' | b'!' | b'<' | b'>') {
                i += 2;
                continue;
            }
            return Some((i + 1, if first == b'=' { "==" } else { "!=" }));
        }
        i += 1;
    }

    None
}

fn find_unused(lines: &[&str], scanned: &[usize], options: &LintOptions) -> Vec<UnusedName> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &line_no in scanned {
        for m in IDENTIFIER_REGEX.find_iter(lines[line_no - 1]) {
            *counts.entry(m.as_str()).or_insert(0) += 1;
        }
    }

    let mut unused = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for &line_no in scanned {
        let line = lines[line_no - 1];
        let mut declared: Vec<&str> = DECLARATION_REGEX
            .captures_iter(line)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        if !options.flag("unparam") {
            for caps in PARAMETERS_REGEX.captures_iter(line) {
                if let Some(params) = caps.get(1) {
                    declared.extend(
                        params.as_str()
                            .split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty()),
                    );
                }
            }
        }

        for name in declared {
            if seen.contains(&name) || options.predef.iter().any(|p| p == name) {
                continue;
            }
            seen.push(name);
            if counts.get(name).copied().unwrap_or(0) <= 1 {
                unused.push(UnusedName {
                    name: name.to_string(),
                    line: line_no,
                });
            }
        }
    }

    unused
}
