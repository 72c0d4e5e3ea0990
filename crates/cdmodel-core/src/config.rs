//! Configuration schema (cdmodel.toml)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name patterns left out of a staged distribution by default
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*.manifest.cdm.json",
    "*.0.6.cdm.json",
    "*.0.7.cdm.json",
    "*.0.8.cdm.json",
    "*.0.8.1.cdm.json",
    "*.0.9.cdm.json",
    "*.1.0.cdm.json",
    "*core*",
    "*office*",
    "*.git*",
    "*.jpg",
    "*.md",
];

/// Staging (packaging) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory holding the schema documents to stage
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Directory the documents are mirrored into; replaced on every run
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// fnmatch-style globs matched against entry base names (`*`, `?`, `[seq]`, `[!seq]`)
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_source() -> PathBuf {
    PathBuf::from("schemaDocuments")
}

fn default_destination() -> PathBuf {
    PathBuf::from("resources")
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            destination: default_destination(),
            ignore: default_ignore(),
        }
    }
}

impl StagingConfig {
    /// Compile the ignore patterns
    pub fn matcher(&self) -> Result<IgnoreMatcher, ConfigError> {
        IgnoreMatcher::new(&self.ignore)
    }
}

/// Compiled ignore patterns
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    patterns: Vec<(String, Regex)>,
}

impl IgnoreMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                glob_to_regex(p).map(|re| (p.to_string(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// The first pattern matching `name`, if any
    pub fn matching_pattern(&self, name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(name))
            .map(|(p, _)| p.as_str())
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.matching_pattern(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translate an fnmatch-style glob into an anchored regex
///
/// `*` matches any run, `?` one character, `[seq]` and `[!seq]` a character in
/// or not in the set (ranges like `0-9` allowed). An unterminated `[` is literal.
fn glob_to_regex(pattern: &str) -> Result<Regex, ConfigError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?s)^");

    let mut literal = String::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;

        let piece = match c {
            '*' => ".*".to_string(),
            '?' => ".".to_string(),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    let class = class_to_regex(&chars[i..end]);
                    i = end + 1;
                    class
                }
                None => {
                    literal.push(c);
                    continue;
                }
            },
            _ => {
                literal.push(c);
                continue;
            }
        };

        expr.push_str(&regex::escape(&literal));
        literal.clear();
        expr.push_str(&piece);
    }
    expr.push_str(&regex::escape(&literal));
    expr.push('$');

    Regex::new(&expr).map_err(|e| ConfigError::InvalidPattern(pattern.to_string(), e.to_string()))
}

/// Index of the `]` closing a class whose body starts at `start`
///
/// A `]` directly after `[` or `[!` belongs to the set.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn class_to_regex(body: &[char]) -> String {
    let (negated, members) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut class = String::from(if negated { "[^" } else { "[" });
    for (k, member) in members.iter().enumerate() {
        if *member == '-' && k > 0 && k + 1 < members.len() {
            class.push('-');
        } else {
            class.push_str(&regex::escape(&member.to_string()));
        }
    }
    class.push(']');
    class
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Staging settings
    #[serde(default)]
    pub staging: StagingConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            staging: StagingConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid ignore pattern '{0}': {1}")]
    InvalidPattern(String, String),
}
