//! # Glob Pattern Module / Glob 模式模块
//!
//! Filter patterns used by trigger rules for paths, branches and tags,
//! compiled with the `glob` crate.
//!
//! 触发器规则用于路径、分支和标签的过滤模式，由 `glob` crate 编译。
//!
//! ## Syntax / 语法
//!
//! - `*` matches any run of characters except `/`
//! - `**` as a whole component matches any run of characters, including `/`
//! - `**/` matches zero or more whole directories
//! - `?` matches a single character except `/`
//! - `[abc]`, `[a-z]`, `[!x]` match a character class
//! - `\` escapes the next character outside a class

use glob::MatchOptions;

use crate::core::error::ConfigError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled filter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    inner: glob::Pattern,
    has_separator: bool,
}

impl Pattern {
    /// Compiles a pattern, rejecting unclosed classes and trailing escapes.
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            message: message.to_string(),
        };

        let translated =
            translate_escapes(source).ok_or_else(|| invalid("trailing escape character"))?;
        let inner = glob::Pattern::new(&translated).map_err(|e| invalid(e.msg))?;

        Ok(Self {
            source: source.to_string(),
            inner,
            has_separator: source.contains('/'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches the whole of `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.inner.matches_with(text, MATCH_OPTIONS)
    }

    /// Matches a repository path. A pattern without `/` is also tried
    /// against the path's file name.
    pub fn matches_path(&self, path: &str) -> bool {
        let path = path.trim_start_matches("./");
        if self.matches(path) {
            return true;
        }
        if !self.has_separator {
            if let Some((_, file_name)) = path.rsplit_once('/') {
                return self.matches(file_name);
            }
        }
        false
    }
}

/// Rewrites `\c` into the `glob` form of a literal `c`. `None` on a trailing `\`.
fn translate_escapes(source: &str) -> Option<String> {
    let mut translated = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            translated.push(c);
            continue;
        }
        let escaped = chars.next()?;
        if matches!(escaped, '*' | '?' | '[' | ']') {
            translated.push('[');
            translated.push(escaped);
            translated.push(']');
        } else {
            translated.push(escaped);
        }
    }
    Some(translated)
}

/// A list of patterns; matches when any member does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(sources: &[S]) -> Result<Self, ConfigError> {
        let patterns = sources
            .iter()
            .map(|s| Pattern::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(text))
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches_path(path))
    }
}
