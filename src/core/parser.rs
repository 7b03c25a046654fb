//! Parsing of `git status --short [--ignored]` output.
//!
//! This module provides [`StatusParser`] which turns raw status lines into
//! [`StatusLine`] values. It performs no I/O and keeps no state.
//!
//! # Public API
//! - [`StatusParser`]: Parser with static methods for single lines and whole outputs
//! - [`StatusLine`]: A parsed path with its index/working-tree codes
//!
//! # Supported Formats
//! - **Plain paths**: `M  src/main.rs`
//! - **Quoted paths**: `?? "file with \"quotes\".txt"` (git C-style escapes)
//! - **Renames and copies**: `R  old.txt -> new.txt`, either side optionally quoted
//! - **Directories**: `?? build/` (trailing slash dropped)

use crate::core::{
    error::{Result, StatusCacheError},
    git_status::{EntryStatus, GitStatusCode},
};
use std::path::{Component, Path};

const RENAME_ARROW: &str = " -> ";

/// One parsed status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Path relative to the repository root (or, for directory-scoped parsing,
    /// the single path component below the base directory)
    pub path: String,
    pub status: EntryStatus,
}

pub struct StatusParser;

impl StatusParser {
    /// Parse one line of short-format status output.
    ///
    /// The first character is the index status, the second the working-tree status,
    /// followed by one space and the path. When either code is a rename or copy the
    /// path is the target of the `->` arrow.
    pub fn parse_line(raw: &str) -> Result<StatusLine> {
        let line = raw.trim_end_matches(['\n', '\r']);
        let mut chars = line.chars();

        let (Some(x), Some(y), Some(separator)) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(StatusCacheError::parse_error(raw, "line too short"));
        };

        let index = GitStatusCode::from_char(x)
            .ok_or_else(|| StatusCacheError::parse_error(raw, "unknown index status"))?;
        let working_tree = GitStatusCode::from_char(y)
            .ok_or_else(|| StatusCacheError::parse_error(raw, "unknown working tree status"))?;

        if separator != ' ' {
            return Err(StatusCacheError::parse_error(
                raw,
                "expected a space after the status code",
            ));
        }

        let rest = chars.as_str();
        if rest.is_empty() {
            return Err(StatusCacheError::parse_error(raw, "missing path"));
        }

        let path = if index.has_source_path() || working_tree.has_source_path() {
            Self::rename_target(raw, rest)?
        } else {
            Self::path_token(raw, rest)?
        };

        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
            _ => path,
        };

        if path.is_empty() {
            return Err(StatusCacheError::parse_error(raw, "empty path"));
        }

        Ok(StatusLine {
            path,
            status: EntryStatus::new(index, working_tree),
        })
    }

    /// Directory-scoped variant of [`StatusParser::parse_line`].
    ///
    /// Returns `Ok(None)` when the parsed path is not strictly below `dir`; otherwise
    /// the returned path is only the first component below `dir`, which is the name
    /// a directory listing of `dir` shows for it.
    pub fn parse_line_in_dir(raw: &str, repo_root: &Path, dir: &Path) -> Result<Option<StatusLine>> {
        let line = Self::parse_line(raw)?;
        let absolute = repo_root.join(&line.path);

        let Ok(relative) = absolute.strip_prefix(dir) else {
            return Ok(None);
        };

        match relative.components().next() {
            Some(Component::Normal(name)) => Ok(Some(StatusLine {
                path: name.to_string_lossy().into_owned(),
                status: line.status,
            })),
            _ => Ok(None),
        }
    }

    /// Parse a complete status output.
    ///
    /// Malformed lines are skipped with a warning; one bad line never discards the
    /// rest of the output.
    pub fn parse_output(output: &str) -> Vec<StatusLine> {
        let mut lines = Vec::new();

        for raw in output.lines() {
            if raw.trim().is_empty() {
                continue;
            }

            match Self::parse_line(raw) {
                Ok(line) => lines.push(line),
                Err(e) => log::warn!("Skipping status line: {e}"),
            }
        }

        lines
    }

    fn rename_target(raw: &str, rest: &str) -> Result<String> {
        let target = if rest.starts_with('"') {
            let (_, after_source) = Self::unquote(raw, rest)?;
            after_source
                .strip_prefix(RENAME_ARROW)
                .ok_or_else(|| StatusCacheError::parse_error(raw, "missing rename arrow"))?
        } else {
            rest.split_once(RENAME_ARROW)
                .map(|(_, target)| target)
                .ok_or_else(|| StatusCacheError::parse_error(raw, "missing rename arrow"))?
        };

        Self::path_token(raw, target)
    }

    fn path_token(raw: &str, token: &str) -> Result<String> {
        if !token.starts_with('"') {
            return Ok(token.to_string());
        }

        let (path, trailing) = Self::unquote(raw, token)?;
        if !trailing.is_empty() {
            return Err(StatusCacheError::parse_error(
                raw,
                "unexpected text after quoted path",
            ));
        }
        Ok(path)
    }

    /// Decode a C-style quoted string starting at `token[0] == '"'`.
    /// Returns the decoded text and whatever follows the closing quote.
    fn unquote<'a>(raw: &str, token: &'a str) -> Result<(String, &'a str)> {
        let bytes = token.as_bytes();
        let mut decoded = Vec::with_capacity(bytes.len());
        let mut i = 1;

        while i < bytes.len() {
            match bytes[i] {
                b'"' => {
                    let text = String::from_utf8_lossy(&decoded).into_owned();
                    return Ok((text, &token[i + 1..]));
                }
                b'\\' => {
                    let escape = *bytes
                        .get(i + 1)
                        .ok_or_else(|| StatusCacheError::parse_error(raw, "dangling escape"))?;
                    match escape {
                        b'0'..=b'7' => {
                            let digits = bytes.get(i + 1..i + 4).ok_or_else(|| {
                                StatusCacheError::parse_error(raw, "truncated octal escape")
                            })?;
                            let mut value: u32 = 0;
                            for digit in digits {
                                if !(b'0'..=b'7').contains(digit) {
                                    return Err(StatusCacheError::parse_error(
                                        raw,
                                        "invalid octal escape",
                                    ));
                                }
                                value = value * 8 + u32::from(digit - b'0');
                            }
                            let byte = u8::try_from(value).map_err(|_| {
                                StatusCacheError::parse_error(raw, "octal escape out of range")
                            })?;
                            decoded.push(byte);
                            i += 4;
                            continue;
                        }
                        b'a' => decoded.push(0x07),
                        b'b' => decoded.push(0x08),
                        b'f' => decoded.push(0x0c),
                        b'n' => decoded.push(b'\n'),
                        b'r' => decoded.push(b'\r'),
                        b't' => decoded.push(b'\t'),
                        b'v' => decoded.push(0x0b),
                        b'"' | b'\\' => decoded.push(escape),
                        _ => {
                            return Err(StatusCacheError::parse_error(raw, "unknown escape"));
                        }
                    }
                    i += 2;
                }
                byte => {
                    decoded.push(byte);
                    i += 1;
                }
            }
        }

        Err(StatusCacheError::parse_error(raw, "unterminated quoted path"))
    }
}
