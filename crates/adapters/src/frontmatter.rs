// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The frontmatter metadata writer.
//!
//! This is the single direct task-file write the engine performs, and it
//! is deliberately narrow: only the sync metadata keys are touched, every
//! other frontmatter line is carried through byte-for-byte, and the body
//! below the closing sentinel is never rewritten.
//!
//! The block is the text between the first and second `---` lines at the
//! top of the file. Editing is line-surgical: foreign entries keep their
//! raw lines (quoted strings, folded/literal scalars, flow arrays and
//! all); the engine's own keys are re-emitted at the end of the block.

use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Frontmatter keys owned by the engine. Everything else is preserved.
pub const OWNED_KEYS: [&str; 4] = ["remote_key", "remote_url", "last_sync", "sync_state"];

/// Errors from frontmatter operations.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed frontmatter in {path}: {message}")]
    Malformed { path: String, message: String },
}

/// The engine-owned metadata. `None` removes the key on write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncMetadata {
    pub remote_key: Option<String>,
    pub remote_url: Option<String>,
    pub last_sync: Option<String>,
    pub sync_state: Option<String>,
}

impl SyncMetadata {
    fn pairs(&self) -> [(&'static str, Option<&String>); 4] {
        [
            ("remote_key", self.remote_key.as_ref()),
            ("remote_url", self.remote_url.as_ref()),
            ("last_sync", self.last_sync.as_ref()),
            ("sync_state", self.sync_state.as_ref()),
        ]
    }
}

/// Read the engine's metadata keys from a task file.
pub fn read_sync_metadata(path: &Path) -> Result<SyncMetadata, FrontmatterError> {
    let content = fs::read_to_string(path).map_err(|source| FrontmatterError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let values = parse_block_values(&content, path)?;
    let get = |key: &str| values.get(key).map(|v| v.as_scalar());
    Ok(SyncMetadata {
        remote_key: get("remote_key"),
        remote_url: get("remote_url"),
        last_sync: get("last_sync"),
        sync_state: get("sync_state"),
    })
}

/// Write the engine's metadata keys into a task file, atomically.
pub fn write_sync_metadata(path: &Path, meta: &SyncMetadata) -> Result<(), FrontmatterError> {
    let content = fs::read_to_string(path).map_err(|source| FrontmatterError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let updated = apply_metadata(&content, meta, path)?;
    if updated == content {
        return Ok(());
    }

    let tmp = path.with_extension("md.tmp");
    fs::write(&tmp, &updated).map_err(|source| FrontmatterError::Io {
        path: tmp.display().to_string(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| FrontmatterError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// A parsed frontmatter value, for reads only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FmValue {
    Scalar(String),
    List(Vec<String>),
}

impl FmValue {
    fn as_scalar(&self) -> String {
        match self {
            FmValue::Scalar(s) => s.clone(),
            FmValue::List(items) => items.join(", "),
        }
    }
}

struct Block<'a> {
    /// Lines between the sentinels, verbatim.
    lines: Vec<&'a str>,
    /// Everything after the closing sentinel line, verbatim.
    body: &'a str,
}

fn is_sentinel(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Split the file into its frontmatter block and body. `None` when the
/// file has no block at all.
fn split_block<'a>(content: &'a str, path: &Path) -> Result<Option<Block<'a>>, FrontmatterError> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_sentinel(first.trim_end_matches('\n')) {
        return Ok(None);
    }

    let mut block_lines = Vec::new();
    let mut offset = first.len();
    for line in lines {
        let stripped = line.trim_end_matches('\n');
        if is_sentinel(stripped) {
            offset += line.len();
            return Ok(Some(Block {
                lines: block_lines,
                body: &content[offset..],
            }));
        }
        block_lines.push(stripped);
        offset += line.len();
    }

    Err(FrontmatterError::Malformed {
        path: path.display().to_string(),
        message: "opening --- without a closing ---".to_string(),
    })
}

/// Does this line start a new top-level entry? Returns the key.
fn entry_key(line: &str) -> Option<&str> {
    if line.starts_with(' ') || line.starts_with('\t') {
        return None;
    }
    let (key, _) = line.split_once(':')?;
    let key = key.trim_end();
    if key.is_empty()
        || key
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
    {
        return None;
    }
    Some(key)
}

/// Parse the block into key → value for reads. Foreign syntax that the
/// reader does not model (anchors, nested maps) degrades to a raw scalar
/// of its first line; the writer never re-serializes foreign entries so
/// nothing is lost.
fn parse_block_values(
    content: &str,
    path: &Path,
) -> Result<IndexMap<String, FmValue>, FrontmatterError> {
    let mut values = IndexMap::new();
    let Some(block) = split_block(content, path)? else {
        return Ok(values);
    };

    let mut i = 0;
    while i < block.lines.len() {
        let line = block.lines[i];
        let Some(key) = entry_key(line) else {
            i += 1;
            continue;
        };
        let rest = line
            .split_once(':')
            .map(|(_, r)| r.trim())
            .unwrap_or_default();

        // Collect this entry's continuation lines
        let mut continuation = Vec::new();
        let mut j = i + 1;
        while j < block.lines.len() && entry_key(block.lines[j]).is_none() {
            continuation.push(block.lines[j]);
            j += 1;
        }

        let value = parse_value(rest, &continuation);
        values.insert(key.to_string(), value);
        i = j;
    }
    Ok(values)
}

fn parse_value(rest: &str, continuation: &[&str]) -> FmValue {
    match rest {
        // Folded scalar: continuation lines joined with spaces
        ">" | ">-" => FmValue::Scalar(join_block_scalar(continuation, ' ', rest == ">")),
        // Literal scalar: continuation lines joined with newlines
        "|" | "|-" => FmValue::Scalar(join_block_scalar(continuation, '\n', rest == "|")),
        _ if rest.starts_with('[') && rest.ends_with(']') => {
            let inner = &rest[1..rest.len() - 1];
            FmValue::List(
                split_flow_items(inner)
                    .into_iter()
                    .map(|item| unquote(item.trim()))
                    .filter(|item| !item.is_empty())
                    .collect(),
            )
        }
        _ => FmValue::Scalar(unquote(rest)),
    }
}

fn join_block_scalar(lines: &[&str], sep: char, keep_trailing_newline: bool) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut out = lines
        .iter()
        .map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join(&sep.to_string());
    if keep_trailing_newline && !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Split flow-array items on commas that are outside quotes.
fn split_flow_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut in_quote: Option<char> = None;
    for (idx, ch) in inner.char_indices() {
        match (ch, in_quote) {
            ('"' | '\'', None) => in_quote = Some(ch),
            (q, Some(open)) if q == open => in_quote = None,
            (',', None) => {
                items.push(&inner[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(&inner[start..]);
    items
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => {}
                }
            } else {
                out.push(ch);
            }
        }
        return out;
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].replace("''", "'");
    }
    raw.to_string()
}

/// Characters that force quoting when serializing an owned value.
fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value.starts_with('-')
        || value.starts_with('?')
        || value.starts_with(' ')
        || value.ends_with(' ')
        || value
            .chars()
            .any(|c| ":[]{}#&*!|>'\"".contains(c) || c == '\n')
}

fn serialize_scalar(value: &str) -> String {
    if !needs_quoting(value) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Apply the metadata to the file content, returning the new content.
///
/// Owned keys are re-emitted (in a fixed order) at the end of the block;
/// all other lines pass through verbatim. A file without a block gets
/// one; a file whose block carries none of our keys and no values to add
/// comes back unchanged.
fn apply_metadata(
    content: &str,
    meta: &SyncMetadata,
    path: &Path,
) -> Result<String, FrontmatterError> {
    let block = split_block(content, path)?;

    // Nothing to write and no block to clean up: leave the file alone.
    if block.is_none() && meta.pairs().iter().all(|(_, v)| v.is_none()) {
        return Ok(content.to_string());
    }

    let mut kept: Vec<&str> = Vec::new();
    let body: String;
    match &block {
        Some(block) => {
            let mut i = 0;
            while i < block.lines.len() {
                let line = block.lines[i];
                let key = entry_key(line);
                // Skip owned entries (and their continuation lines)
                let owned = key.map(|k| OWNED_KEYS.contains(&k)).unwrap_or(false);
                let mut j = i + 1;
                while j < block.lines.len() && entry_key(block.lines[j]).is_none() {
                    j += 1;
                }
                if !owned {
                    kept.extend(&block.lines[i..j]);
                }
                i = j;
            }
            body = block.body.to_string();
        }
        None => {
            body = content.to_string();
        }
    }

    let mut out = String::with_capacity(content.len() + 128);
    out.push_str("---\n");
    for line in &kept {
        out.push_str(line);
        out.push('\n');
    }
    for (key, value) in meta.pairs() {
        if let Some(value) = value {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&serialize_scalar(value));
            out.push('\n');
        }
    }
    out.push_str("---\n");
    // A brand-new block sits above the original content; an existing
    // body is appended exactly as it was.
    out.push_str(&body);
    Ok(out)
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
