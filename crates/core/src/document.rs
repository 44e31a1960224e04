//! Standard documents — free-form markdown references indexed by category.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Category given to documents stored directly under the standards root.
pub const GENERAL_CATEGORY: &str = "general";

/// One indexed reference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDocument {
    /// Relative path with `/` separators and without extension, unless
    /// another file in the same directory already took that id.
    pub id: String,
    pub name: String,
    pub category: String,
    pub content: String,
}

impl StandardDocument {
    /// Build a document from its path relative to the standards root.
    pub fn from_relative_path(relative: &Path, content: String) -> Self {
        let id = document_id(relative);
        let category = relative
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| GENERAL_CATEGORY.to_string());
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = first_heading(&content).unwrap_or_else(|| title_case(&stem));
        Self {
            id,
            name,
            category,
            content,
        }
    }
}

/// Deterministic id for a relative path: components joined with `/`,
/// extension removed.
pub fn document_id(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Like [`document_id`] but keeps the extension. Used when two files in
/// one directory share a stem.
pub fn document_id_with_extension(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn first_heading(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    heading_levels(&lines)
        .iter()
        .zip(&lines)
        .find_map(|(level, line)| level.and(parse_heading(line)))
        .map(|(_, title)| title.to_string())
        .filter(|title| !title.is_empty())
}

/// Heading level of every line, `None` for body lines. Lines inside
/// ``` or ~~~ fenced code blocks are never headings.
pub fn heading_levels(lines: &[&str]) -> Vec<Option<usize>> {
    let mut fence: Option<(char, usize)> = None;
    lines
        .iter()
        .map(|line| {
            if let Some(marker) = fence_marker(line) {
                match fence {
                    None => fence = Some(marker),
                    Some((ch, len)) if marker.0 == ch && marker.1 >= len => fence = None,
                    Some(_) => {}
                }
                return None;
            }
            if fence.is_some() {
                return None;
            }
            parse_heading(line).map(|(level, _)| level)
        })
        .collect()
}

/// Fence character and run length when the line opens or closes a fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Parse an ATX markdown heading into `(level, title)`.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

/// `api-design_rules` → `Api Design Rules`.
pub fn title_case(stem: &str) -> String {
    stem.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Excerpts from one document matching a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub name: String,
    pub category: String,
    /// Number of matching lines in the whole document.
    pub match_count: usize,
    pub excerpts: Vec<String>,
}
