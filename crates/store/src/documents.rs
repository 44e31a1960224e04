//! Document store — the standards tree indexed by category.
//!
//! Every `.md`, `.markdown` and `.txt` file below the root is indexed; the
//! category is the lower-cased name of the directory holding the file, or
//! `general` for files at the root. Unreadable files are skipped with a
//! warning so one bad file never hides the rest of the corpus.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use codeward_core::document::{self, heading_levels};
use codeward_core::io::{self, RetryPolicy};
use codeward_core::{Clock, NotFoundError, Result, SearchHit, StandardDocument};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;

const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Maximum excerpts returned per matching document.
pub const MAX_EXCERPTS_PER_DOCUMENT: usize = 3;
/// Maximum documents returned by one search.
pub const MAX_SEARCH_RESULTS: usize = 5;
/// Lines of context on each side of a match outside any heading section.
const WINDOW_LINES: usize = 3;

#[derive(Default)]
struct DocumentIndex {
    documents: BTreeMap<String, StandardDocument>,
    by_category: BTreeMap<String, Vec<String>>,
}

impl DocumentIndex {
    fn insert(&mut self, document: StandardDocument) {
        self.by_category
            .entry(document.category.clone())
            .or_default()
            .push(document.id.clone());
        self.documents.insert(document.id.clone(), document);
    }

    fn finish(&mut self) {
        for ids in self.by_category.values_mut() {
            ids.sort();
            ids.dedup();
        }
    }
}

fn is_text_document(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub struct DocumentStore {
    root: PathBuf,
    retry: RetryPolicy,
    cache: TtlCache<DocumentIndex>,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: root.into(),
            retry: RetryPolicy::default(),
            cache: TtlCache::new("documents", ttl, clock),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every indexed document, ordered by id.
    pub async fn load_all(&self) -> Result<Vec<StandardDocument>> {
        let index = self.index().await?;
        Ok(index.documents.values().cloned().collect())
    }

    /// Documents in one category, ordered by id. Matching ignores case.
    pub async fn by_category(&self, category: &str) -> Result<Vec<StandardDocument>> {
        let index = self.index().await?;
        let key = category.trim().to_lowercase();
        let ids = index
            .by_category
            .get(&key)
            .ok_or_else(|| NotFoundError::Category(category.to_string()))?;
        Ok(ids
            .iter()
            .filter_map(|id| index.documents.get(id).cloned())
            .collect())
    }

    /// Documents from the given categories, in list order then by id.
    /// Unknown categories contribute nothing.
    pub async fn in_categories(&self, categories: &[&str]) -> Result<Vec<StandardDocument>> {
        let index = self.index().await?;
        let mut selected = Vec::new();
        for category in categories {
            let Some(ids) = index.by_category.get(&category.to_lowercase()) else {
                continue;
            };
            for id in ids {
                if selected.iter().any(|d: &StandardDocument| &d.id == id) {
                    continue;
                }
                if let Some(doc) = index.documents.get(id) {
                    selected.push(doc.clone());
                }
            }
        }
        Ok(selected)
    }

    /// Sorted distinct categories.
    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(self.index().await?.by_category.keys().cloned().collect())
    }

    pub async fn get(&self, id: &str) -> Result<StandardDocument> {
        self.index()
            .await?
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| NotFoundError::Document(id.to_string()).into())
    }

    /// Case-insensitive keyword search. A blank query finds nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let index = self.index().await?;
        let mut hits: Vec<SearchHit> = index
            .documents
            .values()
            .filter_map(|doc| search_document(doc, &needle))
            .collect();
        hits.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        hits.truncate(MAX_SEARCH_RESULTS);
        debug!(query = %needle, hits = hits.len(), "Standards searched");
        Ok(hits)
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    async fn index(&self) -> Result<Arc<DocumentIndex>> {
        self.cache.get_or_load(|| self.scan()).await
    }

    async fn scan(&self) -> Result<DocumentIndex> {
        let mut index = DocumentIndex::default();
        let mut pending = vec![self.root.clone()];
        let mut skipped = 0usize;

        while let Some(dir) = pending.pop() {
            let listing = match io::list_dir(&self.retry, &dir).await {
                Ok(Some(entries)) => entries,
                Ok(None) => {
                    debug!(dir = %dir.display(), "Standards directory missing");
                    continue;
                }
                Err(e) if dir == self.root => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable standards directory");
                    skipped += 1;
                    continue;
                }
            };

            for entry in listing {
                if entry.is_dir {
                    pending.push(entry.path);
                    continue;
                }
                if !is_text_document(&entry.name) {
                    continue;
                }
                let Ok(relative) = entry.path.strip_prefix(&self.root) else {
                    continue;
                };
                match io::read_to_string(&self.retry, &entry.path).await {
                    Ok(content) => {
                        let mut doc = StandardDocument::from_relative_path(relative, content);
                        if index.documents.contains_key(&doc.id) {
                            let id = document::document_id_with_extension(relative);
                            warn!(
                                shared = %doc.id,
                                id = %id,
                                "Two standards documents share a stem, keeping the extension in the id"
                            );
                            doc.id = id;
                        }
                        index.insert(doc);
                    }
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable standards document");
                        skipped += 1;
                    }
                }
            }
        }

        index.finish();
        info!(
            documents = index.documents.len(),
            categories = index.by_category.len(),
            skipped,
            "Standards indexed"
        );
        Ok(index)
    }
}

/// Search one document for a lower-cased needle.
fn search_document(doc: &StandardDocument, needle: &str) -> Option<SearchHit> {
    let lines: Vec<&str> = doc.content.lines().collect();
    let headings = heading_levels(&lines);

    let mut match_count = 0;
    let mut excerpts: Vec<String> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains(needle) {
            continue;
        }
        match_count += 1;
        if excerpts.len() >= MAX_EXCERPTS_PER_DOCUMENT {
            continue;
        }
        let excerpt = excerpt_around(&lines, &headings, i);
        if !excerpts.contains(&excerpt) {
            excerpts.push(excerpt);
        }
    }

    (match_count > 0).then(|| SearchHit {
        document_id: doc.id.clone(),
        name: doc.name.clone(),
        category: doc.category.clone(),
        match_count,
        excerpts,
    })
}

/// The heading section enclosing line `at`, or a fixed window around it.
fn excerpt_around(lines: &[&str], headings: &[Option<usize>], at: usize) -> String {
    let section_start = (0..=at)
        .rev()
        .find_map(|j| headings[j].map(|level| (j, level)));

    let range = match section_start {
        Some((start, level)) => {
            let end = (start + 1..lines.len())
                .find(|&k| headings[k].is_some_and(|l| l <= level))
                .unwrap_or(lines.len());
            start..end
        }
        None => at.saturating_sub(WINDOW_LINES)..(at + WINDOW_LINES + 1).min(lines.len()),
    };

    lines[range].join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeward_core::SystemClock;
    use tempfile::TempDir;

    const MESSAGING: &str = "\
# Messaging Standards

General advice about asynchronous integration.

## Kafka

Use idempotent producers for Kafka topics.
Keys decide partitioning.

## RabbitMQ

Declare queues as durable.
";

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn corpus() -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "architecture/messaging.md", MESSAGING);
        write(tmp.path(), "architecture/hexagonal.md", "# Hexagonal\n\nPorts and adapters.\n");
        write(tmp.path(), "Security/owasp.md", "# OWASP\n\nValidate all input.\n");
        write(tmp.path(), "glossary.txt", "Aggregate: a consistency boundary.\n");
        write(tmp.path(), "architecture/diagram.png", "not text");
        tmp
    }

    fn store(root: &Path) -> DocumentStore {
        DocumentStore::new(root, Duration::ZERO, Arc::new(SystemClock)).with_retry(RetryPolicy::none())
    }

    #[tokio::test]
    async fn indexes_text_documents_by_category() {
        let tmp = corpus();
        let store = store(tmp.path());

        let ids: Vec<_> = store.load_all().await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            ["Security/owasp", "architecture/hexagonal", "architecture/messaging", "glossary"]
        );
        assert_eq!(
            store.categories().await.unwrap(),
            ["architecture", "general", "security"]
        );

        let glossary = store.get("glossary").await.unwrap();
        assert_eq!(glossary.category, "general");
        assert_eq!(glossary.name, "Glossary");
    }

    #[tokio::test]
    async fn category_lookup_ignores_case() {
        let tmp = corpus();
        let store = store(tmp.path());

        let docs = store.by_category("ARCHITECTURE").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "Hexagonal");

        let err = store.by_category("frontend").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn in_categories_keeps_list_order() {
        let tmp = corpus();
        let store = store(tmp.path());

        let docs = store
            .in_categories(&["security", "missing", "architecture"])
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            ["Security/owasp", "architecture/hexagonal", "architecture/messaging"]
        );
    }

    #[tokio::test]
    async fn search_returns_the_enclosing_section() {
        let tmp = corpus();
        let store = store(tmp.path());

        let hits = store.search("KAFKA").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "architecture/messaging");
        assert_eq!(hits[0].match_count, 2);
        assert_eq!(
            hits[0].excerpts,
            ["## Kafka\n\nUse idempotent producers for Kafka topics.\nKeys decide partitioning."]
        );
    }

    #[tokio::test]
    async fn blank_query_finds_nothing() {
        let tmp = corpus();
        let store = store(tmp.path());
        assert!(store.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp.path().join("standards"));
        assert!(store.load_all().await.unwrap().is_empty());
        assert!(store.categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalidate_picks_up_new_documents() {
        let tmp = corpus();
        let store = store(tmp.path());
        assert_eq!(store.load_all().await.unwrap().len(), 4);

        write(tmp.path(), "testing/pyramid.md", "# Test Pyramid\n");
        assert_eq!(store.load_all().await.unwrap().len(), 4);

        store.invalidate().await;
        assert_eq!(store.load_all().await.unwrap().len(), 5);
    }

    #[test]
    fn window_is_used_outside_sections() {
        let content = (1..=10).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        let doc = StandardDocument::from_relative_path(Path::new("notes.txt"), content);
        let hit = search_document(&doc, "line 6").unwrap();
        assert_eq!(hit.excerpts, ["line 3\nline 4\nline 5\nline 6\nline 7\nline 8\nline 9"]);
    }

    #[tokio::test]
    async fn search_ranks_by_matches_and_caps_results() {
        let tmp = TempDir::new().unwrap();
        for n in 0..8 {
            let body = (0..=n)
                .map(|i| format!("## Rule {i}\n\ncache entry {i}\n\n"))
                .collect::<String>();
            write(tmp.path(), &format!("caching/d{n}.md"), &body);
        }
        write(tmp.path(), "caching/a-tie.md", "cache once\n");
        let store = store(tmp.path());

        let hits = store.search("cache").await.unwrap();
        assert_eq!(hits.len(), MAX_SEARCH_RESULTS);
        let ranked: Vec<_> = hits.iter().map(|h| (h.document_id.as_str(), h.match_count)).collect();
        assert_eq!(
            ranked,
            [("caching/d7", 8), ("caching/d6", 7), ("caching/d5", 6), ("caching/d4", 5), ("caching/d3", 4)]
        );
        assert!(hits.iter().all(|h| h.excerpts.len() <= MAX_EXCERPTS_PER_DOCUMENT));
        assert_eq!(hits[0].excerpts.len(), MAX_EXCERPTS_PER_DOCUMENT);
        assert_eq!(hits[0].excerpts[0], "## Rule 0\n\ncache entry 0");
    }

    #[tokio::test]
    async fn equal_counts_rank_by_id() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b.md", "retry once\n");
        write(tmp.path(), "a.md", "retry once\n");
        write(tmp.path(), "c.md", "retry\nretry\n");

        let hits = store(tmp.path()).search("retry").await.unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.document_id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn shared_stems_keep_both_documents() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "security/owasp.md", "# OWASP Top 10\n");
        write(tmp.path(), "security/owasp.txt", "Plain-text checklist.\n");
        let store = store(tmp.path());

        let docs: Vec<_> = store
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();
        assert_eq!(
            docs,
            [
                ("security/owasp".to_string(), "OWASP Top 10".to_string()),
                ("security/owasp.txt".to_string(), "Owasp".to_string()),
            ]
        );
        assert_eq!(store.by_category("security").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_skips_fenced_comments() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "containerization/docker.md",
            "# Docker\n\n## Multi-stage builds\n\nKeep images small.\n\n```dockerfile\n# build stage\nFROM rust AS builder\nRUN cargo build --release\n```\n\n## Tags\n\nPin versions.\n",
        );

        let hits = store(tmp.path()).search("cargo build").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].excerpts[0].starts_with("## Multi-stage builds"));
        assert!(hits[0].excerpts[0].contains("RUN cargo build --release"));
        assert!(!hits[0].excerpts[0].contains("Pin versions"));
    }
}
