//! Corpus service
//!
//! Loads corpus files through the filesystem boundary and runs the domain
//! pipeline on them: source splitting, parsing, layout, hover and excerpts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    self, check_bar_height, excerpt, hover, layout_records, parse_document, DomainError, Hover,
    LayoutConfig, LayoutModel, Record, SourceFile,
};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::PathExt;

/// A parsed corpus file.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub path: PathBuf,
    pub source: SourceFile,
    pub records: Vec<Record>,
}

/// Outcome of validating one file of a directory.
#[derive(Debug)]
pub struct FileCheck {
    pub path: PathBuf,
    /// Number of records, or the failure
    pub result: ApplicationResult<usize>,
}

impl FileCheck {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Explicit layout values taking precedence over the configured ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOverrides {
    pub word_cap: Option<u32>,
    pub bar_height: Option<f64>,
}

/// Service for loading and analysing corpus files.
pub struct CorpusService {
    fs: Arc<dyn FileSystem>,
    corpus_dir: PathBuf,
    layout: LayoutConfig,
}

impl CorpusService {
    pub fn new(fs: Arc<dyn FileSystem>, corpus_dir: PathBuf, layout: LayoutConfig) -> Self {
        Self {
            fs,
            corpus_dir,
            layout,
        }
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Resolve a file argument: paths that do not exist as given are looked
    /// up in the corpus directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.fs.exists(path) {
            path.to_path_buf()
        } else {
            self.corpus_dir.join(path)
        }
    }

    /// Read and split a corpus file.
    #[instrument(level = "debug", skip(self))]
    pub fn read_source(&self, path: &Path) -> ApplicationResult<SourceFile> {
        let path = self.resolve(path);
        if !self.fs.is_file(&path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let raw = self
            .fs
            .read_to_string(&path)
            .with_path_context("read corpus file", &path)?;
        SourceFile::parse(&raw).map_err(|e| ApplicationError::in_file(&path, e))
    }

    /// Read, split and parse a corpus file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Corpus> {
        let source = self.read_source(path)?;
        let path = self.resolve(path);
        let records = parse_document(&source.body)
            .map_err(|e| ApplicationError::in_file(&path, DomainError::Parse(e)))?;
        debug!(records = records.len(), path = %path.display(), "corpus loaded");
        Ok(Corpus {
            path,
            source,
            records,
        })
    }

    /// Lay out every record of `corpus` with a shared effective cap.
    pub fn layout(
        &self,
        corpus: &Corpus,
        overrides: LayoutOverrides,
    ) -> ApplicationResult<Vec<Result<LayoutModel, DomainError>>> {
        let mut config = self.layout.clone();
        if let Some(cap) = overrides.word_cap {
            config.word_cap = cap;
        }
        if let Some(h) = overrides.bar_height {
            config.bar_height = check_bar_height(h)?;
        }
        Ok(layout_records(&corpus.records, &config))
    }

    /// Hover view of a node of record `record` (1-based).
    ///
    /// `node_id` selects the node by id; None selects the root.
    pub fn hover(
        &self,
        corpus: &Corpus,
        record: usize,
        node_id: Option<u64>,
        word_index: Option<usize>,
    ) -> ApplicationResult<Hover> {
        let not_found = |what: String| ApplicationError::OperationFailed {
            context: format!("{what} in {}", corpus.path.display()),
            source: Box::new(std::io::Error::new(std::io::ErrorKind::NotFound, "no such node")),
        };
        let rec = record
            .checked_sub(1)
            .and_then(|i| corpus.records.get(i))
            .ok_or_else(|| not_found(format!("record {record} not found")))?;
        let tree = &rec.tree;
        let node = match node_id {
            Some(id) => tree
                .find_by_id(id)
                .ok_or_else(|| not_found(format!("node {id} not found in record {record}")))?,
            None => tree.root(),
        };
        hover(tree, node, word_index, &self.layout.registry)
            .ok_or_else(|| not_found(format!("node {node:?} not found")))
    }

    pub fn excerpt(&self, corpus: &Corpus) -> Vec<String> {
        excerpt(&corpus.records)
    }

    /// Validate every corpus file below `dir` in parallel.
    ///
    /// Results come back in path order.
    #[instrument(level = "debug", skip(self))]
    pub fn check_dir(&self, dir: &Path) -> ApplicationResult<Vec<FileCheck>> {
        let dir = self.resolve(dir);
        if !self.fs.is_dir(&dir) {
            return Err(ApplicationError::NotADirectory(dir));
        }
        let files = self
            .fs
            .list_files(&dir)
            .with_path_context("list corpus directory", &dir)?
            .into_iter()
            .filter(|p| p.is_corpus_file())
            .collect_vec();
        debug!(files = files.len(), "checking corpus files");

        Ok(files
            .into_par_iter()
            .map(|path| {
                let result = self.load(&path).map(|c| c.records.len());
                FileCheck { path, result }
            })
            .collect())
    }
}

impl Corpus {
    /// Largest subtree word count over all records.
    pub fn longest(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.tree.root_data().w_tree_count)
            .max()
            .unwrap_or(0)
    }

    pub fn effective_word_cap(&self, cap: u32) -> u32 {
        domain::effective_word_cap(cap, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use std::fs;
    use tempfile::TempDir;

    const GOOD: &str = "Work: Test\n###\n The cat sat.\n(IC1The cat sat.\n)\n";

    fn service(dir: &Path) -> CorpusService {
        CorpusService::new(
            Arc::new(RealFileSystem),
            dir.to_path_buf(),
            LayoutConfig::default(),
        )
    }

    #[test]
    fn given_relative_name_when_loading_then_resolves_in_corpus_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), GOOD).unwrap();

        let corpus = service(tmp.path()).load(Path::new("a.txt")).unwrap();

        assert_eq!(corpus.records.len(), 1);
        assert_eq!(corpus.source.get("Work"), Some("Test"));
        assert_eq!(corpus.path, tmp.path().join("a.txt"));
        assert_eq!(corpus.longest(), 3);
    }

    #[test]
    fn given_missing_file_when_loading_then_operation_failed() {
        let tmp = TempDir::new().unwrap();
        let err = service(tmp.path()).load(Path::new("nope.txt")).unwrap_err();
        assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    }

    #[test]
    fn given_bad_notation_when_loading_then_reports_file_and_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.txt");
        fs::write(&path, "###\nThe cat sat.\n(IC1The cat sat.\n").unwrap();

        let err = service(tmp.path()).load(&path).unwrap_err();

        assert!(matches!(err.domain(), Some(DomainError::Parse(_))));
        assert!(err.to_string().contains("Check parentheses pairs"));
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }
}
