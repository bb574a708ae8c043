use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::{DirEntry, WalkDir};

use sentrag_core::chunker;
use sentrag_core::traits::{Embedder, VectorStore};
use sentrag_core::types::VectorRow;
use sentrag_core::Error;

const TEXT_EXTENSION: &str = "txt";

#[derive(Debug)]
pub struct IngestedFile {
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Outcome of a directory walk. Every visited file lands in exactly one list.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub ingested: Vec<IngestedFile>,
    pub failed: Vec<FileFailure>,
}

impl IngestReport {
    pub fn rows(&self) -> usize {
        self.ingested.iter().map(|f| f.rows).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct IngestPipeline<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    embedder: E,
    store: S,
}

impl<E, S> IngestPipeline<E, S>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(embedder: E, store: S) -> Self {
        Self { embedder, store }
    }

    /// Chunk, embed and insert one `.txt` file. Returns the number of rows
    /// inserted.
    pub fn ingest_file(&self, path: &Path) -> Result<usize> {
        let extension = path.extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default();
        if extension != TEXT_EXTENSION {
            return Err(Error::UnsupportedFileType { path: path.to_path_buf(), extension }.into());
        }

        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let chunks = chunker::chunk(&text);
        if chunks.is_empty() {
            return Ok(0);
        }

        let vectors = self
            .embedder
            .embed_batch(&chunks)
            .with_context(|| format!("failed to embed {}", path.display()))?;
        anyhow::ensure!(
            vectors.len() == chunks.len(),
            "embedder returned {} vectors for {} chunks of {}",
            vectors.len(),
            chunks.len(),
            path.display()
        );

        let name = path.to_string_lossy().into_owned();
        let rows: Vec<VectorRow> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(index, (text, vector))| VectorRow { name: name.clone(), index, text, vector })
            .collect();
        self.store
            .insert(&rows)
            .with_context(|| format!("failed to insert {} rows for {}", rows.len(), path.display()))?;
        Ok(rows.len())
    }

    /// Ingest every non-hidden file under `root`, in file-name order. A failing
    /// file is logged and recorded; the walk carries on.
    pub fn ingest_dir(&self, root: &Path) -> Result<IngestReport> {
        anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());

        let mut report = IngestReport::default();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                    tracing::warn!(path = %path.display(), error = %err, "walk error");
                    report.failed.push(FileFailure { path, error: err.into() });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            match self.ingest_file(&path) {
                Ok(rows) => {
                    tracing::info!(path = %path.display(), rows, "ingested file");
                    report.ingested.push(IngestedFile { path, rows });
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %format!("{error:#}"), "skipping file");
                    report.failed.push(FileFailure { path, error });
                }
            }
        }

        tracing::info!(
            files = report.ingested.len(),
            rows = report.rows(),
            failed = report.failed.len(),
            "directory ingest finished"
        );
        Ok(report)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}
