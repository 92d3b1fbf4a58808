//! Local vector-index cache for document question answering.
//!
//! The index lives in memory and is persisted as a single JSON file under
//! the configured index directory. Rebuilding replaces the file.

use crate::chunking::{build_chunks, ChunkingConfig};
use crate::config::QaOptions;
use crate::embeddings::Embedder;
use crate::ingest::CorpusReport;
use crate::models::{RetrievedPassage, TextChunk};
use crate::traits::VectorIndex;
use crate::IndexError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const INDEX_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalVectorIndex {
    dimensions: usize,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl LocalVectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            built_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE_NAME)
    }

    pub fn save(&self, dir: &Path) -> Result<PathBuf, IndexError> {
        fs::create_dir_all(dir)?;
        let path = Self::index_path(dir);
        fs::write(&path, serde_json::to_vec(self)?)?;
        info!(path = %path.display(), chunks = self.entries.len(), "vector index saved");
        Ok(path)
    }

    pub fn load(dir: &Path) -> Result<Self, IndexError> {
        let path = Self::index_path(dir);
        if !path.is_file() {
            return Err(IndexError::NotFound(path.display().to_string()));
        }
        let bytes = fs::read(&path)?;
        let index: LocalVectorIndex = serde_json::from_slice(&bytes)?;
        debug!(path = %path.display(), chunks = index.entries.len(), "vector index loaded");
        Ok(index)
    }
}

impl VectorIndex for LocalVectorIndex {
    fn add_chunks(&mut self, chunks: &[TextChunk], embeddings: &[Vec<f32>]) -> Result<(), IndexError> {
        if chunks.len() != embeddings.len() {
            return Err(IndexError::InvalidArgument(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        if let Some(bad) = embeddings.iter().find(|embedding| embedding.len() != self.dimensions) {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }

        self.entries.extend(
            chunks
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexEntry {
                    chunk: chunk.clone(),
                    embedding: embedding.clone(),
                }),
        );
        Ok(())
    }

    fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<RetrievedPassage>, IndexError> {
        if query_vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query_vector.len(),
            });
        }

        let mut scored: Vec<(f64, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine(query_vector, &entry.embedding), entry))
            .collect();

        scored.sort_by(|(left_score, left), (right_score, right)| {
            right_score
                .total_cmp(left_score)
                .then_with(|| left.chunk.chunk_index.cmp(&right.chunk.chunk_index))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, entry)| RetrievedPassage {
                chunk_id: entry.chunk.chunk_id.clone(),
                document_id: entry.chunk.document_id.clone(),
                source_path: entry.chunk.source_path.clone(),
                chunk_index: entry.chunk.chunk_index,
                score,
                text: entry.chunk.text.clone(),
            })
            .collect())
    }
}

fn cosine(left: &[f32], right: &[f32]) -> f64 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();
    if left_norm == 0.0 || right_norm == 0.0 {
        0.0
    } else {
        f64::from(dot / (left_norm * right_norm))
    }
}

/// Chunks and embeds every loaded document of a corpus into a fresh index.
pub fn build_index<E: Embedder>(
    report: &CorpusReport,
    options: &QaOptions,
    embedder: &E,
) -> Result<LocalVectorIndex, IndexError> {
    let config = ChunkingConfig::from(options);
    let mut index = LocalVectorIndex::new(embedder.dimensions());
    let mut cursor = 0u64;

    for document in &report.documents {
        let Some(text) = report.corpus.get(&document.document_id) else {
            continue;
        };

        let (chunks, next_cursor) = build_chunks(document, text, config, cursor)?;
        cursor = next_cursor;

        let embeddings: Vec<Vec<f32>> = chunks
            .iter()
            .map(|chunk| embedder.embed(&chunk.text))
            .collect();
        index.add_chunks(&chunks, &embeddings)?;

        debug!(document_id = %document.document_id, chunks = chunks.len(), "document indexed");
    }

    info!(documents = report.documents.len(), chunks = index.len(), "vector index built");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashedFeatureEmbedder;
    use crate::ingest::load_corpus_best_effort;
    use tempfile::tempdir;

    fn chunk(index: u64, text: &str) -> TextChunk {
        TextChunk {
            chunk_id: format!("chunk-{index}"),
            document_id: "doc".to_string(),
            source_path: "/tmp/doc.txt".to_string(),
            chunk_index: index,
            text: text.to_string(),
        }
    }

    #[test]
    fn search_returns_best_passages_first() -> Result<(), IndexError> {
        let embedder = HashedFeatureEmbedder::new(64);
        let chunks = vec![
            chunk(0, "pastry chef at a bakery"),
            chunk(1, "rust services on kubernetes"),
            chunk(2, "gardening tips"),
        ];
        let embeddings: Vec<_> = chunks.iter().map(|c| embedder.embed(&c.text)).collect();

        let mut index = LocalVectorIndex::new(64);
        index.add_chunks(&chunks, &embeddings)?;

        let hits = index.search(&embedder.embed("kubernetes rust"), 2)?;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "chunk-1");
        assert!(hits[0].score >= hits[1].score);
        Ok(())
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut index = LocalVectorIndex::new(8);
        let result = index.add_chunks(&[chunk(0, "x")], &[vec![0.0; 4]]);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch { expected: 8, actual: 4 })
        ));
        assert!(index.search(&[0.0; 3], 1).is_err());
    }

    #[test]
    fn missing_index_reports_not_found() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        assert!(matches!(
            LocalVectorIndex::load(dir.path()),
            Err(IndexError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn built_index_round_trips_through_disk() -> Result<(), Box<dyn std::error::Error>> {
        let docs = tempdir()?;
        std::fs::write(docs.path().join("a.txt"), "Rust engineer.\n\nBuilds storage engines.")?;
        std::fs::write(docs.path().join("b.txt"), "Pastry chef.")?;
        let report = load_corpus_best_effort(docs.path())?;

        let embedder = HashedFeatureEmbedder::new(32);
        let index = build_index(&report, &QaOptions::default(), &embedder)?;
        assert_eq!(index.len(), 2);

        let cache = tempdir()?;
        index.save(cache.path())?;
        let loaded = LocalVectorIndex::load(cache.path())?;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimensions(), 32);

        let hits = loaded.search(&embedder.embed("storage engines"), 1)?;
        assert_eq!(hits[0].document_id, "a.txt");
        Ok(())
    }
}
