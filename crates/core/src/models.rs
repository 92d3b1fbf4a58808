use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Document id (filename) to raw extracted text.
pub type Corpus = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub document_id: String,
    pub document_title: String,
    pub source_path: String,
    pub checksum: String,
    pub ingested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MatchTier {
    Match,
    PartialMatch,
    NoMatch,
}

impl MatchTier {
    pub fn label(self) -> &'static str {
        match self {
            MatchTier::Match => "Match",
            MatchTier::PartialMatch => "Partial Match",
            MatchTier::NoMatch => "No Match",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedDocument {
    pub document_id: String,
    pub score: f64,
    pub tier: MatchTier,
}

/// Result of ranking a corpus against a query.
///
/// `NoRelevantFiles` is returned when no document shares any weighted term
/// with the query; it is distinct from an empty ranking, which only happens
/// for an empty corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", content = "documents", rename_all = "snake_case")]
pub enum RankingOutcome {
    Ranked(Vec<RankedDocument>),
    NoRelevantFiles,
}

impl RankingOutcome {
    pub fn documents(&self) -> &[RankedDocument] {
        match self {
            RankingOutcome::Ranked(documents) => documents,
            RankingOutcome::NoRelevantFiles => &[],
        }
    }

    pub fn is_no_relevant_files(&self) -> bool {
        matches!(self, RankingOutcome::NoRelevantFiles)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub source_path: String,
    pub chunk_index: u64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub chunk_id: String,
    pub document_id: String,
    pub source_path: String,
    pub chunk_index: u64,
    pub score: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub chunk_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub text: String,
    pub citations: Vec<Citation>,
    pub provider: String,
}
