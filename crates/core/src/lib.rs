pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod models;
pub mod nlp;
pub mod preprocess;
pub mod qa;
pub mod ranking;
pub mod skills;
pub mod tfidf;
pub mod traits;

pub use chunking::{build_chunks, normalize_whitespace, split_text, ChunkingConfig};
pub use config::{QaOptions, RankerConfig, DEFAULT_THRESHOLD_RATIO};
pub use embeddings::{Embedder, HashedFeatureEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{AnswerError, ConfigError, ExtractError, IndexError};
pub use extractor::{
    extract_document_text, is_supported, DocxTextExtractor, PageText, PdfTextExtractor,
    PlainTextExtractor, TextExtractor, SUPPORTED_EXTENSIONS,
};
pub use index::{build_index, LocalVectorIndex};
pub use ingest::{discover_documents, load_corpus_best_effort, CorpusReport, SkippedDocument};
pub use models::{
    Answer, Citation, Corpus, DocumentFingerprint, MatchTier, RankedDocument, RankingOutcome,
    RetrievedPassage, TextChunk,
};
pub use nlp::NlpResources;
pub use preprocess::normalize_text;
pub use qa::{
    AnswerEndpointConfig, DocumentQa, ExtractiveAnswerProvider, HttpAnswerProvider, NOT_IN_CONTEXT,
};
pub use ranking::RelevanceScorer;
pub use skills::{SkillVocabulary, DEFAULT_SKILLS};
pub use tfidf::{cosine_similarity, TermWeightMatrix, TfidfVectorizer};
pub use traits::{AnswerProvider, VectorIndex};
