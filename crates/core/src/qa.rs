use crate::embeddings::Embedder;
use crate::index::LocalVectorIndex;
use crate::models::{Answer, Citation, RetrievedPassage};
use crate::preprocess::normalize_text;
use crate::traits::{AnswerProvider, VectorIndex};
use crate::AnswerError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

pub const NOT_IN_CONTEXT: &str = "answer is not available in the context";

const ANSWER_TEMPERATURE: f32 = 0.6;

/// Builds the grounded-answer prompt sent to a remote model.
pub fn build_prompt(question: &str, passages: &[RetrievedPassage]) -> String {
    let context = passages
        .iter()
        .map(|passage| passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Answer the question in as much detail as the context allows. \
         If the context does not contain the answer, reply exactly \"{NOT_IN_CONTEXT}\" \
         instead of guessing.\n\nContext:\n{context}\n\nQuestion:\n{question}\n\nAnswer:\n"
    )
}

/// Answers with the retrieved sentence that shares the most normalized
/// terms with the question.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveAnswerProvider;

impl ExtractiveAnswerProvider {
    fn best_sentence(question: &str, passages: &[RetrievedPassage]) -> Option<String> {
        let normalized = normalize_text(question);
        let terms: HashSet<&str> = normalized.split(' ').filter(|term| !term.is_empty()).collect();
        if terms.is_empty() {
            return None;
        }

        let mut best: Option<(usize, String)> = None;
        for passage in passages {
            for sentence in split_sentences(&passage.text) {
                let sentence_terms = normalize_text(sentence);
                let overlap = sentence_terms
                    .split(' ')
                    .filter(|term| terms.contains(*term))
                    .collect::<HashSet<_>>()
                    .len();

                if overlap > 0 && best.as_ref().map_or(true, |(score, _)| overlap > *score) {
                    best = Some((overlap, sentence.trim().to_string()));
                }
            }
        }

        best.map(|(_, sentence)| sentence)
    }
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

#[async_trait]
impl AnswerProvider for ExtractiveAnswerProvider {
    fn name(&self) -> &'static str {
        "extractive"
    }

    async fn answer(
        &self,
        question: &str,
        passages: &[RetrievedPassage],
    ) -> Result<String, AnswerError> {
        Ok(Self::best_sentence(question, passages).unwrap_or_else(|| NOT_IN_CONTEXT.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AnswerEndpointConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
}

impl AnswerEndpointConfig {
    /// Reads `LLM_ANSWER_ENDPOINT` and `LLM_ANSWER_API_KEY`; `None` when no
    /// endpoint is set.
    pub fn from_env() -> Result<Option<Self>, AnswerError> {
        let Some(endpoint) = non_empty_env("LLM_ANSWER_ENDPOINT") else {
            return Ok(None);
        };

        Ok(Some(Self {
            endpoint: Url::parse(&endpoint)?,
            api_key: non_empty_env("LLM_ANSWER_API_KEY"),
        }))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Serialize)]
struct AnswerRequest<'a> {
    prompt: String,
    question: &'a str,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct AnswerResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl AnswerResponse {
    fn into_text(self) -> Option<String> {
        self.answer
            .or(self.text)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// Sends the grounded prompt to a remote text-generation endpoint.
pub struct HttpAnswerProvider {
    client: Client,
    config: AnswerEndpointConfig,
}

impl HttpAnswerProvider {
    pub fn new(config: AnswerEndpointConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl AnswerProvider for HttpAnswerProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn answer(
        &self,
        question: &str,
        passages: &[RetrievedPassage],
    ) -> Result<String, AnswerError> {
        let payload = AnswerRequest {
            prompt: build_prompt(question, passages),
            question,
            temperature: ANSWER_TEMPERATURE,
        };

        let mut request = self.client.post(self.config.endpoint.clone()).json(&payload);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AnswerError::BackendResponse {
                backend: self.config.endpoint.to_string(),
                details: response.status().to_string(),
            });
        }

        let body: AnswerResponse = response.json().await?;
        body.into_text().ok_or_else(|| AnswerError::BackendResponse {
            backend: self.config.endpoint.to_string(),
            details: "response had no answer text".to_string(),
        })
    }
}

/// Retrieval plus answer generation over a loaded vector index.
pub struct DocumentQa<E, P>
where
    E: Embedder,
    P: AnswerProvider,
{
    index: LocalVectorIndex,
    embedder: E,
    provider: P,
    top_k: usize,
}

impl<E, P> DocumentQa<E, P>
where
    E: Embedder + Send + Sync,
    P: AnswerProvider + Send + Sync,
{
    pub fn new(index: LocalVectorIndex, embedder: E, provider: P, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            provider,
            top_k,
        }
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, AnswerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::EmptyQuestion);
        }

        let query_vector = self.embedder.embed(question);
        let passages: Vec<RetrievedPassage> = self
            .index
            .search(&query_vector, self.top_k)?
            .into_iter()
            .filter(|passage| passage.score > 0.0)
            .collect();

        debug!(question, passages = passages.len(), "passages retrieved");

        let text = if passages.is_empty() {
            NOT_IN_CONTEXT.to_string()
        } else {
            self.provider.answer(question, &passages).await?
        };

        info!(provider = self.provider.name(), "question answered");

        Ok(Answer {
            question: question.to_string(),
            text,
            citations: passages
                .into_iter()
                .map(|passage| Citation {
                    document_id: passage.document_id,
                    chunk_id: passage.chunk_id,
                    score: passage.score,
                })
                .collect(),
            provider: self.provider.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashedFeatureEmbedder;
    use crate::models::TextChunk;

    fn passage(text: &str) -> RetrievedPassage {
        RetrievedPassage {
            chunk_id: "chunk-0".to_string(),
            document_id: "doc.txt".to_string(),
            source_path: "/tmp/doc.txt".to_string(),
            chunk_index: 0,
            score: 0.5,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn extractive_provider_picks_overlapping_sentence() {
        let passages = vec![passage(
            "The candidate lives in Berlin. She has five years of Rust experience. Hobbies include chess.",
        )];
        let answer = ExtractiveAnswerProvider
            .answer("How many years of Rust experience?", &passages)
            .await;
        assert_eq!(
            answer.ok().as_deref(),
            Some("She has five years of Rust experience.")
        );
    }

    #[tokio::test]
    async fn extractive_provider_admits_missing_answer() {
        let passages = vec![passage("Pastry chef at a bakery.")];
        let answer = ExtractiveAnswerProvider
            .answer("kubernetes certification?", &passages)
            .await;
        assert_eq!(answer.ok().as_deref(), Some(NOT_IN_CONTEXT));
    }

    #[test]
    fn prompt_contains_context_and_question() {
        let prompt = build_prompt("Where?", &[passage("In Berlin.")]);
        assert!(prompt.contains("Context:\nIn Berlin."));
        assert!(prompt.contains("Question:\nWhere?"));
        assert!(prompt.contains(NOT_IN_CONTEXT));
    }

    #[test]
    fn response_prefers_answer_field() {
        let response: AnswerResponse =
            serde_json::from_str(r#"{"answer": " Berlin ", "text": "ignored"}"#)
                .unwrap_or(AnswerResponse { answer: None, text: None });
        assert_eq!(response.into_text().as_deref(), Some("Berlin"));

        let empty = AnswerResponse {
            answer: None,
            text: Some("  ".to_string()),
        };
        assert_eq!(empty.into_text(), None);
    }

    #[tokio::test]
    async fn document_qa_answers_with_citations() -> Result<(), Box<dyn std::error::Error>> {
        let embedder = HashedFeatureEmbedder::new(64);
        let chunks = vec![
            TextChunk {
                chunk_id: "c0".to_string(),
                document_id: "alice.txt".to_string(),
                source_path: "/tmp/alice.txt".to_string(),
                chunk_index: 0,
                text: "Alice maintains Kubernetes clusters. She is based in Lisbon.".to_string(),
            },
            TextChunk {
                chunk_id: "c1".to_string(),
                document_id: "bob.txt".to_string(),
                source_path: "/tmp/bob.txt".to_string(),
                chunk_index: 1,
                text: "Bob bakes sourdough bread.".to_string(),
            },
        ];
        let embeddings: Vec<_> = chunks.iter().map(|c| embedder.embed(&c.text)).collect();
        let mut index = LocalVectorIndex::new(64);
        index.add_chunks(&chunks, &embeddings)?;

        let qa = DocumentQa::new(index, embedder, ExtractiveAnswerProvider, 1);
        let answer = qa.ask("Who maintains Kubernetes clusters?").await?;

        assert_eq!(answer.text, "Alice maintains Kubernetes clusters.");
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].document_id, "alice.txt");
        assert_eq!(answer.provider, "extractive");

        assert!(matches!(qa.ask("   ").await, Err(AnswerError::EmptyQuestion)));
        Ok(())
    }
}
