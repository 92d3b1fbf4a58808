use crate::{AnswerError, IndexError, RetrievedPassage, TextChunk};
use async_trait::async_trait;

pub trait VectorIndex {
    fn add_chunks(&mut self, chunks: &[TextChunk], embeddings: &[Vec<f32>]) -> Result<(), IndexError>;

    fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<RetrievedPassage>, IndexError>;
}

#[async_trait]
pub trait AnswerProvider {
    fn name(&self) -> &'static str;

    async fn answer(
        &self,
        question: &str,
        passages: &[RetrievedPassage],
    ) -> Result<String, AnswerError>;
}
