use crate::config::{RankerConfig, DEFAULT_THRESHOLD_RATIO};
use crate::models::{Corpus, MatchTier, RankedDocument, RankingOutcome};
use crate::nlp::NlpResources;
use crate::preprocess::normalize_text;
use crate::skills::SkillVocabulary;
use crate::tfidf::{cosine_similarity, TfidfVectorizer};
use std::collections::BTreeSet;
use tracing::debug;

/// Ranks candidate documents against a query and assigns match tiers.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    skills: SkillVocabulary,
    threshold_ratio: f64,
    double_stop_word_filter: bool,
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self {
            skills: SkillVocabulary::default(),
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            double_stop_word_filter: true,
        }
    }
}

impl RelevanceScorer {
    pub fn new(skills: SkillVocabulary, threshold_ratio: f64, double_stop_word_filter: bool) -> Self {
        Self {
            skills,
            threshold_ratio,
            double_stop_word_filter,
        }
    }

    pub fn from_config(config: &RankerConfig) -> Self {
        Self::new(
            config.skill_vocabulary(),
            config.threshold_ratio,
            config.double_stop_word_filter,
        )
    }

    pub fn rank(&self, query: &str, corpus: &Corpus) -> RankingOutcome {
        if corpus.is_empty() {
            return RankingOutcome::Ranked(Vec::new());
        }

        let normalized_query = normalize_text(query);
        let normalized_documents: Vec<(&str, String)> = corpus
            .iter()
            .map(|(document_id, text)| (document_id.as_str(), normalize_text(text)))
            .collect();

        let mut texts = Vec::with_capacity(normalized_documents.len() + 1);
        texts.push(normalized_query.as_str());
        texts.extend(normalized_documents.iter().map(|(_, text)| text.as_str()));

        let vectorizer = if self.double_stop_word_filter {
            TfidfVectorizer::with_stop_words(NlpResources::global().vectorizer_stop_words())
        } else {
            TfidfVectorizer::new()
        };
        let matrix = vectorizer.fit_transform(&texts);

        debug!(
            documents = corpus.len(),
            vocabulary = matrix.vocabulary.len(),
            "term-weight matrix built"
        );

        let query_row = &matrix.rows[0];
        let scores: Vec<f64> = matrix.rows[1..]
            .iter()
            .map(|row| cosine_similarity(query_row, row))
            .collect();

        if scores.iter().all(|score| *score == 0.0) {
            debug!("no document shares vocabulary with the query");
            return RankingOutcome::NoRelevantFiles;
        }

        let highest = scores.iter().copied().fold(f64::MIN, f64::max);
        let threshold = self.threshold_ratio * highest;
        let query_skills = self.skills.extract(&normalized_query);

        let mut ranked: Vec<RankedDocument> = normalized_documents
            .iter()
            .zip(scores)
            .map(|((document_id, text), score)| RankedDocument {
                document_id: (*document_id).to_string(),
                score,
                tier: self.classify(score, threshold, text, &query_skills),
            })
            .collect();

        ranked.sort_by(|left, right| {
            right
                .score
                .total_cmp(&left.score)
                .then_with(|| left.document_id.cmp(&right.document_id))
        });

        debug!(highest, threshold, ranked = ranked.len(), "documents ranked");
        RankingOutcome::Ranked(ranked)
    }

    fn classify(
        &self,
        score: f64,
        threshold: f64,
        normalized_text: &str,
        query_skills: &BTreeSet<String>,
    ) -> MatchTier {
        if score >= threshold {
            return MatchTier::Match;
        }

        let document_skills = self.skills.extract(normalized_text);
        if document_skills.intersection(query_skills).next().is_some() {
            MatchTier::PartialMatch
        } else {
            MatchTier::NoMatch
        }
    }
}
