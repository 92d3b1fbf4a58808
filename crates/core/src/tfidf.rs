//! Term-frequency × inverse-document-frequency weighting.
//!
//! Tokens are runs of two or more word characters. Vocabulary columns are
//! ordered lexicographically. Inverse document frequency is smoothed as
//! `ln((1 + n) / (1 + df)) + 1` and every row is L2-normalised, so the dot
//! product of two rows is their cosine similarity.

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    TOKEN_PATTERN.get_or_init(|| {
        // The pattern is a literal; failure here is a programming error.
        Regex::new(r"\b\w\w+\b").unwrap_or_else(|error| panic!("invalid token pattern: {error}"))
    })
}

#[derive(Debug, Clone, Default)]
pub struct TermWeightMatrix {
    pub vocabulary: BTreeMap<String, usize>,
    pub rows: Vec<Vec<f64>>,
}

impl TermWeightMatrix {
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer<'a> {
    stop_words: Option<&'a HashSet<&'static str>>,
}

impl<'a> TfidfVectorizer<'a> {
    pub fn new() -> Self {
        Self { stop_words: None }
    }

    pub fn with_stop_words(stop_words: &'a HashSet<&'static str>) -> Self {
        Self {
            stop_words: Some(stop_words),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        token_pattern()
            .find_iter(&lowered)
            .map(|found| found.as_str())
            .filter(|token| {
                self.stop_words
                    .map_or(true, |stop_words| !stop_words.contains(*token))
            })
            .map(str::to_string)
            .collect()
    }

    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> TermWeightMatrix {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|document| self.tokenize(document.as_ref()))
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let vocabulary: BTreeMap<String, usize> = document_frequency
            .keys()
            .enumerate()
            .map(|(column, term)| ((*term).to_string(), column))
            .collect();

        let total = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .values()
            .map(|df| ((1.0 + total) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: HashMap<usize, f64> = HashMap::new();
                for token in tokens {
                    if let Some(column) = vocabulary.get(token) {
                        *counts.entry(*column).or_insert(0.0) += 1.0;
                    }
                }

                let mut row = vec![0.0; vocabulary.len()];
                for (column, count) in counts {
                    row[column] = count * idf[column];
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        TermWeightMatrix { vocabulary, rows }
    }
}

pub fn l2_normalize(vector: &mut [f64]) {
    let magnitude = vector.iter().map(|value| value * value).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Cosine similarity of two equally sized vectors; zero when either is all zeros.
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> f64 {
    let dot: f64 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_norm = left.iter().map(|value| value * value).sum::<f64>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f64>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        0.0
    } else {
        dot / (left_norm * right_norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_character_tokens_are_ignored() {
        let vectorizer = TfidfVectorizer::new();
        assert_eq!(vectorizer.tokenize("a b go rust"), vec!["go", "rust"]);
    }

    #[test]
    fn vectorizer_stop_words_are_filtered() {
        let stop_words: HashSet<&'static str> = ["system"].into_iter().collect();
        let vectorizer = TfidfVectorizer::with_stop_words(&stop_words);
        assert_eq!(vectorizer.tokenize("system design"), vec!["design"]);
    }

    #[test]
    fn vocabulary_is_sorted_and_rows_are_unit_length() {
        let matrix = TfidfVectorizer::new().fit_transform(&["rust python", "python java"]);
        let columns: Vec<&str> = matrix.vocabulary.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["java", "python", "rust"]);

        for row in &matrix.rows {
            let norm = row.iter().map(|value| value * value).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rare_terms_outweigh_common_terms() {
        let matrix = TfidfVectorizer::new().fit_transform(&["rust python", "python java"]);
        let row = matrix.row(0).unwrap_or_default();
        let rust = matrix.vocabulary["rust"];
        let python = matrix.vocabulary["python"];
        assert!(row[rust] > row[python]);
    }

    #[test]
    fn empty_documents_produce_zero_rows() {
        let matrix = TfidfVectorizer::new().fit_transform(&["", "rust"]);
        assert!(matrix.rows[0].iter().all(|value| *value == 0.0));

        let empty = TfidfVectorizer::new().fit_transform(&["", ""]);
        assert!(empty.vocabulary.is_empty());
        assert!(empty.rows.iter().all(Vec::is_empty));
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
    }
}
