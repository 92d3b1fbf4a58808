use crate::preprocess::normalize_text;
use std::collections::BTreeSet;

/// Skill labels matched when no vocabulary is configured.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "rust",
    "sql",
    "machine learning",
    "deep learning",
    "data analysis",
    "data science",
    "natural language processing",
    "computer vision",
    "statistics",
    "tensorflow",
    "pytorch",
    "excel",
    "tableau",
    "power bi",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "linux",
    "react",
    "html",
    "css",
    "project management",
    "communication",
    "leadership",
];

#[derive(Debug, Clone)]
struct SkillPattern {
    label: String,
    pattern: String,
}

/// Closed skill vocabulary matched by substring against normalized text.
///
/// Labels are normalized the same way as documents so that plural or
/// punctuated labels still line up with lemmatized text.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    patterns: Vec<SkillPattern>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied())
    }
}

impl SkillVocabulary {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let patterns = labels
            .into_iter()
            .filter_map(|label| {
                let label = label.as_ref().trim().to_string();
                let pattern = normalize_text(&label);
                if pattern.is_empty() || !seen.insert(pattern.clone()) {
                    None
                } else {
                    Some(SkillPattern { label, pattern })
                }
            })
            .collect();

        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.patterns.iter().map(|skill| skill.label.as_str())
    }

    /// Skill labels whose normalized form occurs in `normalized_text`.
    pub fn extract(&self, normalized_text: &str) -> BTreeSet<String> {
        self.patterns
            .iter()
            .filter(|skill| normalized_text.contains(&skill.pattern))
            .map(|skill| skill.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::SkillVocabulary;
    use crate::preprocess::normalize_text;

    #[test]
    fn extracts_multi_word_skills_from_normalized_text() {
        let vocabulary = SkillVocabulary::default();
        let text = normalize_text("Python developer with machine learning experience");
        let skills = vocabulary.extract(&text);
        assert!(skills.contains("python"));
        assert!(skills.contains("machine learning"));
        assert!(!skills.contains("java"));
    }

    #[test]
    fn labels_are_normalized_before_matching() {
        let vocabulary = SkillVocabulary::new(["Data Pipelines", "REST APIs"]);
        let text = normalize_text("Built data pipelines and rest apis");
        let skills = vocabulary.extract(&text);
        assert_eq!(skills.len(), 2);
        assert!(skills.contains("Data Pipelines"));
    }

    #[test]
    fn empty_and_duplicate_labels_are_dropped() {
        let vocabulary = SkillVocabulary::new(["", "the", "Python", "python"]);
        assert_eq!(vocabulary.len(), 1);
        assert_eq!(vocabulary.labels().collect::<Vec<_>>(), vec!["Python"]);
    }
}
