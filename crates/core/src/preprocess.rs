use crate::nlp::NlpResources;

/// Normalizes text for term weighting and skill matching.
///
/// Lowercases, strips ASCII punctuation, splits on whitespace, drops stop
/// words and lemmatizes what remains. Text with no surviving tokens becomes
/// an empty string.
pub fn normalize_text(text: &str) -> String {
    let resources = NlpResources::global();
    let stop_words = resources.preprocess_stop_words();
    let lemmatizer = resources.lemmatizer();

    let stripped = strip_punctuation(&text.to_lowercase());

    stripped
        .split_whitespace()
        .filter(|token| !stop_words.contains(*token))
        .map(|token| lemmatizer.lemmatize(token))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, strip_punctuation};

    #[test]
    fn punctuation_is_removed_without_splitting_words() {
        assert_eq!(strip_punctuation("c++, node.js & rust!"), "c nodejs  rust");
    }

    #[test]
    fn stop_words_are_dropped_and_tokens_lemmatized() {
        let normalized = normalize_text("Seeking a Machine Learning engineer skilled in Python.");
        assert_eq!(normalized, "seeking machine learning engineer skilled python");

        let normalized = normalize_text("Graphic designer with Adobe skills");
        assert_eq!(normalized, "graphic designer adobe skill");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize_text("  Data \t\n  pipelines  "), "data pipeline");
    }

    #[test]
    fn all_stop_words_yield_empty_text() {
        assert_eq!(normalize_text("The and of, to!"), "");
        assert_eq!(normalize_text(""), "");
    }
}
