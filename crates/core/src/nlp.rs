//! Process-wide NLP resources.
//!
//! Stop-word tables and the lemmatizer are built once on first use and shared
//! read-only for the rest of the process. Call sites reach them through
//! [`NlpResources::global`] instead of holding their own copies.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

static RESOURCES: OnceLock<NlpResources> = OnceLock::new();

/// Stop words removed while normalizing text (NLTK English list).
const PREPROCESS_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan",
    "shan't", "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't",
    "wouldn", "wouldn't",
];

/// Stop words dropped by the term-weight vectorizer (scikit-learn English list).
const VECTORIZER_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything",
    "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became", "because",
    "become", "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call",
    "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail",
    "do", "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("analyses", "analysis"),
    ("bases", "basis"),
    ("crises", "crisis"),
    ("hypotheses", "hypothesis"),
    ("theses", "thesis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("appendices", "appendix"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("caches", "cache"),
    ("niches", "niche"),
    ("salesmen", "salesman"),
    ("chairmen", "chairman"),
];

/// Words that end in `s` but are already in base form.
const UNINFLECTED: &[&str] = &[
    "aws", "analytics", "economics", "ethics", "graphics", "kubernetes", "logistics",
    "mathematics", "news", "physics", "politics", "robotics", "series", "species", "windows",
    "ios", "express", "sales", "jenkins", "pandas", "postgres", "devops", "nodejs", "js",
];

/// Rule-based noun lemmatizer.
///
/// Irregular plurals come from an exception table; regular plurals are
/// reduced by suffix rules. Words that do not look inflected are returned
/// unchanged.
#[derive(Debug)]
pub struct Lemmatizer {
    exceptions: HashMap<&'static str, &'static str>,
    uninflected: HashSet<&'static str>,
}

impl Lemmatizer {
    fn new() -> Self {
        Self {
            exceptions: IRREGULAR_NOUNS.iter().copied().collect(),
            uninflected: UNINFLECTED.iter().copied().collect(),
        }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(base) = self.exceptions.get(word) {
            return (*base).to_string();
        }

        if word.len() <= 3
            || self.uninflected.contains(word)
            || !word.ends_with('s')
            || word.chars().any(|c| c.is_ascii_digit())
        {
            return word.to_string();
        }

        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() >= 2 {
                return format!("{stem}y");
            }
        }

        for (suffix, replacement) in [
            ("sses", "ss"),
            ("xes", "x"),
            ("zzes", "zz"),
            ("ches", "ch"),
            ("shes", "sh"),
        ] {
            if let Some(stem) = word.strip_suffix(suffix) {
                return format!("{stem}{replacement}");
            }
        }

        word[..word.len() - 1].to_string()
    }
}

#[derive(Debug)]
pub struct NlpResources {
    preprocess_stop_words: HashSet<&'static str>,
    vectorizer_stop_words: HashSet<&'static str>,
    lemmatizer: Lemmatizer,
}

impl NlpResources {
    /// Returns the shared resources, building them on the first call.
    pub fn global() -> &'static NlpResources {
        RESOURCES.get_or_init(|| {
            let resources = NlpResources::load();
            debug!(
                preprocess_stop_words = resources.preprocess_stop_words.len(),
                vectorizer_stop_words = resources.vectorizer_stop_words.len(),
                "nlp resources loaded"
            );
            resources
        })
    }

    fn load() -> Self {
        Self {
            preprocess_stop_words: PREPROCESS_STOP_WORDS.iter().copied().collect(),
            vectorizer_stop_words: VECTORIZER_STOP_WORDS.iter().copied().collect(),
            lemmatizer: Lemmatizer::new(),
        }
    }

    pub fn preprocess_stop_words(&self) -> &HashSet<&'static str> {
        &self.preprocess_stop_words
    }

    pub fn vectorizer_stop_words(&self) -> &HashSet<&'static str> {
        &self.vectorizer_stop_words
    }

    pub fn lemmatizer(&self) -> &Lemmatizer {
        &self.lemmatizer
    }
}

#[cfg(test)]
mod tests {
    use super::NlpResources;

    #[test]
    fn global_resources_are_shared() {
        let first = NlpResources::global() as *const NlpResources;
        let second = NlpResources::global() as *const NlpResources;
        assert_eq!(first, second);
    }

    #[test]
    fn stop_word_tables_have_expected_entries() {
        let resources = NlpResources::global();
        assert!(resources.preprocess_stop_words().contains("the"));
        assert!(!resources.preprocess_stop_words().contains("system"));
        assert!(resources.vectorizer_stop_words().contains("system"));
    }

    #[test]
    fn lemmatizer_reduces_regular_plurals() {
        let lemmatizer = NlpResources::global().lemmatizer();
        assert_eq!(lemmatizer.lemmatize("skills"), "skill");
        assert_eq!(lemmatizer.lemmatize("technologies"), "technology");
        assert_eq!(lemmatizer.lemmatize("processes"), "process");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("matches"), "match");
    }

    #[test]
    fn lemmatizer_keeps_base_forms() {
        let lemmatizer = NlpResources::global().lemmatizer();
        assert_eq!(lemmatizer.lemmatize("analysis"), "analysis");
        assert_eq!(lemmatizer.lemmatize("business"), "business");
        assert_eq!(lemmatizer.lemmatize("status"), "status");
        assert_eq!(lemmatizer.lemmatize("kubernetes"), "kubernetes");
        assert_eq!(lemmatizer.lemmatize("learning"), "learning");
        assert_eq!(lemmatizer.lemmatize("gps"), "gps");
    }

    #[test]
    fn lemmatizer_uses_irregular_table() {
        let lemmatizer = NlpResources::global().lemmatizer();
        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("criteria"), "criterion");
    }
}
