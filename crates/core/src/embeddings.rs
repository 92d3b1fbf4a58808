const DEFAULT: usize = 256;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Weight of a whole-word feature relative to one character trigram.
const WORD_WEIGHT: f32 = 2.0;

pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Feature-hashing embedder over lowercased words and character trigrams.
///
/// Output vectors are L2-normalised, so a dot product is a cosine similarity.
#[derive(Debug, Clone, Copy)]
pub struct HashedFeatureEmbedder {
    pub dimensions: usize,
}

impl Default for HashedFeatureEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashedFeatureEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, feature: &str, salt: u8) -> usize {
        let mut hash = FNV_OFFSET ^ u64::from(salt);
        for byte in feature.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        (hash % self.dimensions.max(1) as u64) as usize
    }
}

impl Embedder for HashedFeatureEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions.max(1)
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions()];
        let lowered = text.to_lowercase();

        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            vector[self.bucket(word, 0)] += WORD_WEIGHT;

            let padded: Vec<char> = format!(" {word} ").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram, 1)] += 1.0;
            }
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, HashedFeatureEmbedder};

    fn dot(left: &[f32], right: &[f32]) -> f32 {
        left.iter().zip(right).map(|(a, b)| a * b).sum()
    }

    #[test]
    fn embedder_is_deterministic() {
        let embedder = HashedFeatureEmbedder::default();
        assert_eq!(
            embedder.embed("Kubernetes operator experience"),
            embedder.embed("Kubernetes operator experience")
        );
    }

    #[test]
    fn embedder_outputs_expected_length() {
        let embedder = HashedFeatureEmbedder::new(32);
        assert_eq!(embedder.embed("abc").len(), 32);
        assert!(embedder.embed("").iter().all(|value| *value == 0.0));
    }

    #[test]
    fn related_text_is_closer_than_unrelated_text() {
        let embedder = HashedFeatureEmbedder::default();
        let query = embedder.embed("python machine learning");
        let related = embedder.embed("Machine learning models written in Python");
        let unrelated = embedder.embed("pastry chef at a bakery");
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }
}
