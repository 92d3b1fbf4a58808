use crate::error::ConfigError;
use crate::skills::{SkillVocabulary, DEFAULT_SKILLS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankerConfig {
    /// Fraction of the best score a document needs to be a full match.
    pub threshold_ratio: f64,
    /// Apply the vectorizer's stop-word list on top of preprocessing.
    pub double_stop_word_filter: bool,
    pub skills: Vec<String>,
    pub qa: QaOptions,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            double_stop_word_filter: true,
            skills: DEFAULT_SKILLS.iter().map(|skill| (*skill).to_string()).collect(),
            qa: QaOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QaOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_chars: usize,
    pub top_k: usize,
    pub embedding_dimensions: usize,
    pub index_dir: PathBuf,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            chunk_overlap: 1_000,
            min_chunk_chars: 1,
            top_k: 4,
            embedding_dimensions: 256,
            index_dir: PathBuf::from("vector_index"),
        }
    }
}

impl RankerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: RankerConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Replaces the skill list with labels from a JSON array or a plain
    /// one-label-per-line file.
    pub fn load_skills_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let skills = if raw.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<String>>(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect()
        };

        if skills.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "skills file {} has no entries",
                path.display()
            )));
        }

        self.skills = skills;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold_ratio > 0.0 && self.threshold_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "threshold_ratio must be in (0, 1], got {}",
                self.threshold_ratio
            )));
        }
        if self.qa.chunk_size == 0 {
            return Err(ConfigError::Invalid("qa.chunk_size must be positive".to_string()));
        }
        if self.qa.chunk_overlap >= self.qa.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "qa.chunk_overlap {} must be smaller than qa.chunk_size {}",
                self.qa.chunk_overlap, self.qa.chunk_size
            )));
        }
        if self.qa.top_k == 0 {
            return Err(ConfigError::Invalid("qa.top_k must be positive".to_string()));
        }
        if self.qa.embedding_dimensions == 0 {
            return Err(ConfigError::Invalid(
                "qa.embedding_dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn skill_vocabulary(&self) -> SkillVocabulary {
        SkillVocabulary::new(&self.skills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = RankerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold_ratio, 0.7);
        assert!(config.double_stop_word_filter);
        assert_eq!(config.qa.top_k, 4);
    }

    #[test]
    fn partial_file_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"threshold_ratio": 0.5, "qa": {"top_k": 2}}"#)?;

        let config = RankerConfig::load(&path)?;
        assert_eq!(config.threshold_ratio, 0.5);
        assert_eq!(config.qa.top_k, 2);
        assert_eq!(config.qa.chunk_size, 10_000);
        assert_eq!(config.skills.len(), DEFAULT_SKILLS.len());
        Ok(())
    }

    #[test]
    fn invalid_threshold_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"threshold_ratio": 1.5}"#)?;

        let result = RankerConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        Ok(())
    }

    #[test]
    fn skills_file_accepts_lines_and_json() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let lines = dir.path().join("skills.txt");
        fs::write(&lines, "# core\nRust\n\nGraphQL\n")?;
        let json = dir.path().join("skills.json");
        fs::write(&json, r#"["Figma", "Adobe"]"#)?;

        let mut config = RankerConfig::default();
        config.load_skills_file(&lines)?;
        assert_eq!(config.skills, vec!["Rust", "GraphQL"]);

        config.load_skills_file(&json)?;
        assert_eq!(config.skills, vec!["Figma", "Adobe"]);
        Ok(())
    }
}
