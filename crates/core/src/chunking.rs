use crate::config::QaOptions;
use crate::error::ExtractError;
use crate::models::{DocumentFingerprint, TextChunk};
use sha2::{Digest, Sha256};

const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
    pub min_chars: usize,
}

impl From<&QaOptions> for ChunkingConfig {
    fn from(value: &QaOptions) -> Self {
        Self {
            max_chars: value.chunk_size,
            overlap_chars: value.chunk_overlap,
            min_chars: value.min_chunk_chars,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.max_chars == 0 || self.overlap_chars >= self.max_chars {
            return Err(ExtractError::InvalidChunkConfig(format!(
                "max_chars={} overlap_chars={}",
                self.max_chars, self.overlap_chars
            )));
        }
        Ok(())
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits text into chunks of at most `max_chars` characters.
///
/// Paragraphs are packed greedily; each new chunk starts with up to
/// `overlap_chars` of the previous chunk's tail, cut at a word boundary.
/// Paragraphs longer than a chunk are split between words, and words longer
/// than a chunk are split by character.
pub fn split_text(text: &str, config: ChunkingConfig) -> Vec<String> {
    let pieces = text
        .split(PARAGRAPH_SEPARATOR)
        .map(normalize_whitespace)
        .filter(|paragraph| !paragraph.is_empty())
        .flat_map(|paragraph| split_paragraph(&paragraph, config))
        .collect::<Vec<_>>();

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if current.is_empty() {
            current = piece;
            continue;
        }

        if char_len(&current) + PARAGRAPH_SEPARATOR.len() + char_len(&piece) <= config.max_chars {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(&piece);
            continue;
        }

        let tail = overlap_tail(&current, config.overlap_chars);
        chunks.push(std::mem::take(&mut current));

        if !tail.is_empty() && char_len(&tail) + 1 + char_len(&piece) <= config.max_chars {
            current = format!("{tail} {piece}");
        } else {
            current = piece;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .filter(|chunk| char_len(chunk) >= config.min_chars)
        .collect()
}

fn split_paragraph(paragraph: &str, config: ChunkingConfig) -> Vec<String> {
    if char_len(paragraph) <= config.max_chars {
        return vec![paragraph.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in paragraph.split(' ') {
        if char_len(word) > config.max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.extend(hard_split(word, config));
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if char_len(&current) + 1 + char_len(word) <= config.max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            pieces.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn hard_split(word: &str, config: ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let step = config.max_chars.saturating_sub(config.overlap_chars).max(1);
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + config.max_chars).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    pieces
}

fn overlap_tail(text: &str, overlap_chars: usize) -> String {
    if overlap_chars == 0 {
        return String::new();
    }

    let total = char_len(text);
    if total <= overlap_chars {
        return normalize_whitespace(text);
    }

    let tail: String = text.chars().skip(total - overlap_chars).collect();
    let boundary_cut = text
        .chars()
        .nth(total - overlap_chars - 1)
        .is_some_and(char::is_whitespace);

    let tail = if boundary_cut {
        tail.as_str()
    } else {
        match tail.find(char::is_whitespace) {
            Some(position) => &tail[position..],
            None => "",
        }
    };
    normalize_whitespace(tail)
}

pub fn build_chunks(
    document: &DocumentFingerprint,
    text: &str,
    config: ChunkingConfig,
    global_index: u64,
) -> Result<(Vec<TextChunk>, u64), ExtractError> {
    config.validate()?;

    let mut chunks = Vec::new();
    let mut cursor = global_index;

    for raw_chunk in split_text(text, config) {
        chunks.push(TextChunk {
            chunk_id: make_chunk_id(&document.document_id, cursor, &raw_chunk),
            document_id: document.document_id.clone(),
            source_path: document.source_path.clone(),
            chunk_index: cursor,
            text: raw_chunk,
        });
        cursor = cursor.saturating_add(1);
    }

    Ok((chunks, cursor))
}

fn make_chunk_id(document_id: &str, index: u64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(index.to_le_bytes());
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
