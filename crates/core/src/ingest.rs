use crate::extractor::{extract_document_text, is_supported};
use crate::models::{Corpus, DocumentFingerprint};
use crate::ExtractError;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Supported documents under `folder`, recursively, in path order.
pub fn discover_documents(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect();

    files.sort_unstable();
    files
}

pub fn digest_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

pub struct CorpusReport {
    pub corpus: Corpus,
    pub documents: Vec<DocumentFingerprint>,
    pub skipped_files: Vec<SkippedDocument>,
}

/// Loads every supported document under `folder` into a corpus.
///
/// Files that fail to extract are reported in `skipped_files` instead of
/// failing the whole load. A folder without supported documents is an error.
pub fn load_corpus_best_effort(folder: &Path) -> Result<CorpusReport, ExtractError> {
    let files = discover_documents(folder);

    if files.is_empty() {
        return Err(ExtractError::InvalidArgument(format!(
            "no pdf, docx or text files found in {}",
            folder.display()
        )));
    }

    let mut corpus = Corpus::new();
    let mut documents = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let loaded = build_document_fingerprint(folder, &path).and_then(|fingerprint| {
            let text = extract_document_text(&path)?;
            Ok((fingerprint, text))
        });

        match loaded {
            Ok((fingerprint, text)) => {
                debug!(
                    document_id = %fingerprint.document_id,
                    chars = text.len(),
                    "document loaded"
                );
                corpus.insert(fingerprint.document_id.clone(), text);
                documents.push(fingerprint);
            }
            Err(error) => {
                warn!(path = %path.display(), reason = %error, "skipped document");
                skipped_files.push(SkippedDocument {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(CorpusReport {
        corpus,
        documents,
        skipped_files,
    })
}

fn build_document_fingerprint(
    folder: &Path,
    path: &Path,
) -> Result<DocumentFingerprint, ExtractError> {
    let checksum = digest_file(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            ExtractError::MissingFileName(format!("path missing filename: {}", path.display()))
        })?;

    Ok(DocumentFingerprint {
        document_id: document_id_for(folder, path),
        document_title: name.to_string(),
        source_path: path.to_string_lossy().to_string(),
        checksum,
        ingested_at: Utc::now(),
    })
}

/// Path relative to the corpus folder with `/` separators; the bare file
/// name for documents directly inside it.
fn document_id_for(folder: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(folder).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::{digest_file, discover_documents, load_corpus_best_effort};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discover_documents_is_recursive_and_filters_extensions(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        fs::write(base.join("a.pdf"), b"%PDF-1.4\n%fake")?;
        fs::write(nested.join("b.txt"), b"text")?;
        fs::write(base.join("c.png"), b"png")?;

        let files = discover_documents(base);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn checksum_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a.txt");
        fs::write(&file_path, b"abc")?;

        assert_eq!(digest_file(&file_path)?, digest_file(&file_path)?);
        Ok(())
    }

    #[test]
    fn loading_fails_without_documents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        assert!(load_corpus_best_effort(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn corpus_is_keyed_by_relative_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let nested = dir.path().join("team");
        fs::create_dir(&nested)?;
        fs::write(dir.path().join("alice.txt"), "Rust engineer")?;
        fs::write(nested.join("bob.md"), "Python analyst")?;

        let report = load_corpus_best_effort(dir.path())?;
        let ids: Vec<&str> = report.corpus.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["alice.txt", "team/bob.md"]);
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.corpus["alice.txt"], "Rust engineer");
        Ok(())
    }

    #[test]
    fn best_effort_skips_unreadable_documents() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("unreadable.pdf"), b"%PDF-1.4\n%broken")?;
        fs::write(dir.path().join("ok.txt"), "fine")?;

        let report = load_corpus_best_effort(dir.path())?;

        assert_eq!(report.corpus.len(), 1);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(
            report.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("unreadable.pdf")
        );
        Ok(())
    }
}
