use crate::error::ExtractError;
use lopdf::Document;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "txt", "md"];

const DOCX_BODY: &str = "word/document.xml";

static DOCX_TOKEN: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;
}

#[derive(Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractError> {
        let document =
            Document::load(path).map_err(|error| ExtractError::PdfParse(error.to_string()))?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = document
                .extract_text(&[page_no])
                .map_err(|error| ExtractError::PdfParse(error.to_string()))?;

            if !text.trim().is_empty() {
                pages.push(PageText {
                    number: page_no,
                    text,
                });
            }
        }

        if pages.is_empty() {
            return Err(ExtractError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(pages)
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let pages = self.extract_pages(path)?;
        Ok(pages
            .into_iter()
            .map(|page| page.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[derive(Default)]
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        let mut archive = zip::ZipArchive::new(File::open(path)?)?;
        let mut body = String::new();
        archive
            .by_name(DOCX_BODY)
            .map_err(|error| {
                ExtractError::DocxParse(format!("{}: missing {DOCX_BODY}: {error}", path.display()))
            })?
            .read_to_string(&mut body)?;

        docx_xml_to_text(&body)
    }
}

#[derive(Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Extracts plain text from a PDF, DOCX or text file, choosing by extension.
pub fn extract_document_text(path: &Path) -> Result<String, ExtractError> {
    match extension_of(path).as_deref() {
        Some("pdf") => PdfTextExtractor.extract_text(path),
        Some("docx") => DocxTextExtractor.extract_text(path),
        Some("txt") | Some("md") => PlainTextExtractor.extract_text(path),
        _ => Err(ExtractError::UnsupportedFormat(path.display().to_string())),
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn docx_token() -> Result<&'static Regex, ExtractError> {
    if let Some(regex) = DOCX_TOKEN.get() {
        return Ok(regex);
    }
    let regex = Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br/>|</w:p>")
        .map_err(|error| ExtractError::DocxParse(error.to_string()))?;
    Ok(DOCX_TOKEN.get_or_init(|| regex))
}

fn docx_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let token = docx_token()?;
    let mut text = String::new();

    for capture in token.captures_iter(xml) {
        if let Some(run) = capture.get(1) {
            text.push_str(&decode_xml_entities(run.as_str()));
            continue;
        }
        match capture.get(0).map(|m| m.as_str()) {
            Some("<w:tab/>") => text.push('\t'),
            _ => text.push('\n'),
        }
    }

    Ok(text)
}

fn decode_xml_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            decoded.push_str(tail);
            return decoded;
        };

        let entity = &tail[1..end];
        let replacement = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };

        match replacement {
            Some(ch) => decoded.push(ch),
            None => decoded.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    decoded.push_str(rest);
    decoded
}
