// src/utils.rs
use anyhow::Result;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{error, warn};

pub const DEFAULT_CHUNK_LENGTH: usize = 12000;

const KNOWN_LANGUAGES: &str =
    r"(?i)\b(Arabic|English|French|Spanish|German|Italian|Portuguese|Russian|Chinese|Japanese|Korean)\b";

/// Array-valued paths that an imported profile document must carry
const ARRAY_PATHS: [&str; 8] = [
    "personalInfo.languages",
    "professionalSummary.industries",
    "professionalSummary.keyExpertise",
    "professionalSummary.notableCompanies",
    "skills.technical",
    "skills.professional",
    "skills.soft",
    "achievements",
];

const REQUIRED_FIELDS: [&str; 3] = ["personalInfo", "professionalSummary", "skills"];

fn regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .map_err(|e| error!("Invalid pattern {}: {}", pattern, e))
            .ok()
    })
    .as_ref()
}

// ===== Chunking =====

struct Chunker {
    max_length: usize,
    chunks: Vec<String>,
    current: String,
}

impl Chunker {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            chunks: Vec::new(),
            current: String::new(),
        }
    }

    fn fits(&self, separator: &str, unit: &str) -> bool {
        let unit_len = unit.chars().count();
        if self.current.is_empty() {
            unit_len <= self.max_length
        } else {
            self.current.chars().count() + separator.chars().count() + unit_len <= self.max_length
        }
    }

    fn append(&mut self, separator: &str, unit: &str) {
        if !self.current.is_empty() {
            self.current.push_str(separator);
        }
        self.current.push_str(unit);
    }

    fn flush(&mut self) {
        let chunk = self.current.trim();
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_string());
        }
        self.current.clear();
    }

    /// Add `unit`, joined by `separator`, starting a new chunk when it would overflow.
    /// Returns false when the unit alone is too long and has to be split further.
    fn push(&mut self, separator: &str, unit: &str) -> bool {
        if self.fits(separator, unit) {
            self.append(separator, unit);
            return true;
        }
        self.flush();
        if unit.chars().count() <= self.max_length {
            self.current.push_str(unit);
            true
        } else {
            false
        }
    }

    fn push_words(&mut self, sentence: &str) {
        for word in sentence.split_whitespace() {
            if !self.fits(" ", word) {
                self.flush();
            }
            // a word longer than the limit is kept whole
            self.append(" ", word);
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Paragraphs are separated by lines that are empty or whitespace only
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

/// A sentence ends at `.`, `!` or `?` followed by whitespace
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map(|(_, next)| next.is_whitespace()).unwrap_or(false);
        if at_boundary {
            sentences.push(&paragraph[start..i + c.len_utf8()]);
            start = i + c.len_utf8();
        }
    }
    sentences.push(&paragraph[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split text into chunks of at most `max_length` characters.
///
/// Paragraphs are kept together when possible, then sentences, then words.
/// Only a single word longer than `max_length` can produce an oversized chunk.
pub fn chunk_text(text: &str, max_length: usize) -> Vec<String> {
    if text.trim().is_empty() || max_length == 0 {
        if max_length == 0 {
            warn!("chunk_text called with a zero max length");
        }
        return Vec::new();
    }

    let mut chunker = Chunker::new(max_length);

    for paragraph in split_paragraphs(text) {
        let paragraph = paragraph.trim();
        if chunker.push("\n\n", paragraph) {
            continue;
        }
        for sentence in split_sentences(paragraph) {
            if !chunker.push(" ", sentence) {
                chunker.push_words(sentence);
            }
        }
    }

    chunker.finish()
}

// ===== Local CV heuristics =====

/// What a quick regex pass can pull out of a CV without calling the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScannedInfo {
    pub name: String,
    pub email: String,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
    pub skills: Vec<String>,
}

pub fn scan_basic_info(text: &str) -> ScannedInfo {
    static NAME: OnceLock<Option<Regex>> = OnceLock::new();
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    static LANGUAGES: OnceLock<Option<Regex>> = OnceLock::new();
    static CERTIFICATIONS: OnceLock<Option<Regex>> = OnceLock::new();
    static SKILLS: OnceLock<Option<Regex>> = OnceLock::new();

    let mut info = ScannedInfo::default();
    if text.trim().is_empty() {
        return info;
    }

    let first_match = |re: Option<&Regex>| {
        re.and_then(|re| re.find(text))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    info.name = first_match(regex(&NAME, r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b"));
    info.email = first_match(regex(
        &EMAIL,
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
    ));

    if let Some(re) = regex(&LANGUAGES, KNOWN_LANGUAGES) {
        for m in re.find_iter(text) {
            let language = m.as_str().to_lowercase();
            if !info.languages.contains(&language) {
                info.languages.push(language);
            }
        }
    }

    if let Some(re) = regex(
        &CERTIFICATIONS,
        r"(Certified|Certification|Certificate)\s[^.,\n]+",
    ) {
        info.certifications = re
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .filter(|cert| cert.chars().count() < 100)
            .collect();
    }

    let section = regex(
        &SKILLS,
        r"(?i)(?:Technical Skills|Skills|Competencies|Expertise):\s*([\s\S]*?)(?:\n\n|\n[A-Z]|$)",
    )
    .and_then(|re| re.captures(text))
    .and_then(|captures| captures.get(1));

    if let Some(section) = section {
        info.skills = section
            .as_str()
            .split([',', ';', '\n'])
            .map(str::trim)
            .filter(|skill| {
                let len = skill.chars().count();
                len > 0 && len < 50
            })
            .map(String::from)
            .collect();
    }

    info
}

// ===== JSON recovery =====

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Pull a profile document out of free text (e.g. a model answer wrapped in prose).
///
/// The outermost `{...}` span must parse, carry the required sections, and
/// every list-valued path is forced to an array.
pub fn safe_json_parse(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        warn!("No JSON-like content found in text");
        return None;
    }

    let mut parsed: Value = match serde_json::from_str(&text[start..=end]) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse JSON: {}", e);
            return None;
        }
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !parsed.get(field).map(is_truthy).unwrap_or(false))
        .collect();
    if !missing.is_empty() {
        warn!("Parsed JSON missing required fields: {}", missing.join(", "));
        return None;
    }

    for path in ARRAY_PATHS {
        let mut segments: Vec<&str> = path.split('.').collect();
        let key = segments.pop()?;

        let mut parent = &mut parsed;
        for segment in segments {
            parent = parent.get_mut(segment)?;
        }
        let object = parent.as_object_mut()?;
        if !object.get(key).map(Value::is_array).unwrap_or(false) {
            object.insert(key.to_string(), Value::Array(Vec::new()));
        }
    }

    Some(parsed)
}

/// ISO 639-1 codes are exactly two ASCII letters
pub fn normalize_language_code(code: &str) -> Option<String> {
    let code = code.trim().to_lowercase();
    (code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase())).then_some(code)
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}
