//! Corpus artifact writer.
//!
//! Each record becomes one line holding the Python-literal form of
//! `(text, {'title': .., 'id': .., 'url': ..})`, the format downstream
//! corpus loaders already parse.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use boardcorpus_shared::{BoardCorpusError, Corpus, NormalizedRecord, Result};

/// Summary of a written artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub records: usize,
    pub size_bytes: usize,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// Write `corpus` to `path`, replacing any existing file.
///
/// Content goes to a hidden sibling temp file first and is renamed into
/// place, so readers never observe a partial artifact.
#[instrument(skip_all, fields(path = %path.display(), records = corpus.len()))]
pub fn write_corpus(corpus: &Corpus, path: &Path) -> Result<WriteReport> {
    let file_name = path.file_name().ok_or_else(|| {
        BoardCorpusError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path has no file name"),
        )
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BoardCorpusError::io(parent, e))?;
    }

    let content = render_corpus(corpus);
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp, &content).map_err(|e| BoardCorpusError::io(&temp, e))?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(BoardCorpusError::io(path, e));
    }

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let sha256 = format!("{:x}", hasher.finalize());

    info!(size = content.len(), %sha256, "corpus written");

    Ok(WriteReport {
        path: path.to_path_buf(),
        records: corpus.len(),
        size_bytes: content.len(),
        sha256,
    })
}

/// Render the whole artifact: one line per record, in corpus order.
pub fn render_corpus(corpus: &Corpus) -> String {
    let mut out = String::new();
    for record in corpus.iter() {
        out.push_str(&format_record(record));
        out.push('\n');
    }
    debug!(bytes = out.len(), "corpus rendered");
    out
}

/// Render one record as its tuple literal, without the trailing newline.
pub fn format_record(record: &NormalizedRecord) -> String {
    let meta = &record.metadata;
    format!(
        "({}, {{'title': {}, 'id': {}, 'url': {}}})",
        quote_str(&record.text),
        quote_str(&meta.title),
        quote_str(&meta.id),
        quote_str(&meta.url),
    )
}

/// Quote a string the way Python's `repr` does.
pub fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => {
                let cp = c as u32;
                if cp <= 0xff {
                    out.push_str(&format!("\\x{cp:02x}"));
                } else if cp <= 0xffff {
                    out.push_str(&format!("\\u{cp:04x}"));
                } else {
                    out.push_str(&format!("\\U{cp:08x}"));
                }
            }
        }
    }
    out.push(quote);
    out
}

/// Control, separator, format and private-use characters are escaped;
/// everything else is written as-is.
fn is_printable(c: char) -> bool {
    if c.is_ascii() {
        return (' '..='~').contains(&c);
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{F0000}'..='\u{10FFFF}'
    )
}
