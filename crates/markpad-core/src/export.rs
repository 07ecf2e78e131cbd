use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "export failed: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
        }
    }
}

/// A document packaged as a downloadable `.md` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownExport {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl MarkdownExport {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            file_name: export_file_name(title),
            media_type: MARKDOWN_MEDIA_TYPE,
            bytes: content.as_bytes().to_vec(),
        }
    }

    /// Writes into `dir`, replacing an existing file of the same name.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "exported document");
        Ok(path)
    }
}

pub fn export_file_name(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .filter(|ch| !ch.is_control())
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            _ => ch,
        })
        .collect();
    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed.chars().all(|ch| ch == '.') {
        "document.md".to_string()
    } else {
        format!("{trimmed}.md")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_title() {
        assert_eq!(export_file_name("Meeting Notes"), "Meeting Notes.md");
    }

    #[test]
    fn file_name_falls_back_to_document() {
        assert_eq!(export_file_name(""), "document.md");
        assert_eq!(export_file_name("   "), "document.md");
        assert_eq!(export_file_name(".."), "document.md");
    }

    #[test]
    fn file_name_replaces_path_characters() {
        assert_eq!(export_file_name("a/b\\c: d?"), "a-b-c- d-.md");
    }

    #[test]
    fn export_carries_markdown_media_type() {
        let export = MarkdownExport::new("Doc", "# Héllo");
        assert_eq!(export.media_type, "text/markdown");
        assert_eq!(export.bytes, "# Héllo".as_bytes());
    }

    #[test]
    fn write_to_dir_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let export = MarkdownExport::new("Inbox", "- item\n");
        let path = export
            .write_to_dir(&dir.path().join("out"))
            .expect("write");

        assert!(path.ends_with("out/Inbox.md"));
        let saved = std::fs::read_to_string(&path).expect("read");
        assert_eq!(saved, "- item\n");
    }
}
