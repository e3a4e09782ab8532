//! Error types for converting a single SVG file

use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// The document could not be parsed, or its size could not be determined
    #[error("failed to parse SVG '{}': {message}", path.display())]
    Parse {
        path: PathBuf,
        message: String,
        span: Option<Span>,
    },

    /// The raw text never opens an `<svg` element
    #[error("no '<svg' tag found in '{}'", path.display())]
    MissingSvgTag { path: PathBuf },

    /// The content cannot be embedded as ASCII text
    #[error("cannot encode '{}': {message}", path.display())]
    Encoding {
        path: PathBuf,
        message: String,
        span: Option<Span>,
    },

    /// The library content could not be serialized
    #[error("failed to serialize library '{}': {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading an input or writing an output failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Path of the file that caused the error
    pub fn path(&self) -> &Path {
        match self {
            Self::Parse { path, .. }
            | Self::MissingSvgTag { path }
            | Self::Encoding { path, .. }
            | Self::Serialize { path, .. }
            | Self::Io { path, .. } => path,
        }
    }

    /// Location of the error inside the file, if known
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Parse { span, .. } | Self::Encoding { span, .. } => span.as_ref(),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Returns `None` when the error carries no location.
    pub fn format(&self, source: &str) -> Option<String> {
        let span = self.span()?;
        // ariadne counts characters, not bytes
        let span = char_index(source, span.start)..char_index(source, span.end);
        let message = match self {
            Self::Parse { message, .. } | Self::Encoding { message, .. } => message.as_str(),
            _ => return None,
        };
        let filename = self.path().display().to_string();

        let mut buf = Vec::new();
        Report::build(ReportKind::Error, filename.as_str(), span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename.as_str(), span))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename.as_str(), Source::from(source)), &mut buf)
            .ok()?;
        Some(String::from_utf8_lossy(&buf).into_owned())
    }
}

fn char_index(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source
        .char_indices()
        .take_while(|(idx, _)| *idx < byte)
        .count()
}

/// Convert a 1-based row/column position into a byte offset
pub(crate) fn offset_at(text: &str, row: u32, col: u32) -> usize {
    let mut offset = 0;
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if idx + 1 == row as usize {
            let col_offset: usize = line
                .chars()
                .take(col.saturating_sub(1) as usize)
                .map(char::len_utf8)
                .sum();
            return offset + col_offset;
        }
        offset += line.len();
    }
    text.len()
}
