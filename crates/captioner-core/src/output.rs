//! Rendering of caption results as human-readable text or JSON Lines.

use crate::types::{CaptionRecord, ImageDescription};
use std::io::{self, Write};
use std::path::Path;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One block of lines per caption
    #[default]
    Text,
    /// One JSON object per image (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Writes per-image caption results in the chosen format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    images_written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            images_written: 0,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write the captions for one image.
    ///
    /// Text format prints one block per caption followed by a blank line, or a
    /// single "no captions" line when the list is empty. JSONL prints one
    /// record per image either way.
    pub fn write_description(
        &mut self,
        path: &Path,
        description: &ImageDescription,
    ) -> io::Result<()> {
        let file_name = file_name(path);
        match self.format {
            OutputFormat::Text => {
                if description.has_captions() {
                    for caption in &description.captions {
                        writeln!(self.writer, "Image: {file_name}")?;
                        writeln!(self.writer, "  Caption: {}", caption.text)?;
                        writeln!(self.writer, "  Confidence: {}", caption.confidence)?;
                        writeln!(self.writer)?;
                    }
                } else {
                    writeln!(self.writer, "No captions found for image: {file_name}")?;
                }
            }
            OutputFormat::JsonLines => {
                let record = CaptionRecord::new(&file_name, path.to_path_buf(), description);
                serde_json::to_writer(&mut self.writer, &record).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.images_written += 1;
        Ok(())
    }

    /// Write a run-level notice ("folder does not exist", "no images").
    ///
    /// Only the text format prints notices; JSONL output stays pure data.
    pub fn write_notice(&mut self, message: &str) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{message}"),
            OutputFormat::JsonLines => Ok(()),
        }
    }

    /// Get the number of images written.
    pub fn images_written(&self) -> usize {
        self.images_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Base filename of a path, lossily converted for display.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
