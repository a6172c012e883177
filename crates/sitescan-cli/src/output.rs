//! Page entry formatting.
//!
//! Text and JSONL are written as entries arrive; JSON buffers until the
//! stream ends so the output is a single array.

use anyhow::Result;
use colored::Colorize;
use sitescan_core::PageEntry;
use std::io::Write;

/// Output format options for `sitescan pages`
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One location per line, with lastmod when known
    Text,
    /// A single JSON array
    Json,
    /// Newline-delimited JSON, one entry per line
    Jsonl,
}

impl OutputFormat {
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json | Self::Jsonl)
    }
}

/// Writes entries to `out` in the chosen format.
pub struct PageWriter<W: Write> {
    out: W,
    format: OutputFormat,
    buffered: Vec<PageEntry>,
    written: usize,
}

impl<W: Write> PageWriter<W> {
    pub const fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            buffered: Vec::new(),
            written: 0,
        }
    }

    pub fn write(&mut self, entry: PageEntry) -> Result<()> {
        self.written += 1;
        match self.format {
            OutputFormat::Text => {
                match entry.lastmod {
                    Some(lastmod) => writeln!(
                        self.out,
                        "{}  {}",
                        entry.location,
                        lastmod.format("%Y-%m-%d").to_string().dimmed()
                    )?,
                    None => writeln!(self.out, "{}", entry.location)?,
                }
                self.out.flush()?;
            },
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.out, &entry)?;
                writeln!(self.out)?;
                self.out.flush()?;
            },
            OutputFormat::Json => self.buffered.push(entry),
        }
        Ok(())
    }

    /// Flush buffered output; returns how many entries were written.
    pub fn finish(mut self) -> Result<usize> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.out, &self.buffered)?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    fn entry(loc: &str) -> PageEntry {
        PageEntry::new(Url::parse(loc).unwrap())
    }

    #[test]
    fn test_text_output() {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        let mut writer = PageWriter::new(&mut buf, OutputFormat::Text);
        writer.write(entry("https://example.com/a")).unwrap();
        assert_eq!(writer.finish().unwrap(), 1);
        assert_eq!(String::from_utf8(buf).unwrap(), "https://example.com/a\n");
    }

    #[test]
    fn test_jsonl_output_is_one_object_per_line() {
        let mut buf = Vec::new();
        let mut writer = PageWriter::new(&mut buf, OutputFormat::Jsonl);
        writer.write(entry("https://example.com/a")).unwrap();
        writer.write(entry("https://example.com/b")).unwrap();
        writer.finish().unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["location"], "https://example.com/b");
    }

    #[test]
    fn test_json_output_is_an_array_even_when_empty() {
        let mut buf = Vec::new();
        let writer = PageWriter::new(&mut buf, OutputFormat::Json);
        assert_eq!(writer.finish().unwrap(), 0);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }
}
