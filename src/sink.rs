//! Append-only TSV output
//!
//! One header line per run, then one line per sample. Rows are never
//! rewritten; every line goes out as a single write followed by a flush, so
//! a killed process cannot leave a torn row behind.

use crate::config::Mode;
use crate::sampler::Sample;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Marker emitted for an item holding no rank in a category this tick
pub const NULL_RANK: &str = "\\N";

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(e) => Some(e),
        }
    }
}

/// Column set for the active mode and category list
///
/// A single rank category keeps the plain `rank` column; multiple
/// categories get one `rank_<category>` column each, in configuration
/// order. Snapshot mode appends a trailing `tick` column.
pub fn columns(mode: Mode, categories: &[String]) -> Vec<String> {
    let mut cols = Vec::with_capacity(categories.len() + 6);
    cols.push("id".to_string());
    cols.push("score".to_string());
    if categories.len() == 1 {
        cols.push("rank".to_string());
    } else {
        for category in categories {
            cols.push(format!("rank_{}", category));
        }
    }
    cols.push("descendants".to_string());
    cols.push("submission_time".to_string());
    cols.push("sample_time".to_string());
    if mode == Mode::Snapshot {
        cols.push("tick".to_string());
    }
    cols
}

/// Serialize one sample to its output line, without the trailing newline
pub fn render_line(sample: &Sample) -> String {
    let mut fields = Vec::with_capacity(sample.ranks.len() + 6);
    fields.push(sample.id.to_string());
    fields.push(sample.score.to_string());
    for rank in &sample.ranks {
        match rank {
            Some(r) => fields.push(r.to_string()),
            None => fields.push(NULL_RANK.to_string()),
        }
    }
    fields.push(sample.descendants.to_string());
    fields.push(sample.submission_time.to_string());
    fields.push(sample.sample_time.to_string());
    if let Some(tick) = sample.tick {
        fields.push(tick.to_string());
    }
    fields.join("\t")
}

/// Append-only sample writer
///
/// The scheduler loop is the only writer, so writes arrive one at a time
/// by construction.
pub struct TsvSink<W: Write> {
    out: W,
}

impl<W: Write> TsvSink<W> {
    /// Wrap a writer and emit the header immediately
    pub fn new(out: W, mode: Mode, categories: &[String]) -> Result<Self, SinkError> {
        let header = columns(mode, categories).join("\t");
        let mut sink = Self { out };
        sink.write_line(&header)?;
        Ok(sink)
    }

    /// Append one sample row
    pub fn write(&mut self, sample: &Sample) -> Result<(), SinkError> {
        self.write_line(&render_line(sample))
    }

    fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        self.out.write_all(record.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TsvSink<Box<dyn Write + Send>> {
    /// Open the configured backend: append to `output_path` when set,
    /// stdout otherwise
    pub fn from_config(
        output_path: Option<&str>,
        mode: Mode,
        categories: &[String],
    ) -> Result<Self, SinkError> {
        let out: Box<dyn Write + Send> = match output_path {
            Some(path) => {
                let path = Path::new(path);
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(std::io::stdout()),
        };
        Self::new(out, mode, categories)
    }
}
