//! File-backed finite source connector.
//!
//! Reads a local file into record batches with Arrow's readers. Readiness
//! becomes false after one exhaustive pass, giving run-to-completion
//! semantics.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::PathBuf;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rillflow_types::{ConnectorDescriptor, PipelineError};

use crate::connector::SourceConnector;

const DEFAULT_BATCH_SIZE: usize = 1024;

enum BatchReader {
    Csv(arrow::csv::Reader<File>),
    Jsonl(arrow::json::Reader<BufReader<File>>),
}

pub struct FileSource {
    path: PathBuf,
    reader: BatchReader,
    exhausted: bool,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("path", &self.path)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl FileSource {
    /// Build from a descriptor with a required `path` and optional `format`
    /// (`jsonl`, the default, or `csv`) and `batch_size` parameters. The file
    /// is opened and its schema inferred eagerly.
    pub fn from_descriptor(descriptor: &ConnectorDescriptor) -> Result<Self, PipelineError> {
        let path = PathBuf::from(descriptor.require_str("path")?);
        let format = descriptor.param_str("format").unwrap_or("jsonl");
        let batch_size = descriptor
            .param_usize("batch_size")?
            .unwrap_or(DEFAULT_BATCH_SIZE);

        let reader = match format {
            "csv" => Self::open_csv(&path, batch_size)?,
            "jsonl" => Self::open_jsonl(&path, batch_size)?,
            other => {
                return Err(PipelineError::Configuration(format!(
                    "unsupported file format '{other}' (expected 'jsonl' or 'csv')"
                )))
            }
        };

        tracing::debug!(path = %path.display(), format, batch_size, "opened file source");
        Ok(Self {
            path,
            reader,
            exhausted: false,
        })
    }

    fn open_csv(path: &PathBuf, batch_size: usize) -> Result<BatchReader, PipelineError> {
        let mut file = open(path)?;
        let csv_format = arrow::csv::reader::Format::default().with_header(true);
        let (schema, _) = csv_format
            .infer_schema(&mut file, None)
            .map_err(|e| schema_error(path, &e))?;
        file.rewind().map_err(PipelineError::runtime)?;
        let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema))
            .with_header(true)
            .with_batch_size(batch_size)
            .build(file)
            .map_err(PipelineError::runtime)?;
        Ok(BatchReader::Csv(reader))
    }

    fn open_jsonl(path: &PathBuf, batch_size: usize) -> Result<BatchReader, PipelineError> {
        let mut buf = BufReader::new(open(path)?);
        let (schema, _) = arrow::json::reader::infer_json_schema_from_seekable(&mut buf, None)
            .map_err(|e| schema_error(path, &e))?;
        let reader = arrow::json::ReaderBuilder::new(Arc::new(schema))
            .with_batch_size(batch_size)
            .build(buf)
            .map_err(PipelineError::runtime)?;
        Ok(BatchReader::Jsonl(reader))
    }
}

fn open(path: &PathBuf) -> Result<File, PipelineError> {
    File::open(path).map_err(|e| {
        PipelineError::Configuration(format!("failed to open source file {}: {e}", path.display()))
    })
}

fn schema_error(path: &PathBuf, err: &arrow::error::ArrowError) -> PipelineError {
    PipelineError::Configuration(format!(
        "failed to infer schema for source file {}: {err}",
        path.display()
    ))
}

#[async_trait]
impl SourceConnector for FileSource {
    fn has_data(&self) -> bool {
        !self.exhausted
    }

    async fn fetch(&mut self) -> Result<Option<RecordBatch>, PipelineError> {
        if self.exhausted {
            return Ok(None);
        }
        let next = match &mut self.reader {
            BatchReader::Csv(reader) => reader.next(),
            BatchReader::Jsonl(reader) => reader.next(),
        };
        match next {
            Some(Ok(batch)) => Ok(Some(batch)),
            Some(Err(err)) => Err(PipelineError::runtime(err)),
            None => {
                tracing::debug!(path = %self.path.display(), "file source exhausted");
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}
