//! File-backed destination connector writing line-delimited JSON.

use std::fs::File;
use std::path::PathBuf;

use arrow::json::LineDelimitedWriter;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rillflow_types::{ConnectorDescriptor, PipelineError};

use crate::connector::DestinationConnector;

pub struct FileSink {
    path: PathBuf,
    writer: LineDelimitedWriter<File>,
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileSink {
    /// Build from a descriptor with a required `path` parameter. The output
    /// file is created (or truncated) eagerly.
    pub fn from_descriptor(descriptor: &ConnectorDescriptor) -> Result<Self, PipelineError> {
        let path = PathBuf::from(descriptor.require_str("path")?);
        let file = File::create(&path).map_err(|e| {
            PipelineError::Configuration(format!(
                "failed to create destination file {}: {e}",
                path.display()
            ))
        })?;
        tracing::debug!(path = %path.display(), "opened file sink");
        Ok(Self {
            path,
            writer: LineDelimitedWriter::new(file),
        })
    }
}

#[async_trait]
impl DestinationConnector for FileSink {
    async fn write(&mut self, batch: RecordBatch) -> Result<(), PipelineError> {
        self.writer
            .write_batches(&[&batch])
            .map_err(PipelineError::runtime)?;
        tracing::trace!(path = %self.path.display(), rows = batch.num_rows(), "wrote batch");
        Ok(())
    }
}
