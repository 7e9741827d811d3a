//! The fetch-enrich-write run loop and its builder.

use std::path::PathBuf;
use std::time::Duration;

use arrow::record_batch::RecordBatch;
use rillflow_types::{ConnectorDescriptor, PipelineError};
use tokio_util::sync::CancellationToken;

use crate::config::{discover_settings, ResolvedConfig};
use crate::connector::factory;
use crate::connector::{DestinationConnector, SourceConnector};

/// Pause between polls while an unbounded source reports no data.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(50);

const DEFAULT_NAME: &str = "pipeline";

/// The one hook a pipeline owner implements: batch in, batch out.
pub trait Enrichment: Send {
    fn enrich(&mut self, batch: RecordBatch) -> Result<RecordBatch, PipelineError>;
}

/// Identity enrichment, for pipelines that only move data.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Enrichment for PassThrough {
    fn enrich(&mut self, batch: RecordBatch) -> Result<RecordBatch, PipelineError> {
        Ok(batch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Stopped,
}

enum Outcome {
    Drained,
    Cancelled,
}

pub struct PipelineBuilder<E> {
    enrichment: E,
    name: Option<String>,
    source: Option<ConnectorDescriptor>,
    destination: Option<ConnectorDescriptor>,
    config_dir: Option<PathBuf>,
    idle_delay: Duration,
}

impl<E: Enrichment> PipelineBuilder<E> {
    pub fn new(enrichment: E) -> Self {
        Self {
            enrichment,
            name: None,
            source: None,
            destination: None,
            config_dir: None,
            idle_delay: DEFAULT_IDLE_DELAY,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn source(mut self, descriptor: ConnectorDescriptor) -> Self {
        self.source = Some(descriptor);
        self
    }

    #[must_use]
    pub fn destination(mut self, descriptor: ConnectorDescriptor) -> Self {
        self.destination = Some(descriptor);
        self
    }

    /// Directory searched for the conventional config file.
    #[must_use]
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }

    /// Resolve configuration and materialize the connectors.
    ///
    /// File settings are applied first, then the builder's own values
    /// overwrite them. Connectors are built from whichever descriptor wins,
    /// so a bad descriptor fails here rather than on first use.
    pub fn build(self) -> Result<Pipeline<E>, PipelineError> {
        let settings = match &self.config_dir {
            Some(dir) => discover_settings(dir)?,
            None => None,
        };
        let resolved = ResolvedConfig::merge(settings, self.name, self.source, self.destination);

        let reader = resolved
            .source
            .as_ref()
            .map(|d| factory::get_reader(&d.kind, d))
            .transpose()?;
        let writer = resolved
            .destination
            .as_ref()
            .map(|d| factory::get_writer(&d.kind, d))
            .transpose()?;

        Ok(Pipeline {
            name: resolved.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            source: resolved.source,
            destination: resolved.destination,
            reader,
            writer,
            enrichment: self.enrichment,
            state: PipelineState::Idle,
            cancel: CancellationToken::new(),
            idle_delay: self.idle_delay,
        })
    }
}

/// A configured pipeline instance. Drive it with [`Pipeline::run`]; request
/// shutdown from another task through [`Pipeline::cancellation_token`].
pub struct Pipeline<E> {
    name: String,
    source: Option<ConnectorDescriptor>,
    destination: Option<ConnectorDescriptor>,
    reader: Option<Box<dyn SourceConnector>>,
    writer: Option<Box<dyn DestinationConnector>>,
    enrichment: E,
    state: PipelineState,
    cancel: CancellationToken,
    idle_delay: Duration,
}

impl<E> std::fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("state", &self.state)
            .field("idle_delay", &self.idle_delay)
            .finish_non_exhaustive()
    }
}

impl<E: Enrichment> Pipeline<E> {
    pub fn builder(enrichment: E) -> PipelineBuilder<E> {
        PipelineBuilder::new(enrichment)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&ConnectorDescriptor> {
        self.source.as_ref()
    }

    pub fn destination(&self) -> Option<&ConnectorDescriptor> {
        self.destination.as_ref()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Token observed by the run loop. Cancelling it stops the pipeline at
    /// the next loop boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Swap in a new source. The replacement connector is built from the new
    /// descriptor immediately.
    pub fn set_source(&mut self, descriptor: ConnectorDescriptor) -> Result<(), PipelineError> {
        self.reader = Some(factory::get_reader(&descriptor.kind, &descriptor)?);
        self.source = Some(descriptor);
        Ok(())
    }

    /// Swap in a new destination. All subsequent writes go through the
    /// connector built from the new descriptor.
    pub fn set_destination(
        &mut self,
        descriptor: ConnectorDescriptor,
    ) -> Result<(), PipelineError> {
        self.writer = Some(factory::get_writer(&descriptor.kind, &descriptor)?);
        self.destination = Some(descriptor);
        Ok(())
    }

    /// Move batches from source to destination until the source drains or
    /// the cancellation token fires.
    ///
    /// A finite source runs to completion and leaves the pipeline `Idle`; an
    /// unbounded one is polled with [`DEFAULT_IDLE_DELAY`] pauses whenever it
    /// has nothing to offer, until cancelled. Cancellation ends the run
    /// cleanly with the pipeline `Stopped`.
    ///
    /// # Errors
    ///
    /// `PipelineError::Configuration` if either connector is missing; any
    /// connector or enrichment error otherwise, unwrapped. A failed run
    /// leaves the pipeline `Idle`.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            PipelineError::Configuration("no source connector configured".to_string())
        })?;
        let writer = self.writer.as_mut().ok_or_else(|| {
            PipelineError::Configuration("no destination connector configured".to_string())
        })?;
        let enrichment = &mut self.enrichment;
        let cancel = self.cancel.clone();
        let idle_delay = self.idle_delay;

        self.state = PipelineState::Running;
        tracing::info!(pipeline = %self.name, "pipeline running");

        let outcome = loop {
            if cancel.is_cancelled() {
                break Ok(Outcome::Cancelled);
            }
            if !reader.has_data() {
                break Ok(Outcome::Drained);
            }

            let fetched = tokio::select! {
                _ = cancel.cancelled() => break Ok(Outcome::Cancelled),
                fetched = reader.fetch() => match fetched {
                    Ok(fetched) => fetched,
                    Err(err) => break Err(err),
                },
            };

            match fetched {
                Some(batch) => {
                    let enriched = match enrichment.enrich(batch) {
                        Ok(enriched) => enriched,
                        Err(err) => break Err(err),
                    };
                    if let Err(err) = writer.write(enriched).await {
                        break Err(err);
                    }
                }
                None => {
                    if !reader.has_data() {
                        break Ok(Outcome::Drained);
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => break Ok(Outcome::Cancelled),
                        _ = tokio::time::sleep(idle_delay) => {}
                    }
                }
            }
        };

        match outcome {
            Ok(Outcome::Drained) => {
                self.state = PipelineState::Idle;
                tracing::info!(pipeline = %self.name, "source drained, pipeline idle");
                Ok(())
            }
            Ok(Outcome::Cancelled) => {
                self.stop();
                Ok(())
            }
            Err(err) => {
                // A failed run leaves the pipeline idle, not running.
                self.state = PipelineState::Idle;
                tracing::error!(pipeline = %self.name, error = %err, "pipeline run failed");
                Err(err)
            }
        }
    }

    /// Record the stopped state and log it. Safe to call any number of
    /// times; only the first call after a run logs.
    pub fn stop(&mut self) {
        if self.state == PipelineState::Stopped {
            return;
        }
        self.state = PipelineState::Stopped;
        self.cancel.cancel();
        tracing::info!(pipeline = %self.name, "pipeline stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch(values: Vec<i64>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    #[test]
    fn pass_through_is_identity() {
        let input = batch(vec![1, 2, 3]);
        let output = PassThrough.enrich(input.clone()).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn builder_without_connectors_still_builds() {
        let pipeline = Pipeline::builder(PassThrough).build().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert_eq!(pipeline.name(), "pipeline");
        assert!(pipeline.source().is_none());
    }

    #[tokio::test]
    async fn run_without_source_fails_before_fetching() {
        let mut pipeline = Pipeline::builder(PassThrough)
            .destination(ConnectorDescriptor::new("memory").with_param("topic", "unit_no_src"))
            .build()
            .unwrap();
        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("source"));
    }

    #[tokio::test]
    async fn run_without_destination_fails_before_fetching() {
        let mut pipeline = Pipeline::builder(PassThrough)
            .source(ConnectorDescriptor::new("memory").with_param("topic", "unit_no_dst"))
            .build()
            .unwrap();
        let err = pipeline.run().await.unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[tokio::test]
    async fn cancelled_run_stops_cleanly() {
        let mut pipeline = Pipeline::builder(PassThrough)
            .source(ConnectorDescriptor::new("memory").with_param("topic", "unit_cancel"))
            .destination(ConnectorDescriptor::new("memory").with_param("topic", "unit_cancel_out"))
            .build()
            .unwrap();

        pipeline.cancellation_token().cancel();
        pipeline.run().await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut pipeline = Pipeline::builder(PassThrough).build().unwrap();
        pipeline.stop();
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
    }

    #[test]
    fn explicit_builder_name_is_kept() {
        let pipeline = Pipeline::builder(PassThrough).name("orders").build().unwrap();
        assert_eq!(pipeline.name(), "orders");
    }
}
