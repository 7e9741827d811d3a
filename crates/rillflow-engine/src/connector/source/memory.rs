//! Queue-backed unbounded source connector.
//!
//! Subscribes to a topic on the in-process memory queue. Readiness is always
//! true; an empty topic yields the absence signal, giving run-until-cancelled
//! semantics.

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rillflow_types::{ConnectorDescriptor, PipelineError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use crate::connector::memory_queue;
use crate::connector::SourceConnector;

pub struct MemorySource {
    topic: String,
    receiver: broadcast::Receiver<RecordBatch>,
}

impl MemorySource {
    /// Build from a descriptor with a required `topic` and optional
    /// `capacity` parameter.
    pub fn from_descriptor(descriptor: &ConnectorDescriptor) -> Result<Self, PipelineError> {
        let topic = descriptor.require_str("topic")?.to_string();
        let capacity = descriptor.param_usize("capacity")?;
        let receiver = memory_queue::registry().subscribe(&topic, capacity)?;
        tracing::debug!(topic, "subscribed memory source");
        Ok(Self { topic, receiver })
    }
}

#[async_trait]
impl SourceConnector for MemorySource {
    fn has_data(&self) -> bool {
        // A queue can always receive more; the pipeline decides when to stop.
        true
    }

    async fn fetch(&mut self) -> Result<Option<RecordBatch>, PipelineError> {
        loop {
            match self.receiver.try_recv() {
                Ok(batch) => return Ok(Some(batch)),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(None),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "memory source lagged, skipping ahead");
                }
            }
        }
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

    #[tokio::test]
    async fn empty_topic_yields_absence_but_stays_ready() {
        let desc = ConnectorDescriptor::new("memory").with_param("topic", "src_empty");
        let mut source = MemorySource::from_descriptor(&desc).unwrap();
        assert!(source.has_data());
        assert!(source.fetch().await.unwrap().is_none());
        assert!(source.has_data());
    }

    #[tokio::test]
    async fn receives_published_batches_in_order() {
        let desc = ConnectorDescriptor::new("memory").with_param("topic", "src_ordered");
        let mut source = MemorySource::from_descriptor(&desc).unwrap();

        let tx = memory_queue::registry().publisher("src_ordered", None).unwrap();
        tx.send(batch(vec![1])).unwrap();
        tx.send(batch(vec![2, 3])).unwrap();

        assert_eq!(source.fetch().await.unwrap().unwrap().num_rows(), 1);
        assert_eq!(source.fetch().await.unwrap().unwrap().num_rows(), 2);
        assert!(source.fetch().await.unwrap().is_none());
    }

    #[test]
    fn missing_topic_fails_at_construction() {
        let desc = ConnectorDescriptor::new("memory");
        assert!(MemorySource::from_descriptor(&desc).is_err());
    }
}
