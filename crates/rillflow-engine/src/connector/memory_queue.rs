//! In-process topic registry backing the memory source/sink connectors.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use arrow::record_batch::RecordBatch;
use rillflow_types::PipelineError;
use tokio::sync::broadcast;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Topic-keyed broadcast channels shared by every memory connector in the
/// process. Topics are created lazily with the capacity of the first request.
pub struct MemoryQueueRegistry {
    topics: RwLock<HashMap<String, broadcast::Sender<RecordBatch>>>,
}

impl MemoryQueueRegistry {
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Sender half for `topic`.
    ///
    /// # Errors
    ///
    /// `PipelineError::Configuration` if the topic name is empty.
    pub fn publisher(
        &self,
        topic: &str,
        capacity: Option<usize>,
    ) -> Result<broadcast::Sender<RecordBatch>, PipelineError> {
        self.ensure_topic(topic, capacity)
    }

    /// New receiver subscribed to `topic`. Only batches published after the
    /// subscription are observed.
    ///
    /// # Errors
    ///
    /// `PipelineError::Configuration` if the topic name is empty.
    pub fn subscribe(
        &self,
        topic: &str,
        capacity: Option<usize>,
    ) -> Result<broadcast::Receiver<RecordBatch>, PipelineError> {
        Ok(self.ensure_topic(topic, capacity)?.subscribe())
    }

    fn ensure_topic(
        &self,
        topic: &str,
        capacity: Option<usize>,
    ) -> Result<broadcast::Sender<RecordBatch>, PipelineError> {
        if topic.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "memory queue topic must not be empty".to_string(),
            ));
        }
        let cap = capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY).max(1);

        {
            let guard = self.topics.read().expect("memory queue registry poisoned");
            if let Some(sender) = guard.get(topic) {
                return Ok(sender.clone());
            }
        }

        let mut guard = self.topics.write().expect("memory queue registry poisoned");
        Ok(guard
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(cap).0)
            .clone())
    }
}

impl Default for MemoryQueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Accessor for the process-wide registry.
pub fn registry() -> &'static MemoryQueueRegistry {
    static REGISTRY: LazyLock<MemoryQueueRegistry> = LazyLock::new(MemoryQueueRegistry::new);
    &REGISTRY
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
    fn empty_topic_is_rejected() {
        let registry = MemoryQueueRegistry::new();
        assert!(registry.subscribe("  ", None).is_err());
        assert!(registry.publisher("", None).is_err());
    }

    #[test]
    fn publish_then_receive_in_order() {
        let registry = MemoryQueueRegistry::new();
        let mut rx = registry.subscribe("ordered", None).unwrap();
        let tx = registry.publisher("ordered", None).unwrap();

        tx.send(batch(vec![1])).unwrap();
        tx.send(batch(vec![2, 3])).unwrap();

        assert_eq!(rx.try_recv().unwrap().num_rows(), 1);
        assert_eq!(rx.try_recv().unwrap().num_rows(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn same_topic_shares_a_channel() {
        let registry = MemoryQueueRegistry::new();
        let tx1 = registry.publisher("shared", None).unwrap();
        let mut rx = registry.subscribe("shared", None).unwrap();
        let tx2 = registry.publisher("shared", None).unwrap();

        tx1.send(batch(vec![1])).unwrap();
        tx2.send(batch(vec![2])).unwrap();
        assert_eq!(rx.try_recv().unwrap().num_rows(), 1);
        assert_eq!(rx.try_recv().unwrap().num_rows(), 1);
    }
}
