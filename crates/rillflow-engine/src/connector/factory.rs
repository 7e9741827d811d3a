//! Kind-keyed connector construction.
//!
//! A process-wide registry maps connector kind strings to constructor
//! functions, seeded with the built-in kinds on first use. Host processes and
//! tests may register additional kinds at runtime.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use rillflow_types::{ConnectorDescriptor, PipelineError};

use crate::connector::sink::{FileSink, MemorySink};
use crate::connector::source::{FileSource, MemorySource};
use crate::connector::{DestinationConnector, SourceConnector};

type ReaderCtor =
    Box<dyn Fn(&ConnectorDescriptor) -> Result<Box<dyn SourceConnector>, PipelineError> + Send + Sync>;
type WriterCtor = Box<
    dyn Fn(&ConnectorDescriptor) -> Result<Box<dyn DestinationConnector>, PipelineError>
        + Send
        + Sync,
>;

struct Registry {
    readers: RwLock<HashMap<String, ReaderCtor>>,
    writers: RwLock<HashMap<String, WriterCtor>>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut readers: HashMap<String, ReaderCtor> = HashMap::new();
        let mut writers: HashMap<String, WriterCtor> = HashMap::new();

        readers.insert(
            "file".to_string(),
            Box::new(|d| Ok(Box::new(FileSource::from_descriptor(d)?) as Box<dyn SourceConnector>)),
        );
        readers.insert(
            "memory".to_string(),
            Box::new(|d| {
                Ok(Box::new(MemorySource::from_descriptor(d)?) as Box<dyn SourceConnector>)
            }),
        );
        writers.insert(
            "file".to_string(),
            Box::new(|d| {
                Ok(Box::new(FileSink::from_descriptor(d)?) as Box<dyn DestinationConnector>)
            }),
        );
        writers.insert(
            "memory".to_string(),
            Box::new(|d| {
                Ok(Box::new(MemorySink::from_descriptor(d)?) as Box<dyn DestinationConnector>)
            }),
        );

        Self {
            readers: RwLock::new(readers),
            writers: RwLock::new(writers),
        }
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::with_builtins);

/// Construct a source connector for `kind` from `descriptor`.
///
/// # Errors
///
/// `PipelineError::ConnectorResolution` if no reader is registered under
/// `kind`; whatever the constructor returns otherwise.
pub fn get_reader(
    kind: &str,
    descriptor: &ConnectorDescriptor,
) -> Result<Box<dyn SourceConnector>, PipelineError> {
    let readers = REGISTRY.readers.read().expect("connector registry poisoned");
    let ctor = readers
        .get(kind)
        .ok_or_else(|| PipelineError::ConnectorResolution(kind.to_string()))?;
    ctor(descriptor)
}

/// Construct a destination connector for `kind` from `descriptor`.
///
/// # Errors
///
/// `PipelineError::ConnectorResolution` if no writer is registered under
/// `kind`; whatever the constructor returns otherwise.
pub fn get_writer(
    kind: &str,
    descriptor: &ConnectorDescriptor,
) -> Result<Box<dyn DestinationConnector>, PipelineError> {
    let writers = REGISTRY.writers.read().expect("connector registry poisoned");
    let ctor = writers
        .get(kind)
        .ok_or_else(|| PipelineError::ConnectorResolution(kind.to_string()))?;
    ctor(descriptor)
}

/// Register a source connector constructor under `kind`, replacing any
/// existing registration.
pub fn register_reader<F>(kind: impl Into<String>, ctor: F)
where
    F: Fn(&ConnectorDescriptor) -> Result<Box<dyn SourceConnector>, PipelineError>
        + Send
        + Sync
        + 'static,
{
    REGISTRY
        .readers
        .write()
        .expect("connector registry poisoned")
        .insert(kind.into(), Box::new(ctor));
}

/// Register a destination connector constructor under `kind`, replacing any
/// existing registration.
pub fn register_writer<F>(kind: impl Into<String>, ctor: F)
where
    F: Fn(&ConnectorDescriptor) -> Result<Box<dyn DestinationConnector>, PipelineError>
        + Send
        + Sync
        + 'static,
{
    REGISTRY
        .writers
        .write()
        .expect("connector registry poisoned")
        .insert(kind.into(), Box::new(ctor));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reader_kind_fails_with_the_kind() {
        let desc = ConnectorDescriptor::new("carrier-pigeon");
        let err = get_reader("carrier-pigeon", &desc).unwrap_err();
        assert!(matches!(err, PipelineError::ConnectorResolution(_)));
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn unknown_writer_kind_fails_with_the_kind() {
        let desc = ConnectorDescriptor::new("tape-drive");
        let err = get_writer("tape-drive", &desc).unwrap_err();
        assert!(err.to_string().contains("tape-drive"));
    }

    #[test]
    fn builtin_memory_kinds_resolve() {
        let desc = ConnectorDescriptor::new("memory").with_param("topic", "factory_builtin");
        assert!(get_reader("memory", &desc).is_ok());
        assert!(get_writer("memory", &desc).is_ok());
    }

    #[test]
    fn builtin_file_reader_validates_params_at_construction() {
        // Missing required `path` must fail when building the connector, not
        // on first fetch.
        let desc = ConnectorDescriptor::new("file");
        let err = get_reader("file", &desc).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn registered_kind_is_dispatched() {
        struct NullSource;

        #[async_trait::async_trait]
        impl SourceConnector for NullSource {
            fn has_data(&self) -> bool {
                false
            }
            async fn fetch(
                &mut self,
            ) -> Result<Option<arrow::record_batch::RecordBatch>, PipelineError> {
                Ok(None)
            }
        }

        register_reader("null-test", |_| Ok(Box::new(NullSource)));
        let desc = ConnectorDescriptor::new("null-test");
        let reader = get_reader("null-test", &desc).unwrap();
        assert!(!reader.has_data());
    }
}
