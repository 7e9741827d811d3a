//! Pipeline error model.
//!
//! Three categories: configuration problems surfaced at construction or first
//! connector use, unknown connector kinds surfaced at resolution time, and
//! opaque runtime failures from connectors or enrichments. Runtime failures
//! are passed through untouched so the original detail reaches the caller.

/// Error raised by pipeline construction, connector resolution, or a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Missing or malformed configuration, or an unset connector at run time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A connector kind with no registered constructor was requested.
    #[error("unknown connector kind '{0}'")]
    ConnectorResolution(String),

    /// Failure during fetch, enrich, or write. Not retried; source and
    /// Display delegate to the underlying error.
    #[error(transparent)]
    Runtime(#[from] anyhow::Error),
}

impl PipelineError {
    /// Wrap a connector-level failure without translating it.
    pub fn runtime<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Runtime(anyhow::Error::new(err))
    }
}
