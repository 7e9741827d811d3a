//! Merging file settings with values supplied directly on the builder.
//!
//! Precedence is fixed: a value passed to the builder always wins over the
//! same value from the config file.

use rillflow_types::ConnectorDescriptor;

use super::settings::PipelineSettings;

/// Effective configuration after merging, before connectors are built.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub name: Option<String>,
    pub source: Option<ConnectorDescriptor>,
    pub destination: Option<ConnectorDescriptor>,
}

impl ResolvedConfig {
    /// Apply `settings` from disk, then overwrite with the explicit values.
    pub fn merge(
        settings: Option<PipelineSettings>,
        explicit_name: Option<String>,
        explicit_source: Option<ConnectorDescriptor>,
        explicit_destination: Option<ConnectorDescriptor>,
    ) -> Self {
        let mut resolved = Self::default();

        if let Some(settings) = settings {
            resolved.name = settings.name.filter(|n| !n.trim().is_empty());
            resolved.source = settings.source;
            resolved.destination = settings.destination;
        }

        if let Some(name) = explicit_name {
            resolved.name = Some(name);
        }
        if let Some(source) = explicit_source {
            resolved.source = Some(source);
        }
        if let Some(destination) = explicit_destination {
            resolved.destination = Some(destination);
        }

        resolved
    }
}
