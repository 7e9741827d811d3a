//! Loading pipeline settings from the conventional config file.

use std::path::Path;

use rillflow_types::{ConnectorDescriptor, PipelineError};
use serde::Deserialize;

/// File name looked up inside the configured directory.
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.yaml";

/// Settings as they appear on disk. Every field is optional; builder values
/// fill or override whatever the file leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineSettings {
    pub name: Option<String>,
    pub source: Option<ConnectorDescriptor>,
    pub destination: Option<ConnectorDescriptor>,
}

/// Parse the settings file at `path`.
///
/// # Errors
///
/// `PipelineError::Configuration` naming the file path if it cannot be read
/// or does not parse. A malformed file never yields partial settings.
pub fn load_settings(path: &Path) -> Result<PipelineSettings, PipelineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::Configuration(format!(
            "failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        PipelineError::Configuration(format!(
            "malformed config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Look for the conventional config file inside `dir`.
///
/// Absence is not an error; a present but unreadable or malformed file is.
pub fn discover_settings(dir: &Path) -> Result<Option<PipelineSettings>, PipelineError> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if !path.is_file() {
        tracing::info!(dir = %dir.display(), "no config file detected");
        return Ok(None);
    }
    tracing::info!(path = %path.display(), "config file detected");
    load_settings(&path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_full_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
name: orders
source:
  type: file
  path: /data/orders.jsonl
destination:
  type: memory
  topic: enriched
"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.name.as_deref(), Some("orders"));
        assert_eq!(settings.source.unwrap().kind, "file");
        assert_eq!(
            settings.destination.unwrap().param_str("topic"),
            Some("enriched")
        );
    }

    #[test]
    fn missing_file_is_absence_not_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_settings(dir.path()).unwrap().is_none());
    }

    #[test]
    fn malformed_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "source: [not, a, mapping").unwrap();

        let err = discover_settings(dir.path()).unwrap_err().to_string();
        assert!(err.contains(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn partial_settings_are_fine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "source:\n  type: memory\n  topic: raw\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert!(settings.name.is_none());
        assert!(settings.destination.is_none());
        assert_eq!(settings.source.unwrap().kind, "memory");
    }
}
