//! Pipeline configuration: on-disk settings and builder-value resolution.

pub mod resolve;
pub mod settings;

pub use resolve::ResolvedConfig;
pub use settings::{discover_settings, load_settings, PipelineSettings, DEFAULT_CONFIG_FILE};
