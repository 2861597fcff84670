//! Build command implementation

use super::output;
use crate::build::{BuildOptions, RequestBuilder};
use crate::request::CohortRequest;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Configuration for build command
pub struct BuildConfig {
    pub file: PathBuf,
    pub version: Option<String>,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Serialize an editable request into a query document
pub async fn build(config: BuildConfig) -> Result<()> {
    let content = fs::read_to_string(&config.file)
        .with_context(|| format!("Failed to read request file: {}", config.file.display()))?;
    let request: CohortRequest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse request file: {}", config.file.display()))?;

    let mut options = BuildOptions {
        pretty: config.pretty,
        ..Default::default()
    };
    if let Some(version) = config.version {
        options.version = version;
    }
    let document = RequestBuilder::with_options(options).build(&request)?;
    if document.is_empty() {
        eprintln!("{}", output::format_warning("request has no source population, nothing to build"));
        return Ok(());
    }

    output::write_output(&document, config.output_file.as_deref())
}
