//! Unbuild command implementation

use super::{load_resolvers, output};
use crate::unbuild::RequestUnbuilder;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Configuration for unbuild command
pub struct UnbuildConfig {
    pub file: PathBuf,
    pub catalog: Option<PathBuf>,
    pub pretty: bool,
    pub verbose: bool,
    pub output_file: Option<PathBuf>,
}

/// Decode a query document into an editable request
pub async fn unbuild(config: UnbuildConfig) -> Result<()> {
    let resolvers = load_resolvers(config.catalog.as_deref())?;
    let content = fs::read_to_string(&config.file)
        .with_context(|| format!("Failed to read query document: {}", config.file.display()))?;

    let unbuilt = RequestUnbuilder::new(resolvers)
        .unbuild(&content)
        .await
        .with_context(|| format!("Failed to unbuild query document: {}", config.file.display()))?;

    if config.verbose {
        output::print_diagnostics(&unbuilt.diagnostics);
    } else if !unbuilt.diagnostics.is_empty() {
        eprintln!(
            "{}",
            output::format_warning(&format!("{} finding(s), use --verbose to list them", unbuilt.diagnostics.len()))
        );
    }

    let content = output::format_json(&unbuilt, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}
