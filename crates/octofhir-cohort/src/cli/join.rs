//! Join command implementation

use super::{load_resolvers, output};
use crate::build::BuildOptions;
use crate::merger::{JoinOptions, OffsetPolicy, RequestMerger};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Configuration for join command
pub struct JoinConfig {
    pub base: PathBuf,
    pub sub: PathBuf,
    pub parent_id: i64,
    pub offset: Option<i64>,
    pub catalog: Option<PathBuf>,
    pub pretty: bool,
    pub verbose: bool,
    pub output_file: Option<PathBuf>,
}

/// Splice the tree of one query document into a group of another
pub async fn join(config: JoinConfig) -> Result<()> {
    let resolvers = load_resolvers(config.catalog.as_deref())?;
    let base = fs::read_to_string(&config.base)
        .with_context(|| format!("Failed to read base query: {}", config.base.display()))?;
    let sub = fs::read_to_string(&config.sub)
        .with_context(|| format!("Failed to read sub-query: {}", config.sub.display()))?;

    let options = JoinOptions {
        offset: config.offset.map_or(OffsetPolicy::Dynamic, OffsetPolicy::Fixed),
        build: BuildOptions {
            pretty: config.pretty,
            ..Default::default()
        },
    };
    let joined = RequestMerger::new(resolvers)
        .with_options(options)
        .join(&base, &sub, config.parent_id)
        .await
        .with_context(|| format!("Failed to join into group {}", config.parent_id))?;

    if config.verbose {
        output::print_diagnostics(&joined.request.diagnostics);
    }
    output::write_output(&joined.json, config.output_file.as_deref())
}
