//! Check command implementation

use super::{load_resolvers, output};
use crate::nominative::is_nominative;
use crate::unbuild::RequestUnbuilder;
use anyhow::Result;
use colored::Colorize;
use octofhir_cohort_diagnostics::{Diagnostic, Severity};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for check command
pub struct CheckConfig {
    pub files: Vec<PathBuf>,
    pub catalog: Option<PathBuf>,
    /// Treat warnings as errors
    pub strict: bool,
    pub verbose: bool,
}

/// Outcome of checking one document
struct CheckResult {
    file: PathBuf,
    fatal: Option<String>,
    diagnostics: Vec<Diagnostic>,
    /// Criteria only partially decoded
    incomplete: usize,
    nominative: bool,
}

impl CheckResult {
    fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }
}

/// Unbuild query documents and report what could not be decoded
pub async fn check(config: CheckConfig) -> Result<()> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for checking");
    }
    let unbuilder = RequestUnbuilder::new(load_resolvers(config.catalog.as_deref())?);

    let mut results = Vec::with_capacity(config.files.len());
    for file in &config.files {
        results.push(check_file(&unbuilder, file, config.verbose).await);
    }

    let mut total_errors = 0;
    let mut total_warnings = 0;
    for result in &results {
        print_check_result(result);
        total_errors += result.count(Severity::Error) + result.incomplete + usize::from(result.fatal.is_some());
        total_warnings += result.count(Severity::Warning);
    }

    println!();
    if total_errors == 0 && total_warnings == 0 {
        println!(
            "{}",
            output::format_success(&format!("All {} document(s) decoded cleanly", config.files.len()))
        );
        return Ok(());
    }

    let mut summary = Vec::new();
    if total_errors > 0 {
        summary.push(format!("{} error(s)", total_errors).red().to_string());
    }
    if total_warnings > 0 {
        summary.push(format!("{} warning(s)", total_warnings).yellow().to_string());
    }
    eprintln!("{} Found {}", "Check failed:".red().bold(), summary.join(", "));

    if total_errors > 0 || (config.strict && total_warnings > 0) {
        anyhow::bail!("{} document(s) did not pass", results.iter().filter(|r| !passed(r, config.strict)).count());
    }
    Ok(())
}

fn passed(result: &CheckResult, strict: bool) -> bool {
    result.fatal.is_none()
        && result.incomplete == 0
        && result.count(Severity::Error) == 0
        && !(strict && result.count(Severity::Warning) > 0)
}

async fn check_file(unbuilder: &RequestUnbuilder, file: &Path, verbose: bool) -> CheckResult {
    if verbose {
        eprintln!("Checking: {}", file.display());
    }
    let mut result = CheckResult {
        file: file.to_path_buf(),
        fatal: None,
        diagnostics: Vec::new(),
        incomplete: 0,
        nominative: false,
    };

    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            result.fatal = Some(format!("Failed to read file: {}", e));
            return result;
        }
    };
    match unbuilder.unbuild(&content).await {
        Ok(unbuilt) => {
            result.nominative = is_nominative(&unbuilt.request.criteria);
            result.incomplete = unbuilt.request.criteria.iter().filter(|c| c.has_error()).count();
            result.diagnostics = unbuilt.diagnostics;
        }
        Err(e) => result.fatal = Some(e.to_string()),
    }
    result
}

fn print_check_result(result: &CheckResult) {
    let name = result.file.display().to_string();
    match &result.fatal {
        Some(message) => println!("{} {}\n  {}", "✗".red().bold(), name.bold(), message.red()),
        None if result.diagnostics.is_empty() => println!("{} {}", "✓".green().bold(), name.bold()),
        None => println!("{} {}", "!".yellow().bold(), name.bold()),
    }
    if result.incomplete > 0 {
        println!("  {}", format!("{} criterion(s) only partially decoded", result.incomplete).red());
    }
    if result.nominative {
        println!("  {}", "uses nominative criteria".cyan());
    }
    output::print_diagnostics(&result.diagnostics);
}
