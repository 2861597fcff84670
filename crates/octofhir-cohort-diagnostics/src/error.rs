//! Cohort query error types

use crate::{COH0001, COH0002, COH0003, COH0300, COH0400, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation cannot proceed
    Error,
    /// Part of the input was not understood, the rest was kept
    Warning,
    /// Informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A finding produced while decoding a query document
///
/// Decoding never aborts on a malformed filter fragment; instead the criterion
/// is flagged and a diagnostic pointing at the fragment is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    /// Identifier of the criterion the finding belongs to, as found in the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion_id: Option<i64>,
    /// The offending `key=value` fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message)
    }

    fn with_severity(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            criterion_id: None,
            fragment: None,
            help: code.info().help.map(str::to_string),
        }
    }

    /// Attach the criterion the finding belongs to
    pub fn for_criterion(mut self, id: i64) -> Self {
        self.criterion_id = Some(id);
        self
    }

    /// Attach the offending fragment
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic with terminal colors
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().cyan().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(fragment) = &self.fragment {
            out.push_str(&format!("\n  {} {}", "-->".blue(), fragment));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(id) = self.criterion_id {
            write!(f, " (criterion {})", id)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, " in '{}'", fragment)?;
        }
        Ok(())
    }
}

/// Main cohort query error type
///
/// Only unrecoverable conditions are represented here. Malformed fragments
/// and failed lookups are reported through [`Diagnostic`] and criterion flags.
#[derive(Debug, Clone, Error)]
pub enum CohortError {
    /// The document is not valid JSON or does not have the expected shape
    #[error("{code}: {message}")]
    Document {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// A criterion node names a resource type that cannot be decoded
    #[error("{code}: unknown resource type '{resource_type}'")]
    UnknownResourceType {
        code: ErrorCode,
        resource_type: String,
    },

    /// A questionnaire response names no known form
    #[error("{code}: unknown questionnaire form{}", .form.as_deref().map(|f| format!(" '{f}'")).unwrap_or_default())]
    UnknownQuestionnaire {
        code: ErrorCode,
        form: Option<String>,
    },

    /// Joining a sub-query failed
    #[error("{code}: {message}")]
    Merge { code: ErrorCode, message: String },

    /// System error (I/O, serialization)
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl CohortError {
    /// Create a document error
    pub fn document(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Document {
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn unknown_resource_type(resource_type: impl Into<String>) -> Self {
        Self::UnknownResourceType {
            code: COH0002,
            resource_type: resource_type.into(),
        }
    }

    pub fn unknown_questionnaire(form: Option<String>) -> Self {
        Self::UnknownQuestionnaire {
            code: COH0003,
            form,
        }
    }

    /// Create a merge error
    pub fn merge(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Merge {
            code,
            message: message.into(),
        }
    }

    /// Merge error raised when the target group does not exist
    pub fn parent_not_found(parent_id: i64) -> Self {
        Self::merge(COH0300, format!("group {} does not exist in the base query", parent_id))
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to the error (only document and system errors carry it)
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Document { context, .. } | Self::System { context, .. } => {
                *context = Some(ctx.into());
            }
            _ => {}
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Document { code, .. } => *code,
            Self::UnknownResourceType { code, .. } => *code,
            Self::UnknownQuestionnaire { code, .. } => *code,
            Self::Merge { code, .. } => *code,
            Self::System { code, .. } => *code,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            Self::Document { context: Some(ctx), .. } | Self::System { context: Some(ctx), .. } => {
                diag.with_help(ctx.clone())
            }
            _ => diag,
        }
    }
}

impl From<serde_json::Error> for CohortError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::system(COH0400, err.to_string())
        } else {
            Self::document(COH0001, format!("invalid query document: {}", err))
        }
    }
}
