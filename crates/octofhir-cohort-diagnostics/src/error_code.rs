//! Cohort query error codes following a structured numbering system
//!
//! Error code ranges:
//! - COH0001-COH0099: Document errors (malformed or unsupported query documents)
//! - COH0100-COH0199: Filter decode findings (recoverable, flagged on the criterion)
//! - COH0200-COH0299: Lookup failures (population, organisational unit, vocabulary)
//! - COH0300-COH0399: Merge errors (joining a sub-query into a query)
//! - COH0400-COH0499: System errors (I/O, serialization)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_document_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_decode_finding(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_lookup_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_merge_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COH{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Document errors (0001-0099)
    map.insert(1, ErrorInfo::new("Malformed query document"));
    map.insert(2, ErrorInfo::new("Unknown resource type")
        .with_help("The document references a resource type this version cannot decode"));
    map.insert(3, ErrorInfo::new("Unknown questionnaire form"));
    map.insert(4, ErrorInfo::new("Missing request tree"));

    // Decode findings (0100-0199)
    map.insert(100, ErrorInfo::new("Unrecognised filter key")
        .with_help("The criterion may be incomplete; review it before saving"));
    map.insert(101, ErrorInfo::new("Malformed date bound"));
    map.insert(102, ErrorInfo::new("Malformed duration"));
    map.insert(103, ErrorInfo::new("Malformed comparator value"));
    map.insert(104, ErrorInfo::new("Unknown document status"));
    map.insert(105, ErrorInfo::new("Unknown document attachment method"));

    // Lookup failures (0200-0299)
    map.insert(200, ErrorInfo::new("Population lookup failed"));
    map.insert(201, ErrorInfo::new("Organisational unit lookup failed"));
    map.insert(202, ErrorInfo::new("Vocabulary lookup failed"));
    map.insert(203, ErrorInfo::new("Biology hierarchy lookup failed"));

    // Merge errors (0300-0399)
    map.insert(300, ErrorInfo::new("Parent group not found")
        .with_help("The sub-query can only be attached to an existing group"));
    map.insert(301, ErrorInfo::new("Identifier offset overflow"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Serialization failure"));
    map.insert(401, ErrorInfo::new("I/O failure"));

    map
});

// Document errors
pub const COH0001: ErrorCode = ErrorCode::new(1);
pub const COH0002: ErrorCode = ErrorCode::new(2);
pub const COH0003: ErrorCode = ErrorCode::new(3);
pub const COH0004: ErrorCode = ErrorCode::new(4);

// Decode findings
pub const COH0100: ErrorCode = ErrorCode::new(100);
pub const COH0101: ErrorCode = ErrorCode::new(101);
pub const COH0102: ErrorCode = ErrorCode::new(102);
pub const COH0103: ErrorCode = ErrorCode::new(103);
pub const COH0104: ErrorCode = ErrorCode::new(104);
pub const COH0105: ErrorCode = ErrorCode::new(105);

// Lookup failures
pub const COH0200: ErrorCode = ErrorCode::new(200);
pub const COH0201: ErrorCode = ErrorCode::new(201);
pub const COH0202: ErrorCode = ErrorCode::new(202);
pub const COH0203: ErrorCode = ErrorCode::new(203);

// Merge errors
pub const COH0300: ErrorCode = ErrorCode::new(300);
pub const COH0301: ErrorCode = ErrorCode::new(301);

// System errors
pub const COH0400: ErrorCode = ErrorCode::new(400);
pub const COH0401: ErrorCode = ErrorCode::new(401);
