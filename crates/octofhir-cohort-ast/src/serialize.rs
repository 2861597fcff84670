//! Query document serialization

use std::io::{Read, Write};

use octofhir_cohort_diagnostics::{COH0001, COH0400, COH0401, CohortError};

use crate::model::QueryDocument;

/// Errors that can occur during serialization
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SerializeError> for CohortError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::Json(e) if e.is_data() || e.is_syntax() || e.is_eof() => {
                CohortError::document(COH0001, format!("invalid query document: {}", e))
            }
            SerializeError::Json(e) => CohortError::system(COH0400, e.to_string()),
            SerializeError::Io(e) => CohortError::system(COH0401, e.to_string()),
        }
    }
}

/// Trait for query document serializers
pub trait RequestSerializer {
    /// Serialize a document to a string
    fn serialize(&self, document: &QueryDocument) -> Result<String, SerializeError>;

    /// Serialize a document to a writer
    fn serialize_to_writer<W: Write>(
        &self,
        document: &QueryDocument,
        writer: W,
    ) -> Result<(), SerializeError>;

    /// Deserialize a document from a string
    fn deserialize(&self, input: &str) -> Result<QueryDocument, SerializeError>;

    /// Deserialize a document from a reader
    fn deserialize_from_reader<R: Read>(&self, reader: R) -> Result<QueryDocument, SerializeError>;
}

/// JSON serializer for query documents
#[derive(Debug, Default, Clone)]
pub struct JsonSerializer {
    /// Whether to produce pretty-printed output
    pub pretty: bool,
}

impl JsonSerializer {
    /// Create a new JSON serializer producing compact output
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new JSON serializer with pretty-printing enabled
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl RequestSerializer for JsonSerializer {
    fn serialize(&self, document: &QueryDocument) -> Result<String, SerializeError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(json)
    }

    fn serialize_to_writer<W: Write>(
        &self,
        document: &QueryDocument,
        writer: W,
    ) -> Result<(), SerializeError> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, document)?;
        } else {
            serde_json::to_writer(writer, document)?;
        }
        Ok(())
    }

    fn deserialize(&self, input: &str) -> Result<QueryDocument, SerializeError> {
        Ok(serde_json::from_str(input)?)
    }

    fn deserialize_from_reader<R: Read>(&self, reader: R) -> Result<QueryDocument, SerializeError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_VERSION, GroupNode, GroupType, SourcePopulation};
    use pretty_assertions::assert_eq;

    fn document() -> QueryDocument {
        QueryDocument::new(
            DEFAULT_VERSION,
            SourcePopulation {
                caresite_cohort_list: vec!["123".into()],
                provider_cohort_list: None,
            },
        )
        .with_request(GroupNode::new(0, GroupType::AndGroup))
    }

    #[test]
    fn test_json_serialization() {
        let json = JsonSerializer::new().serialize(&document()).unwrap();
        assert!(json.starts_with(r#"{"version":"v1.4.4","_type":"request""#));
        assert!(json.contains(r#""caresiteCohortList":["123"]"#));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_json_pretty_serialization() {
        let json = JsonSerializer::pretty().serialize(&document()).unwrap();
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_writer_and_reader() {
        let serializer = JsonSerializer::new();
        let mut buffer = Vec::new();
        serializer.serialize_to_writer(&document(), &mut buffer).unwrap();

        let back = serializer.deserialize_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(back, document());
    }

    #[test]
    fn test_malformed_input_is_document_error() {
        let err = JsonSerializer::new().deserialize("{\"version\": 1").unwrap_err();
        let err: CohortError = err.into();
        assert_eq!(err.code(), COH0001);
    }
}
