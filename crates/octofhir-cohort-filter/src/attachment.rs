//! Imaging document attachment: `METHOD` or `METHOD|days`

use crate::error::{FilterError, FilterResult};
use octofhir_cohort_types::{AttachmentMethod, DocumentAttachment};

/// Encode an attachment policy, `None` when no document is required
pub fn build_with_document(attachment: &DocumentAttachment) -> Option<String> {
    match (attachment.method, attachment.days_of_delay) {
        (AttachmentMethod::None, _) => None,
        (method, Some(days)) => Some(format!("{}|{}", method.code(), days)),
        (method, None) => Some(method.code().to_string()),
    }
}

pub fn parse_document_attachment(value: &str) -> FilterResult<DocumentAttachment> {
    let err = || FilterError::Attachment(value.to_string());
    let (method, days) = match value.split_once('|') {
        Some((method, days)) => (method, Some(days.parse::<u32>().map_err(|_| err())?)),
        None => (value, None),
    };
    let method = AttachmentMethod::from_code(method).ok_or_else(err)?;
    Ok(DocumentAttachment {
        method,
        days_of_delay: days,
    })
}
