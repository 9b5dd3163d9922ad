//! Form validation shared by the drafts.
//!
//! Drafts are validated before any request is issued so that obviously
//! incomplete forms never reach the backend.

use thiserror::Error;

/// A draft failed validation.
///
/// Messages are written for direct display next to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// A field has a value that is not acceptable.
    #[error("{field} {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl ValidationError {
    /// The field this error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Required(field) | Self::Invalid { field, .. } => field,
        }
    }
}

/// Fail with [`ValidationError::Required`] if `value` is blank.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Fail if `value` is present but is not an absolute http(s) URL.
pub(crate) fn optional_url(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(()),
        Some(url) if url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/') => {
            Ok(())
        }
        Some(_) => Err(ValidationError::Invalid {
            field,
            reason: "must be an http(s) URL".to_string(),
        }),
    }
}
