//! Upload results.

use serde::{Deserialize, Serialize};

/// A file stored by `/upload/single` or `/upload/multiple`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Public URL of the stored file.
    #[serde(alias = "path")]
    pub url: String,
    #[serde(default, alias = "originalName")]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, alias = "mimetype")]
    pub mime_type: Option<String>,
}
