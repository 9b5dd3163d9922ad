//! File uploads (`/upload/single`, `/upload/multiple`).

use std::path::Path;

use atelier_core::{ListPayload, UploadedFile};
use futures::future::try_join_all;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use crate::api::{ApiClient, ApiError, ApiResult};

const SINGLE: &str = "/upload/single";
const MULTIPLE: &str = "/upload/multiple";

/// Uploads files and returns where the backend stored them.
#[derive(Debug, Clone, Copy)]
pub struct UploadService<'a> {
    api: &'a ApiClient,
}

impl<'a> UploadService<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Upload one file as the `file` field.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] if the file cannot be read, otherwise the
    /// sanitized error of the call.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn single(&self, path: &Path) -> ApiResult<UploadedFile> {
        let form = Form::new().part("file", file_part(path).await?);
        self.api.upload(SINGLE, form).await
    }

    /// Upload several files as repeated `files` fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::File`] for the first unreadable file, otherwise
    /// the sanitized error of the call.
    #[instrument(skip(self, paths), fields(count = paths.len()))]
    pub async fn multiple<P: AsRef<Path>>(&self, paths: &[P]) -> ApiResult<Vec<UploadedFile>> {
        let parts = try_join_all(paths.iter().map(|p| file_part(p.as_ref()))).await?;
        let form = parts
            .into_iter()
            .fold(Form::new(), |form, part| form.part("files", part));
        self.api
            .upload::<ListPayload<UploadedFile>>(MULTIPLE, form)
            .await
            .map(ListPayload::into_items)
    }
}

async fn file_part(path: &Path) -> ApiResult<Part> {
    let name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(source) => {
            tracing::debug!(path = %path.display(), "upload file unreadable");
            return Err(ApiError::File {
                name,
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let part = Part::bytes(bytes).file_name(name);
    match mime_for(path) {
        Some(mime) => part.mime_str(mime).map_err(ApiError::Setup),
        None => Ok(part),
    }
}

/// Content type for the file kinds the site accepts.
fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}
