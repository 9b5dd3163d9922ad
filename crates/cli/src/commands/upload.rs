//! Upload command.

use std::path::PathBuf;

use atelier_client::ClientState;

use super::{CommandError, print_json, require_session};

/// Upload one file through `/upload/single`, several through `/upload/multiple`.
pub async fn upload(state: &ClientState, files: &[PathBuf]) -> Result<(), CommandError> {
    require_session(state).await?;
    let uploads = state.uploads();
    match files {
        [file] => print_json(&uploads.single(file).await?),
        _ => print_json(&uploads.multiple(files).await?),
    }
}
