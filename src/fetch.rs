use std::path::{Path, PathBuf};

use crate::{
    request::{FetchRequest, TargetKind},
    ytdlp::{Ytdlp, YtdlpError},
};

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("no target locator provided")]
    EmptyTarget,
    #[error("yt-dlp executable not found on PATH")]
    YtdlpNotFound,
    #[error("delegate failed for '{target}': {diagnostic}")]
    Delegate { target: String, diagnostic: String },
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Outcome of a successful dispatch.
#[derive(Debug)]
pub struct Fetched {
    pub request: FetchRequest,
    /// Final file path, reported for single-video requests only.
    pub final_path: Option<PathBuf>,
}

/// Create the output directory (and parents) if it is missing.
/// Calling this twice is not an error.
pub async fn ensure_output_root(path: &Path) -> std::io::Result<()> {
    if let Ok(true) = tokio::fs::try_exists(path).await {
        return Ok(());
    }
    tokio::fs::create_dir_all(path).await?;
    info!("Created directory: {}", path.display());
    Ok(())
}

/// Dispatch one request to the delegate: make sure the output root
/// exists, run yt-dlp, and map its failure modes onto ours.
pub async fn fetch(delegate: &Ytdlp, request: FetchRequest) -> Result<Fetched, FetchError> {
    if request.target.trim().is_empty() {
        return Err(FetchError::EmptyTarget);
    }

    ensure_output_root(&request.output_root).await?;

    info!(
        "Fetching {} '{}' into '{}'",
        request.kind.noun(),
        request.target,
        request.output_root.display()
    );

    let completed = delegate.run(&request).await.map_err(|e| match e {
        YtdlpError::NotFound => FetchError::YtdlpNotFound,
        YtdlpError::Failed(diagnostic) => FetchError::Delegate {
            target: request.target.clone(),
            diagnostic,
        },
        YtdlpError::IoError(e) => FetchError::IoError(e),
    })?;

    Ok(Fetched {
        final_path: completed.final_path,
        request,
    })
}

/// Download a single video as MP4 into `output_root`, returning a
/// human-readable status message.
pub async fn download_video(url: &str, output_root: impl AsRef<Path>) -> String {
    let request = FetchRequest::video(url, output_root.as_ref());
    report(&Ytdlp::new(), request).await
}

/// Download every video of a playlist as MP4, nested under a folder
/// named for the playlist. Already-fetched items recorded in the
/// resume ledger are skipped.
pub async fn download_playlist(url: &str, output_root: impl AsRef<Path>) -> String {
    let request = FetchRequest::playlist(url, output_root.as_ref());
    report(&Ytdlp::new(), request).await
}

/// Download every video of a channel as MP4, nested under a folder
/// named for the channel. Already-fetched items recorded in the
/// resume ledger are skipped.
pub async fn download_channel(url: &str, output_root: impl AsRef<Path>) -> String {
    let request = FetchRequest::channel(url, output_root.as_ref());
    report(&Ytdlp::new(), request).await
}

/// Run one dispatch and fold the result into the status string the
/// entry points hand back.
pub async fn report(delegate: &Ytdlp, request: FetchRequest) -> String {
    let kind = request.kind;
    let root = request.output_root.clone();

    match fetch(delegate, request).await {
        Ok(fetched) => match (kind, fetched.final_path) {
            (TargetKind::Video, Some(path)) => {
                format!("Success: MP4 saved to {}", path.display())
            }
            (TargetKind::Video, None) => {
                format!("Success: MP4 saved under '{}'", root.display())
            }
            _ => format!(
                "Success: All available videos from {} '{}' have been processed. Check '{}'.",
                kind.noun(),
                fetched.request.target,
                root.display()
            ),
        },
        Err(FetchError::Delegate { target, diagnostic }) => format!(
            "Error downloading {} '{}': {}. Please check the URL and ensure \
             ffmpeg is installed and accessible in your PATH.",
            kind.noun(),
            target,
            diagnostic
        ),
        Err(FetchError::YtdlpNotFound) => {
            "Error: yt-dlp not found. Install with: pip install yt-dlp".to_string()
        }
        Err(e) => format!("An unexpected error occurred: {}", e),
    }
}
