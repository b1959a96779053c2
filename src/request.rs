use std::path::{Path, PathBuf};

/// Format selector handed to yt-dlp: prefer a separate MP4 video stream
/// merged with M4A audio, fall back to the best combined stream.
pub const FORMAT_MP4: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best";

/// Container the merged output is normalized to.
pub const MERGE_CONTAINER: &str = "mp4";

/// Default output directory for single videos.
pub const DEFAULT_VIDEO_DIR: &str = "downloaded_mp4s";
/// Default output directory for playlists.
pub const DEFAULT_PLAYLIST_DIR: &str = "downloaded_playlist_videos";
/// Default output directory for channels.
pub const DEFAULT_CHANNEL_DIR: &str = "downloaded_channel_videos";

const PLAYLIST_LEDGER: &str = "downloaded_videos.txt";
const CHANNEL_LEDGER: &str = "downloaded_channel_videos.txt";

/// Which kind of locator a fetch was invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Video,
    Playlist,
    Channel,
}

impl TargetKind {
    pub fn noun(&self) -> &'static str {
        match self {
            TargetKind::Video => "video",
            TargetKind::Playlist => "playlist",
            TargetKind::Channel => "channel",
        }
    }
}

/// Everything the delegate needs for one batch. Built fresh per
/// invocation and discarded once the delegate call returns; the only
/// state that outlives it is whatever yt-dlp writes under
/// `output_root` (files and, for collections, the resume ledger).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub kind: TargetKind,
    pub target: String,
    pub output_root: PathBuf,
    /// yt-dlp output template, relative to `output_root`.
    pub naming_template: String,
    pub format_selector: &'static str,
    /// Archive file yt-dlp consults to skip already-fetched items.
    pub resume_ledger: Option<PathBuf>,
    /// Skip failing items instead of aborting the batch.
    pub ignore_errors: bool,
    /// Refuse to expand a playlist URL into its items.
    pub no_playlist: bool,
    pub quiet: bool,
    /// Ask yt-dlp to print the final moved file path on stdout.
    pub report_final_path: bool,
}

impl FetchRequest {
    /// Request for a single video: flat filename, no ledger, fail on
    /// the first error.
    pub fn video(target: &str, output_root: &Path) -> Self {
        Self {
            kind: TargetKind::Video,
            target: target.to_string(),
            output_root: output_root.to_path_buf(),
            naming_template: "%(title)s.%(ext)s".to_string(),
            format_selector: FORMAT_MP4,
            resume_ledger: None,
            ignore_errors: false,
            no_playlist: true,
            quiet: true,
            report_final_path: true,
        }
    }

    /// Request for a playlist: one subfolder named after the playlist,
    /// files prefixed with their playlist index.
    pub fn playlist(target: &str, output_root: &Path) -> Self {
        Self {
            kind: TargetKind::Playlist,
            target: target.to_string(),
            output_root: output_root.to_path_buf(),
            naming_template: "%(playlist)s/%(playlist_index)s - %(title)s.%(ext)s".to_string(),
            format_selector: FORMAT_MP4,
            resume_ledger: Some(output_root.join(PLAYLIST_LEDGER)),
            ignore_errors: true,
            no_playlist: false,
            quiet: false,
            report_final_path: false,
        }
    }

    /// Request for a channel: one subfolder named after the channel,
    /// files prefixed with their upload date for chronological sorting.
    pub fn channel(target: &str, output_root: &Path) -> Self {
        Self {
            kind: TargetKind::Channel,
            target: target.to_string(),
            output_root: output_root.to_path_buf(),
            naming_template: "%(channel)s/%(upload_date)s - %(title)s.%(ext)s".to_string(),
            format_selector: FORMAT_MP4,
            resume_ledger: Some(output_root.join(CHANNEL_LEDGER)),
            ignore_errors: true,
            no_playlist: false,
            quiet: false,
            report_final_path: false,
        }
    }

    /// Naming template joined under the output root, as handed to yt-dlp.
    pub fn output_template(&self) -> String {
        self.output_root
            .join(&self.naming_template)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_request_is_flat_and_strict() {
        let req = FetchRequest::video("https://youtu.be/abc", Path::new("out"));
        assert_eq!(req.kind, TargetKind::Video);
        assert_eq!(req.naming_template, "%(title)s.%(ext)s");
        assert!(req.resume_ledger.is_none(), "single videos keep no ledger");
        assert!(req.no_playlist);
        assert!(!req.ignore_errors);
        assert!(req.report_final_path);
    }

    #[test]
    fn playlist_request_nests_by_playlist_name() {
        let req = FetchRequest::playlist("https://example.com/list", Path::new("out"));
        assert_eq!(
            req.naming_template,
            "%(playlist)s/%(playlist_index)s - %(title)s.%(ext)s"
        );
        assert_eq!(
            req.resume_ledger.as_deref(),
            Some(Path::new("out/downloaded_videos.txt"))
        );
        assert!(req.ignore_errors);
        assert!(!req.no_playlist);
    }

    #[test]
    fn channel_request_nests_by_channel_name() {
        let req = FetchRequest::channel("https://example.com/@chan", Path::new("out"));
        assert_eq!(
            req.naming_template,
            "%(channel)s/%(upload_date)s - %(title)s.%(ext)s"
        );
        assert_eq!(
            req.resume_ledger.as_deref(),
            Some(Path::new("out/downloaded_channel_videos.txt"))
        );
        assert!(req.ignore_errors);
    }

    #[test]
    fn output_template_is_rooted() {
        let req = FetchRequest::video("x", Path::new("some/dir"));
        assert_eq!(req.output_template(), "some/dir/%(title)s.%(ext)s");
    }
}
