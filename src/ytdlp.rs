use std::path::PathBuf;
use std::process::Stdio;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
};

use crate::request::{FetchRequest, MERGE_CONTAINER};

#[derive(thiserror::Error, Debug)]
pub enum YtdlpError {
    #[error("yt-dlp executable not found on PATH")]
    NotFound,
    #[error("yt-dlp failed: {0}")]
    Failed(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Handle to the yt-dlp executable. Locator resolution, network fetch
/// and transcoding all happen inside the spawned process.
pub struct Ytdlp {
    program: PathBuf,
}

/// What a finished yt-dlp run reported back.
#[derive(Debug)]
pub struct Completed {
    /// Final moved file path, when the request asked for one.
    pub final_path: Option<PathBuf>,
}

/// Translate a request into the yt-dlp command line.
pub fn build_args(req: &FetchRequest) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        req.format_selector.to_string(),
        "--merge-output-format".to_string(),
        MERGE_CONTAINER.to_string(),
        "-o".to_string(),
        req.output_template(),
    ];

    if req.no_playlist {
        args.push("--no-playlist".to_string());
    }
    if req.ignore_errors {
        args.push("--ignore-errors".to_string());
    }
    if let Some(ledger) = &req.resume_ledger {
        args.push("--download-archive".to_string());
        args.push(ledger.to_string_lossy().into_owned());
    }
    if req.quiet {
        args.push("--quiet".to_string());
    } else {
        args.push("--newline".to_string());
        args.push("--progress".to_string());
    }

    // Keep ffmpeg from flooding the output while merging streams
    args.push("--downloader-args".to_string());
    args.push("ffmpeg:-loglevel error".to_string());

    if req.report_final_path {
        args.push("--print".to_string());
        args.push("after_move:filepath".to_string());
    }

    args.push("--".to_string());
    args.push(req.target.clone());
    args
}

impl Ytdlp {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run yt-dlp to completion for one request, forwarding its output
    /// into the log. The child is killed if the future is dropped, so
    /// the delegate never outlives its caller.
    pub async fn run(&self, req: &FetchRequest) -> Result<Completed, YtdlpError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(build_args(req))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                YtdlpError::NotFound
            } else {
                YtdlpError::IoError(e)
            }
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes while the child runs; buffering either one
        // until exit can deadlock a chatty batch.
        let read_stdout = async {
            let mut last = None;
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Some(line) = lines.next_line().await? {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    debug!("yt-dlp: {}", line);
                    last = Some(line.to_string());
                }
            }
            Ok::<_, std::io::Error>(last)
        };
        let read_stderr = async {
            let mut last = None;
            let mut last_error = None;
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Some(line) = lines.next_line().await? {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with("ERROR") || line.starts_with("WARNING") {
                        warn!("yt-dlp: {}", line);
                    } else {
                        info!("yt-dlp: {}", line);
                    }
                    if line.starts_with("ERROR") {
                        last_error = Some(line.to_string());
                    }
                    last = Some(line.to_string());
                }
            }
            // yt-dlp tends to trail off with WARNING lines; the ERROR
            // line is the one worth surfacing
            Ok::<_, std::io::Error>(last_error.or(last))
        };
        let (last_out, last_err) = tokio::try_join!(read_stdout, read_stderr)?;

        let status = child.wait().await?;
        if !status.success() {
            let diagnostic = last_err
                .or(last_out)
                .unwrap_or_else(|| format!("exit status {}", status));
            return Err(YtdlpError::Failed(diagnostic));
        }

        let final_path = if req.report_final_path {
            last_out.map(PathBuf::from)
        } else {
            None
        };
        Ok(Completed { final_path })
    }
}

impl Default for Ytdlp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::request::FORMAT_MP4;

    fn pair_of(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .map(|i| args[i + 1].clone())
    }

    #[test]
    fn video_args_are_flat_and_quiet() {
        let req = FetchRequest::video("https://youtu.be/abc", Path::new("out"));
        let args = build_args(&req);

        assert_eq!(pair_of(&args, "-f").as_deref(), Some(FORMAT_MP4));
        assert_eq!(pair_of(&args, "--merge-output-format").as_deref(), Some("mp4"));
        assert_eq!(
            pair_of(&args, "-o").as_deref(),
            Some("out/%(title)s.%(ext)s")
        );
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(args.contains(&"--quiet".to_string()));
        assert_eq!(
            pair_of(&args, "--print").as_deref(),
            Some("after_move:filepath")
        );
        assert!(!args.contains(&"--ignore-errors".to_string()));
        assert!(!args.contains(&"--download-archive".to_string()));
    }

    #[test]
    fn playlist_args_tolerate_item_failures() {
        let req = FetchRequest::playlist("https://example.com/list", Path::new("out"));
        let args = build_args(&req);

        assert!(args.contains(&"--ignore-errors".to_string()));
        assert_eq!(
            pair_of(&args, "--download-archive").as_deref(),
            Some("out/downloaded_videos.txt")
        );
        assert!(args.contains(&"--progress".to_string()));
        assert!(!args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--quiet".to_string()));
    }

    #[test]
    fn channel_args_carry_ledger_and_ffmpeg_silencing() {
        let req = FetchRequest::channel("https://example.com/@chan", Path::new("out"));
        let args = build_args(&req);

        assert!(args.contains(&"--ignore-errors".to_string()));
        assert_eq!(
            pair_of(&args, "--download-archive").as_deref(),
            Some("out/downloaded_channel_videos.txt")
        );
        assert_eq!(
            pair_of(&args, "--downloader-args").as_deref(),
            Some("ffmpeg:-loglevel error")
        );
        assert!(args.contains(&"--progress".to_string()));
        assert!(!args.contains(&"--no-playlist".to_string()));
    }

    #[test]
    fn target_comes_last_behind_a_guard() {
        let req = FetchRequest::channel("-not-an-option", Path::new("out"));
        let args = build_args(&req);
        let n = args.len();
        assert_eq!(args[n - 2], "--");
        assert_eq!(args[n - 1], "-not-an-option");
    }

    #[cfg(unix)]
    mod stub {
        use std::os::unix::fs::PermissionsExt;

        use super::*;

        pub fn fake_ytdlp(dir: &Path, body: &str) -> std::path::PathBuf {
            let path = dir.join("yt-dlp");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn reports_final_path_on_success() {
            let dir = tempfile::tempdir().unwrap();
            let stub = fake_ytdlp(dir.path(), "echo '/tmp/out/video.mp4'");

            let req = FetchRequest::video("https://youtu.be/abc", dir.path());
            let done = Ytdlp::with_program(stub).run(&req).await.unwrap();
            assert_eq!(
                done.final_path.as_deref(),
                Some(Path::new("/tmp/out/video.mp4"))
            );
        }

        #[tokio::test]
        async fn surfaces_last_stderr_line_on_failure() {
            let dir = tempfile::tempdir().unwrap();
            let stub = fake_ytdlp(dir.path(), "echo 'ERROR: unable to extract' >&2; exit 1");

            let req = FetchRequest::video("https://youtu.be/abc", dir.path());
            let err = Ytdlp::with_program(stub).run(&req).await.unwrap_err();
            match err {
                YtdlpError::Failed(diag) => assert!(diag.contains("unable to extract")),
                other => panic!("expected Failed, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn error_line_beats_trailing_warning_as_diagnostic() {
            let dir = tempfile::tempdir().unwrap();
            let stub = fake_ytdlp(
                dir.path(),
                "echo 'ERROR: unable to extract' >&2; \
                 echo 'WARNING: some cleanup notice' >&2; exit 1",
            );

            let req = FetchRequest::video("https://youtu.be/abc", dir.path());
            let err = Ytdlp::with_program(stub).run(&req).await.unwrap_err();
            match err {
                YtdlpError::Failed(diag) => {
                    assert!(diag.contains("unable to extract"));
                    assert!(!diag.contains("cleanup notice"));
                }
                other => panic!("expected Failed, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn missing_program_maps_to_not_found() {
            let req = FetchRequest::video("https://youtu.be/abc", Path::new("out"));
            let err = Ytdlp::with_program("/nonexistent/yt-dlp")
                .run(&req)
                .await
                .unwrap_err();
            assert!(matches!(err, YtdlpError::NotFound));
        }
    }
}
