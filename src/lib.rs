//! # ytmp4-rs
//!
//! This crate is thin glue around [yt-dlp](https://github.com/yt-dlp/yt-dlp):
//! given a video, playlist, or channel URL it builds the right option set
//! and output naming template, then hands the whole batch to yt-dlp, which
//! owns locator resolution, network fetch, transcoding and retries. The
//! merged output is normalized to MP4 (ffmpeg must be on `PATH`).
//!
//! ## Usage
//!
//! The three entry points are near-identical parameterizations of one
//! dispatch call and each return a human-readable status string:
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() {
//!     // A single video, saved flat as <output_root>/<title>.mp4
//!     let msg = ytmp4_rs::fetch::download_video(
//!         "https://www.youtube.com/watch?v=...",
//!         "downloaded_mp4s",
//!     )
//!     .await;
//!     println!("{}", msg);
//!
//!     // A whole playlist, nested under a folder named for the playlist.
//!     // A resume ledger in the output root lets a rerun skip items that
//!     // were already fetched.
//!     let msg = ytmp4_rs::fetch::download_playlist(
//!         "https://www.youtube.com/playlist?list=...",
//!         "downloaded_playlist_videos",
//!     )
//!     .await;
//!     println!("{}", msg);
//! }
//! ```
//!
//! For finer control, build a [`request::FetchRequest`] yourself and run
//! it through [`fetch::fetch`] with a [`ytdlp::Ytdlp`] handle.

#[forbid(unsafe_code)]
#[macro_use]
extern crate log;

pub mod fetch;
pub mod request;
pub mod ytdlp;
