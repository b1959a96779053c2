use ytmp4_rs::{fetch, request};

#[tokio::main]
async fn main() {
    env_logger::init();

    // Read url from args
    let url = std::env::args().nth(1).expect("No url provided");
    let outdir = std::env::args()
        .nth(2)
        .unwrap_or_else(|| request::DEFAULT_VIDEO_DIR.to_string());

    println!("Attempting to download and convert '{}' to MP4...", url);
    let message = fetch::download_video(&url, &outdir).await;
    println!("{}", message);
}
