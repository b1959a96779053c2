use ytmp4_rs::{fetch, request};

#[tokio::main]
async fn main() {
    env_logger::init();

    // Read url from args
    let url = std::env::args().nth(1).expect("No playlist url provided");
    let outdir = std::env::args()
        .nth(2)
        .unwrap_or_else(|| request::DEFAULT_PLAYLIST_DIR.to_string());

    println!(
        "Attempting to download videos from playlist: '{}' to '{}'...",
        url, outdir
    );
    let message = fetch::download_playlist(&url, &outdir).await;
    println!("{}", message);
}
