use ytmp4_rs::{fetch, request};

#[tokio::main]
async fn main() {
    env_logger::init();

    // Read url from args
    let url = std::env::args().nth(1).expect("No channel url provided");
    let outdir = std::env::args()
        .nth(2)
        .unwrap_or_else(|| request::DEFAULT_CHANNEL_DIR.to_string());

    println!(
        "Attempting to download videos from channel: '{}' to '{}'...",
        url, outdir
    );
    let message = fetch::download_channel(&url, &outdir).await;
    println!("{}", message);
}
