#[tokio::main]
async fn main() {
    if let Err(e) = beatbars::app::run().await {
        tracing::error!("Fatal: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
