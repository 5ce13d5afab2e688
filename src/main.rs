#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examhall::run().await {
        eprintln!("examhall fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
