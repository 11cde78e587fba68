use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gatehouse::cli::run().await
}
