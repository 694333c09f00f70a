#[tokio::main]
async fn main() -> anyhow::Result<()> {
    leadvault::run().await
}
