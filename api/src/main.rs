use auth_service::{config, http};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(".env").ok();
    dotenvy::from_filename("api/.env").ok();
    env_logger::init();

    let config = config::Config::parse();
    http::serve(config).await?;

    Ok(())
}
