use purchasing_service::{config::Config, Application};
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.service_name, "info");

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
