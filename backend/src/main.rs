use task_list::{server, telemetry, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    telemetry::init(&config);

    let service = server::build_service(&config)?;

    server::run(&config, service).await?;
    Ok(())
}
