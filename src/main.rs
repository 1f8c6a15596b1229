use vestibule::configuration::get_configuration;
use vestibule::startup::build;
use vestibule::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("vestibule".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().expect("Failed to read configuration.");
    let app = build(config).await?;
    app.run().await?;

    Ok(())
}
