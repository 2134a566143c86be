use anyhow::Result;
use common::bus::{BusConfig, EventBus};
use notifier::mailer::{LogMailer, MailConfig};
use notifier::service::Notifier;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("starting notifier service");

    let bus = EventBus::connect(&BusConfig::from_env()).await?;
    let mailer = LogMailer::new(MailConfig::from_env());

    let notifier = Notifier::new(bus, mailer);
    notifier.run().await?;

    Ok(())
}
