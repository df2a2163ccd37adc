use std::path::PathBuf;

use a3s_event_producer::{EventError, PublisherConfig, Result, TransactionDetail, TxEvent};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "a3s-event-producer",
    about = "Publish a schema-encoded business event to Kafka"
)]
struct Cli {
    /// Path to an HCL configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker address (host:port), repeatable
    #[arg(short, long = "broker")]
    brokers: Vec<String>,

    /// Destination topic
    #[arg(short, long)]
    topic: Option<String>,

    /// Schema registry URL
    #[arg(long)]
    registry_url: Option<String>,

    /// Avro schema registered when the subject has none
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Delete the subject before resolving its schema
    #[arg(long)]
    delete_existing_schema: bool,

    /// JSON file holding the event to publish (defaults to a sample transaction)
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<(PublisherConfig, Option<PathBuf>)> {
        let mut cfg = match &self.config {
            Some(path) => PublisherConfig::from_file(path)?,
            None => PublisherConfig::default(),
        };

        if !self.brokers.is_empty() {
            cfg.broker_addresses = self.brokers;
        }
        if let Some(topic) = self.topic {
            cfg.topic = topic;
        }
        if let Some(url) = self.registry_url {
            cfg.registry_url = url;
        }
        if let Some(path) = self.schema_file {
            cfg.schema_file_path = path;
        }
        if self.delete_existing_schema {
            cfg.delete_existing_schema = true;
        }
        if let Some(level) = self.log_level {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok((cfg, self.event))
    }
}

fn load_event(path: Option<&PathBuf>) -> Result<TxEvent> {
    match path {
        Some(path) => {
            let src = std::fs::read_to_string(path).map_err(|e| {
                EventError::Config(format!("cannot read event file {}: {}", path.display(), e))
            })?;
            Ok(serde_json::from_str(&src)?)
        }
        None => Ok(sample_event()),
    }
}

fn sample_event() -> TxEvent {
    TxEvent::new(
        "4324",
        "BILLPAYMENT",
        TransactionDetail {
            tran_amount: 200.5,
            mer_fee_amt: 100.4,
            cus_fee_amt: 23.5,
        },
    )
    .with_company("PH0013", "ABC")
    .with_channel("BPP")
    .with_product("PH001")
    .with_classification("00", "CONFIRM", "SUCCESS")
}

async fn run(cfg: PublisherConfig, event_path: Option<PathBuf>) -> Result<()> {
    let event = load_event(event_path.as_ref())?;

    tracing::info!(
        topic = %cfg.topic,
        brokers = ?cfg.broker_addresses,
        registry = %cfg.registry_url,
        category = event.transaction_detail.category(),
        "Publishing event"
    );

    let receipt = a3s_event_producer::run(&cfg, &event).await?;

    tracing::info!(
        key = %receipt.key,
        schema_id = receipt.schema_id,
        partition = receipt.delivery.partition,
        offset = receipt.delivery.offset,
        "Event published"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let (cfg, event_path) = match cli.into_config() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("[a3s-event-producer] {} failed: {}", e.stage(), e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.log_level)),
        )
        .init();

    if let Err(e) = run(cfg, event_path).await {
        tracing::error!(stage = e.stage(), error = %e, "Publish run failed");
        eprintln!("[a3s-event-producer] {} failed: {}", e.stage(), e);
        std::process::exit(1);
    }
}
