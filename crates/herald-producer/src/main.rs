//! Herald producer binary entry point.
//!
//! Usage: herald-producer <publish|batch|status|generate> [--kind K]

use clap::{Parser, Subcommand};
use herald_content::EventKind;
use herald_producer::{
    parse_kind, EventGenerator, Producer, ProducerConfig, ProducerError, ProducerResult,
    QueueStatus,
};
use herald_queue::{QueueHandle, RedisQueue};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Herald producer: pushes synthetic events onto the queue.
#[derive(Parser, Debug)]
#[command(name = "herald-producer")]
#[command(about = "Generate events and publish them to the Herald queue")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Queue name
    #[arg(long, global = true, env = "QUEUE_NAME")]
    queue: Option<String>,

    /// Redis connection URL
    #[arg(long, global = true, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Log level (trace, debug, info, warn, error). Defaults to info.
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to .env file (optional)
    #[arg(long, global = true, default_value = ".env")]
    dotenv: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish one event
    Publish {
        /// Event kind (alert, business, scheduled, alpha, test); random if omitted
        #[arg(long)]
        kind: Option<String>,
    },
    /// Publish several events with pacing between sends
    Batch {
        /// Number of events to publish
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Event kind; random per event if omitted
        #[arg(long)]
        kind: Option<String>,
    },
    /// Print queue length and health
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a generated event as JSON without publishing it
    Generate {
        /// Event kind; random if omitted
        #[arg(long)]
        kind: Option<String>,
    },
}

fn resolve_kind(kind: Option<&str>) -> ProducerResult<Option<EventKind>> {
    kind.map(parse_kind).transpose()
}

fn build_config(args: &Args) -> ProducerConfig {
    let mut config = ProducerConfig::from_env();
    if let Some(queue) = &args.queue {
        config.queue.queue_name = queue.clone();
    }
    if let Some(redis_url) = &args.redis_url {
        config.queue.redis_url = redis_url.clone();
    }
    config
}

async fn connect(config: ProducerConfig) -> ProducerResult<Producer> {
    let queue: QueueHandle = Arc::new(RedisQueue::connect(&config.queue).await?);
    Ok(Producer::new(queue, config))
}

#[tokio::main]
async fn main() -> ProducerResult<()> {
    let args = Args::parse();

    let loaded_dotenv = if args.dotenv.exists() {
        dotenvy::from_path(&args.dotenv).map_err(|e| {
            ProducerError::Config(format!("failed to load {}: {}", args.dotenv.display(), e))
        })?;
        true
    } else {
        false
    };

    let log_level = args
        .log_level
        .clone()
        // The .env file is loaded after argument parsing.
        .or_else(|| std::env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());

    observability::init_with_config(observability::LogConfig {
        service_name: "herald-producer".into(),
        default_level: log_level.to_lowercase(),
        also_stderr: true,
        ..observability::LogConfig::from_env()
    });

    if loaded_dotenv {
        info!(path = %args.dotenv.display(), "Loaded environment file");
    }

    let config = build_config(&args);

    match &args.command {
        Command::Generate { kind } => {
            let kind = resolve_kind(kind.as_deref())?;
            let event = EventGenerator::new().generate(kind);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Command::Publish { kind } => {
            let kind = resolve_kind(kind.as_deref())?;
            let mut producer = connect(config).await?;
            let event = producer.generate(kind);
            let receipt = producer.publish(event).await?;
            println!(
                "published {} (queue length {})",
                receipt.queue_id, receipt.queue_length
            );
        }
        Command::Batch { count, kind } => {
            let kind = resolve_kind(kind.as_deref())?;
            let mut producer = connect(config).await?;
            let published = producer.batch_publish(*count, kind).await;
            println!("published {}/{}", published, count);
            if published < *count {
                error!(failed = count - published, "Some events were not published");
            }
        }
        Command::Status { json } => {
            let queue_name = config.queue.queue_name.clone();
            let status = match connect(config).await {
                Ok(producer) => producer.queue_status().await,
                Err(e) => QueueStatus::unreachable(queue_name, e.to_string()),
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", status);
            }
        }
    }

    Ok(())
}
