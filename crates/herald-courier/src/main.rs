//! Herald courier binary entry point.
//!
//! Usage: herald-courier [run|single|status] [--profile alpha|message]
//!
//! `run` (the default) consumes until SIGINT/SIGTERM, `single` processes
//! at most one waiting item and `status` prints a snapshot.

use clap::{Parser, Subcommand};
use herald_courier::{shutdown, Courier, CourierConfig, CourierError, CourierResult};
use std::path::PathBuf;
use tracing::{error, info};

/// Herald courier: posts queued events to social media.
#[derive(Parser, Debug)]
#[command(name = "herald-courier")]
#[command(about = "Consume queued events and publish them as posts")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Event profile to handle (alpha, message)
    #[arg(long, global = true, env = "COURIER_PROFILE")]
    profile: Option<String>,

    /// Queue name
    #[arg(long, global = true, env = "QUEUE_NAME")]
    queue: Option<String>,

    /// Redis connection URL
    #[arg(long, global = true, env = "REDIS_URL")]
    redis_url: Option<String>,

    /// Template file overriding the profile's built-in template
    #[arg(long, global = true, env = "COURIER_TEMPLATE")]
    template: Option<PathBuf>,

    /// Log posts instead of publishing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error). Defaults to info.
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to .env file (optional)
    #[arg(long, global = true, default_value = ".env")]
    dotenv: PathBuf,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Consume continuously
    Run,
    /// Process one available item and exit
    Single,
    /// Print queue, gateway and counter status
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn build_config(args: &Args) -> CourierResult<CourierConfig> {
    let mut config = CourierConfig::from_env()?;

    if let Some(profile) = &args.profile {
        config.profile = profile.parse()?;
    }
    if let Some(queue) = &args.queue {
        config.queue.queue_name = queue.clone();
    }
    if let Some(redis_url) = &args.redis_url {
        config.queue.redis_url = redis_url.clone();
    }
    if let Some(template) = &args.template {
        config.template_path = Some(template.clone());
    }
    if args.dry_run {
        config.dry_run = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> CourierResult<()> {
    let args = Args::parse();

    let loaded_dotenv = if args.dotenv.exists() {
        dotenvy::from_path(&args.dotenv).map_err(|e| {
            CourierError::Config(format!("failed to load {}: {}", args.dotenv.display(), e))
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
        service_name: "herald-courier".into(),
        default_level: log_level.to_lowercase(),
        also_stderr: true,
        ..observability::LogConfig::from_env()
    });

    if loaded_dotenv {
        info!(path = %args.dotenv.display(), "Loaded environment file");
    }

    let config = build_config(&args)?;
    info!(
        instance = %config.instance_name,
        profile = %config.profile,
        queue = %config.queue.queue_name,
        redis_url = %config.queue.redacted_url(),
        dry_run = config.dry_run,
        pop_timeout_secs = config.pop_timeout.as_secs(),
        max_consecutive_failures = config.max_consecutive_failures,
        "Configuration loaded"
    );

    let (trigger, shutdown) = shutdown::channel();
    let mut courier = Courier::connect(config, shutdown).await?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            courier.verify_gateway().await?;

            tokio::spawn(async move {
                shutdown::shutdown_signal().await;
                trigger.trigger();
            });

            if let Err(e) = courier.run().await {
                error!(error = %e, "Courier exited with error");
                return Err(e);
            }
        }
        Command::Single => {
            courier.verify_gateway().await?;
            let outcome = courier.process_next_available().await?;
            info!(outcome = ?outcome, "Single run finished");
        }
        Command::Status { json } => {
            let snapshot = courier.status_snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", snapshot);
            }
        }
    }

    Ok(())
}
