use anyhow::Result;
use clap::{Parser, Subcommand};
use modelgate::{Config, QueryRequest, Router};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modelgate")]
#[command(about = "Request routing and response caching for pluggable LLM backends", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route one query to a backend and print the answer
    Query {
        /// The query text
        text: String,

        /// Task hint for routing rules (e.g. "code")
        #[arg(long)]
        task: Option<String>,

        /// Mime hint for routing rules (e.g. "text/x-rust")
        #[arg(long)]
        mime: Option<String>,

        /// Prior context to fold into the prompt window
        #[arg(long)]
        context: Option<String>,
    },

    /// Show registered backends and where a sample query would route
    Check {
        /// Optional sample query to resolve
        sample: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    init_logging(&config);

    match cli.command {
        Commands::Query {
            text,
            task,
            mime,
            context,
        } => {
            let router = Router::new(config);
            let response = router
                .handle_query(QueryRequest {
                    query: text,
                    task,
                    mime,
                    cache_context: context,
                    ..Default::default()
                })
                .await?;

            tracing::info!(
                "Answered by {} ({})",
                response.backend,
                response.model
            );
            println!("{}", response.text);
        }

        Commands::Check { sample } => {
            let router = Router::new(config);
            let backends = router.registry().list();

            if backends.is_empty() {
                println!("No backends registered; set credentials in the config file or environment.");
            } else {
                println!("Registered backends: {}", backends.join(", "));
            }

            if let Some(sample) = sample {
                let (backend, model) = router.resolve(&QueryRequest::new(sample));
                let available = if router.registry().contains(&backend) {
                    "available"
                } else {
                    "NOT AVAILABLE"
                };
                println!("Sample query routes to {} / {} ({})", backend, model, available);
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
