mod api;
mod config;

use bramble_core::{LoginTelemetry, ThresholdTable};
use bramble_detect::ScoringEngine;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bramble")]
#[command(about = "Score login telemetry for bot-vs-human confidence")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Analyze {
        #[arg(help = "Path to a captured telemetry JSON file")]
        telemetry: String,
        #[arg(short = 'f', long, help = "Path to a TOML threshold config")]
        config: Option<String>,
        #[arg(long, help = "Emit the raw JSON result instead of the text report")]
        json: bool,
    },
    Serve {
        #[arg(short = 'f', long, default_value = "bramble.toml", help = "Path to config file")]
        config: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bramble=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            telemetry,
            config,
            json,
        } => run_analyze(telemetry, config, json),
        Commands::Serve { config: config_path } => run_serve(config_path).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn load_thresholds(path: Option<&str>) -> Result<ThresholdTable, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(config::BrambleConfig::from_file(p)?.thresholds),
        None => Ok(ThresholdTable::default()),
    }
}

fn run_analyze(
    telemetry_path: String,
    config_path: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&telemetry_path)?;
    let telemetry: LoginTelemetry = serde_json::from_str(&raw)?;

    let thresholds = load_thresholds(config_path.as_deref())?;
    let engine = ScoringEngine::new(thresholds);
    let result = engine.analyze(&telemetry);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", bramble_report::render(&result));
    }

    Ok(())
}

async fn run_serve(config_path: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config::BrambleConfig::from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config {} not usable ({}), using defaults", config_path, e);
            config::BrambleConfig::default()
        }
    };

    let engine = ScoringEngine::new(config.thresholds);
    api::run_api(
        &config.api.bind,
        config.api.port,
        engine,
        config.api.max_records,
    )
    .await
}
