use agentbay_core::{config::ConfigLoader, AgentBayError, ToolFactory, ToolRegistry};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

mod diagnose;

#[derive(Parser, Debug)]
#[clap(name = "agentbay", author, version, about = "Run code in AgentBay cloud sandboxes")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(long, short, help = "YAML configuration file (defaults to environment only)")]
    config: Option<PathBuf>,

    #[clap(long, short, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a snippet through the agentbay_run_code tool and print its stdout
    Run {
        #[clap(long, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,

        #[clap(long, help = "Read the code from a file")]
        file: Option<PathBuf>,

        #[clap(long, default_value = "python")]
        language: String,

        #[clap(long = "timeout", default_value_t = 60)]
        timeout_s: i64,

        #[clap(long = "label", help = "Session label as key=value (repeatable)")]
        labels: Vec<String>,
    },
    /// Send a JSON payload to the "Run AgentBay task" tool
    Task {
        #[clap(help = "Payload such as '{\"action\": \"retrieve_summarize\", \"inputs\": {\"query\": \"...\"}}'")]
        payload: String,
    },
    /// Print the metadata and input schema of every tool
    Tools,
    /// Check configuration and connectivity
    Diagnose {
        #[clap(long, default_value = ".env")]
        env_file: PathBuf,
    },
}

fn parse_labels(labels: &[String]) -> Result<Option<Map<String, Value>>> {
    if labels.is_empty() {
        return Ok(None);
    }

    let mut map = Map::new();
    for label in labels {
        let (key, value) = label
            .split_once('=')
            .ok_or_else(|| anyhow!("label '{}' must have the form key=value", label))?;
        map.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
    }
    Ok(Some(map))
}

/// Tag a tool failure with whether AgentBay was ever contacted.
fn describe_failure(err: AgentBayError) -> anyhow::Error {
    let context = if err.is_local() {
        "request rejected before contacting AgentBay"
    } else {
        "AgentBay call failed"
    };
    anyhow::Error::new(err).context(context)
}

async fn build_registry(config_path: Option<&PathBuf>) -> Result<ToolRegistry> {
    match config_path {
        Some(path) => {
            let config = ConfigLoader::from_file(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            Ok(ToolFactory::create_registry_with_config(config))
        }
        None => Ok(ToolFactory::create_default_registry()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = match cli.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", cli.log_level);
            LevelFilter::Info
        }
    };

    // stdout carries tool output only
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Run {
            code,
            file,
            language,
            timeout_s,
            labels,
        } => {
            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => return Err(anyhow!("either --code or --file is required")),
            };

            let mut arguments = json!({
                "code": code,
                "language": language,
                "timeout_s": timeout_s,
            });
            if let Some(labels) = parse_labels(&labels)? {
                arguments["labels"] = Value::Object(labels);
            }

            let registry = build_registry(cli.config.as_ref()).await?;
            let output = registry
                .invoke("agentbay_run_code", arguments)
                .await
                .map_err(describe_failure)?;
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Commands::Task { payload } => {
            let registry = build_registry(cli.config.as_ref()).await?;
            let output = registry
                .invoke("Run AgentBay task", json!({ "input_text": payload }))
                .await
                .map_err(describe_failure)?;
            println!("{}", output);
            Ok(())
        }
        Commands::Tools => {
            let registry = build_registry(cli.config.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&registry.list_tools())?);
            Ok(())
        }
        Commands::Diagnose { env_file } => {
            let passed = diagnose::run(&env_file, cli.config.as_deref()).await;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
