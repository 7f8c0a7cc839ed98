//! Sequential configuration and connectivity checks.
//!
//! Stops at the first hard failure. Connectivity problems are reported but
//! not fatal, since the endpoint may refuse unauthenticated probes.

use agentbay_core::config::{AgentBayConfig, ConfigLoader, Credentials, DEFAULT_API_KEY_ENV};
use agentbay_core::AgentBayCodeExecutor;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;

const OPTIONAL_VARS: [(&str, &str); 4] = [
    ("AGENTBAY_API_BASE", "AgentBay endpoint override"),
    ("OPENAI_API_KEY", "LLM API, used by the agent framework"),
    ("OPENAI_API_BASE", "Custom LLM endpoint"),
    ("OPENAI_MODEL_NAME", "Model name"),
];

fn header(title: &str) {
    println!("\n✓ {}", title);
}

/// Returns true when every hard check passed.
pub async fn run(env_file: &Path, config_path: Option<&Path>) -> bool {
    println!("{}", "=".repeat(80));
    println!("🔍 AgentBay Configuration Diagnostic");
    println!("{}", "=".repeat(80));

    header("Check 1: env file");
    if env_file.exists() {
        println!("  ✅ Found: {}", env_file.display());
    } else {
        println!("  ❌ NOT FOUND: {}", env_file.display());
        println!("  → Create it with {}=<your key>", DEFAULT_API_KEY_ENV);
        return false;
    }

    header("Check 2: Loading environment variables");
    match ConfigLoader::load_env_file(env_file) {
        Ok(loaded) => println!("  ✅ Loaded {} new variable(s)", loaded),
        Err(e) => {
            println!("  ❌ {}", e);
            return false;
        }
    }

    let config = match config_path {
        Some(path) => ConfigLoader::from_file(path).await,
        None => ConfigLoader::from_env(),
    };
    let config: AgentBayConfig = match config {
        Ok(config) => config,
        Err(e) => {
            println!("  ❌ {}", e);
            return false;
        }
    };

    header("Check 3: Required environment variables");
    match std::env::var(&config.api_key_env).ok().and_then(Credentials::new) {
        Some(credentials) => println!(
            "  ✅ {}: {} (AgentBay SDK)",
            config.api_key_env,
            credentials.masked()
        ),
        None if config.api_key.is_some() => {
            println!("  ✅ API key provided by configuration file")
        }
        None => {
            println!("  ❌ {}: NOT SET (AgentBay SDK)", config.api_key_env);
            println!("\n❌ Missing required variables. Please edit {}.", env_file.display());
            return false;
        }
    }
    for (var, desc) in OPTIONAL_VARS {
        match std::env::var(var) {
            Ok(value) if !value.is_empty() && var.ends_with("_KEY") => {
                let masked = Credentials::new(value).map(|c| c.masked()).unwrap_or_default();
                println!("  ℹ️  {}: {} ({})", var, masked, desc)
            }
            Ok(value) if !value.is_empty() => println!("  ℹ️  {}: {} ({})", var, value, desc),
            _ => println!("  ⚠️  {}: NOT SET ({}) - using default", var, desc),
        }
    }

    header("Check 4: Network connectivity");
    println!("  Testing: {}", config.api_base);
    check_connectivity(&config.api_base).await;

    header("Check 5: AgentBay executor");
    match AgentBayCodeExecutor::from_config(&config, None) {
        Ok(_) => {
            println!("  ✅ AgentBay executor initialized");
            println!("  Note: actual code execution requires a valid {}", config.api_key_env);
        }
        Err(e) => {
            println!("  ❌ AgentBay executor error: {}", e);
            return false;
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("✅ All checks passed!");
    println!("{}", "=".repeat(80));
    println!("\nTry: agentbay run --code \"print('hello from agentbay')\"");
    true
}

async fn check_connectivity(api_base: &str) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .user_agent("AgentBay-Diagnostic/1.0")
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            println!("  ❌ Could not build HTTP client: {}", e);
            return;
        }
    };

    match client.head(api_base).send().await {
        Ok(response) if response.status().is_success() => {
            println!("  ✅ Connection successful (HTTP {})", response.status().as_u16())
        }
        Ok(response)
            if matches!(
                response.status(),
                StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ) =>
        {
            println!("  ✅ Server reachable (HTTP {})", response.status().as_u16());
            println!("     This is normal - the endpoint exists and is accessible");
        }
        Ok(response) => println!("  ⚠️  HTTP {}", response.status()),
        Err(e) => {
            println!("  ❌ Connection failed: {}", e);
            println!("     Check your network or firewall settings");
        }
    }
}
