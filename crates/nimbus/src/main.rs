// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nimbus - A resilient chat assistant.
//!
//! This is the binary entry point for the Nimbus assistant.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod runtime;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use nimbus_config::NimbusConfig;
use nimbus_core::NimbusError;

/// Nimbus - A resilient chat assistant.
#[derive(Parser, Debug)]
#[command(name = "nimbus", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Chat interactively in the terminal.
    Chat {
        /// Continue an existing conversation.
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Show current weather for a city.
    Weather { city: String },
    /// Search the knowledge base.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration with credentials redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let loaded = match &cli.config {
        Some(path) => nimbus_config::load_and_validate_path(path),
        None => nimbus_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            nimbus_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Chat { conversation }) => chat::run_chat(config, conversation).await,
        Some(Commands::Weather { city }) => run_weather(config, &city).await,
        Some(Commands::Search { query, limit }) => run_search(config, &query, limit).await,
        Some(Commands::Config) => print_config(config),
        None => {
            println!("nimbus: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run_weather(config: NimbusConfig, city: &str) -> Result<(), NimbusError> {
    runtime::init_tracing(&config.agent.log_level);
    let agent = runtime::build_agent(&config).await?;
    let reading = agent.weather(city).await;
    println!(
        "{} {}  {}°C  湿度 {}%  风速 {}m/s  [{}]",
        reading.city.bold(),
        reading.description,
        reading.temperature,
        reading.humidity,
        reading.wind_speed,
        reading.icon
    );
    Ok(())
}

async fn run_search(
    config: NimbusConfig,
    query: &str,
    limit: Option<usize>,
) -> Result<(), NimbusError> {
    runtime::init_tracing(&config.agent.log_level);
    let agent = runtime::build_agent(&config).await?;
    let results = agent.search_knowledge(query, limit).await;
    if results.is_empty() {
        println!("{}", "no matching knowledge".dimmed());
    }
    for item in results {
        println!(
            "{} {} {}",
            format!("{:.2}", item.similarity.unwrap_or(0.0)).cyan(),
            item.title.bold(),
            item.source.as_deref().map(|s| format!("({s})")).unwrap_or_default().dimmed()
        );
        println!("     {}", item.content);
    }
    Ok(())
}

fn print_config(config: NimbusConfig) -> Result<(), NimbusError> {
    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| NimbusError::Config(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

fn redacted(mut config: NimbusConfig) -> NimbusConfig {
    for key in [
        &mut config.openai.api_key,
        &mut config.weather.api_key,
        &mut config.retrieval.embedding_api_key,
    ] {
        if key.is_some() {
            *key = Some("********".to_string());
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["nimbus", "search", "rust", "--limit", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Search { ref query, limit: Some(3) }) if query == "rust"
        ));

        let cli = Cli::try_parse_from(["nimbus", "--config", "x.toml", "weather", "北京"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Some(Commands::Weather { ref city }) if city == "北京"));
    }

    #[test]
    fn config_output_hides_credentials() {
        let mut config = NimbusConfig::default();
        config.openai.api_key = Some("sk-secret".into());
        let rendered = toml::to_string_pretty(&redacted(config)).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("********"));
    }
}
