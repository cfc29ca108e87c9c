//! CLI interface for word-explorer

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::engine::LearningEngine;
use crate::persistence::HttpPersistenceGateway;
use crate::predictor::NearestPredictor;
use crate::provider::HttpDefinitionProvider;

#[derive(Parser)]
#[command(name = "word-explorer")]
#[command(about = "Autonomous word-learning agent with a bounded knowledge base", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to an alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the continuous learning loop until Ctrl-C
    Learn {
        /// Word to start learning from (defaults to the configured seed)
        #[arg(short, long)]
        seed: Option<String>,
    },
    /// Chat with the agent using whatever it has learned
    Chat,
    /// Export the knowledge store as indented JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or initialize the configuration
    Config {
        /// Write a config file with the default settings
        #[arg(long)]
        init: bool,
        /// Show the active configuration
        #[arg(long)]
        show: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Learn { seed } => learn(&config, seed).await,
        Commands::Chat => chat(&config).await,
        Commands::Export { output } => export(&config, output).await,
        Commands::Config { init, show } => config_command(&config, init, show),
    }
}

/// Wire the engine up to its HTTP collaborators.
fn build_engine(config: &Config) -> Result<LearningEngine> {
    let provider = HttpDefinitionProvider::with_timeout(
        &config.provider.lookup_url,
        Duration::from_secs(config.provider.timeout_secs),
    )?;
    let gateway = HttpPersistenceGateway::new(
        &config.persistence.save_url,
        &config.persistence.load_url,
        config.persistence.chunk_size,
    )?;
    Ok(LearningEngine::new(
        config.engine(),
        Arc::new(provider),
        Arc::new(gateway),
        Arc::new(NearestPredictor::new()),
    ))
}

async fn learn(config: &Config, seed: Option<String>) -> Result<()> {
    let engine = build_engine(config)?;
    let seed = seed.unwrap_or_else(|| config.learning.seed_word.clone());

    engine.start(&seed).await;
    println!("Learning from '{seed}'. Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for Ctrl-C")?;

    engine.stop().await;
    engine.join().await;

    let stats = engine.stats().await;
    println!(
        "Stopped after {} iterations: {} words learned, {} lookup failures, {} fallbacks.",
        stats.iterations, stats.words_learned, stats.lookup_failures, stats.fallbacks
    );
    Ok(())
}

async fn chat(config: &Config) -> Result<()> {
    let engine = build_engine(config)?;
    engine.load().await;

    let mut rl = rustyline::DefaultEditor::new()?;
    println!("Chat with the agent (empty line or Ctrl-D to quit).");

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    break;
                }
                rl.add_history_entry(&line)?;
                let response = engine.send_message(&line).await;
                if response.is_empty() {
                    println!("(nothing known about that yet)");
                } else {
                    println!("{response}");
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    // words learned mid-chat should survive the session
    engine.stop().await;
    Ok(())
}

async fn export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let engine = build_engine(config)?;
    engine.load().await;

    let json = engine.export().await?;
    match output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported knowledge store to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn config_command(config: &Config, init: bool, show: bool) -> Result<()> {
    if init {
        let path = Config::default().save()?;
        println!("Wrote default configuration to {}", path.display());
    }
    if show || !init {
        let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
        print!("{rendered}");
    }
    Ok(())
}
