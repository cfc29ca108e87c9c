//! Word Explorer - autonomous word-learning agent
//!
//! Builds a bounded knowledge base of words, definitions, and related
//! words by following definitions from word to word.

// Use the library crate for all modules
use word_explorer::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (WARN level by default, use RUST_LOG=info for debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Run CLI
    cli::run().await
}
