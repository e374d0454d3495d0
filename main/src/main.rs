mod chat_loop;
mod provision;

use std::{io::Write, process::ExitCode, sync::Arc};

use anyhow::Context;
use chat_loop::{run_chat_loop, separator};
use common::utils::{
    config::{get_config, AppConfig, MISSING_API_KEY_MESSAGE},
    embedding::EmbeddingProvider,
    llm::gemini_client,
};
use provision::provision_index;
use retrieval_pipeline::{GeminiChatModel, LanguageModel, RagQueryEngine};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn write_missing_key_message(out: &mut impl Write) -> std::io::Result<()> {
    for line in MISSING_API_KEY_MESSAGE {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

const MISSING_API_KEY_EXIT: u8 = 1;

#[derive(Debug, PartialEq, Eq)]
enum KeyCheck {
    Ready(String),
    Exit(u8),
}

/// Returns the trimmed API key, or prints the setup hint and the status to exit with.
fn check_api_key(config: &AppConfig, out: &mut impl Write) -> std::io::Result<KeyCheck> {
    match config.api_key() {
        Ok(key) => Ok(KeyCheck::Ready(key.to_string())),
        Err(_) => {
            write_missing_key_message(out)?;
            Ok(KeyCheck::Exit(MISSING_API_KEY_EXIT))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let config = get_config().context("failed to load configuration")?;

    let api_key = match check_api_key(&config, &mut std::io::stdout())? {
        KeyCheck::Ready(key) => key,
        KeyCheck::Exit(code) => return Ok(ExitCode::from(code)),
    };

    println!("Starting RAG AI Chat with Gemini API...");

    let client = Arc::new(gemini_client(&config, &api_key));
    let embedding_provider = Arc::new(
        EmbeddingProvider::from_config(&config, Arc::clone(&client))
            .context("failed to create embedding provider")?,
    );
    info!(
        embedding_backend = embedding_provider.backend_label(),
        embedding_dimension = embedding_provider.dimension(),
        "Embedding provider initialized"
    );

    let provisioned = provision_index(&config, Arc::clone(&embedding_provider))
        .await
        .context("failed to prepare the index")?;
    info!(outcome = ?provisioned.outcome, nodes = provisioned.index.len(), "Index ready");

    let llm: Arc<dyn LanguageModel> =
        Arc::new(GeminiChatModel::new(client, config.model_name.clone()));
    let engine = RagQueryEngine::from_config(
        Arc::new(provisioned.index),
        embedding_provider,
        llm,
        &config,
    );

    println!("\nAI ready to answer questions. Type 'exit' to quit.");
    println!("{}", separator());

    run_chat_loop(
        BufReader::new(tokio::io::stdin()),
        &mut tokio::io::stdout(),
        &engine,
    )
    .await
    .context("chat session ended with an error")?;

    Ok(ExitCode::SUCCESS)
}
