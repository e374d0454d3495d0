use std::io;

use common::error::AppError;
use futures::TryStreamExt;
use retrieval_pipeline::QueryEngine;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "sair"];
pub const SEPARATOR_WIDTH: usize = 50;

pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Matches the whole line, lowercased. Surrounding whitespace makes it a question.
pub fn is_exit_command(line: &str) -> bool {
    EXIT_COMMANDS.contains(&line.to_lowercase().as_str())
}

/// Reads questions line by line and writes streamed answers until a
/// sentinel or the first error. Input closing before a sentinel is an error.
pub async fn run_chat_loop<R, W, E>(
    mut input: R,
    output: &mut W,
    engine: &E,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    E: QueryEngine + ?Sized,
{
    let separator = separator();
    let mut line = String::new();

    loop {
        output.write_all(b"Your question: ").await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            debug!("Input closed before an exit command");
            return Err(AppError::Io(io::ErrorKind::UnexpectedEof.into()));
        }

        let question = line.trim_end_matches(['\n', '\r']);
        if is_exit_command(question) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        let mut answer = engine.query(question).await?;

        output.write_all(b"\nAI Response:\n").await?;
        output.flush().await?;
        while let Some(chunk) = answer.try_next().await? {
            output.write_all(chunk.as_bytes()).await?;
            output.flush().await?;
        }
        output
            .write_all(format!("\n{separator}\n").as_bytes())
            .await?;
        output.flush().await?;
    }

    Ok(())
}
