use async_openai::{
    error::OpenAIError,
    types::{
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use common::error::AppError;

use crate::RetrievedChunk;

/// Renders retrieved chunks as the context block of the QA prompt.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|retrieved| match retrieved.chunk.file_path() {
            Some(path) => format!("file_path: {path}\n\n{}", retrieved.chunk.text),
            None => retrieved.chunk.text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn create_qa_prompt(context: &str, query: &str) -> String {
    format!(
        "Context information is below.\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {query}\n\
         Answer: "
    )
}

pub fn create_chat_request(
    model: &str,
    prompt: String,
    stream: bool,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages([ChatCompletionRequestUserMessage::from(prompt).into()])
        .stream(stream)
        .build()
}

pub fn process_llm_response(response: CreateChatCompletionResponse) -> Result<String, AppError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(AppError::LLMParsing(
            "No content found in LLM response".into(),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::types::{text_chunk::TextChunk, Metadata};

    fn retrieved(path: Option<&str>, text: &str) -> RetrievedChunk {
        let mut metadata = Metadata::new();
        if let Some(path) = path {
            metadata.insert("file_path".into(), path.into());
        }
        RetrievedChunk {
            chunk: TextChunk::new("doc".into(), text.into(), metadata),
            score: 0.5,
        }
    }

    #[test]
    fn context_lists_chunks_with_their_source() {
        let context = format_context(&[
            retrieved(Some("transcripts/a.txt"), "Alpha text."),
            retrieved(None, "Beta text."),
        ]);

        assert_eq!(
            context,
            "file_path: transcripts/a.txt\n\nAlpha text.\n\nBeta text."
        );
    }

    #[test]
    fn prompt_wraps_context_and_query() {
        let prompt = create_qa_prompt("Some context.", "What happened?");

        assert_eq!(
            prompt,
            "Context information is below.\n---------------------\nSome context.\n---------------------\nGiven the context information and not prior knowledge, answer the query.\nQuery: What happened?\nAnswer: "
        );
    }

    #[test]
    fn chat_request_carries_model_and_stream_flag() {
        let request =
            create_chat_request("gemini-2.5-pro", "prompt".into(), true).expect("request");

        assert_eq!(request.model, "gemini-2.5-pro");
        assert_eq!(request.stream, Some(true));
        assert_eq!(request.messages.len(), 1);
    }
}
