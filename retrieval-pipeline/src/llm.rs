use std::sync::Arc;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use common::error::AppError;
use futures::{future, stream::BoxStream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::answer_retrieval::{create_chat_request, process_llm_response};

/// Lazily produced answer text, in arrival order.
pub type ResponseStream = BoxStream<'static, Result<String, AppError>>;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: String) -> Result<String, AppError>;

    async fn stream(&self, prompt: String) -> Result<ResponseStream, AppError>;
}

/// Gemini chat model reached through the OpenAI-compatible API.
pub struct GeminiChatModel {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl GeminiChatModel {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiChatModel {
    async fn complete(&self, prompt: String) -> Result<String, AppError> {
        let request = create_chat_request(&self.model, prompt, false)?;
        let response = self.client.chat().create(request).await?;
        process_llm_response(response)
    }

    async fn stream(&self, prompt: String) -> Result<ResponseStream, AppError> {
        let request = create_chat_request(&self.model, prompt, true)?;
        debug!(model = %self.model, "Opening chat completion stream");
        let stream = self.client.chat().create_stream(request).await?;

        Ok(stream
            .map_err(AppError::from)
            .try_filter_map(|response| {
                let content = response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty());
                future::ready(Ok(content))
            })
            .boxed())
    }
}
