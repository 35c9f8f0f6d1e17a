use crate::error::{ChainError, Result};
use crate::history::HistoryStore;
use crate::prompt::{PromptTemplate, Variables};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ytcreator_llm::{ChatClient, ChatOptions, ChatRequest, Message};

pub const DEFAULT_TEMPERATURE: f64 = 0.9;

/// Model parameters shared by every generation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl LlmSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::new("gpt-4o-mini")
    }
}

/// A prompt template bound to a model client and its own history
///
/// `run` renders the prompt, asks the model, and records the exchange. Nothing
/// is recorded unless the model call succeeds.
pub struct GenerationStep {
    template: Arc<PromptTemplate>,
    history: HistoryStore,
    output_key: String,
    client: Arc<dyn ChatClient>,
    settings: Arc<LlmSettings>,
}

impl GenerationStep {
    pub fn new(
        template: Arc<PromptTemplate>,
        history: HistoryStore,
        output_key: impl Into<String>,
        client: Arc<dyn ChatClient>,
        settings: Arc<LlmSettings>,
    ) -> Self {
        Self {
            template,
            history,
            output_key: output_key.into(),
            client,
            settings,
        }
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub async fn run(&mut self, variables: &Variables) -> Result<String> {
        let prompt = self.template.render(variables)?;

        tracing::debug!(
            output_key = %self.output_key,
            prompt = %prompt,
            "Prompt after formatting"
        );

        let request = ChatRequest::new(self.settings.model.clone(), vec![Message::human(prompt.clone())])
            .with_options(ChatOptions::new().temperature(self.settings.temperature));

        let response = self.client.chat(request).await.map_err(ChainError::Model)?;

        let output = response
            .content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ChainError::EmptyCompletion {
                output_key: self.output_key.clone(),
            })?
            .to_string();

        self.history.append(prompt, output.clone());

        tracing::info!(
            output_key = %self.output_key,
            history_len = self.history.len(),
            "Generation step completed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::variables;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use ytcreator_llm::ChatResponse;

    struct RecordingClient {
        reply: Option<String>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Some(text) => Ok(ChatResponse::text(text.clone())),
                None => anyhow::bail!("401 Unauthorized"),
            }
        }
    }

    fn title_step(reply: Option<&str>) -> (GenerationStep, Arc<RecordingClient>) {
        let client = Arc::new(RecordingClient {
            reply: reply.map(String::from),
            requests: Mutex::new(Vec::new()),
        });
        let step = GenerationStep::new(
            Arc::new(PromptTemplate::title().unwrap()),
            HistoryStore::new("topic"),
            "title",
            client.clone(),
            Arc::new(LlmSettings::default()),
        );
        (step, client)
    }

    #[tokio::test]
    async fn test_run_records_prompt_and_output() {
        let (mut step, client) = title_step(Some("  Buzzing Secrets \n"));

        let output = step.run(&variables([("topic", "bees")])).await.unwrap();

        assert_eq!(output, "Buzzing Secrets");
        assert_eq!(step.history().len(), 1);
        let entry = &step.history().entries()[0];
        assert_eq!(entry.input, "Write me a YouTube video title about bees");
        assert_eq!(entry.output, "Buzzing Secrets");

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].options.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(requests[0].messages, vec![Message::human("Write me a YouTube video title about bees")]);
    }

    #[tokio::test]
    async fn test_model_failure_leaves_history_untouched() {
        let (mut step, _client) = title_step(None);

        let err = step.run(&variables([("topic", "bees")])).await.unwrap_err();

        assert!(matches!(err, ChainError::Model(_)));
        assert!(step.history().is_empty());
    }

    #[tokio::test]
    async fn test_empty_completion_is_an_error() {
        let (mut step, _client) = title_step(Some("   "));

        let err = step.run(&variables([("topic", "bees")])).await.unwrap_err();

        assert!(matches!(err, ChainError::EmptyCompletion { .. }));
        assert!(step.history().is_empty());
    }

    #[tokio::test]
    async fn test_template_error_skips_model_call() {
        let (mut step, client) = title_step(Some("unused"));

        let err = step.run(&Variables::new()).await.unwrap_err();

        assert!(matches!(err, ChainError::Template(_)));
        assert!(client.requests.lock().unwrap().is_empty());
    }
}
