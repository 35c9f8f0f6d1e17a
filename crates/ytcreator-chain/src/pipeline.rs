use crate::error::Result;
use crate::history::HistoryStore;
use crate::prompt::{variables, PromptTemplate, TemplateError};
use crate::research::ResearchLookup;
use crate::session::Session;
use crate::step::{GenerationStep, LlmSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;
use ytcreator_llm::ChatClient;

/// Everything shown for one successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub title: String,
    pub script: String,
    pub research: String,
}

/// How far the most recent submission of a session got
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Idle,
    TitleGenerated,
    ScriptGenerated,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::TitleGenerated => "title_generated",
            PipelineStage::ScriptGenerated => "script_generated",
        };
        f.write_str(name)
    }
}

/// Title → research → script, run against one session's history
///
/// Shared by every session: holds the model client, the lookup collaborator
/// and the two fixed templates. Per-session state lives in [`Session`].
pub struct Pipeline {
    client: Arc<dyn ChatClient>,
    lookup: Arc<dyn ResearchLookup>,
    settings: Arc<LlmSettings>,
    title_template: Arc<PromptTemplate>,
    script_template: Arc<PromptTemplate>,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn ChatClient>,
        lookup: Arc<dyn ResearchLookup>,
        settings: LlmSettings,
    ) -> std::result::Result<Self, TemplateError> {
        Ok(Self {
            client,
            lookup,
            settings: Arc::new(settings),
            title_template: Arc::new(PromptTemplate::title()?),
            script_template: Arc::new(PromptTemplate::script()?),
        })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Fresh session with empty title and script histories
    pub fn new_session(&self) -> Session {
        self.new_session_with_id(Uuid::new_v4())
    }

    pub fn new_session_with_id(&self, id: Uuid) -> Session {
        let title_step = GenerationStep::new(
            Arc::clone(&self.title_template),
            HistoryStore::new("topic"),
            "title",
            Arc::clone(&self.client),
            Arc::clone(&self.settings),
        );
        let script_step = GenerationStep::new(
            Arc::clone(&self.script_template),
            HistoryStore::new("title"),
            "script",
            Arc::clone(&self.client),
            Arc::clone(&self.settings),
        );
        Session::new(id, title_step, script_step)
    }

    /// Run one submission. An empty topic is a no-op and yields `None`.
    ///
    /// Any failure aborts the submission. Steps that already succeeded keep
    /// their history entry; no partial result is returned.
    pub async fn submit(&self, session: &mut Session, topic: &str) -> Result<Option<PipelineResult>> {
        if topic.trim().is_empty() {
            tracing::debug!(session_id = %session.id(), "Empty topic, skipping pipeline");
            return Ok(None);
        }

        let start = Instant::now();
        session.set_stage(PipelineStage::Idle);

        let title = session
            .title_step_mut()
            .run(&variables([("topic", topic)]))
            .await?;
        session.set_stage(PipelineStage::TitleGenerated);
        tracing::info!(session_id = %session.id(), stage = %session.stage(), "Title generated");

        // lookup uses the raw topic, not the generated title
        let research = self.lookup.run(topic).await?;
        tracing::info!(
            session_id = %session.id(),
            research_chars = research.chars().count(),
            "Research lookup completed"
        );

        let script = session
            .script_step_mut()
            .run(&variables([
                ("title", title.as_str()),
                ("wikipedia_research", research.as_str()),
            ]))
            .await?;
        session.set_stage(PipelineStage::ScriptGenerated);

        tracing::info!(
            session_id = %session.id(),
            stage = %session.stage(),
            duration_ms = %start.elapsed().as_millis(),
            "Pipeline completed"
        );

        Ok(Some(PipelineResult {
            title,
            script,
            research,
        }))
    }
}
