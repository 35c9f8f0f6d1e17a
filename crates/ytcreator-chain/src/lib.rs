pub mod error;
pub mod prompt;
pub mod history;
pub mod step;
pub mod research;
pub mod pipeline;
pub mod session;

pub use error::ChainError;
pub use prompt::{variables, PromptTemplate, TemplateError, Variables, SCRIPT_TEMPLATE, TITLE_TEMPLATE};
pub use history::{HistoryEntry, HistoryStore};
pub use step::{GenerationStep, LlmSettings, DEFAULT_TEMPERATURE};
pub use research::{LookupError, ResearchLookup, WikipediaClient, WikipediaConfig};
pub use pipeline::{Pipeline, PipelineResult, PipelineStage};
pub use session::{Session, SessionLimits, SessionRegistry, SharedSession};
