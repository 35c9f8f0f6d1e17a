pub mod types;
pub mod traits;
pub mod config;
pub mod openai;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions};
pub use config::{ClientFactory, OpenAIConfig, ProviderConfig, ProviderDetails};
pub use openai::OpenAIClient;
pub use types::Message;
