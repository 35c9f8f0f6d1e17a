// Configuration layer for provider-agnostic LLM client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for OpenAI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Sent as the `OpenAI-Organization` header when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Base URL for OpenAI API (optional, defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: None,
            base_url: None,
        }
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Provider-specific configuration details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderDetails {
    OpenAI(OpenAIConfig),
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(flatten)]
    pub details: ProviderDetails,
}

impl ProviderConfig {
    /// Create OpenAI provider config
    pub fn openai(config: OpenAIConfig) -> Self {
        Self {
            details: ProviderDetails::OpenAI(config),
        }
    }
}

/// Factory for creating LLM clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a chat client from provider configuration
    pub fn create_chat_client(
        config: ProviderConfig,
    ) -> Result<Arc<dyn crate::traits::ChatClient>> {
        match config.details {
            ProviderDetails::OpenAI(openai_config) => {
                let client = crate::openai::OpenAIClient::from_config(&openai_config)?;
                Ok(Arc::new(client))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_config_builder() {
        let config = OpenAIConfig::new("test-key")
            .with_organization("org-123")
            .with_base_url("http://localhost:9999/v1");

        assert_eq!(config.organization.as_deref(), Some("org-123"));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9999/v1"));
    }

    #[test]
    fn test_serde_tagged_shape() {
        let config = ProviderConfig::openai(OpenAIConfig::new("test-key").with_organization("org-1"));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "openai");
        assert_eq!(json["organization"], "org-1");
        assert!(json.get("base_url").is_none());

        let back: ProviderConfig = serde_json::from_value(json).unwrap();
        let ProviderDetails::OpenAI(openai) = back.details;
        assert_eq!(openai.organization.as_deref(), Some("org-1"));
    }

    #[test]
    fn test_factory_builds_client() {
        let config = ProviderConfig::openai(OpenAIConfig::new("test-key"));
        assert!(ClientFactory::create_chat_client(config).is_ok());
    }
}
