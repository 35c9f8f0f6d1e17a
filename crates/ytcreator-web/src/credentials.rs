//! OpenAI key material read from a YAML file kept outside the deployed tree.
//!
//! ```yaml
//! ORG_ID: org-...
//! API_KEY: sk-...
//! ```

use config::{Config as ConfigLoader, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use ytcreator_llm::OpenAIConfig;

#[derive(Clone)]
pub struct Credentials {
    organization_id: String,
    api_key: String,
}

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(rename = "ORG_ID", alias = "org_id")]
    org_id: String,
    #[serde(rename = "API_KEY", alias = "api_key")]
    api_key: String,
}

impl Credentials {
    pub fn new(organization_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Read and validate the credentials file; every failure is fatal at startup
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Message(format!(
                "credentials file not found: {}",
                path.display()
            )));
        }

        let file: CredentialsFile = ConfigLoader::builder()
            .add_source(File::from(path).format(FileFormat::Yaml).required(true))
            .build()?
            .try_deserialize()?;

        let credentials = Self::new(file.org_id.trim(), file.api_key.trim());
        if credentials.organization_id.is_empty() {
            return Err(ConfigError::Message("ORG_ID must not be empty".to_string()));
        }
        if credentials.api_key.is_empty() {
            return Err(ConfigError::Message("API_KEY must not be empty".to_string()));
        }

        tracing::info!(path = %path.display(), "Credentials loaded");
        Ok(credentials)
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Client configuration carrying this key and organization
    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig::new(self.api_key.clone()).with_organization(self.organization_id.clone())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("organization_id", &self.organization_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
