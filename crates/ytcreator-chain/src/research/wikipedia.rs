//! Wikipedia lookup over the MediaWiki action API.
//!
//! A query runs a full-text search, then fetches the plain-text intro of the
//! top hits and renders them as `Page: <title>\nSummary: <extract>` blocks.

use super::{LookupError, ResearchLookup};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_LANG: &str = "en";
const DEFAULT_USER_AGENT: &str = concat!(
    "ytcreator/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/your-org/ytcreator)"
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    /// Wikipedia language edition, e.g. `en` or `de`
    pub lang: String,
    /// Full API endpoint; overrides the one derived from `lang`
    pub base_url: Option<String>,
    /// Number of search hits summarised per lookup
    pub top_k_results: usize,
    /// Upper bound on the returned summary, in characters
    pub max_chars: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            base_url: None,
            top_k_results: 3,
            max_chars: 4000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl WikipediaConfig {
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// MediaWiki action API endpoint queried by the client
    pub fn api_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}.wikipedia.org/w/api.php", self.lang.trim()),
        }
    }

    pub fn with_top_k_results(mut self, top_k: usize) -> Self {
        self.top_k_results = top_k;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

pub struct WikipediaClient {
    http: Client,
    endpoint: String,
    config: WikipediaConfig,
}

impl WikipediaClient {
    pub fn new(config: WikipediaConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.api_url(),
            config,
        })
    }

    pub fn config(&self) -> &WikipediaConfig {
        &self.config
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(params)
            .query(&[("format", "json"), ("formatversion", "2")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| LookupError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(LookupError::InvalidResponse(format!("{}: {}", error.code, error.info)));
        }
        body.query
            .ok_or_else(|| LookupError::InvalidResponse("missing `query` object".to_string()))
    }

    /// Titles of the best full-text matches, best first
    async fn search(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let limit = self.config.top_k_results.max(1).to_string();
        let result: SearchQuery = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
            ])
            .await?;
        Ok(result.search.into_iter().map(|hit| hit.title).collect())
    }

    /// Plain-text intro extracts, in the order of `titles`
    async fn extracts(&self, titles: &[String]) -> Result<Vec<(String, String)>, LookupError> {
        let joined = titles.join("|");
        let result: ExtractQuery = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", joined.as_str()),
            ])
            .await?;

        let mut renamed: HashMap<&str, &str> = HashMap::new();
        for rename in result.normalized.iter().chain(result.redirects.iter()) {
            renamed.insert(&rename.from, &rename.to);
        }

        let pages: HashMap<&str, &ExtractPage> = result
            .pages
            .iter()
            .filter(|page| !page.missing)
            .map(|page| (page.title.as_str(), page))
            .collect();

        let mut ordered = Vec::new();
        for title in titles {
            let mut resolved = title.as_str();
            // normalisation then redirect, at most one hop each
            for _ in 0..2 {
                if let Some(next) = renamed.get(resolved) {
                    resolved = *next;
                }
            }
            if let Some(page) = pages.get(resolved) {
                if let Some(extract) = page.extract.as_deref() {
                    ordered.push((page.title.clone(), extract.trim().to_string()));
                }
            }
        }
        Ok(ordered)
    }
}

#[async_trait]
impl ResearchLookup for WikipediaClient {
    async fn run(&self, query: &str) -> Result<String, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::NoResult(String::new()));
        }

        let titles = self.search(query).await?;
        tracing::debug!(query = %query, hits = titles.len(), "Wikipedia search completed");
        if titles.is_empty() {
            return Err(LookupError::NoResult(query.to_string()));
        }

        let pages = self.extracts(&titles).await?;
        format_pages(&pages, self.config.max_chars)
            .ok_or_else(|| LookupError::NoResult(query.to_string()))
    }
}

/// Render non-empty pages and cut the result to `max_chars` characters
fn format_pages(pages: &[(String, String)], max_chars: usize) -> Option<String> {
    let summary = pages
        .iter()
        .filter(|(_, extract)| !extract.is_empty())
        .map(|(title, extract)| format!("Page: {title}\nSummary: {extract}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    if summary.is_empty() {
        return None;
    }
    Some(summary.chars().take(max_chars).collect())
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    query: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    normalized: Vec<Rename>,
    #[serde(default)]
    redirects: Vec<Rename>,
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct Rename {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}
