use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One prompt/completion exchange recorded by a generation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: String,
    pub output: String,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only conversation log for a single prompt template
///
/// Entries are kept in insertion order and never truncated. `buffer()` renders
/// them the way the history panels display them:
///
/// ```text
/// Human: <input>
/// AI: <output>
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStore {
    input_key: String,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new(input_key: impl Into<String>) -> Self {
        Self {
            input_key: input_key.into(),
            entries: Vec::new(),
        }
    }

    /// Name of the template variable this log is keyed by
    pub fn input_key(&self) -> &str {
        &self.input_key
    }

    pub fn append(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.entries.push(HistoryEntry {
            input: input.into(),
            output: output.into(),
            recorded_at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries concatenated in insertion order
    pub fn buffer(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("Human: {}\nAI: {}", entry.input, entry.output))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
