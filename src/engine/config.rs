//! Account engine configuration options.

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Label attached to every log line for this account.
    pub label: String,
    /// Maximum number of events to retain in memory.
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            label: "boost-account".to_string(),
            max_events: 10_000,
        }
    }
}
