//! Search configuration.

use serde::{Deserialize, Serialize};
use synth_rules::PoolPolicy;

/// Whether a function may be applied more than once in one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionReuse {
    #[default]
    Once,
    Unlimited,
}

/// Bounds and policies for a single search.
///
/// Deserializes from partial documents; missing fields take their defaults.
///
/// ```ignore
/// let config: SearchConfig = serde_json::from_str(r#"{ "max_depth": 4, "pool": "consume" }"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Expansions allowed before giving up with `BoundExceeded`.
    pub max_expansions: usize,
    /// Longest pipeline (in steps) the search will generate.
    pub max_depth: Option<usize>,
    pub reuse: FunctionReuse,
    pub pool: PoolPolicy,
    /// Skip states equivalent to one already generated.
    pub deduplicate_states: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansions: 100_000,
            max_depth: None,
            reuse: FunctionReuse::Once,
            pool: PoolPolicy::Accumulate,
            deduplicate_states: true,
        }
    }
}

impl SearchConfig {
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_reuse(mut self, reuse: FunctionReuse) -> Self {
        self.reuse = reuse;
        self
    }

    pub fn with_pool(mut self, pool: PoolPolicy) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_deduplication(mut self, deduplicate_states: bool) -> Self {
        self.deduplicate_states = deduplicate_states;
        self
    }
}
