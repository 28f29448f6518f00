//! AI suggestion results for an idea.

use serde::{Deserialize, Serialize};

/// Maximum tags a suggestion may carry.
pub const MAX_SUGGESTED_TAGS: usize = 5;

/// Maximum next steps a suggestion may carry.
pub const MAX_NEXT_STEPS: usize = 3;

/// Tags and next steps suggested by the AI adapter.
///
/// The empty value doubles as the degraded result: the adapter returns
/// `Suggestions::default()` on any failure instead of an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Suggestions {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl Suggestions {
    /// Build a suggestion set, clamping oversized lists to the 0-5 tag
    /// and 0-3 next-step bounds.
    pub fn clamped(mut tags: Vec<String>, mut next_steps: Vec<String>) -> Self {
        tags.truncate(MAX_SUGGESTED_TAGS);
        next_steps.truncate(MAX_NEXT_STEPS);
        Self { tags, next_steps }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.next_steps.is_empty()
    }
}
