//! Generator configuration.
//!
//! All fields have defaults; a partial document deserializes with the
//! remaining fields filled in from [`GeneratorConfig::default`].

use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_DIFFICULTY;

/// Fewest paces a projection may request.
pub const MIN_TOTAL_PACES: usize = 72;

/// What the generator does with a pace the backoff ladder cannot place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedPolicy {
    /// Return it in `GenerationOutcome::unplaced`.
    #[default]
    Report,
    /// Abort generation with `GenerationError::Unplaced`.
    Fail,
}

/// Tunables for projection generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Minimum total paces across all subjects.
    pub min_total_paces: usize,
    /// Difficulty used when a request omits one.
    pub default_difficulty: u8,
    /// Run the post-placement balancer (frequency-balanced mode only).
    pub smoothing: bool,
    /// Handling of paces the backoff ladder cannot place.
    pub unplaced_policy: UnplacedPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_total_paces: MIN_TOTAL_PACES,
            default_difficulty: DEFAULT_DIFFICULTY,
            smoothing: true,
            unplaced_policy: UnplacedPolicy::Report,
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum total pace count.
    pub fn with_min_total_paces(mut self, min: usize) -> Self {
        self.min_total_paces = min;
        self
    }

    /// Sets the default difficulty.
    pub fn with_default_difficulty(mut self, difficulty: u8) -> Self {
        self.default_difficulty = difficulty;
        self
    }

    /// Enables or disables the balancer pass.
    pub fn with_smoothing(mut self, enabled: bool) -> Self {
        self.smoothing = enabled;
        self
    }

    /// Sets the unplaced-pace policy.
    pub fn with_unplaced_policy(mut self, policy: UnplacedPolicy) -> Self {
        self.unplaced_policy = policy;
        self
    }

    /// Configuration where any unplaced pace is fatal.
    pub fn strict() -> Self {
        Self::default().with_unplaced_policy(UnplacedPolicy::Fail)
    }
}
