use std::time::Duration;

/// Default simulated time between two search steps.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_secs(5);

/// Tunables for a [`PathFinder`](crate::PathFinder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Elapsed time that must accumulate before `advance` performs a step.
    pub step_interval: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_interval: DEFAULT_STEP_INTERVAL,
        }
    }
}
