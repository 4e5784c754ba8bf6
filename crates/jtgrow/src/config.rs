//! Construction parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{JtError, Result};
use crate::incremental::Budget;

/// How the frontier driver decides whether a variable may join the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdmissionStrategy {
    /// Insert into the live clique list, widening ancestors as needed.
    #[default]
    Incremental,
    /// Re-evaluate the whole accepted order after each tentative addition.
    Replay,
    /// Recompute a min-fill order from scratch after each tentative addition.
    MinFill,
}

impl AdmissionStrategy {
    pub const ALL: [AdmissionStrategy; 3] = [Self::Incremental, Self::Replay, Self::MinFill];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Replay => "replay",
            Self::MinFill => "min-fill",
        }
    }
}

impl fmt::Display for AdmissionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionStrategy {
    type Err = JtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "incremental" => Ok(Self::Incremental),
            "replay" | "evaluate" | "bfs" => Ok(Self::Replay),
            "min-fill" | "minfill" | "min_fill" => Ok(Self::MinFill),
            other => Err(JtError::InvalidConfig(format!(
                "unknown admission strategy '{}'",
                other
            ))),
        }
    }
}

/// Parameters for growing a junction tree from a root variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Maximum number of variables per clique.
    pub max_width: usize,
    /// Maximum product of arities over a clique (incremental strategy only).
    pub max_factor_size: u64,
    pub strategy: AdmissionStrategy,
    /// Stop once this many variables have been accepted.
    pub max_vertices: Option<usize>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_width: 5,
            max_factor_size: 1 << 5,
            strategy: AdmissionStrategy::default(),
            max_vertices: None,
        }
    }
}

impl GrowthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn with_max_factor_size(mut self, max_factor_size: u64) -> Self {
        self.max_factor_size = max_factor_size;
        self
    }

    pub fn with_strategy(mut self, strategy: AdmissionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = Some(max_vertices);
        self
    }

    /// Reject parameters no tree could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.max_width == 0 {
            return Err(JtError::InvalidConfig(
                "max_width must be at least 1".to_string(),
            ));
        }
        if self.max_factor_size == 0 {
            return Err(JtError::InvalidConfig(
                "max_factor_size must be at least 1".to_string(),
            ));
        }
        if self.max_vertices == Some(0) {
            return Err(JtError::InvalidConfig(
                "max_vertices must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn budget(&self) -> Budget {
        Budget::new(self.max_width, self.max_factor_size)
    }
}
