use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const DEFAULT_REVIEW_THRESHOLD: f64 = 95.0;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    /// Label for the value being merged (e.g. "adp", "hr").
    #[serde(default = "default_metric")]
    pub metric: String,
    pub policy: MergePolicy,
    #[serde(default = "default_threshold")]
    pub review_threshold: f64,
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_metric() -> String {
    "value".into()
}

fn default_threshold() -> f64 {
    DEFAULT_REVIEW_THRESHOLD
}

// ---------------------------------------------------------------------------
// Merge policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Weighted average of projected values, weights renormalized per player.
    WeightedBlend,
    /// Arithmetic mean of draft-position ranks.
    RankBlend,
}

impl MergePolicy {
    pub fn default_sort(&self) -> SortOrder {
        match self {
            Self::RankBlend => SortOrder::Ascending,
            Self::WeightedBlend => SortOrder::Input,
        }
    }
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeightedBlend => write!(f, "weighted_blend"),
            Self::RankBlend => write!(f, "rank_blend"),
        }
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub file: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "col_name")]
    pub name: String,
    #[serde(default = "col_team")]
    pub team: String,
    #[serde(default = "col_position")]
    pub position: String,
    #[serde(default = "col_value")]
    pub value: String,
}

fn col_name() -> String {
    "name".into()
}
fn col_team() -> String {
    "team".into()
}
fn col_position() -> String {
    "position".into()
}
fn col_value() -> String {
    "value".into()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: col_name(),
            team: col_team(),
            position: col_position(),
            value: col_value(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Input,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub consensus: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.sources.len() < 2 {
            return Err(ReconError::ConfigValidation(format!(
                "at least 2 sources are required, found {}",
                self.sources.len()
            )));
        }

        if !(0.0..=100.0).contains(&self.review_threshold) {
            return Err(ReconError::ConfigValidation(format!(
                "review_threshold must be within 0..=100, got {}",
                self.review_threshold
            )));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(ReconError::ConfigValidation("source id must not be empty".into()));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate source id '{}'",
                    source.id
                )));
            }
        }

        if self.policy == MergePolicy::WeightedBlend {
            let weights = self.weights()?;
            if !weights.values().any(|w| *w > 0.0) {
                return Err(ReconError::ConfigValidation(
                    "weighted_blend requires at least one positive weight".into(),
                ));
            }
            let total: f64 = weights.values().sum();
            if (total - 1.0).abs() > 1e-6 {
                tracing::warn!(total, "configured weights do not sum to 1.0; renormalizing per player");
            }
        }

        Ok(())
    }

    /// Configured weight per source. Errors if any source lacks a usable weight.
    pub fn weights(&self) -> Result<BTreeMap<String, f64>, ReconError> {
        let mut out = BTreeMap::new();
        for source in &self.sources {
            let w = source.weight.ok_or_else(|| {
                ReconError::ConfigValidation(format!(
                    "source '{}': weighted_blend requires a weight",
                    source.id
                ))
            })?;
            if !w.is_finite() || w < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "source '{}': weight must be a non-negative number, got {w}",
                    source.id
                )));
            }
            out.insert(source.id.clone(), w);
        }
        Ok(out)
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id.clone()).collect()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.output.sort.unwrap_or_else(|| self.policy.default_sort())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
