//! Distance metrics for vector ranking.
//!
//! Lower is closer for every metric, so results always sort ascending.
//! The distances themselves are computed by the vector store.

use lancedb::DistanceType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::KbaseError;

/// Distance function used to rank records against a query vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    L2,

    /// `1 - cosine similarity`, in `[0, 2]`
    Cosine,
}

impl DistanceMetric {
    /// The vector store's name for this metric
    pub fn distance_type(&self) -> DistanceType {
        match self {
            DistanceMetric::L2 => DistanceType::L2,
            DistanceMetric::Cosine => DistanceType::Cosine,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = KbaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l2" | "euclidean" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            other => Err(KbaseError::ConfigError(format!(
                "Unknown distance metric '{other}' (expected 'l2' or 'cosine')"
            ))),
        }
    }
}
