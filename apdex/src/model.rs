//! Domain types for Apdex threshold optimization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default thresholds agents start with before anyone tunes them.
/// Surrounding UIs use these to flag suggestions that would loosen
/// rather than tighten the target.
pub const DEFAULT_APM_APDEX_T: f64 = 0.5;
pub const DEFAULT_BROWSER_APDEX_T: f64 = 7.0;

/// Runtimes whose agents do not accept server-side APM threshold
/// configuration. Suggestions for these are display-only.
pub const SERVER_CONFIG_UNSUPPORTED_LANGUAGES: [&str; 2] = ["php", "c"];

/// Opaque application identifier assigned by the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppGuid(String);

impl AppGuid {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metric family a threshold belongs to.
///
/// This is a closed set. Free-form tags are rejected when records cross
/// the deserialization boundary, so downstream code never has to handle
/// an unrecognized metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Apm,
    Browser,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Apm => "apm",
            MetricKind::Browser => "browser",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown metric family: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for MetricKind {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apm" => Ok(MetricKind::Apm),
            "browser" => Ok(MetricKind::Browser),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}

/// Currently configured vs suggested threshold for one metric family.
/// Either side may be absent: not every application reports both
/// products, and a suggestion only exists once enough data accrued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub current: Option<f64>,
    pub suggested: Option<f64>,
}

/// One monitored application, as fetched for a single UI session.
///
/// Records are read-only inputs: a successful apply only changes the
/// value stored remotely, which becomes visible on the next fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub guid: AppGuid,
    pub language: String,
    #[serde(default)]
    pub apm: ThresholdPair,
    #[serde(default)]
    pub browser: ThresholdPair,
}

impl ApplicationRecord {
    pub fn thresholds(&self, metric: MetricKind) -> &ThresholdPair {
        match metric {
            MetricKind::Apm => &self.apm,
            MetricKind::Browser => &self.browser,
        }
    }
}

/// One pending threshold update: "set this metric's Apdex T for this
/// application to `target_value`".
///
/// Immutable value object; created by `evaluate` and consumed exactly
/// once by the batch scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTask {
    pub guid: AppGuid,
    pub metric: MetricKind,
    pub target_value: f64,
}
