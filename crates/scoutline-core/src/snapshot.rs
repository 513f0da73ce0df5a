// Metric snapshots: the sparse raw input of every scoring computation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::tier::AgeTier;

// ---------------------------------------------------------------------------
// Metric keys
// ---------------------------------------------------------------------------

/// Name of one raw measurement, e.g. `run_1b_seconds` or `grounders_2b_rep_3`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricKey(String);

impl MetricKey {
    pub fn new(key: impl Into<String>) -> Self {
        MetricKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MetricKey {
    fn from(key: &str) -> Self {
        MetricKey(key.to_string())
    }
}

impl From<String> for MetricKey {
    fn from(key: String) -> Self {
        MetricKey(key)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Why a metric lookup produced no number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputIssue {
    /// The key was not recorded for this assessment.
    Absent,
    /// The key was recorded but its value is not a finite number.
    Malformed,
}

/// One stored raw value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Malformed,
}

impl MetricValue {
    /// Coerce a loosely-typed JSON value. Numeric strings count as numbers;
    /// `null` is treated as not recorded and yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Number(n) => Some(match n.as_f64() {
                Some(v) if v.is_finite() => MetricValue::Number(v),
                _ => MetricValue::Malformed,
            }),
            serde_json::Value::String(s) => MetricValue::from_text(s),
            _ => Some(MetricValue::Malformed),
        }
    }

    /// Coerce a text cell. Blank text is not recorded and yields `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => MetricValue::Number(v),
            _ => MetricValue::Malformed,
        })
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable mapping from metric key to raw value for one assessment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSnapshot {
    values: BTreeMap<MetricKey, MetricValue>,
}

impl MetricSnapshot {
    /// Build a snapshot from already-numeric values without key validation.
    pub fn from_numbers<K, I>(values: I) -> Self
    where
        K: Into<MetricKey>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let values = values
            .into_iter()
            .map(|(k, v)| {
                let value = if v.is_finite() {
                    MetricValue::Number(v)
                } else {
                    MetricValue::Malformed
                };
                (k.into(), value)
            })
            .collect();
        MetricSnapshot { values }
    }

    /// Build a snapshot from a JSON object without key validation. Non-object
    /// input produces an empty snapshot.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let values = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| MetricValue::from_json(v).map(|mv| (MetricKey::from(k.as_str()), mv)))
                    .collect()
            })
            .unwrap_or_default();
        MetricSnapshot { values }
    }

    /// Build a snapshot from text cells (CSV rows, form fields).
    pub fn from_text<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values = cells
            .into_iter()
            .filter_map(|(k, v)| MetricValue::from_text(v).map(|mv| (MetricKey::from(k), mv)))
            .collect();
        MetricSnapshot { values }
    }

    /// Reject any key the tier's registry does not declare.
    pub fn validated_for(self, tier: AgeTier) -> Result<Self, ProfileError> {
        let profile = tier.profile();
        let known = profile.metric_keys();
        if let Some(unknown) = self.values.keys().find(|k| !known.contains(k.as_str())) {
            return Err(ProfileError::UnknownMetric {
                tier: tier.label().to_string(),
                key: unknown.to_string(),
            });
        }
        Ok(self)
    }

    /// Typed lookup of one key.
    pub fn lookup(&self, key: &MetricKey) -> Result<f64, InputIssue> {
        match self.values.get(key) {
            Some(MetricValue::Number(v)) => Ok(*v),
            Some(MetricValue::Malformed) => Err(InputIssue::Malformed),
            None => Err(InputIssue::Absent),
        }
    }

    /// Numeric value of `key`, with absent and malformed both collapsing to `None`.
    pub fn get(&self, key: &MetricKey) -> Option<f64> {
        self.lookup(key).ok()
    }

    /// Keys recorded with a non-numeric value.
    pub fn malformed_keys(&self) -> impl Iterator<Item = &MetricKey> {
        self.values
            .iter()
            .filter(|(_, v)| matches!(v, MetricValue::Malformed))
            .map(|(k, _)| k)
    }

    /// Every recorded key.
    pub fn keys(&self) -> impl Iterator<Item = &MetricKey> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric values as a JSON object, for audit storage alongside results.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    MetricValue::Number(n) => serde_json::json!(n),
                    MetricValue::Malformed => serde_json::Value::Null,
                };
                (k.to_string(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}
