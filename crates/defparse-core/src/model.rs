//! The structured record produced from a definition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A captured value: JSON when it parsed, otherwise the raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Json(Value),
    Raw(String),
}

impl FieldValue {
    /// An empty JSON array.
    pub fn empty_list() -> Self {
        Self::Json(Value::Array(Vec::new()))
    }

    /// An empty JSON object.
    pub fn empty_map() -> Self {
        Self::Json(Value::Object(Map::new()))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Raw(text) => Some(text),
        }
    }

    /// The string items of a JSON array value.
    ///
    /// Returns `None` for raw text or non-array JSON; non-string items are
    /// skipped.
    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        self.as_json()?
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    /// `true` for empty arrays, empty objects and empty raw text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Json(Value::Array(items)) => items.is_empty(),
            Self::Json(Value::Object(map)) => map.is_empty(),
            Self::Json(_) => false,
            Self::Raw(text) => text.is_empty(),
        }
    }
}

/// Targeting data attached to one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentSection {
    /// Individually targeted keys (`whitelist in <section>:`).
    pub whitelist: FieldValue,
    /// Individually targeted segments (`whitelist segment in <section>:`).
    pub whitelist_segment: FieldValue,
    /// Per-treatment configurations (`configurations in <section>:`).
    pub configurations: FieldValue,
    /// Every other label, e.g. `individually_targeted_premium_served`.
    #[serde(flatten)]
    pub served: BTreeMap<String, FieldValue>,
}

impl Default for TreatmentSection {
    fn default() -> Self {
        Self {
            whitelist: FieldValue::empty_list(),
            whitelist_segment: FieldValue::empty_list(),
            configurations: FieldValue::empty_map(),
            served: BTreeMap::new(),
        }
    }
}

impl TreatmentSection {
    /// Store `value` under the underscore-normalized `label`.
    pub fn set(&mut self, label: &str, value: FieldValue) {
        match label {
            "whitelist" => self.whitelist = value,
            "whitelist_segment" => self.whitelist_segment = value,
            "configurations" => self.configurations = value,
            other => {
                self.served.insert(other.to_string(), value);
            }
        }
    }

    /// Look up a value by label, including the fixed fields.
    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        match label {
            "whitelist" => Some(&self.whitelist),
            "whitelist_segment" => Some(&self.whitelist_segment),
            "configurations" => Some(&self.configurations),
            other => self.served.get(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficAllocations {
    pub split: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingRules {
    pub rules: Vec<String>,
    /// Treatment name to percentage, kept as written (e.g. `"0%"`).
    pub default_rule: BTreeMap<String, String>,
}

/// A parsed feature-flag change definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub default_treatment: Option<String>,
    pub treatments: BTreeMap<String, TreatmentSection>,
    pub traffic_allocations: TrafficAllocations,
    pub targeting_rules: TargetingRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Definition {
    /// The section named `name`, created with default fields on first use.
    pub fn section_mut(&mut self, name: &str) -> &mut TreatmentSection {
        self.treatments.entry(name.to_string()).or_default()
    }
}
