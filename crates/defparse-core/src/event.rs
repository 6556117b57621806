//! Change events and the job-run envelope built around a parsed definition.
//!
//! A change event carries the definition text plus metadata (time, editor,
//! change number, environment, flag name, link). The metadata is passed
//! through untouched into a [`JobRunRecord`], whose `job_run` field holds
//! the parsed [`Definition`]. Delivering the record is left to the caller.

use crate::error::{Error, Result};
use crate::model::Definition;
use crate::parser::DefinitionParser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An incoming feature-flag change event.
///
/// Metadata fields are `None` only when the key is absent; an explicit
/// `null` is kept as `Some(Value::Null)` and passed through as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    #[serde(default, deserialize_with = "present")]
    pub time: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub editor: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub change_number: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub environment_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    pub definition: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub link: Option<Value>,
}

/// Deserialize a present key as `Some`, including `null`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ChangeEvent {
    /// Decode an event from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode an event body, which is either an object or a string holding
    /// one.
    pub fn from_body(body: &Value) -> Result<Self> {
        match body {
            Value::String(text) => Self::from_json(text),
            Value::Object(_) => Ok(Self::deserialize(body)?),
            other => Err(Error::UnsupportedBody {
                kind: value_kind(other),
            }),
        }
    }

    /// Decode either a bare event or a wrapper with the event under `body`.
    pub fn from_envelope(event: &Value) -> Result<Self> {
        match event.get("body") {
            Some(body) => Self::from_body(body),
            None => Self::from_body(event),
        }
    }

    /// The definition text, or [`Error::MissingDefinition`].
    pub fn definition_text(&self) -> Result<&str> {
        self.definition.as_deref().ok_or(Error::MissingDefinition)
    }

    /// `time` when it is set and truthy, otherwise the change number.
    pub fn start_time(&self) -> Option<Value> {
        self.time
            .as_ref()
            .filter(|time| is_truthy(time))
            .or(self.change_number.as_ref())
            .cloned()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Constant fields of the job-run envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeSettings {
    /// Used for `pipeline`, `job_full_name` and `qualified_name`.
    pub pipeline: String,
    pub instance_name: String,
    pub instance_guid: Option<String>,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            pipeline: "FME".to_string(),
            instance_name: "FME-App".to_string(),
            instance_guid: None,
        }
    }
}

/// The record handed to a deployment-tracking endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRunRecord {
    pub pipeline: String,
    pub job_full_name: String,
    pub qualified_name: String,
    pub instance_name: String,
    pub instance_guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    pub duration: u64,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<Value>,
    pub job_run: Definition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<Value>,
}

impl JobRunRecord {
    /// Parse the event's definition and wrap it with the event metadata.
    ///
    /// # Errors
    /// Fails when the event has no definition or `settings` has no
    /// instance GUID. Problems inside the definition never fail.
    pub fn build(event: &ChangeEvent, settings: &EnvelopeSettings) -> Result<Self> {
        let instance_guid = settings
            .instance_guid
            .clone()
            .filter(|guid| !guid.is_empty())
            .ok_or(Error::MissingSetting {
                name: "instance_guid",
            })?;
        let definition = DefinitionParser::new().parse(event.definition_text()?);

        Ok(Self {
            pipeline: settings.pipeline.clone(),
            job_full_name: settings.pipeline.clone(),
            qualified_name: settings.pipeline.clone(),
            instance_name: settings.instance_name.clone(),
            instance_guid,
            start_time: event.start_time(),
            duration: 0,
            result: "SUCCESS".to_string(),
            user_id: event.editor.clone(),
            build_number: event.change_number.clone(),
            execution_id: event.change_number.clone(),
            branch_name: event.environment_name.clone(),
            module_name: event.name.clone(),
            project_name: event.name.clone(),
            job_run: definition,
            repo_url: event.link.clone(),
        })
    }
}
