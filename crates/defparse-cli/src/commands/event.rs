//! Event command implementation

use defparse_core::{ChangeEvent, EnvelopeSettings, JobRunRecord};
use serde_json::Value;

use super::render;
use crate::error::Result;

/// Decode a change event and render its job-run record as JSON.
pub fn run_event(input: &str, settings: &EnvelopeSettings, compact: bool) -> Result<String> {
    let value: Value = serde_json::from_str(input).map_err(defparse_core::Error::from)?;
    let event = ChangeEvent::from_envelope(&value)?;
    let record = JobRunRecord::build(&event, settings)?;

    tracing::info!(
        flag = ?record.module_name,
        environment = ?record.branch_name,
        "Built job-run record"
    );

    render(&record, compact)
}
