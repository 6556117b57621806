//! Parse command implementation

use defparse_core::DefinitionParser;

use super::render;
use crate::error::Result;

/// Parse definition text and render it as JSON.
///
/// With `report` the output also carries the parse warnings.
pub fn run_parse(input: &str, report: bool, compact: bool) -> Result<String> {
    let parsed = DefinitionParser::new().parse_report(input);
    tracing::debug!(
        sections = parsed.definition.treatments.len(),
        warnings = parsed.warnings.len(),
        "Parsed definition"
    );

    if report {
        render(&parsed, compact)
    } else {
        render(&parsed.definition, compact)
    }
}
