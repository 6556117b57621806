//! Definition parsing.
//!
//! A definition is read in one forward pass. Each non-blank line is checked
//! against the known headers in a fixed order and the first match handles
//! the lines that follow it:
//!
//! ```text
//! default treatment:              -> next non-blank line
//! whitelist in <section>:         -> next non-blank line, JSON array or raw
//! configurations in <section>:    -> JSON block, raw line, or empty
//! traffic allocations:            -> lines up to the next header, joined
//! targeting rules:                -> lines up to `default rule:`
//! default rule:                   -> `<percentage>:<treatment>` tokens
//! ```
//!
//! Lines that match no header are skipped. `Comment for the change:` and
//! `Title for the change:` are looked up afterwards over the whole text.

use crate::cursor::LineCursor;
use crate::json_block::extract_json_block;
use crate::model::{Definition, FieldValue};
use crate::warning::ParseWarning;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const DEFAULT_TREATMENT: &str = "default treatment:";
const TRAFFIC_ALLOCATIONS: &str = "traffic allocations:";
const TARGETING_RULES: &str = "targeting rules:";
const DEFAULT_RULE: &str = "default rule:";
const COMMENT_PREFIX: &str = "Comment for the change:";
const TITLE_PREFIX: &str = "Title for the change:";

/// Removed from the joined traffic allocation text.
const SPLIT_SUFFIX: &str = " in Split";

/// Trimmed-line prefixes that end the search for a configurations value.
const CONFIGURATION_BOUNDARIES: [&str; 5] = [
    "whitelist",
    "individually",
    "traffic",
    "targeting",
    "default rule",
];

/// Section headers such as `whitelist in Production:` or
/// `individually targeted premium served in Staging:`.
static SECTION_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(individually targeted ([A-Za-z0-9_]+) served|individually targeted segments served|whitelist|whitelist segment|configurations) in ([^:]+):",
    )
    .expect("Invalid section header regex")
});

/// Any `<word> in <name>:` line; ends multi-line collections.
static NEW_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" in ([A-Za-z0-9_]+):").expect("Invalid new header regex"));

/// The result of a parse together with every fallback taken along the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseReport {
    pub definition: Definition,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    /// `true` when every value was interpreted without a fallback.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Parser for feature-flag change definitions.
///
/// The parser holds no state between calls and may be shared freely
/// across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefinitionParser;

impl DefinitionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `text` into a [`Definition`].
    ///
    /// Never fails: malformed values are kept as raw text and logged.
    ///
    /// # Example
    /// ```
    /// use defparse_core::DefinitionParser;
    ///
    /// let text = "default treatment:\n\nstandard\ndefault rule:\n0%:premium 100%:standard";
    /// let definition = DefinitionParser::new().parse(text);
    /// assert_eq!(definition.default_treatment.as_deref(), Some("standard"));
    /// assert_eq!(definition.targeting_rules.default_rule["standard"], "100%");
    /// ```
    pub fn parse(&self, text: &str) -> Definition {
        self.parse_report(text).definition
    }

    /// Parse `text`, also returning the warnings for every fallback.
    pub fn parse_report(&self, text: &str) -> ParseReport {
        let mut scan = Scan::new(text);
        scan.run();
        scan.finish()
    }
}

/// Parse `text` with a default [`DefinitionParser`].
pub fn parse_definition(text: &str) -> Definition {
    DefinitionParser::new().parse(text)
}

/// A matched section header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionHeader {
    /// Label with spaces replaced by underscores, e.g. `whitelist_segment`.
    label: String,
    section: String,
}

impl SectionHeader {
    fn find(line: &str) -> Option<Self> {
        SECTION_HEADER_REGEX
            .captures_iter(line)
            .find(|caps| {
                // `individually targeted segmentsX served` is neither form.
                caps.get(2).is_none_or(|word| {
                    let word = word.as_str();
                    word == "segments" || !word.starts_with("segments")
                })
            })
            .map(|caps| Self {
                label: caps[1].replace(' ', "_"),
                section: caps[3].to_string(),
            })
    }
}

fn is_configuration_boundary(line: &str) -> bool {
    CONFIGURATION_BOUNDARIES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Parse `"0%:premium 100%:standard"` into treatment -> percentage.
///
/// Tokens without a colon or with an empty side are skipped.
fn parse_default_rule(line: &str) -> BTreeMap<String, String> {
    let mut allocations = BTreeMap::new();
    for token in line.split(' ').filter(|token| token.contains(':')) {
        let mut parts = token.split(':');
        let percentage = parts.next().unwrap_or_default();
        let treatment = parts.next().unwrap_or_default();
        if !percentage.is_empty() && !treatment.is_empty() {
            allocations.insert(treatment.trim().to_string(), percentage.trim().to_string());
        }
    }
    allocations
}

/// The first line starting with `prefix`, with the prefix removed.
fn find_trailer(lines: &[&str], prefix: &str) -> Option<String> {
    lines
        .iter()
        .find(|line| line.trim().starts_with(prefix))
        .map(|line| line.replacen(prefix, "", 1).trim().to_string())
}

/// State of a single parse.
struct Scan<'a> {
    cursor: LineCursor<'a>,
    definition: Definition,
    warnings: Vec<ParseWarning>,
}

impl<'a> Scan<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            cursor: LineCursor::new(text),
            definition: Definition::default(),
            warnings: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(raw) = self.cursor.current() {
            let line = raw.trim();
            let number = self.cursor.position() + 1;
            self.cursor.advance();
            if !line.is_empty() {
                self.dispatch(line, number);
            }
        }
    }

    fn finish(mut self) -> ParseReport {
        let lines = self.cursor.lines();
        self.definition.comment = find_trailer(lines, COMMENT_PREFIX);
        self.definition.title = find_trailer(lines, TITLE_PREFIX);

        ParseReport {
            definition: self.definition,
            warnings: self.warnings,
        }
    }

    /// Handle the header on `line`; the cursor is already past it.
    fn dispatch(&mut self, line: &str, number: usize) {
        if line.starts_with(DEFAULT_TREATMENT) {
            tracing::debug!(line = number, "default treatment header");
            self.read_default_treatment();
        } else if let Some(header) = SectionHeader::find(line) {
            tracing::debug!(
                line = number,
                label = %header.label,
                section = %header.section,
                "section header"
            );
            self.read_section(header);
        } else if line.starts_with(TRAFFIC_ALLOCATIONS) {
            tracing::debug!(line = number, "traffic allocations header");
            self.read_traffic_allocations();
        } else if line.starts_with(TARGETING_RULES) {
            tracing::debug!(line = number, "targeting rules header");
            self.read_targeting_rules();
        } else if line.starts_with(DEFAULT_RULE) {
            tracing::debug!(line = number, "default rule header");
            self.read_default_rule();
        }
    }

    /// Take the next non-blank line, leaving the cursor after it.
    fn take_next_non_blank(&mut self) -> Option<(usize, &'a str)> {
        match self.cursor.peek_non_blank() {
            Some((index, line)) => {
                self.cursor.advance_to(index + 1);
                Some((index, line))
            }
            None => {
                self.cursor.finish();
                None
            }
        }
    }

    fn read_default_treatment(&mut self) {
        if let Some((_, line)) = self.take_next_non_blank() {
            self.definition.default_treatment = Some(line.to_string());
        }
    }

    fn read_section(&mut self, header: SectionHeader) {
        let SectionHeader { label, section } = header;
        self.definition.section_mut(&section);

        let value = if label == "configurations" {
            self.read_configurations(&section)
        } else {
            self.read_listing(&section, &label)
        };

        self.definition.section_mut(&section).set(&label, value);
    }

    /// Whitelist-style value: `[]`, a JSON array, or the raw line.
    fn read_listing(&mut self, section: &str, label: &str) -> FieldValue {
        let Some((index, line)) = self.take_next_non_blank() else {
            return FieldValue::Raw(String::new());
        };

        if line == "[]" {
            return FieldValue::empty_list();
        }
        if !(line.starts_with('[') && line.ends_with(']')) {
            return FieldValue::Raw(line.to_string());
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => FieldValue::Json(value),
            Err(e) => {
                tracing::warn!(
                    section,
                    label,
                    line = index + 1,
                    error = %e,
                    "Invalid array, keeping raw text"
                );
                self.warnings.push(ParseWarning::InvalidArray {
                    section: section.to_string(),
                    label: label.to_string(),
                    line: index + 1,
                    raw: line.to_string(),
                    message: e.to_string(),
                });
                FieldValue::Raw(line.to_string())
            }
        }
    }

    /// Configurations value: a JSON block, a raw line, or nothing before the
    /// next header.
    fn read_configurations(&mut self, section: &str) -> FieldValue {
        let found = self
            .cursor
            .peek_trimmed(|line| is_configuration_boundary(line) || !line.is_empty());

        match found {
            None => {
                self.cursor.finish();
                FieldValue::empty_map()
            }
            Some((index, line)) if is_configuration_boundary(line) => {
                // The boundary header is consumed along with the empty value.
                self.cursor.advance_to(index + 1);
                FieldValue::empty_map()
            }
            Some((index, line)) if line.starts_with('{') => {
                self.cursor.advance_to(index);
                match extract_json_block(&mut self.cursor) {
                    Ok(value) => FieldValue::Json(value),
                    Err(warning) => {
                        let warning = warning.in_section(section);
                        tracing::error!(section, warning = %warning, "Error parsing JSON configuration");
                        let raw = warning.raw_text().to_string();
                        self.warnings.push(warning);
                        FieldValue::Raw(raw)
                    }
                }
            }
            Some((index, line)) => {
                self.cursor.advance_to(index + 1);
                FieldValue::Raw(line.to_string())
            }
        }
    }

    fn read_traffic_allocations(&mut self) {
        let lines = self
            .cursor
            .consume_until(|raw| raw.starts_with(TARGETING_RULES) || NEW_HEADER_REGEX.is_match(raw));

        let joined = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        self.definition.traffic_allocations.split =
            joined.replacen(SPLIT_SUFFIX, "", 1).trim().to_string();
    }

    fn read_targeting_rules(&mut self) {
        let lines = self
            .cursor
            .consume_until(|raw| raw.starts_with(DEFAULT_RULE) || NEW_HEADER_REGEX.is_match(raw));

        self.definition.targeting_rules.rules = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| {
                !line.is_empty() && !line.starts_with("Comment for") && !line.starts_with("Title for")
            })
            .map(str::to_string)
            .collect();
    }

    fn read_default_rule(&mut self) {
        if let Some((_, line)) = self.take_next_non_blank() {
            self.definition.targeting_rules.default_rule = parse_default_rule(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_section_header_whitelist() {
        let header = SectionHeader::find("whitelist in Production:").unwrap();
        assert_eq!(header.label, "whitelist");
        assert_eq!(header.section, "Production");
    }

    #[test]
    fn test_section_header_prefers_whitelist_segment() {
        let header = SectionHeader::find("whitelist segment in Staging:").unwrap();
        assert_eq!(header.label, "whitelist_segment");
        assert_eq!(header.section, "Staging");
    }

    #[test]
    fn test_section_header_individually_targeted() {
        let header =
            SectionHeader::find("individually targeted premium served in Split:").unwrap();
        assert_eq!(header.label, "individually_targeted_premium_served");

        let header =
            SectionHeader::find("individually targeted segments served in Split:").unwrap();
        assert_eq!(header.label, "individually_targeted_segments_served");
    }

    #[test]
    fn test_section_header_rejects_segments_prefix_word() {
        assert_eq!(
            SectionHeader::find("individually targeted segmentsx served in Split:"),
            None
        );
    }

    #[test]
    fn test_section_header_name_may_contain_spaces() {
        let header = SectionHeader::find("configurations in my env:").unwrap();
        assert_eq!(header.section, "my env");
    }

    #[test]
    fn test_new_header_regex_single_word_only() {
        assert!(NEW_HEADER_REGEX.is_match("whitelist in Production:"));
        assert!(!NEW_HEADER_REGEX.is_match("whitelist in my env:"));
        assert!(!NEW_HEADER_REGEX.is_match("100% in Split"));
    }

    #[test]
    fn test_parse_default_rule_tokens() {
        let rule = parse_default_rule("0%:premium  100%:standard bogus :empty 5%: 1%:a:b");
        let expected: BTreeMap<String, String> = [("premium", "0%"), ("standard", "100%"), ("a", "1%")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(rule, expected);
    }

    #[test]
    fn test_find_trailer_strips_prefix() {
        let lines = ["x", "  Comment for the change: rolled out  ", "y"];
        assert_eq!(
            find_trailer(&lines, COMMENT_PREFIX),
            Some("rolled out".to_string())
        );
        assert_eq!(find_trailer(&lines, TITLE_PREFIX), None);
    }

    #[test]
    fn test_configurations_boundary_header_is_skipped() {
        let text = "configurations in prod:\n\nwhitelist in prod:\n[\"alice\"]";
        let definition = DefinitionParser::new().parse(text);
        let section = &definition.treatments["prod"];
        assert_eq!(section.configurations, FieldValue::empty_map());
        // The whitelist header went with the empty configurations value.
        assert_eq!(section.whitelist, FieldValue::empty_list());
    }

    #[test]
    fn test_configurations_boundary_drops_targeting_rules_header() {
        let text = "configurations in prod:\ntargeting rules:\nr1\ndefault rule:\n100%:on";
        let definition = DefinitionParser::new().parse(text);
        assert!(definition.targeting_rules.rules.is_empty());
        assert_eq!(definition.targeting_rules.default_rule["on"], "100%");
    }

    #[test]
    fn test_configurations_raw_line() {
        let text = "configurations in prod:\nnot json\ndefault treatment:\non";
        let definition = DefinitionParser::new().parse(text);
        assert_eq!(
            definition.treatments["prod"].configurations,
            FieldValue::Raw("not json".into())
        );
        assert_eq!(definition.default_treatment.as_deref(), Some("on"));
    }

    #[test]
    fn test_invalid_array_is_reported() {
        let report = DefinitionParser::new().parse_report("whitelist in prod:\n[alice, bob]");
        assert_eq!(
            report.definition.treatments["prod"].whitelist,
            FieldValue::Raw("[alice, bob]".into())
        );
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            ParseWarning::InvalidArray { section, label, line: 2, .. }
                if section == "prod" && label == "whitelist"
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_listing_at_end_of_input_is_empty_text() {
        let definition = DefinitionParser::new().parse("whitelist segment in prod:\n\n");
        assert_eq!(
            definition.treatments["prod"].whitelist_segment,
            FieldValue::Raw(String::new())
        );
    }
}
