use defparse_core::{DefinitionParser, parse_definition};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_parse_never_panics(text in "\\PC*") {
        let _ = parse_definition(&text);
    }

    #[test]
    fn test_parse_never_panics_on_header_soup(
        lines in prop::collection::vec(
            prop_oneof![
                Just("default treatment:".to_string()),
                Just("configurations in prod:".to_string()),
                Just("whitelist in prod:".to_string()),
                Just("traffic allocations:".to_string()),
                Just("targeting rules:".to_string()),
                Just("default rule:".to_string()),
                Just("{".to_string()),
                Just("}".to_string()),
                Just(String::new()),
                "[a-z0-9%:{}\\[\\] ]{0,12}",
            ],
            0..40,
        )
    ) {
        let report = DefinitionParser::new().parse_report(&lines.join("\n"));
        for warning in &report.warnings {
            prop_assert!(warning.line() >= 1);
            prop_assert!(warning.line() <= lines.len().max(1));
        }
    }

    #[test]
    fn test_comment_found_at_any_position(
        noise in prop::collection::vec("[a-z0-9%:{} ]{0,16}", 0..20),
        at in any::<prop::sample::Index>(),
        comment in "[a-zA-Z][a-zA-Z ]{0,20}[a-zA-Z]",
    ) {
        let mut lines = noise;
        let position = at.index(lines.len() + 1);
        lines.insert(position, format!("Comment for the change: {comment}"));

        let definition = parse_definition(&lines.join("\n"));
        prop_assert_eq!(definition.comment.as_deref(), Some(comment.as_str()));
    }

    #[test]
    fn test_default_treatment_ignores_blank_lines(
        blanks in prop::collection::vec("[ \t]{0,4}", 0..6),
        name in "[a-z_]{1,12}",
    ) {
        let text = format!("default treatment:\n{}\n{name}", blanks.join("\n"));
        let definition = parse_definition(&text);
        prop_assert_eq!(definition.default_treatment.as_deref(), Some(name.as_str()));
    }
}
