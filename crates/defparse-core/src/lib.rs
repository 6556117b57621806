//! Feature-flag change definition parsing.
//!
//! A change definition is a loosely structured, line-oriented text blob
//! describing a feature flag: its default treatment, per-section whitelists
//! and configurations, traffic allocation, targeting rules and default rule.
//! This crate turns that text into a [`Definition`] record.
//!
//! ```text
//! default treatment:
//! standard
//!
//! configurations in Production:
//! {"premium": {"color": "gold"}}
//!
//! default rule:
//! 0%:premium 100%:standard
//! ```
//!
//! The parser never fails. Values it cannot interpret are kept as raw text
//! ([`FieldValue::Raw`]) and recorded as [`ParseWarning`]s.
//!
//! The [`event`] module holds the boundary around the parser: decoding a
//! change event and wrapping the parsed definition in a [`JobRunRecord`].

pub mod cursor;
pub mod error;
pub mod event;
pub mod json_block;
pub mod model;
pub mod parser;
pub mod warning;

pub use cursor::LineCursor;
pub use error::{Error, Result};
pub use event::{ChangeEvent, EnvelopeSettings, JobRunRecord};
pub use json_block::extract_json_block;
pub use model::{Definition, FieldValue, TargetingRules, TrafficAllocations, TreatmentSection};
pub use parser::{DefinitionParser, ParseReport, parse_definition};
pub use warning::ParseWarning;
