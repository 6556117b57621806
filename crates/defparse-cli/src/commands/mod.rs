//! Command implementations for defparse-cli

pub mod event;
pub mod parse;

pub use event::run_event;
pub use parse::run_parse;

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Read a whole input, from stdin when `file` is `None` or `-`.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn render<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}
