//! State model building.
//!
//! Turns the object literal assigned to the instance state field into an
//! ordered list of state entries.

use crate::scanner::{is_identifier, CodeMap};
use crate::types::{range, Snippet, StateEntry, Warning, WarningCode};
use smol_str::SmolStr;

/// The result of building the state model.
#[derive(Debug, Default)]
pub struct StateModel {
    /// Entries in declaration order.
    pub entries: Vec<StateEntry>,
    /// Entries that could not be used.
    pub warnings: Vec<Warning>,
}

/// Builds the ordered state entries from a state initializer.
///
/// The snippet is the full object literal including its braces. Values are
/// split on top-level commas only, so nested objects, arrays and calls stay
/// intact. A missing initializer yields an empty model.
pub fn build_state_model(initializer: Option<&Snippet>) -> StateModel {
    let Some(initializer) = initializer else {
        return StateModel::default();
    };

    let text = initializer.text.as_str();
    let base = usize::from(initializer.offset());
    let map = CodeMap::new(text);

    let trimmed_start = text.len() - text.trim_start().len();
    let trimmed_end = text.trim_end().len();
    let (inner_start, inner_end) = match map.matching(trimmed_start) {
        Some(close) if text.as_bytes()[trimmed_start] == b'{' && close + 1 == trimmed_end => {
            (trimmed_start + 1, close)
        }
        _ => (trimmed_start, trimmed_end),
    };

    let mut model = StateModel::default();

    for (start, end) in map.split_top_level(inner_start, inner_end, b',') {
        let part = &text[start..end];
        if part.trim().is_empty() {
            continue;
        }
        let lead = part.len() - part.trim_start().len();
        let part_start = start + lead;
        let part_end = start + part.trim_end().len();

        match parse_entry(&map, part_start, part_end) {
            Some((name, value_start, value_end)) => {
                let entry = StateEntry {
                    name,
                    initial_value_expr: text[value_start..value_end].to_string(),
                    value_range: range(base + value_start, base + value_end),
                };
                insert_entry(&mut model, entry, range(base + part_start, base + part_end));
            }
            None => model.warnings.push(Warning::new(
                WarningCode::StateEntrySkipped,
                format!(
                    "state initializer entry `{}` has no static key and was skipped",
                    text[part_start..part_end].trim()
                ),
                range(base + part_start, base + part_end),
            )),
        }
    }

    model
}

/// Parses `key: value` or shorthand `key` in `[start, end)`.
///
/// Returns the key and the value range.
fn parse_entry(map: &CodeMap<'_>, start: usize, end: usize) -> Option<(SmolStr, usize, usize)> {
    let text = map.source();
    match map.find_top_level(start, end, b':') {
        Some(colon) => {
            let key = unquote(text[start..colon].trim())?;
            let value = &text[colon + 1..end];
            let value_start = colon + 1 + (value.len() - value.trim_start().len());
            let value_end = colon + 1 + value.trim_end().len();
            if value_start >= value_end {
                return None;
            }
            Some((SmolStr::new(key), value_start, value_end))
        }
        None => {
            let key = text[start..end].trim();
            if is_identifier(key) {
                Some((SmolStr::new(key), start, end))
            } else {
                None
            }
        }
    }
}

fn unquote(key: &str) -> Option<&str> {
    let inner = key
        .strip_prefix('\'')
        .and_then(|k| k.strip_suffix('\''))
        .or_else(|| key.strip_prefix('"').and_then(|k| k.strip_suffix('"')))
        .unwrap_or(key);
    is_identifier(inner).then_some(inner)
}

/// Adds an entry; a repeated key keeps its first position and takes the later value.
fn insert_entry(model: &mut StateModel, entry: StateEntry, entry_range: text_size::TextRange) {
    if let Some(existing) = model.entries.iter_mut().find(|e| e.name == entry.name) {
        model.warnings.push(Warning::new(
            WarningCode::DuplicateStateEntry,
            format!("state key `{}` is declared more than once", entry.name),
            entry_range,
        ));
        *existing = entry;
    } else {
        model.entries.push(entry);
    }
}
