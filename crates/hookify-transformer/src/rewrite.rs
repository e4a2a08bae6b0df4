//! Reference rewriting.
//!
//! Rewrites instance references (`this.state.x`, `this.setState(...)`,
//! `this.props.x`, `this.method(...)`) into the bindings a function component
//! exposes. Only code is rewritten; strings and comments are left alone.
//! Template literal holes count as code.
//!
//! At every receiver occurrence the rules are tried in order:
//! 1. `<receiver>.state.<name>` → `<name>` for declared state entries.
//! 2. `<receiver>.setState({ <name>: <expr> })` → `set<Name>(<expr>)` for a
//!    single-field object literal naming a declared state entry.
//! 3. `<receiver>.props` → `props`.
//! 4. `<receiver>.<ident>(` → `<ident>(`.
//! 5. Any other `<receiver>.` prefix is stripped.

use crate::scanner::{ident_end, is_identifier, CodeMap};
use crate::types::{range, setter_name, StateEntry, Warning, WarningCode};
use regex::{Captures, Regex};
use smol_str::SmolStr;
use std::collections::HashSet;
use text_size::TextSize;

/// Rewritten text plus the warnings raised while rewriting it.
#[derive(Debug, Clone, Default)]
pub struct Rewritten {
    /// The rewritten text.
    pub text: String,
    /// Warnings, with ranges into the original source.
    pub warnings: Vec<Warning>,
}

/// State-aware instance reference rewriter for one component.
#[derive(Debug)]
pub struct ReferenceRewriter<'a> {
    states: &'a [StateEntry],
    methods: HashSet<&'a str>,
    receivers: &'a [SmolStr],
}

impl<'a> ReferenceRewriter<'a> {
    /// Creates a rewriter for the given state entries, method names and
    /// receiver keywords (usually `this` and `self`).
    pub fn new(
        states: &'a [StateEntry],
        methods: impl IntoIterator<Item = &'a str>,
        receivers: &'a [SmolStr],
    ) -> Self {
        Self {
            states,
            methods: methods.into_iter().collect(),
            receivers,
        }
    }

    /// Rewrites `text`, which starts at byte `base` of the original source.
    pub fn rewrite(&self, text: &str, base: TextSize) -> Rewritten {
        let mut warnings = Vec::new();
        let mut flattened = HashSet::new();
        let text = self.rewrite_at(text, usize::from(base), &mut warnings, &mut flattened);
        Rewritten { text, warnings }
    }

    /// Blanks out `const { a, b } = this.state;` statements whose names are
    /// all state entries, since those names are already bound.
    ///
    /// Removed statements are replaced by whitespace of the same length so
    /// offsets into the text stay valid.
    pub fn strip_state_destructuring(&self, text: &str) -> String {
        let receivers = self
            .receivers
            .iter()
            .map(|r| regex::escape(r))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"\b(?:const|let|var)\s*\{{([^{{}}]*)\}}\s*=\s*(?:{receivers})\s*\.\s*state\b\s*;?"
        );
        let Ok(re) = Regex::new(&pattern) else {
            return text.to_string();
        };
        let map = CodeMap::new(text);

        re.replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let start = caps.get(0).map_or(0, |m| m.start());
            let names: Vec<&str> = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect();
            let removable = map.is_code(start)
                && !names.is_empty()
                && names.iter().all(|n| is_identifier(n) && self.is_state(n));
            if removable {
                whole
                    .chars()
                    .map(|c| {
                        if c == '\n' {
                            "\n".to_string()
                        } else {
                            " ".repeat(c.len_utf8())
                        }
                    })
                    .collect::<String>()
            } else {
                whole.to_string()
            }
        })
        .into_owned()
    }

    fn is_state(&self, name: &str) -> bool {
        self.states.iter().any(|entry| entry.name == name)
    }

    fn rewrite_at(
        &self,
        text: &str,
        base: usize,
        warnings: &mut Vec<Warning>,
        flattened: &mut HashSet<SmolStr>,
    ) -> String {
        let map = CodeMap::new(text);
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut idx = 0;

        while idx < text.len() {
            if let Some((receiver, member_start)) = self.receiver_at(&map, idx) {
                let (replacement, resume) = self.rewrite_reference(
                    &map,
                    receiver,
                    idx,
                    member_start,
                    base,
                    warnings,
                    flattened,
                );
                out.push_str(&text[copied..idx]);
                out.push_str(&replacement);
                idx = resume;
                copied = resume;
                continue;
            }
            idx += 1;
        }

        out.push_str(&text[copied..]);
        out
    }

    /// If `<receiver>.` starts at `idx`, returns the receiver and the position
    /// after the dot.
    fn receiver_at(&self, map: &CodeMap<'_>, idx: usize) -> Option<(&'a str, usize)> {
        if !map.is_code(idx) {
            return None;
        }
        self.receivers.iter().find_map(|receiver| {
            let dot = idx + receiver.len();
            let is_reference = map.is_word_at(idx, receiver)
                && map.code_byte(dot) == Some(b'.')
                && map.code_byte(dot + 1) != Some(b'.');
            is_reference.then_some((receiver.as_str(), dot + 1))
        })
    }

    /// Rewrites the reference whose receiver starts at `idx`.
    ///
    /// Returns the replacement for `[idx, resume)`.
    #[allow(clippy::too_many_arguments)]
    fn rewrite_reference(
        &self,
        map: &CodeMap<'_>,
        receiver: &str,
        idx: usize,
        member_start: usize,
        base: usize,
        warnings: &mut Vec<Warning>,
        flattened: &mut HashSet<SmolStr>,
    ) -> (String, usize) {
        let text = map.source();
        let member_end = ident_end(text, member_start);
        let member = &text[member_start..member_end];

        match member {
            "state" => {
                if map.code_byte(member_end) == Some(b'.') {
                    let name_end = ident_end(text, member_end + 1);
                    let name = &text[member_end + 1..name_end];
                    if self.is_state(name) {
                        return (name.to_string(), name_end);
                    }
                }
                self.flatten(receiver, member, idx, member_end, base, warnings, flattened);
            }
            "setState" => {
                let open = map.skip_trivia(member_end, text.len());
                if map.code_byte(open) == Some(b'(') {
                    if let Some(call) = self.rewrite_set_state(map, open, base, warnings, flattened)
                    {
                        return call;
                    }
                }
                let end = map
                    .matching(open)
                    .map_or(member_end, |close| close + 1);
                warnings.push(Warning::new(
                    WarningCode::UnrewrittenSetState,
                    format!(
                        "`{}.setState` is only rewritten for a single-field object literal naming a state entry",
                        receiver
                    ),
                    range(base + idx, base + end),
                ));
            }
            "props" => {}
            "" => {}
            _ => {
                let next = map.skip_trivia(member_end, text.len());
                let is_call = map.code_byte(next) == Some(b'(');
                if !is_call && !self.methods.contains(member) {
                    self.flatten(receiver, member, idx, member_end, base, warnings, flattened);
                }
            }
        }

        (String::new(), member_start)
    }

    /// Rewrites `setState({ name: value })` whose argument list opens at `open`.
    fn rewrite_set_state(
        &self,
        map: &CodeMap<'_>,
        open: usize,
        base: usize,
        warnings: &mut Vec<Warning>,
        flattened: &mut HashSet<SmolStr>,
    ) -> Option<(String, usize)> {
        let text = map.source();
        let close = map.matching(open)?;
        let args = &text[open + 1..close];
        let arg_start = open + 1 + (args.len() - args.trim_start().len());
        let arg_end = open + 1 + args.trim_end().len();

        if map.code_byte(arg_start) != Some(b'{') || map.matching(arg_start)? + 1 != arg_end {
            return None;
        }

        let fields: Vec<(usize, usize)> = map
            .split_top_level(arg_start + 1, arg_end - 1, b',')
            .into_iter()
            .filter(|(s, e)| !text[*s..*e].trim().is_empty())
            .collect();
        let [(field_start, field_end)] = fields.as_slice() else {
            return None;
        };

        let (key, value_start) = match map.find_top_level(*field_start, *field_end, b':') {
            Some(colon) => (text[*field_start..colon].trim(), colon + 1),
            None => (text[*field_start..*field_end].trim(), *field_start),
        };
        let key = key.trim_matches(|c| c == '\'' || c == '"');
        if !is_identifier(key) || !self.is_state(key) {
            return None;
        }

        let value = &text[value_start..*field_end];
        let lead = value.len() - value.trim_start().len();
        let value = self.rewrite_at(value.trim(), base + value_start + lead, warnings, flattened);

        Some((format!("{}({})", setter_name(key), value), close + 1))
    }

    #[allow(clippy::too_many_arguments)]
    fn flatten(
        &self,
        receiver: &str,
        member: &str,
        idx: usize,
        member_end: usize,
        base: usize,
        warnings: &mut Vec<Warning>,
        flattened: &mut HashSet<SmolStr>,
    ) {
        if flattened.insert(SmolStr::new(member)) {
            warnings.push(Warning::new(
                WarningCode::InstanceMemberFlattened,
                format!(
                    "`{}.{}` has no local binding and was reduced to `{}`",
                    receiver, member, member
                ),
                range(base + idx, base + member_end),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Snippet;
    use pretty_assertions::assert_eq;

    fn state(names: &[&str]) -> Vec<StateEntry> {
        names
            .iter()
            .map(|name| StateEntry {
                name: SmolStr::new(name),
                initial_value_expr: "null".to_string(),
                value_range: Snippet::from_source("null", 0, 4).range,
            })
            .collect()
    }

    fn receivers() -> Vec<SmolStr> {
        vec![SmolStr::new("this"), SmolStr::new("self")]
    }

    fn rewrite(text: &str, states: &[&str], methods: &[&str]) -> Rewritten {
        let states = state(states);
        let receivers = receivers();
        let rewriter = ReferenceRewriter::new(&states, methods.iter().copied(), &receivers);
        rewriter.rewrite(text, TextSize::from(0))
    }

    #[test]
    fn test_state_reads() {
        let result = rewrite("this.state.count + this.state.step", &["count", "step"], &[]);
        assert_eq!(result.text, "count + step");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_state_read_requires_identifier_boundary() {
        let result = rewrite("this.state.counter", &["count"], &[]);
        assert_eq!(result.text, "state.counter");
        assert_eq!(result.warnings[0].code, WarningCode::InstanceMemberFlattened);
    }

    #[test]
    fn test_single_field_set_state() {
        let result = rewrite(
            "this.setState({ count: this.state.count + 1 });",
            &["count"],
            &[],
        );
        assert_eq!(result.text, "setCount(count + 1);");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_set_state_negation() {
        let result = rewrite("this.setState({ on: !this.state.on })", &["on"], &[]);
        assert_eq!(result.text, "setOn(!on)");
    }

    #[test]
    fn test_set_state_with_nested_object_value() {
        let result = rewrite(
            "this.setState({ user: { name: 'x', tags: [1, 2] } })",
            &["user"],
            &[],
        );
        assert_eq!(result.text, "setUser({ name: 'x', tags: [1, 2] })");
    }

    #[test]
    fn test_set_state_shorthand_field() {
        let result = rewrite("this.setState({ color })", &["color"], &[]);
        assert_eq!(result.text, "setColor(color)");
    }

    #[test]
    fn test_multi_field_set_state_is_left_alone() {
        let result = rewrite(
            "this.setState({ user: data, loading: false })",
            &["user", "loading"],
            &[],
        );
        assert_eq!(result.text, "setState({ user: data, loading: false })");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::UnrewrittenSetState);
    }

    #[test]
    fn test_updater_set_state_is_left_alone() {
        let result = rewrite(
            "this.setState(prev => ({ isOn: !prev.isOn }))",
            &["isOn"],
            &[],
        );
        assert_eq!(result.text, "setState(prev => ({ isOn: !prev.isOn }))");
        assert_eq!(result.warnings[0].code, WarningCode::UnrewrittenSetState);
    }

    #[test]
    fn test_set_state_unknown_key_is_left_alone() {
        let result = rewrite("this.setState({ other: 1 })", &["count"], &[]);
        assert_eq!(result.text, "setState({ other: 1 })");
    }

    #[test]
    fn test_props() {
        let result = rewrite(
            "this.props.title + this.props.subtitle; const { a } = this.props;",
            &[],
            &[],
        );
        assert_eq!(
            result.text,
            "props.title + props.subtitle; const { a } = props;"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_method_calls_and_references() {
        let result = rewrite(
            "<button onClick={this.toggle}>{this.label(1)}</button>",
            &[],
            &["toggle", "label"],
        );
        assert_eq!(result.text, "<button onClick={toggle}>{label(1)}</button>");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_bare_fallback_warns_once_per_member() {
        let result = rewrite(
            "this.timer = setInterval(tick, 1000);\nclearInterval(this.timer);",
            &[],
            &[],
        );
        assert_eq!(
            result.text,
            "timer = setInterval(tick, 1000);\nclearInterval(timer);"
        );
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::InstanceMemberFlattened);
        assert_eq!(u32::from(result.warnings[0].range.start()), 0);
    }

    #[test]
    fn test_strings_and_comments_are_untouched() {
        let result = rewrite(
            "const s = 'this.state.count'; // this.state.count\nthis.state.count",
            &["count"],
            &[],
        );
        assert_eq!(
            result.text,
            "const s = 'this.state.count'; // this.state.count\ncount"
        );
    }

    #[test]
    fn test_template_literal_holes_are_rewritten() {
        let result = rewrite("`Count: ${this.state.count}`", &["count"], &[]);
        assert_eq!(result.text, "`Count: ${count}`");
    }

    #[test]
    fn test_self_receiver() {
        let result = rewrite(
            "self.setState({ on: !self.state.on }); self.props.x",
            &["on"],
            &[],
        );
        assert_eq!(result.text, "setOn(!on); props.x");
    }

    #[test]
    fn test_receiver_requires_word_boundary() {
        let result = rewrite("xthis.state.a + that.this.state.a", &["a"], &[]);
        assert_eq!(result.text, "xthis.state.a + that.this.state.a");
    }

    #[test]
    fn test_warning_offsets_include_base() {
        let states = state(&[]);
        let receivers = receivers();
        let rewriter = ReferenceRewriter::new(&states, std::iter::empty(), &receivers);
        let result = rewriter.rewrite("f(this.x)", TextSize::from(100));
        assert_eq!(u32::from(result.warnings[0].range.start()), 102);
    }

    #[test]
    fn test_strip_state_destructuring() {
        let states = state(&["loading", "user"]);
        let receivers = receivers();
        let rewriter = ReferenceRewriter::new(&states, std::iter::empty(), &receivers);
        let prelude = "\n    const { loading, user } = this.state;\n    const x = 1;";
        let stripped = rewriter.strip_state_destructuring(prelude);
        assert_eq!(stripped.len(), prelude.len());
        assert_eq!(stripped.trim(), "const x = 1;");
    }

    #[test]
    fn test_strip_state_destructuring_keeps_renames() {
        let states = state(&["loading"]);
        let receivers = receivers();
        let rewriter = ReferenceRewriter::new(&states, std::iter::empty(), &receivers);
        let prelude = "const { loading: busy } = this.state;";
        assert_eq!(rewriter.strip_state_destructuring(prelude), prelude);
    }
}
