//! Pattern extraction.
//!
//! Locates the structural regions of a class component without building a
//! full syntax tree: the class declaration, the state initializer, the mount
//! and unmount callbacks, auxiliary methods, and the render method's prelude
//! and returned markup expression.
//!
//! Class members are delimited by balanced-bracket scanning over code
//! positions. Class fields without a trailing semicolon end at the first line
//! break that completes the statement.

use crate::error::ExtractError;
use crate::scanner::{ident_end, is_ident_start, CodeMap};
use crate::types::{
    range, LifecycleBlock, LifecycleKind, MethodBody, MethodEntry, Snippet, Warning, WarningCode,
};
use regex::Regex;
use smol_str::SmolStr;
use std::sync::OnceLock;

/// Lifecycle callbacks with no effect-based counterpart.
const UNSUPPORTED_LIFECYCLES: &[&str] = &[
    "componentDidUpdate",
    "shouldComponentUpdate",
    "getSnapshotBeforeUpdate",
    "componentDidCatch",
    "componentWillMount",
    "componentWillReceiveProps",
    "componentWillUpdate",
    "UNSAFE_componentWillMount",
    "UNSAFE_componentWillReceiveProps",
    "UNSAFE_componentWillUpdate",
    "getDerivedStateFromProps",
    "getDerivedStateFromError",
];

/// The structural regions of one class component.
#[derive(Debug, Clone)]
pub struct ExtractedComponent {
    /// The class name.
    pub name: SmolStr,
    /// The state object literal, braces included.
    pub state_initializer: Option<Snippet>,
    /// The `componentDidMount` body.
    pub mount: Option<LifecycleBlock>,
    /// The `componentWillUnmount` body.
    pub unmount: Option<LifecycleBlock>,
    /// Auxiliary methods in declaration order.
    pub methods: Vec<MethodEntry>,
    /// Render statements preceding the returned expression.
    pub render_prelude: Snippet,
    /// The returned markup expression, without one wrapping pair of parentheses.
    pub template: Snippet,
    /// Members and statements that were dropped.
    pub warnings: Vec<Warning>,
}

fn class_declaration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\bclass\s+([A-Za-z_$][\w$]*)\s+extends\s+(?:[A-Za-z_$][\w$]*\s*\.\s*)?(?:Pure)?Component\b",
        )
        .expect("class declaration pattern is valid")
    })
}

/// Finds the first class component declaration at a code position.
///
/// Returns the class name and the end of the declaration header.
fn find_class(map: &CodeMap<'_>) -> Option<(SmolStr, usize)> {
    class_declaration()
        .captures_iter(map.source())
        .filter_map(|caps| Some((caps.get(0)?, caps.get(1)?)))
        .find(|(whole, _)| map.is_code(whole.start()))
        .map(|(whole, name)| (SmolStr::new(name.as_str()), whole.end()))
}

/// Whether `source` declares a class component.
pub fn is_class_component(source: &str) -> bool {
    find_class(&CodeMap::new(source)).is_some()
}

/// Extracts the structural regions of the first class component in `source`.
///
/// `receivers` are the instance receiver keywords used to find
/// `<receiver>.state = { ... }` assignments.
pub fn extract_component(
    source: &str,
    receivers: &[SmolStr],
) -> Result<ExtractedComponent, ExtractError> {
    let map = CodeMap::new(source);
    let (name, header_end) = find_class(&map).ok_or(ExtractError::NotAClassComponent)?;

    let body_open = map
        .find_code(header_end, source.len(), "{")
        .ok_or(ExtractError::NoRenderExpression)?;
    let body_close = map.matching(body_open).unwrap_or(source.len());
    let body_start = body_open + 1;

    let mut warnings = Vec::new();
    let members = parse_members(&map, body_start, body_close, &mut warnings);
    let state_assignment = state_assignment(receivers);

    let mut state_candidates: Vec<(usize, Snippet)> = Vec::new();
    if let Some(re) = &state_assignment {
        let found = re
            .find_iter(&source[body_start..body_close])
            .map(|m| (body_start + m.start(), body_start + m.end() - 1))
            .find(|(start, _)| map.is_code(*start));
        if let Some((start, brace)) = found {
            if let Some(close) = map.matching(brace) {
                state_candidates.push((start, Snippet::from_source(source, brace, close + 1)));
            }
        }
    }

    let mut mount = None;
    let mut unmount = None;
    let mut methods = Vec::new();
    let mut render = None;

    for member in members {
        let member_range = range(member.start, member.end);

        if UNSUPPORTED_LIFECYCLES.contains(&member.name.as_str()) {
            warnings.push(Warning::new(
                WarningCode::UnsupportedLifecycle,
                format!(
                    "`{}` has no effect-based counterpart and was omitted",
                    member.name
                ),
                member_range,
            ));
            continue;
        }
        if member.is_static {
            warnings.push(Warning::new(
                WarningCode::ClassFieldDropped,
                format!("static member `{}` was omitted", member.name),
                member_range,
            ));
            continue;
        }

        match member.kind {
            MemberKind::Function(parts) => {
                if member.name == "constructor" {
                    inspect_constructor(&map, &parts, state_assignment.as_ref(), &mut warnings);
                } else if member.name == "render" {
                    render.get_or_insert(parts);
                } else if let Some(kind) = LifecycleKind::from_method_name(&member.name) {
                    let slot = match kind {
                        LifecycleKind::Mount => &mut mount,
                        LifecycleKind::Unmount => &mut unmount,
                    };
                    if slot.is_some() {
                        warnings.push(Warning::new(
                            WarningCode::DuplicateLifecycle,
                            format!(
                                "`{}` is declared more than once; only the first is kept",
                                kind.method_name()
                            ),
                            member_range,
                        ));
                    } else {
                        *slot = Some(LifecycleBlock {
                            kind,
                            body: parts.body.snippet(source),
                        });
                    }
                } else {
                    let (params_start, params_end) = parts.params;
                    methods.push(MethodEntry {
                        name: member.name,
                        params_text: source[params_start..params_end].trim().to_string(),
                        body: parts.body.method_body(source),
                        is_async: parts.is_async,
                    });
                }
            }
            MemberKind::Field { value: Some((start, _)) }
                if member.name == "state" && map.code_byte(start) == Some(b'{') =>
            {
                if let Some(close) = map.matching(start) {
                    state_candidates.push((start, Snippet::from_source(source, start, close + 1)));
                }
            }
            MemberKind::Field { .. } => warnings.push(Warning::new(
                WarningCode::ClassFieldDropped,
                format!("class field `{}` was omitted", member.name),
                member_range,
            )),
            MemberKind::Accessor => warnings.push(Warning::new(
                WarningCode::ClassFieldDropped,
                format!("accessor `{}` was omitted", member.name),
                member_range,
            )),
        }
    }

    let state_initializer = state_candidates
        .into_iter()
        .min_by_key(|(start, _)| *start)
        .map(|(_, snippet)| snippet);

    let render = render.ok_or(ExtractError::NoRenderExpression)?;
    let (render_prelude, template) = split_render(&map, render.body)?;

    Ok(ExtractedComponent {
        name,
        state_initializer,
        mount,
        unmount,
        methods,
        render_prelude,
        template,
        warnings,
    })
}

/// Builds the `<receiver>.state = {` pattern for the configured receivers.
fn state_assignment(receivers: &[SmolStr]) -> Option<Regex> {
    if receivers.is_empty() {
        return None;
    }
    let receivers = receivers
        .iter()
        .map(|r| regex::escape(r))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{receivers})\s*\.\s*state\s*=\s*\{{")).ok()
}

/// Splits a render body into the prelude and the last top-level returned expression.
fn split_render(map: &CodeMap<'_>, body: BodyRange) -> Result<(Snippet, Snippet), ExtractError> {
    let source = map.source();
    match body {
        BodyRange::Block(start, end) => {
            let ret = map
                .top_level_keywords(start, end, "return")
                .last()
                .copied()
                .ok_or(ExtractError::NoRenderExpression)?;
            let expr_start = map.skip_trivia(ret + "return".len(), end);
            // Markup whose extent is unknown cannot be cut out safely.
            if map.source().as_bytes().get(expr_start) == Some(&b'<') && map.is_code(expr_start) {
                return Err(ExtractError::NoRenderExpression);
            }
            let expr_end = map.find_top_level(expr_start, end, b';').unwrap_or(end);
            let expr_end = trim_trivia_end(map, expr_start, expr_end);
            if expr_end <= expr_start {
                return Err(ExtractError::NoRenderExpression);
            }
            Ok((
                Snippet::from_source(source, start, ret),
                unwrap_parens(map, expr_start, expr_end),
            ))
        }
        BodyRange::Expression(start, end) => Ok((
            Snippet::from_source(source, start, start),
            unwrap_parens(map, start, end),
        )),
    }
}

/// Removes one pair of parentheses wrapping the whole of `[start, end)`.
fn unwrap_parens(map: &CodeMap<'_>, start: usize, end: usize) -> Snippet {
    if map.code_byte(start) == Some(b'(') && map.matching(start) == Some(end - 1) {
        Snippet::from_source(map.source(), start + 1, end - 1)
    } else {
        Snippet::from_source(map.source(), start, end)
    }
}

fn trim_trivia_end(map: &CodeMap<'_>, start: usize, mut end: usize) -> usize {
    while end > start && map.is_trivia(end - 1) {
        end -= 1;
    }
    end
}

/// Checks constructor statements, warning about those that are dropped.
///
/// `super(...)` calls, `.bind(` statements and the state assignment have
/// closure-based counterparts; everything else is reported.
fn inspect_constructor(
    map: &CodeMap<'_>,
    parts: &FunctionParts,
    state_assignment: Option<&Regex>,
    warnings: &mut Vec<Warning>,
) {
    let BodyRange::Block(start, end) = parts.body else {
        return;
    };
    let source = map.source();
    for (stmt_start, stmt_end) in map.split_top_level(start, end, b';') {
        let stmt_start = map.skip_trivia(stmt_start, stmt_end);
        if stmt_start >= stmt_end {
            continue;
        }
        let stmt_end = trim_trivia_end(map, stmt_start, stmt_end);
        let statement = &source[stmt_start..stmt_end];

        let kept = map.is_word_at(stmt_start, "super")
            || statement.contains(".bind(")
            || state_assignment.is_some_and(|re| re.is_match(statement));
        if !kept {
            let first_line = statement.lines().next().unwrap_or(statement).trim();
            warnings.push(Warning::new(
                WarningCode::ConstructorStatementDropped,
                format!("constructor statement `{}` was dropped", first_line),
                range(stmt_start, stmt_end),
            ));
        }
    }
}

/// A class member delimited in the class body.
#[derive(Debug)]
struct Member {
    name: SmolStr,
    is_static: bool,
    start: usize,
    end: usize,
    kind: MemberKind,
}

#[derive(Debug)]
enum MemberKind {
    /// A method or a field initialized with a function.
    Function(FunctionParts),
    /// A field with some other initializer, or none.
    Field { value: Option<(usize, usize)> },
    /// A `get` or `set` accessor.
    Accessor,
}

#[derive(Debug)]
struct FunctionParts {
    is_async: bool,
    params: (usize, usize),
    body: BodyRange,
}

#[derive(Debug, Clone, Copy)]
enum BodyRange {
    /// Inside the braces of a statement block.
    Block(usize, usize),
    /// A concise arrow body.
    Expression(usize, usize),
}

impl BodyRange {
    fn snippet(self, source: &str) -> Snippet {
        match self {
            BodyRange::Block(start, end) | BodyRange::Expression(start, end) => {
                Snippet::from_source(source, start, end)
            }
        }
    }

    fn method_body(self, source: &str) -> MethodBody {
        match self {
            BodyRange::Block(..) => MethodBody::Block(self.snippet(source)),
            BodyRange::Expression(..) => MethodBody::Expression(self.snippet(source)),
        }
    }
}

/// Delimits the members of a class body spanning `[start, end)`.
fn parse_members(
    map: &CodeMap<'_>,
    start: usize,
    end: usize,
    warnings: &mut Vec<Warning>,
) -> Vec<Member> {
    let mut members = Vec::new();
    let mut pos = start;

    loop {
        pos = skip_separators(map, pos, end);
        if pos >= end {
            break;
        }
        match parse_member(map, pos, end) {
            Ok((member, next)) => {
                members.push(member);
                pos = next;
            }
            Err(resume) => {
                let text = map.source()[pos..resume].trim();
                let first_line = text.lines().next().unwrap_or(text);
                warnings.push(Warning::new(
                    WarningCode::MethodBoundaryAmbiguity,
                    format!("could not delimit class member starting at `{}`", first_line),
                    range(pos, resume),
                ));
                pos = resume;
            }
        }
    }

    members
}

fn skip_separators(map: &CodeMap<'_>, mut pos: usize, end: usize) -> usize {
    loop {
        pos = map.skip_trivia(pos, end);
        if pos < end && map.code_byte(pos) == Some(b';') {
            pos += 1;
        } else {
            return pos;
        }
    }
}

/// Parses one member starting at `start`.
///
/// On success returns the member and the position to continue from. On
/// failure returns the position to resume scanning at, always past `start`.
fn parse_member(map: &CodeMap<'_>, start: usize, end: usize) -> Result<(Member, usize), usize> {
    let source = map.source();
    let mut pos = start;
    let mut is_static = false;
    let mut is_async = false;
    let mut accessor = false;

    loop {
        let word_end = ident_end(source, pos);
        let word = &source[pos..word_end];
        let after = map.skip_trivia(word_end, end);
        let modifier = matches!(word, "static" | "async" | "get" | "set")
            && after > word_end
            && source[after..]
                .chars()
                .next()
                .is_some_and(|c| is_ident_start(c) || matches!(c, '#' | '*' | '['));
        if !modifier {
            break;
        }
        match word {
            "static" => is_static = true,
            "async" => is_async = true,
            _ => accessor = true,
        }
        pos = after;
    }

    if map.code_byte(pos) == Some(b'*') {
        pos = map.skip_trivia(pos + 1, end);
    }
    let name_start = if map.code_byte(pos) == Some(b'#') {
        pos + 1
    } else {
        pos
    };
    let name_end = ident_end(source, name_start);
    if name_end == name_start {
        return Err(recover(map, start, end));
    }
    let name = SmolStr::new(&source[name_start..name_end]);
    let after_name = map.skip_trivia(name_end, end);

    match map.code_byte(after_name) {
        Some(b'(') => {
            let params_close = map
                .matching(after_name)
                .filter(|close| *close < end)
                .ok_or_else(|| recover(map, start, end))?;
            let body_open = map.skip_trivia(params_close + 1, end);
            if map.code_byte(body_open) != Some(b'{') {
                return Err(recover(map, start, end));
            }
            let body_close = map
                .matching(body_open)
                .filter(|close| *close < end)
                .ok_or_else(|| recover(map, start, end))?;
            let kind = if accessor {
                MemberKind::Accessor
            } else {
                MemberKind::Function(FunctionParts {
                    is_async,
                    params: (after_name + 1, params_close),
                    body: BodyRange::Block(body_open + 1, body_close),
                })
            };
            let member = Member {
                name,
                is_static,
                start,
                end: body_close + 1,
                kind,
            };
            Ok((member, body_close + 1))
        }
        Some(b'=') if map.code_byte(after_name + 1) != Some(b'=') => {
            let value_start = map.skip_trivia(after_name + 1, end);
            let (value_end, next) = field_end(map, value_start, end);
            let value_end = trim_trivia_end(map, value_start, value_end);
            let kind = match parse_function_value(map, value_start, value_end) {
                Some(parts) => MemberKind::Function(parts),
                None => MemberKind::Field {
                    value: Some((value_start, value_end)),
                },
            };
            let member = Member {
                name,
                is_static,
                start,
                end: value_end,
                kind,
            };
            Ok((member, next.max(value_end).max(after_name + 1)))
        }
        Some(b';') => Ok((field_without_value(name, is_static, start, name_end), after_name + 1)),
        _ if after_name >= end || source[name_end..after_name].contains('\n') => {
            Ok((field_without_value(name, is_static, start, name_end), after_name))
        }
        _ => Err(recover(map, start, end)),
    }
}

fn field_without_value(name: SmolStr, is_static: bool, start: usize, end: usize) -> Member {
    Member {
        name,
        is_static,
        start,
        end,
        kind: MemberKind::Field { value: None },
    }
}

/// Finds the end of a field initializer starting at `start`.
///
/// Returns the end of the value and the position after its terminator.
fn field_end(map: &CodeMap<'_>, start: usize, end: usize) -> (usize, usize) {
    let mut depth = 0usize;
    for idx in start..end {
        match map.code_byte(idx) {
            Some(b'(' | b'[' | b'{') => depth += 1,
            Some(b')' | b']' | b'}') => {
                if depth == 0 {
                    return (idx, idx);
                }
                depth -= 1;
            }
            Some(b';') if depth == 0 => return (idx, idx + 1),
            Some(b'\n') if depth == 0 && statement_complete(map, start, idx, end) => {
                return (idx, idx + 1)
            }
            _ => {}
        }
    }
    (end, end)
}

/// Whether a line break at `newline` ends the statement begun at `start`.
fn statement_complete(map: &CodeMap<'_>, start: usize, newline: usize, end: usize) -> bool {
    let bytes = map.source().as_bytes();
    let last = trim_trivia_end(map, start, newline);
    if last == start {
        return false;
    }
    if map.is_code(last - 1) {
        let continues = matches!(
            bytes[last - 1],
            b'=' | b',' | b'(' | b'[' | b'{' | b'?' | b':' | b'+' | b'-' | b'*' | b'/'
                | b'%' | b'&' | b'|' | b'!' | b'.' | b'~' | b'^' | b'<'
        ) || (bytes[last - 1] == b'>' && last >= 2 && bytes[last - 2] == b'=');
        if continues {
            return false;
        }
    }

    let next = map.skip_trivia(newline, end);
    if next >= end {
        return true;
    }
    !matches!(
        map.code_byte(next),
        Some(
            b'.' | b'?' | b':' | b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'=' | b','
                | b'(' | b'>'
        )
    )
}

/// Skips to the next line break at bracket depth zero after `start`.
fn recover(map: &CodeMap<'_>, start: usize, end: usize) -> usize {
    let mut depth = 0usize;
    for idx in start..end {
        match map.code_byte(idx) {
            Some(b'(' | b'[' | b'{') => depth += 1,
            Some(b')' | b']' | b'}') => depth = depth.saturating_sub(1),
            Some(b'\n') if depth == 0 && idx > start => return idx + 1,
            _ => {}
        }
    }
    end
}

/// Recognizes a function expression or arrow function spanning exactly `[start, end)`.
fn parse_function_value(map: &CodeMap<'_>, start: usize, end: usize) -> Option<FunctionParts> {
    let source = map.source();
    let mut pos = start;
    let mut is_async = false;

    let word_end = ident_end(source, pos);
    if &source[pos..word_end] == "async" {
        let after = map.skip_trivia(word_end, end);
        let is_modifier = (after > word_end || map.code_byte(after) == Some(b'('))
            && map.code_byte(after) != Some(b'=');
        if is_modifier {
            is_async = true;
            pos = after;
        }
    }

    let word_end = ident_end(source, pos);
    if &source[pos..word_end] == "function" {
        let mut open = map.skip_trivia(word_end, end);
        if map.code_byte(open) == Some(b'*') {
            open = map.skip_trivia(open + 1, end);
        }
        open = map.skip_trivia(ident_end(source, open), end);
        if map.code_byte(open) != Some(b'(') {
            return None;
        }
        let close = map.matching(open).filter(|close| *close < end)?;
        let body_open = map.skip_trivia(close + 1, end);
        if map.code_byte(body_open) != Some(b'{') {
            return None;
        }
        let body_close = map.matching(body_open).filter(|close| *close < end)?;
        if map.skip_trivia(body_close + 1, end) < end {
            return None;
        }
        return Some(FunctionParts {
            is_async,
            params: (open + 1, close),
            body: BodyRange::Block(body_open + 1, body_close),
        });
    }

    let (params, after_params) = match map.code_byte(pos) {
        Some(b'(') => {
            let close = map.matching(pos).filter(|close| *close < end)?;
            ((pos + 1, close), close + 1)
        }
        _ if word_end > pos => ((pos, word_end), word_end),
        _ => return None,
    };

    let arrow = map.skip_trivia(after_params, end);
    if !map.is_code(arrow) || !source.as_bytes()[arrow..end].starts_with(b"=>") {
        return None;
    }
    let body_start = map.skip_trivia(arrow + 2, end);

    if map.code_byte(body_start) == Some(b'{') {
        if let Some(close) = map.matching(body_start).filter(|close| *close < end) {
            if map.skip_trivia(close + 1, end) >= end {
                return Some(FunctionParts {
                    is_async,
                    params,
                    body: BodyRange::Block(body_start + 1, close),
                });
            }
        }
    }

    let body_end = trim_trivia_end(map, body_start, end);
    if body_end <= body_start {
        return None;
    }
    Some(FunctionParts {
        is_async,
        params,
        body: BodyRange::Expression(body_start, body_end),
    })
}
