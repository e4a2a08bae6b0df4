//! Data model shared by the conversion stages.

use smol_str::SmolStr;
use std::fmt;
use text_size::{TextRange, TextSize};

/// One input component definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSource {
    /// The component identifier, usually the file stem (`Counter` for `Counter.js`).
    pub identifier: SmolStr,
    /// The unmodified source text.
    pub raw_text: String,
}

impl ComponentSource {
    /// Creates a new component source.
    pub fn new(identifier: impl Into<SmolStr>, raw_text: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// A slice of the original source, kept together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// The text of the slice.
    pub text: String,
    /// The range of the slice in the original source.
    pub range: TextRange,
}

impl Snippet {
    pub(crate) fn from_source(source: &str, start: usize, end: usize) -> Self {
        Self {
            text: source[start..end].to_string(),
            range: TextRange::new(offset(start), offset(end)),
        }
    }

    /// Byte offset of the first character of this snippet.
    pub fn offset(&self) -> TextSize {
        self.range.start()
    }
}

/// One declared piece of instance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    /// The state key.
    pub name: SmolStr,
    /// The initial value expression, carried through as opaque text.
    pub initial_value_expr: String,
    /// Where the initial value expression sits in the source.
    pub value_range: TextRange,
}

impl StateEntry {
    /// The name of the generated state setter, e.g. `setCount` for `count`.
    pub fn setter_name(&self) -> String {
        setter_name(&self.name)
    }
}

/// Derives the setter binding name for a state entry.
///
/// Only the first character is upper-cased, so `count` and `Count` both
/// yield `setCount`.
pub fn setter_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let mut setter = String::with_capacity(name.len() + 3);
            setter.push_str("set");
            setter.extend(first.to_uppercase());
            setter.push_str(chars.as_str());
            setter
        }
        None => "set".to_string(),
    }
}

/// The body of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBody {
    /// A braced statement block (the braces are not part of the snippet).
    Block(Snippet),
    /// A concise arrow-function expression body.
    Expression(Snippet),
}

impl MethodBody {
    /// The snippet of the body, regardless of its form.
    pub fn snippet(&self) -> &Snippet {
        match self {
            MethodBody::Block(snippet) | MethodBody::Expression(snippet) => snippet,
        }
    }
}

/// A non-lifecycle, non-render method of a class component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    /// The method name.
    pub name: SmolStr,
    /// The parameter list without its parentheses.
    pub params_text: String,
    /// The method body.
    pub body: MethodBody,
    /// Whether the method was declared `async`.
    pub is_async: bool,
}

/// The lifecycle callbacks that map onto an effect block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    /// `componentDidMount`
    Mount,
    /// `componentWillUnmount`
    Unmount,
}

impl LifecycleKind {
    /// The callback name in a class component.
    pub fn method_name(self) -> &'static str {
        match self {
            LifecycleKind::Mount => "componentDidMount",
            LifecycleKind::Unmount => "componentWillUnmount",
        }
    }

    /// Looks up a lifecycle kind by callback name.
    pub fn from_method_name(name: &str) -> Option<Self> {
        match name {
            "componentDidMount" => Some(LifecycleKind::Mount),
            "componentWillUnmount" => Some(LifecycleKind::Unmount),
            _ => None,
        }
    }
}

/// The body of a recognized lifecycle callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleBlock {
    /// Which callback this body came from.
    pub kind: LifecycleKind,
    /// The callback body.
    pub body: Snippet,
}

/// Codes for non-fatal conversion warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// A lifecycle callback other than mount/unmount was dropped.
    UnsupportedLifecycle,
    /// A second mount or unmount callback was ignored.
    DuplicateLifecycle,
    /// A class member could not be delimited and was omitted.
    MethodBoundaryAmbiguity,
    /// A non-function or static class field was omitted.
    ClassFieldDropped,
    /// A constructor statement with no closure-based counterpart was dropped.
    ConstructorStatementDropped,
    /// A state initializer entry (spread, computed key) was skipped.
    StateEntrySkipped,
    /// A state key was declared more than once.
    DuplicateStateEntry,
    /// A `setState` call was not a single-field object literal.
    UnrewrittenSetState,
    /// An instance member reference was reduced to a bare identifier.
    InstanceMemberFlattened,
}

impl WarningCode {
    /// The kebab-case code used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            WarningCode::UnsupportedLifecycle => "unsupported-lifecycle",
            WarningCode::DuplicateLifecycle => "duplicate-lifecycle",
            WarningCode::MethodBoundaryAmbiguity => "method-boundary-ambiguity",
            WarningCode::ClassFieldDropped => "class-field-dropped",
            WarningCode::ConstructorStatementDropped => "constructor-statement-dropped",
            WarningCode::StateEntrySkipped => "state-entry-skipped",
            WarningCode::DuplicateStateEntry => "duplicate-state-entry",
            WarningCode::UnrewrittenSetState => "unrewritten-set-state",
            WarningCode::InstanceMemberFlattened => "instance-member-flattened",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal conversion diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable message.
    pub message: String,
    /// Location in the original source.
    pub range: TextRange,
}

impl Warning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, message: impl Into<String>, range: TextRange) -> Self {
        Self {
            code,
            message: message.into(),
            range,
        }
    }
}

/// Converts a byte offset, saturating at `u32::MAX`.
pub(crate) fn offset(value: usize) -> TextSize {
    u32::try_from(value).map_or(TextSize::from(u32::MAX), TextSize::from)
}

pub(crate) fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(offset(start), offset(end))
}
