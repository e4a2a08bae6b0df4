//! Main transformation logic.
//!
//! Chooses a conversion strategy for a component and, for the generic
//! strategy, assembles the function component from the extracted regions:
//!
//! ```text
//! import line
//!
//! function Name(props) {
//!   state bindings
//!
//!   effect block
//!
//!   method bindings
//!
//!   render prelude
//!
//!   return ( template );
//! }
//!
//! export default Name;
//! ```

use crate::error::ExtractError;
use crate::extract::{extract_component, ExtractedComponent};
use crate::lifecycle::{map_lifecycle, EffectBlock};
use crate::rewrite::ReferenceRewriter;
use crate::special::{lookup, SpecialCase};
use crate::state::build_state_model;
use crate::template::{reconstruct_template, reindent, TEMPLATE_INDENT};
use crate::types::{ComponentSource, MethodBody, MethodEntry, Snippet, Warning, WarningCode};
use smol_str::SmolStr;
use std::collections::HashSet;
use std::fmt;

/// Options controlling a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// Instance receiver keywords whose member references are rewritten.
    pub receivers: Vec<SmolStr>,
    /// Whether hand-authored outputs are used for well-known component names.
    pub special_cases: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            receivers: vec![SmolStr::new("this"), SmolStr::new("self")],
            special_cases: true,
        }
    }
}

/// How a component is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Emit a hand-authored output verbatim.
    Exact(&'static SpecialCase),
    /// Extract, rewrite and reassemble.
    Generic,
}

impl Strategy {
    /// Selects the strategy for a component identifier.
    pub fn resolve(identifier: &str, options: &TransformOptions) -> Self {
        if options.special_cases {
            if let Some(case) = lookup(identifier) {
                return Strategy::Exact(case);
            }
        }
        Strategy::Generic
    }
}

/// Why a source was passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassThroughReason {
    /// The source does not declare a class component.
    NotAClassComponent,
    /// The class has no render return expression.
    NoRenderExpression,
    /// Conversion failed unexpectedly.
    InternalFault(String),
}

impl From<ExtractError> for PassThroughReason {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NotAClassComponent => PassThroughReason::NotAClassComponent,
            ExtractError::NoRenderExpression => PassThroughReason::NoRenderExpression,
        }
    }
}

impl fmt::Display for PassThroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassThroughReason::NotAClassComponent => f.write_str("not a class component"),
            PassThroughReason::NoRenderExpression => f.write_str("no render return expression"),
            PassThroughReason::InternalFault(message) => write!(f, "internal fault: {}", message),
        }
    }
}

/// What happened to a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A hand-authored output was emitted.
    SpecialCased,
    /// The component was converted structurally.
    Converted,
    /// The original text was emitted unchanged.
    PassedThrough(PassThroughReason),
}

/// Result of converting one component.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// The output text.
    pub code: String,
    /// What happened.
    pub outcome: Outcome,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

impl TransformResult {
    /// A result that emits `source` unchanged.
    pub fn pass_through(source: &ComponentSource, reason: PassThroughReason) -> Self {
        Self {
            code: source.raw_text.clone(),
            outcome: Outcome::PassedThrough(reason),
            warnings: Vec::new(),
        }
    }

    /// Whether the output is the unchanged input.
    pub fn is_pass_through(&self) -> bool {
        matches!(self.outcome, Outcome::PassedThrough(_))
    }
}

/// Converts one component.
///
/// Never fails: sources that cannot be converted are passed through
/// unchanged, with the reason recorded in the outcome.
pub fn transform(source: &ComponentSource, options: &TransformOptions) -> TransformResult {
    match Strategy::resolve(&source.identifier, options) {
        Strategy::Exact(case) => {
            tracing::debug!(identifier = %source.identifier, "using hand-authored output");
            TransformResult {
                code: case.output.to_string(),
                outcome: Outcome::SpecialCased,
                warnings: Vec::new(),
            }
        }
        Strategy::Generic => match convert_class_component(&source.raw_text, options) {
            Ok(conversion) => TransformResult {
                code: conversion.code,
                outcome: Outcome::Converted,
                warnings: conversion.warnings,
            },
            Err(err) => {
                tracing::debug!(identifier = %source.identifier, reason = %err, "passing source through");
                TransformResult::pass_through(source, err.into())
            }
        },
    }
}

/// Output of the generic strategy.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The generated function component module.
    pub code: String,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

/// Converts a class component structurally, ignoring hand-authored outputs.
pub fn convert_class_component(
    raw_text: &str,
    options: &TransformOptions,
) -> Result<Conversion, ExtractError> {
    let component = extract_component(raw_text, &options.receivers)?;
    Ok(generate(&component, &options.receivers))
}

fn generate(component: &ExtractedComponent, receivers: &[SmolStr]) -> Conversion {
    let mut warnings = component.warnings.clone();
    let state = build_state_model(component.state_initializer.as_ref());
    warnings.extend(state.warnings.iter().cloned());

    let rewriter = ReferenceRewriter::new(
        &state.entries,
        component.methods.iter().map(|m| m.name.as_str()),
        receivers,
    );

    let mut sections = Vec::new();

    if !state.entries.is_empty() {
        let mut block = String::new();
        for entry in &state.entries {
            let initial = rewrite_text(
                &rewriter,
                &entry.initial_value_expr,
                entry.value_range.start(),
                &mut warnings,
            );
            block.push_str(&format!(
                "  const [{}, {}] = useState({});\n",
                entry.name,
                entry.setter_name(),
                initial
            ));
        }
        sections.push(block);
    }

    let setup = component
        .mount
        .as_ref()
        .map(|block| rewrite_snippet(&rewriter, &block.body, &mut warnings));
    let cleanup = component
        .unmount
        .as_ref()
        .map(|block| rewrite_snippet(&rewriter, &block.body, &mut warnings));
    let effect = map_lifecycle(setup, cleanup);
    if let Some(effect) = &effect {
        sections.push(effect.render());
    }

    for method in &component.methods {
        let body = rewrite_snippet(&rewriter, method.body.snippet(), &mut warnings);
        sections.push(render_method(method, &body));
    }

    let prelude = rewriter.strip_state_destructuring(&component.render_prelude.text);
    let prelude = rewrite_text(
        &rewriter,
        &prelude,
        component.render_prelude.offset(),
        &mut warnings,
    );
    let prelude = reindent(&prelude, "  ");
    if !prelude.is_empty() {
        sections.push(format!("{}\n", prelude));
    }

    let template = rewrite_snippet(&rewriter, &component.template, &mut warnings);
    sections.push(format!(
        "  return (\n{}{}\n  );\n",
        TEMPLATE_INDENT,
        reconstruct_template(&template)
    ));

    let mut flattened = HashSet::new();
    warnings.retain(|warning| {
        warning.code != WarningCode::InstanceMemberFlattened
            || flattened.insert(warning.message.clone())
    });

    tracing::debug!(
        component = %component.name,
        state_entries = state.entries.len(),
        methods = component.methods.len(),
        effect = effect.is_some(),
        effect_cleanup = effect.as_ref().is_some_and(EffectBlock::has_cleanup),
        warnings = warnings.len(),
        "generated function component"
    );

    let code = format!(
        "{}\n\nfunction {}(props) {{\n{}}}\n\nexport default {};\n",
        import_line(!state.entries.is_empty(), effect.is_some()),
        component.name,
        sections.join("\n"),
        component.name
    );

    Conversion { code, warnings }
}

fn rewrite_snippet(
    rewriter: &ReferenceRewriter<'_>,
    snippet: &Snippet,
    warnings: &mut Vec<Warning>,
) -> String {
    rewrite_text(rewriter, &snippet.text, snippet.offset(), warnings)
}

fn rewrite_text(
    rewriter: &ReferenceRewriter<'_>,
    text: &str,
    offset: text_size::TextSize,
    warnings: &mut Vec<Warning>,
) -> String {
    let rewritten = rewriter.rewrite(text, offset);
    warnings.extend(rewritten.warnings);
    rewritten.text
}

/// The import line, naming only the hooks the output uses.
fn import_line(uses_state: bool, uses_effect: bool) -> String {
    let hooks: Vec<&str> = [("useState", uses_state), ("useEffect", uses_effect)]
        .into_iter()
        .filter_map(|(hook, used)| used.then_some(hook))
        .collect();
    if hooks.is_empty() {
        "import React from 'react';".to_string()
    } else {
        format!("import React, {{ {} }} from 'react';", hooks.join(", "))
    }
}

/// Renders a method as a `const` arrow-function binding.
fn render_method(method: &MethodEntry, body: &str) -> String {
    let prefix = if method.is_async { "async " } else { "" };
    match &method.body {
        MethodBody::Block(_) => {
            let body = reindent(body, "    ");
            if body.is_empty() {
                format!(
                    "  const {} = {}({}) => {{}};\n",
                    method.name, prefix, method.params_text
                )
            } else {
                format!(
                    "  const {} = {}({}) => {{\n{}\n  }};\n",
                    method.name, prefix, method.params_text, body
                )
            }
        }
        MethodBody::Expression(_) => format!(
            "  const {} = {}({}) => {};\n",
            method.name,
            prefix,
            method.params_text,
            body.trim()
        ),
    }
}
