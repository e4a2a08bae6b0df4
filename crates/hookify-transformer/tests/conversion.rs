//! End-to-end conversion behavior.

use hookify_transformer::{
    lookup_special_case, process_batch, setter_name, transform, ComponentSource, FileStatus,
    MemorySink, Outcome, PassThroughReason, TransformOptions, SPECIAL_CASES,
};
use pretty_assertions::assert_eq;

fn convert(identifier: &str, text: &str) -> hookify_transformer::TransformResult {
    transform(
        &ComponentSource::new(identifier, text),
        &TransformOptions::default(),
    )
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

const MINI_TOGGLE: &str = r#"import React, { Component } from 'react';

class MiniToggle extends Component {
  constructor(props) {
    super(props);
    this.state = { on: false };
  }

  toggle = () => {
    this.setState({ on: !this.state.on });
  }

  render() {
    return <button onClick={this.toggle}>{this.state.on ? 'ON' : 'OFF'}</button>;
  }
}

export default MiniToggle;
"#;

#[test]
fn test_mini_toggle_end_to_end() {
    let result = convert("MiniToggle", MINI_TOGGLE);
    assert_eq!(result.outcome, Outcome::Converted);
    assert!(result.warnings.is_empty());

    let code = &result.code;
    assert!(code.starts_with("import React, { useState } from 'react';"));
    assert!(code.contains("function MiniToggle(props) {"));
    assert_eq!(count(code, "const [on, setOn] = useState(false);"), 1);
    assert!(code.contains("const toggle = () => {\n    setOn(!on);\n  };"));
    assert!(code.contains("<button onClick={toggle}>{on ? 'ON' : 'OFF'}</button>"));
    assert!(code.ends_with("export default MiniToggle;\n"));
    assert!(!code.contains("useEffect"));
    assert!(!code.contains("this."));
    assert!(!code.contains("class "));
}

#[test]
fn test_every_state_entry_appears_once_in_order() {
    let text = r#"class Dashboard extends Component {
  state = { alpha: 1, beta: [1, 2], gamma: { nested: true }, delta: 'd, e' };
  render() { return <div>{this.state.alpha}</div>; }
}"#;
    let code = convert("Dashboard", text).code;
    let names = ["alpha", "beta", "gamma", "delta"];
    let positions: Vec<usize> = names
        .iter()
        .map(|name| {
            let binding = format!("const [{}, {}] = useState(", name, setter_name(name));
            assert_eq!(count(&code, &binding), 1, "{}", binding);
            code.find(&binding).unwrap_or_default()
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(code.contains("useState({ nested: true })"));
    assert!(code.contains("useState('d, e')"));
}

#[test]
fn test_two_entries_without_lifecycle_have_no_effect() {
    let text = "class Pair extends Component {\n  state = {a: 1, b: 2};\n  render() { return <p />; }\n}\n";
    let code = convert("Pair", text).code;
    assert_eq!(count(&code, "useState("), 2);
    assert_eq!(count(&code, "useEffect"), 0);
}

#[test]
fn test_mount_only_has_no_cleanup() {
    let text = "class Ping extends Component {\n  componentDidMount() {\n    ping();\n  }\n  render() { return null; }\n}\n";
    let code = convert("Ping", text).code;
    assert_eq!(count(&code, "useEffect(() => {"), 1);
    assert!(!code.contains("return () =>"));
    assert!(code.contains("  useEffect(() => {\n    ping();\n  }, []);\n"));
}

#[test]
fn test_mount_and_unmount_share_one_effect() {
    let text = "class Sub extends Component {\n  componentDidMount() {\n    subscribe();\n  }\n  componentWillUnmount() {\n    unsubscribe();\n  }\n  render() { return null; }\n}\n";
    let code = convert("Sub", text).code;
    assert_eq!(count(&code, "useEffect(() => {"), 1);
    assert!(code.contains(
        "  useEffect(() => {\n    subscribe();\n\n    return () => {\n      unsubscribe();\n    };\n  }, []);\n"
    ));
}

#[test]
fn test_unmount_only_effect() {
    let text = "class Bye extends Component {\n  componentWillUnmount() {\n    log('bye');\n  }\n  render() { return null; }\n}\n";
    let code = convert("Bye", text).code;
    assert!(code.contains("  useEffect(() => {\n    return () => {\n      log('bye');\n    };\n  }, []);\n"));
}

#[test]
fn test_non_class_source_is_byte_identical() {
    let text = "export function add(a, b) {\n  return a + b; // class Foo extends Component\n}\n";
    let result = convert("add", text);
    assert_eq!(
        result.outcome,
        Outcome::PassedThrough(PassThroughReason::NotAClassComponent)
    );
    assert_eq!(result.code, text);
}

#[test]
fn test_generated_output_is_not_reconverted() {
    let first = convert("MiniToggle", MINI_TOGGLE);
    let second = convert("MiniToggle", &first.code);
    assert_eq!(
        second.outcome,
        Outcome::PassedThrough(PassThroughReason::NotAClassComponent)
    );
    assert_eq!(second.code, first.code);
}

#[test]
fn test_special_cases_ignore_input_text() {
    for case in SPECIAL_CASES {
        for text in ["", "garbage", MINI_TOGGLE] {
            let result = convert(case.name, text);
            assert_eq!(result.outcome, Outcome::SpecialCased);
            assert_eq!(result.code, case.output);
        }
    }
    assert_eq!(SPECIAL_CASES.len(), 8);
    assert!(lookup_special_case("Counter")
        .is_some_and(|case| case.output.contains("const [count, setCount] = useState(0);")));
}

#[test]
fn test_setter_collision_is_known_behavior() {
    assert_eq!(setter_name("count"), "setCount");
    assert_eq!(setter_name("Count"), "setCount");

    let text = "class Clash extends Component {\n  state = { count: 0, Count: 1 };\n  render() { return null; }\n}\n";
    let result = convert("Clash", text);
    assert_eq!(count(&result.code, "setCount] = useState("), 2);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_batch_of_ten() {
    let mut sources = Vec::new();
    for idx in 0..7 {
        let name = format!("Widget{}", idx);
        sources.push(ComponentSource::new(
            name.clone(),
            format!(
                "class {} extends React.Component {{\n  state = {{ n: {} }};\n  render() {{\n    return <span>{{this.state.n}}</span>;\n  }}\n}}\n",
                name, idx
            ),
        ));
    }
    for idx in 0..3 {
        sources.push(ComponentSource::new(
            format!("helper{}", idx),
            "export const noop = () => {};\n",
        ));
    }

    let sink = MemorySink::new();
    let (reports, summary) = process_batch(&sources, &TransformOptions::default(), &sink);

    assert_eq!(reports.len(), 10);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.converted + summary.errored, 7);
    assert_eq!(summary.total(), 10);
    assert_eq!(sink.outputs().len(), 7);
    assert!(reports
        .iter()
        .filter(|r| r.identifier.starts_with("helper"))
        .all(|r| r.status == FileStatus::Skipped));
    assert!(sink
        .get("Widget3")
        .is_some_and(|code| code.contains("const [n, setN] = useState(3);")));
}

fn render_only(name: &str, state: &str, render_body: &str) -> String {
    format!(
        "class {name} extends Component {{\n  state = {state};\n  render() {{\n    {render_body}\n  }}\n}}\n"
    )
}

#[test]
fn test_apostrophe_in_markup_text_keeps_holes_rewritable() {
    let text = render_only(
        "Motivator",
        "{ count: 0 }",
        "return (\n      <p>Don't stop: {this.state.count}</p>\n    );",
    );
    let result = convert("Motivator", &text);
    assert_eq!(result.outcome, Outcome::Converted);
    assert!(result.code.contains("<p>Don't stop: {count}</p>"));
    assert!(!result.code.contains("this."));
}

#[test]
fn test_entity_in_unparenthesized_return() {
    let text = render_only(
        "Units",
        "{ a: 1 }",
        "return <p>{this.state.a}&nbsp;units</p>;",
    );
    let code = convert("Units", &text).code;
    assert!(code.contains("  return (\n    <p>{a}&nbsp;units</p>\n  );\n"));
}

#[test]
fn test_return_word_in_markup_text() {
    let text = render_only("Notice", "{}", "return <p>Please return it</p>;");
    let code = convert("Notice", &text).code;
    assert!(code.contains("  return (\n    <p>Please return it</p>\n  );\n"));
    assert_eq!(count(&code, "return"), 2);
    assert!(!code.contains("return <p>"));
}

#[test]
fn test_url_in_markup_text_is_not_a_comment() {
    let text = render_only(
        "Pager",
        "{ page: 1 }",
        "return <a href=\"/docs\">see http://example.com/{this.state.page}</a>;",
    );
    let code = convert("Pager", &text).code;
    assert!(code.contains("<a href=\"/docs\">see http://example.com/{page}</a>"));
    assert!(!code.contains("this."));
}

#[test]
fn test_unclosed_markup_is_passed_through() {
    let text = render_only("Broken", "{ a: 1 }", "return <p>{this.state.a};");
    let result = convert("Broken", &text);
    assert_eq!(
        result.outcome,
        Outcome::PassedThrough(PassThroughReason::NoRenderExpression)
    );
    assert_eq!(result.code, text);
}
