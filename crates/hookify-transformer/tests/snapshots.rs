//! Snapshot tests for generated function components.
//!
//! Hand-authored outputs are disabled so every case exercises the generic
//! conversion.

use hookify_transformer::{transform, ComponentSource, Outcome, TransformOptions};

fn convert_snapshot(name: &str, source: &str) {
    let options = TransformOptions {
        special_cases: false,
        ..TransformOptions::default()
    };
    let result = transform(&ComponentSource::new(name, source), &options);
    assert_eq!(result.outcome, Outcome::Converted);

    let warnings = if result.warnings.is_empty() {
        "(none)".to_string()
    } else {
        result
            .warnings
            .iter()
            .map(|w| format!("{}: {}", w.code, w.message))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let output = format!("{}\n=== Warnings ===\n{}", result.code, warnings);
    insta::assert_snapshot!(name, output);
}

#[test]
fn test_render_only_component() {
    convert_snapshot(
        "fruit_list",
        r#"import React, { Component } from 'react';

class FruitList extends Component {
  render() {
    const items = ['Apple', 'Banana', 'Cherry'];
    return (
      <ul>
        {items.map((item, i) => <li key={i}>{item}</li>)}
      </ul>
    );
  }
}

export default FruitList;
"#,
    );
}

#[test]
fn test_mount_and_unmount() {
    convert_snapshot(
        "stopwatch",
        r#"import React, { Component } from 'react';

class Stopwatch extends Component {
  constructor(props) {
    super(props);
    this.state = { elapsed: 0, label: 'Elapsed' };
  }

  componentDidMount() {
    this.timer = setInterval(() => {
      this.setState({ elapsed: this.state.elapsed + 1 });
    }, 1000);
  }

  componentWillUnmount() {
    clearInterval(this.timer);
  }

  render() {
    return <h2>{this.state.label}: {this.state.elapsed}s</h2>;
  }
}

export default Stopwatch;
"#,
    );
}

#[test]
fn test_async_method_and_prelude() {
    convert_snapshot(
        "profile_card",
        r#"import React from 'react';

class ProfileCard extends React.PureComponent {
  state = {
    user: null,
    loading: true,
  };

  componentDidMount() {
    this.loadUser();
  }

  async loadUser() {
    const response = await fetch(`/api/users/${this.props.userId}`);
    const user = await response.json();
    this.setState({ user, loading: false });
  }

  clear = () => this.setState({ user: null })

  render() {
    const { user, loading } = this.state;
    if (loading) {
      return <p>Loading...</p>;
    }
    return (
      <div className="profile">
        <h3>{user.name}</h3>
        <button onClick={this.clear}>Clear</button>
      </div>
    );
  }
}

export default ProfileCard;
"#,
    );
}

#[test]
fn test_dropped_members() {
    convert_snapshot(
        "legacy_notice",
        r#"class LegacyNotice extends Component {
  constructor(props) {
    super(props);
    this.state = { visible: true };
    this.dismiss = this.dismiss.bind(this);
    this.renderCount = 0;
  }

  shouldComponentUpdate(nextProps, nextState) {
    return nextState.visible !== this.state.visible;
  }

  dismiss() {
    this.setState({ visible: false });
  }

  render() {
    if (!this.state.visible) {
      return null;
    }
    return (
      <div className="notice">
        <span>{this.props.message}</span>
        <button onClick={this.dismiss}>x</button>
      </div>
    );
  }
}
"#,
    );
}
