//! Class component to function component transformation.
//!
//! This crate rewrites React class components into function components that
//! keep their state in `useState` cells and their mount/unmount callbacks in
//! a single `useEffect`. It handles:
//! - Locating the class boundary, state initializer, lifecycle callbacks,
//!   methods and the render return expression
//! - Rewriting instance references into local bindings and setter calls
//! - Reassembling the pieces into a function component module
//! - Emitting hand-authored outputs for a fixed set of component names
//!
//! No syntax tree is built. Every region is found by scanning the text with
//! awareness of strings, template literals and comments.
//!
//! # Example
//!
//! ```
//! use hookify_transformer::{transform, ComponentSource, Outcome, TransformOptions};
//!
//! let source = ComponentSource::new(
//!     "Greeting",
//!     r#"class Greeting extends React.Component {
//!   state = { name: 'world' };
//!   render() {
//!     return <h1>Hello {this.state.name}</h1>;
//!   }
//! }"#,
//! );
//!
//! let result = transform(&source, &TransformOptions::default());
//! assert_eq!(result.outcome, Outcome::Converted);
//! assert!(result.code.contains("const [name, setName] = useState('world');"));
//! ```

mod batch;
mod error;
mod extract;
mod lifecycle;
mod line_index;
mod rewrite;
mod scanner;
mod special;
mod state;
mod template;
mod transform;
mod types;

pub use batch::{
    process_batch, process_source, BatchSummary, ConversionSink, FileReport, FileStatus,
    MemorySink,
};
pub use error::{ExtractError, SinkError};
pub use extract::{extract_component, is_class_component, ExtractedComponent};
pub use lifecycle::{map_lifecycle, EffectBlock};
pub use line_index::{LineCol, LineIndex};
pub use rewrite::{ReferenceRewriter, Rewritten};
pub use special::{lookup as lookup_special_case, SpecialCase, SPECIAL_CASES};
pub use state::{build_state_model, StateModel};
pub use template::{reconstruct_template, reindent, TEMPLATE_INDENT};
pub use transform::{
    convert_class_component, transform, Conversion, Outcome, PassThroughReason, Strategy,
    TransformOptions, TransformResult,
};
pub use text_size::{TextRange, TextSize};
pub use types::{
    setter_name, ComponentSource, LifecycleBlock, LifecycleKind, MethodBody, MethodEntry,
    Snippet, StateEntry, Warning, WarningCode,
};
