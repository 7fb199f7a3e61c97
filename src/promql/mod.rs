//! PromQL Front End
//!
//! Parsing, the expression tree and canonical rendering come from the
//! `promql-parser` crate. This module re-exports the pieces the injector
//! works with and adds selector traversal over the tree:
//! * `parse` turns query text into an `Expr`
//! * `Expr` renders canonical text through `Display` and `prettify`
//! * `visit` collects vector selectors at any depth, shared or mutable
//!
//! # Module Structure
//!
//! * `visit` - Vector selector collection

/// Vector selector collection
pub mod visit;

pub use promql_parser::label::{MatchOp, Matcher, Matchers};
pub use promql_parser::parser::{parse, Expr, VectorSelector};
