//! PromQL Label Injector
//!
//! A label-matcher injector for generated dashboard queries, built on the
//! `promql-parser` crate's parser and pretty printer.
//!
//! # Features
//!
//! * Label matcher injection on every vector selector of a query
//! * Validation of every edited selector before the query is rendered
//! * Canonical, line-splitting output for injected and untouched queries
//! * Injector settings loadable from TOML, YAML or JSON
//!
//! # Architecture
//!
//! The crate is divided into two main modules:
//! * `promql` - Parser re-exports and selector traversal
//! * `inject` - Label matcher injection and batch query rewriting
//!
//! ```
//! use promql_inject::inject::{apply_matchers, LabelMatcher};
//!
//! let query = apply_matchers(
//!     "node_uname_info{job='node'}",
//!     &[LabelMatcher::equal("cluster", "$cluster")],
//! );
//! assert!(query.starts_with("node_uname_info{"));
//! assert!(query.contains(r#"cluster="$cluster""#));
//! assert!(query.contains(r#"job="node""#));
//! ```

/// PromQL parser re-exports and selector traversal
pub mod promql;

/// Label matcher injection and query rewriting
pub mod inject;
