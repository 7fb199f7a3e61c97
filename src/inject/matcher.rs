//! Label matcher override instructions

use promql_parser::label::MatchOp;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};

use super::InjectError;

/// Placeholder value resolved by the dashboard at render time
pub const CLUSTER_PLACEHOLDER: &str = "$cluster";

const EQUAL: &str = "=";

/// Operator tokens and the match kinds they resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    Equal,
    NotEqual,
    Regex,
    NotRegex,
}

static MATCH_KINDS: &[(&str, MatchKind)] = &[
    ("=", MatchKind::Equal),
    ("!=", MatchKind::NotEqual),
    ("=~", MatchKind::Regex),
    ("!~", MatchKind::NotRegex),
];

fn default_operator() -> String {
    EQUAL.to_string()
}

/// Compile a regex matcher value the way the query engine anchors it
fn anchored_regex(value: &str) -> Result<Regex, InjectError> {
    Regex::new(&format!("^(?:{})$", value)).map_err(|e| InjectError::InvalidRegex {
        pattern: value.to_string(),
        reason: e.to_string(),
    })
}

/// A `name op "value"` constraint to force onto every selector of a query
///
/// The operator is kept as text so configuration files can carry it
/// verbatim; it is only resolved when the matcher is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelMatcher {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", alias = "operator", default = "default_operator")]
    pub operator: String,
}

impl LabelMatcher {
    pub fn new(name: &str, operator: &str, value: &str) -> Self {
        LabelMatcher {
            name: name.to_string(),
            value: value.to_string(),
            operator: operator.to_string(),
        }
    }

    /// Equality matcher, the common case for dashboard variables
    pub fn equal(name: &str, value: &str) -> Self {
        LabelMatcher::new(name, EQUAL, value)
    }

    /// Matchers with an empty name or value leave queries untouched
    pub fn is_noop(&self) -> bool {
        self.name.is_empty() || self.value.is_empty()
    }

    /// Resolve the operator token into a query language match kind
    ///
    /// Regex values are compiled here, so a matcher that resolves can never
    /// produce a selector the parser would reject for its regex.
    pub fn resolve(&self) -> Result<MatchOp, InjectError> {
        let kind = MATCH_KINDS
            .iter()
            .find(|(token, _)| *token == self.operator)
            .map(|&(_, kind)| kind)
            .ok_or_else(|| InjectError::UnknownOperator {
                operator: self.operator.clone(),
            })?;

        Ok(match kind {
            MatchKind::Equal => MatchOp::Equal,
            MatchKind::NotEqual => MatchOp::NotEqual,
            MatchKind::Regex => MatchOp::Re(anchored_regex(&self.value)?),
            MatchKind::NotRegex => MatchOp::NotRe(anchored_regex(&self.value)?),
        })
    }
}

/// Build the `{label_name}="$cluster"` matcher used by multi-cluster dashboards
///
/// Returns `None` when no cluster label is configured.
pub fn cluster_label_matcher(label_name: &str) -> Option<LabelMatcher> {
    if label_name.is_empty() {
        return None;
    }
    Some(LabelMatcher::equal(label_name, CLUSTER_PLACEHOLDER))
}
