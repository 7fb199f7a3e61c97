//! Label Matcher Injection
//!
//! Forces label constraints onto every vector selector of a PromQL query so
//! that one query template can be reused across clusters, jobs and
//! instances. Queries are parsed, edited in place and re-rendered with the
//! pretty printer, so the output is always in canonical form.
//!
//! # Module Structure
//!
//! * `matcher` - Override instructions and operator resolution
//! * `config` - Serde-loadable injector settings and the batch rewriter

use derive_more::{Display, Error};
use promql_parser::label::{MatchOp, Matcher};

use crate::promql::visit;
use crate::promql::{parse, Expr, VectorSelector};

/// Injector configuration and batch query rewriting
pub mod config;

/// Label matcher override instructions
pub mod matcher;

pub use self::config::{ConfigError, InjectorConfig, QueryRewriter};
pub use self::matcher::{cluster_label_matcher, LabelMatcher, CLUSTER_PLACEHOLDER};

#[derive(Debug, Clone, PartialEq, Display, Error)]
pub enum InjectError {
    #[display(fmt = "failed to parse query: {}", message)]
    Parse { message: String },
    #[display(fmt = "unknown label match operator {:?}", operator)]
    UnknownOperator { operator: String },
    #[display(fmt = "invalid regex {:?}: {}", pattern, reason)]
    InvalidRegex { pattern: String, reason: String },
    #[display(
        fmt = "vector selector {} must contain at least one non-empty matcher",
        selector
    )]
    EmptySelector { selector: String },
}

type Result<T> = std::result::Result<T, InjectError>;

/// Apply `matchers` to every vector selector of `expr`
///
/// For each matcher, a selector's first matcher on the same label is
/// overwritten, otherwise the matcher is appended. After each matcher every
/// selector must still select something, so a later matcher cannot repair a
/// selector an earlier one emptied. On error `expr` is left unchanged.
/// Returns the number of selector edits.
pub fn inject(expr: &mut Expr, matchers: &[LabelMatcher]) -> Result<usize> {
    let mut resolved = Vec::with_capacity(matchers.len());
    for matcher in matchers {
        if matcher.is_noop() {
            log::debug!(
                "Skipping label matcher with empty name or value: {:?}",
                matcher
            );
            continue;
        }
        resolved.push((matcher, matcher.resolve()?));
    }
    if resolved.is_empty() {
        return Ok(0);
    }

    let mut edited = expr.clone();
    let mut edits = 0;
    {
        let mut selectors = visit::vector_selectors_mut(&mut edited);
        for (matcher, op) in resolved {
            for selector in selectors.iter_mut() {
                let overwritten = set_matcher(selector, &matcher.name, op.clone(), &matcher.value);
                log::trace!(
                    "{} matcher {}{}{:?} on selector {:?}",
                    if overwritten { "Overwrote" } else { "Appended" },
                    matcher.name,
                    matcher.operator,
                    matcher.value,
                    selector.name
                );
                edits += 1;
            }
            for selector in selectors.iter() {
                check_selector(selector)?;
            }
        }
    }

    *expr = edited;
    Ok(edits)
}

/// Overwrite the first matcher on `name`, or append one; true if overwritten
fn set_matcher(selector: &mut VectorSelector, name: &str, op: MatchOp, value: &str) -> bool {
    if let Some(existing) = selector
        .matchers
        .matchers
        .iter_mut()
        .find(|m| m.name == name)
    {
        existing.op = op;
        existing.value = value.to_string();
        return true;
    }

    selector.matchers.matchers.push(Matcher {
        op,
        name: name.to_string(),
        value: value.to_string(),
    });
    false
}

fn matches_empty(matcher: &Matcher) -> bool {
    match &matcher.op {
        MatchOp::Equal => matcher.value.is_empty(),
        MatchOp::NotEqual => !matcher.value.is_empty(),
        MatchOp::Re(re) => re.is_match(""),
        MatchOp::NotRe(re) => !re.is_match(""),
    }
}

/// A selector needs a metric name or one matcher that rejects the empty value
fn check_selector(selector: &VectorSelector) -> Result<()> {
    if selector.name.is_some() || selector.matchers.matchers.iter().any(|m| !matches_empty(m)) {
        return Ok(());
    }
    Err(InjectError::EmptySelector {
        selector: Expr::VectorSelector(selector.clone()).to_string(),
    })
}

/// Parse `query`, inject `matchers` and pretty print the result
///
/// The rendered text is parsed once more, so the returned query is always
/// one the parser accepts.
pub fn try_apply_matchers(query: &str, matchers: &[LabelMatcher]) -> Result<String> {
    let mut expr = parse(query).map_err(|message| InjectError::Parse { message })?;
    let edits = inject(&mut expr, matchers)?;
    log::debug!(
        "Injected {} label matcher(s) with {} selector edit(s)",
        matchers.len(),
        edits
    );

    let rendered = expr.prettify();
    parse(&rendered).map_err(|message| InjectError::Parse { message })?;
    Ok(rendered)
}

/// Parse `query`, inject `matchers` and pretty print the result
///
/// Returns an empty string if the query does not parse, a matcher carries
/// an unknown operator or a broken regex, or the edit leaves a selector
/// that matches everything. Use [`try_apply_matchers`] to tell those apart.
pub fn apply_matchers(query: &str, matchers: &[LabelMatcher]) -> String {
    match try_apply_matchers(query, matchers) {
        Ok(rendered) => rendered,
        Err(e) => {
            log::warn!("Suppressing query {:?}: {}", query, e);
            String::new()
        }
    }
}

/// Single matcher form of [`apply_matchers`]
pub fn set_label_matcher(query: &str, operator: &str, name: &str, value: &str) -> String {
    apply_matchers(query, &[LabelMatcher::new(name, operator, value)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(query: &str) -> String {
        parse(query).expect("Failed to parse expected query").prettify()
    }

    #[test]
    fn test_inject_counts_edits() {
        let mut expr = parse("a / b").expect("Failed to parse query");
        let matchers = vec![
            LabelMatcher::equal("cluster", "$cluster"),
            LabelMatcher::equal("", "ignored"),
            LabelMatcher::new("job", "=~", "node|api"),
        ];

        assert_eq!(inject(&mut expr, &matchers), Ok(4));
        assert_eq!(
            expr.prettify(),
            canonical("a{cluster=\"$cluster\", job=~\"node|api\"} / b{cluster=\"$cluster\", job=~\"node|api\"}")
        );
    }

    #[test]
    fn test_inject_is_atomic() {
        let mut expr = parse("up{job=\"a\"}").expect("Failed to parse query");
        let original = expr.clone();
        let matchers = vec![
            LabelMatcher::equal("job", "b"),
            LabelMatcher::new("env", "<>", "prod"),
        ];

        assert!(matches!(
            inject(&mut expr, &matchers),
            Err(InjectError::UnknownOperator { .. })
        ));
        assert_eq!(expr, original);

        let mut expr = parse("{job=\"a\"} + up").expect("Failed to parse query");
        let original = expr.clone();
        assert!(matches!(
            inject(&mut expr, &[LabelMatcher::new("job", "!=", "b")]),
            Err(InjectError::EmptySelector { .. })
        ));
        assert_eq!(expr, original);
    }

    #[test]
    fn test_each_matcher_is_checked_on_its_own() {
        let mut expr = parse("{job=\"a\"}").expect("Failed to parse query");
        let matchers = vec![
            LabelMatcher::new("job", "!=", "b"),
            LabelMatcher::equal("cluster", "$cluster"),
        ];
        assert!(matches!(
            inject(&mut expr, &matchers),
            Err(InjectError::EmptySelector { .. })
        ));

        // the same matchers in the other order never leave the selector empty
        let reversed: Vec<LabelMatcher> = matchers.into_iter().rev().collect();
        assert_eq!(inject(&mut expr, &reversed), Ok(2));
    }

    #[test]
    fn test_named_selector_may_match_empty() {
        assert_eq!(
            set_label_matcher("up{job=\"a\"}", "!=", "job", "b"),
            canonical("up{job!=\"b\"}")
        );
        assert_eq!(
            set_label_matcher("up", "=~", "env", ".*"),
            canonical("up{env=~\".*\"}")
        );
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            try_apply_matchers("sum(", &[]),
            Err(InjectError::Parse { .. })
        ));
        let error = try_apply_matchers("up", &[LabelMatcher::new("job", "~=", "x")])
            .expect_err("Failed to reject operator");
        assert_eq!(error.to_string(), "unknown label match operator \"~=\"");
        assert!(matches!(
            try_apply_matchers("up", &[LabelMatcher::new("job", "=~", "[a-")]),
            Err(InjectError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_set_label_matcher() {
        assert_eq!(
            set_label_matcher("up{job='x'}", "!=", "job", "y"),
            canonical("up{job!=\"y\"}")
        );
        assert_eq!(set_label_matcher("up", "===", "job", "y"), "");
    }
}
