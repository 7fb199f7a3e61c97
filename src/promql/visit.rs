//! Expression tree traversal

use promql_parser::parser::{Expr, VectorSelector};

/// All vector selectors in the tree in pre-order, including those wrapped by
/// range selectors
pub fn vector_selectors(expr: &Expr) -> Vec<&VectorSelector> {
    let mut selectors = Vec::new();
    collect_selectors(expr, &mut selectors);
    selectors
}

fn collect_selectors<'a>(expr: &'a Expr, out: &mut Vec<&'a VectorSelector>) {
    match expr {
        Expr::VectorSelector(selector) => out.push(selector),
        Expr::MatrixSelector(matrix) => out.push(&matrix.vs),
        Expr::Aggregate(aggregate) => {
            if let Some(param) = aggregate.param.as_ref() {
                collect_selectors(param, out);
            }
            collect_selectors(&aggregate.expr, out);
        }
        Expr::Binary(binary) => {
            collect_selectors(&binary.lhs, out);
            collect_selectors(&binary.rhs, out);
        }
        Expr::Call(call) => {
            for arg in call.args.args.iter() {
                collect_selectors(arg, out);
            }
        }
        Expr::Paren(paren) => collect_selectors(&paren.expr, out),
        Expr::Subquery(subquery) => collect_selectors(&subquery.expr, out),
        Expr::Unary(unary) => collect_selectors(&unary.expr, out),
        _ => {}
    }
}

/// Mutable references to every vector selector in the tree, in pre-order
///
/// Selectors are collected before any of them is handed out, so callers
/// edit a flat list rather than the tree they are walking.
pub fn vector_selectors_mut(expr: &mut Expr) -> Vec<&mut VectorSelector> {
    let mut selectors = Vec::new();
    collect_selectors_mut(expr, &mut selectors);
    selectors
}

fn collect_selectors_mut<'a>(expr: &'a mut Expr, out: &mut Vec<&'a mut VectorSelector>) {
    match expr {
        Expr::VectorSelector(selector) => out.push(selector),
        Expr::MatrixSelector(matrix) => out.push(&mut matrix.vs),
        Expr::Aggregate(aggregate) => {
            if let Some(param) = aggregate.param.as_mut() {
                collect_selectors_mut(param, out);
            }
            collect_selectors_mut(&mut aggregate.expr, out);
        }
        Expr::Binary(binary) => {
            collect_selectors_mut(&mut binary.lhs, out);
            collect_selectors_mut(&mut binary.rhs, out);
        }
        Expr::Call(call) => {
            for arg in call.args.args.iter_mut() {
                collect_selectors_mut(arg, out);
            }
        }
        Expr::Paren(paren) => collect_selectors_mut(&mut paren.expr, out),
        Expr::Subquery(subquery) => collect_selectors_mut(&mut subquery.expr, out),
        Expr::Unary(unary) => collect_selectors_mut(&mut unary.expr, out),
        // number and string literals carry no selectors
        _ => {}
    }
}
