//! Static column-reference extraction from derived-column expressions
//!
//! Parses a column's defining SQL expression and collects every column
//! it references. Anything that cannot be parsed yields `None`; the
//! CLL builder then falls back to a whole-table dependency instead of
//! guessing a specific column.

use sqlparser::ast::{Expr, FunctionArg, FunctionArgExpr, FunctionArguments};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// A column reference found in an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Qualifying table name or alias, if the reference was qualified
    pub table: Option<String>,

    /// Referenced column name
    pub column: String,
}

/// Extract all column references from a SQL expression.
/// Returns `None` when the expression cannot be parsed.
pub fn column_refs(expression: &str) -> Option<Vec<ColumnRef>> {
    let dialect = GenericDialect {};
    let expr = Parser::new(&dialect)
        .try_with_sql(expression)
        .ok()?
        .parse_expr()
        .ok()?;

    let mut refs = Vec::new();
    collect_refs(&expr, &mut refs);
    Some(refs)
}

fn collect_refs(expr: &Expr, refs: &mut Vec<ColumnRef>) {
    match expr {
        Expr::Identifier(ident) => {
            refs.push(ColumnRef {
                table: None,
                column: ident.value.clone(),
            });
        }
        Expr::CompoundIdentifier(idents) => {
            if let Some(column) = idents.last() {
                let table = if idents.len() >= 2 {
                    Some(idents[idents.len() - 2].value.clone())
                } else {
                    None
                };
                refs.push(ColumnRef {
                    table,
                    column: column.value.clone(),
                });
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_refs(left, refs);
            collect_refs(right, refs);
        }
        Expr::UnaryOp { expr, .. } => collect_refs(expr, refs),
        Expr::Nested(inner) => collect_refs(inner, refs),
        Expr::Cast { expr, .. } => collect_refs(expr, refs),
        Expr::IsNull(inner) | Expr::IsNotNull(inner) => collect_refs(inner, refs),
        Expr::InList { expr, list, .. } => {
            collect_refs(expr, refs);
            for item in list {
                collect_refs(item, refs);
            }
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            collect_refs(expr, refs);
            collect_refs(low, refs);
            collect_refs(high, refs);
        }
        Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
            collect_refs(expr, refs);
            collect_refs(pattern, refs);
        }
        Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            if let Some(operand) = operand {
                collect_refs(operand, refs);
            }
            for condition in conditions {
                collect_refs(condition, refs);
            }
            for result in results {
                collect_refs(result, refs);
            }
            if let Some(else_result) = else_result {
                collect_refs(else_result, refs);
            }
        }
        Expr::Function(func) => {
            if let FunctionArguments::List(list) = &func.args {
                for arg in &list.args {
                    match arg {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => collect_refs(e, refs),
                        FunctionArg::Named {
                            arg: FunctionArgExpr::Expr(e),
                            ..
                        } => collect_refs(e, refs),
                        // Wildcard args reference no specific column
                        _ => {}
                    }
                }
            }
        }
        // Literals, subqueries, and anything else contribute no
        // statically resolvable column references
        _ => {}
    }
}
