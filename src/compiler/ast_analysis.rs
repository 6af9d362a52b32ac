//! A utility module for traversing a Rhai AST to extract information.
//! This is the static analysis behind the cluster-resolvability check: it
//! finds every name a script reads so the compiler can verify that all of
//! them resolve to declared ambient bindings.

use std::collections::{BTreeSet, HashSet};

use rhai::{AST, Expr, Stmt};

/// The result of analyzing a script's variable usage.
#[derive(Debug, Default)]
pub(crate) struct BindingAnalysis {
    /// A set of all unique, fully-qualified variable paths accessed in the
    /// script.
    pub accessed_variables: HashSet<String>,

    /// A set of local variables defined within the script using `let` or loop
    /// headers.
    pub local_variables: HashSet<String>,
}

impl BindingAnalysis {
    /// The root names the script reads but never defines locally. These must
    /// all be supplied by the execution scope, on the driver and on every
    /// remote node alike.
    pub fn free_roots(&self) -> BTreeSet<String> {
        self.accessed_variables
            .iter()
            .filter_map(|path| path.split('.').next())
            .filter(|root| !self.local_variables.contains(*root))
            .map(String::from)
            .collect()
    }
}

/// Traverses a compiled `AST` and returns a [`BindingAnalysis`] containing
/// accessed variables and locally defined names.
pub(crate) fn analyze_ast(ast: &AST) -> BindingAnalysis {
    let mut result = BindingAnalysis::default();
    for stmt in ast.statements() {
        walk_stmt(stmt, &mut result);
    }
    result
}

/// Recursively walks a statement (`Stmt`) to find expressions.
fn walk_stmt(stmt: &Stmt, result: &mut BindingAnalysis) {
    match stmt {
        Stmt::Expr(expr) => walk_expr(expr, result),
        Stmt::Block(stmt_block) =>
            for s in stmt_block.statements() {
                walk_stmt(s, result);
            },
        Stmt::If(flow_control, _) => {
            walk_expr(&flow_control.expr, result);
            for s in flow_control.body.statements() {
                walk_stmt(s, result);
            }
            for s in flow_control.branch.statements() {
                walk_stmt(s, result);
            }
        }
        Stmt::While(flow_control, _) => {
            walk_expr(&flow_control.expr, result);
            for s in flow_control.body.statements() {
                walk_stmt(s, result);
            }
        }
        Stmt::Do(flow_control, _, _) => {
            for s in flow_control.body.statements() {
                walk_stmt(s, result);
            }
            walk_expr(&flow_control.expr, result);
        }
        Stmt::For(for_loop, _) => {
            // `for_loop.0` and `for_loop.1` are the loop variable names
            // (e.g., `item` in `for item in ...`).
            result.local_variables.insert(for_loop.0.name.to_string());
            if let Some(second_var) = &for_loop.1 {
                result.local_variables.insert(second_var.name.to_string());
            }

            walk_expr(&for_loop.2.expr, result);
            for s in for_loop.2.body.statements() {
                walk_stmt(s, result);
            }
        }
        Stmt::Var(var_definition, _, _) => {
            result.local_variables.insert(var_definition.0.name.to_string());

            walk_expr(&var_definition.1, result);
        }
        Stmt::Assignment(assignment) => {
            walk_expr(&assignment.1.lhs, result);
            walk_expr(&assignment.1.rhs, result);
        }
        Stmt::FnCall(fn_call_expr, _) =>
            for arg in &fn_call_expr.args {
                walk_expr(arg, result);
            },
        Stmt::Switch(switch_data, _) => {
            let (expr, cases_collection) = &**switch_data;
            walk_expr(expr, result);
            for case_expr in &cases_collection.expressions {
                walk_expr(&case_expr.lhs, result);
                walk_expr(&case_expr.rhs, result);
            }
        }
        Stmt::TryCatch(flow_control, _) => {
            for s in flow_control.body.statements() {
                walk_stmt(s, result);
            }
            for s in flow_control.branch.statements() {
                walk_stmt(s, result);
            }
        }
        Stmt::Return(Some(expr), _, _) | Stmt::BreakLoop(Some(expr), _, _) =>
            walk_expr(expr, result),
        Stmt::Import(import_data, _) => {
            walk_expr(&import_data.0, result);
        }
        Stmt::Noop(_)
        | Stmt::Return(None, _, _)
        | Stmt::BreakLoop(None, _, _)
        | Stmt::Export(_, _)
        | Stmt::Share(_) => {}

        _ => {
            // Remaining statement kinds carry no variable accesses of their
            // own.
        }
    }
}

/// Recursively walks an expression (`Expr`) to find and record variable access
/// paths.
fn walk_expr(expr: &Expr, result: &mut BindingAnalysis) {
    if let Some(path) = get_full_variable_path(expr) {
        result.accessed_variables.insert(path);
        // For Index, also collect the index variable if present.
        if let Expr::Index(binary_expr, _, _) = expr {
            if let Some(index_path) = get_full_variable_path(&binary_expr.rhs) {
                result.accessed_variables.insert(index_path);
            }
        }
        return;
    }

    match expr {
        Expr::Dot(binary_expr, _, _) => {
            walk_expr(&binary_expr.lhs, result);
            walk_expr(&binary_expr.rhs, result);
        }
        Expr::Index(binary_expr, _, _) => {
            walk_expr(&binary_expr.lhs, result);
            if let Some(index_path) = get_full_variable_path(&binary_expr.rhs) {
                result.accessed_variables.insert(index_path);
            } else {
                walk_expr(&binary_expr.rhs, result);
            }
        }
        Expr::MethodCall(method_call_expr, _) =>
            for arg in &method_call_expr.args {
                walk_expr(arg, result);
            },
        Expr::FnCall(fn_call_expr, _) =>
            for arg in &fn_call_expr.args {
                walk_expr(arg, result);
            },
        Expr::And(expr_vec, _) | Expr::Or(expr_vec, _) | Expr::Coalesce(expr_vec, _) => {
            for e in &**expr_vec {
                walk_expr(e, result);
            }
        }
        Expr::Array(expr_vec, _) | Expr::InterpolatedString(expr_vec, _) =>
            for e in expr_vec {
                walk_expr(e, result);
            },
        Expr::Map(map_data, _) =>
            for (_, value_expr) in &map_data.0 {
                walk_expr(value_expr, result);
            },
        Expr::Stmt(stmt_block) =>
            for s in stmt_block.statements() {
                walk_stmt(s, result);
            },
        Expr::Custom(custom_expr, _) =>
            for e in &custom_expr.inputs {
                walk_expr(e, result);
            },
        Expr::Variable(_, _, _) | Expr::Property(_, _) => {}
        Expr::DynamicConstant(_, _)
        | Expr::BoolConstant(_, _)
        | Expr::IntegerConstant(_, _)
        | Expr::CharConstant(_, _)
        | Expr::StringConstant(_, _)
        | Expr::Unit(_)
        | Expr::ThisPtr(_)
        | Expr::FloatConstant(_, _) => {}
        _ => {}
    }
}

/// Attempts to reconstruct a full variable path (e.g., "cluster.archives")
/// from an expression.
fn get_full_variable_path(expr: &Expr) -> Option<String> {
    // Recursively collect property/index chains in left-to-right order
    fn collect_path(expr: &Expr, parts: &mut Vec<String>) -> bool {
        match expr {
            Expr::Dot(binary_expr, _, _) => {
                let mut ok = collect_path(&binary_expr.lhs, parts);
                ok &= collect_path(&binary_expr.rhs, parts);
                ok
            }
            Expr::Property(prop_info, _) => {
                parts.push(prop_info.2.to_string());
                true
            }
            Expr::Variable(var_info, _, _) => {
                parts.push(var_info.1.to_string());
                true
            }
            Expr::Index(binary_expr, _, _) => collect_path(&binary_expr.lhs, parts),
            _ => false,
        }
    }

    let mut path_parts = Vec::new();
    if collect_path(expr, &mut path_parts) && !path_parts.is_empty() {
        Some(path_parts.join("."))
    } else {
        None
    }
}
