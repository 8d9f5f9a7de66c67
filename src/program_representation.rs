//! Data structures to represent lambda-calculus scripts, and some utility
//! functions to display and inspect them.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::rc::Rc;

/// Represents a lambda-calculus expression.
///
/// Nodes are never mutated once built. Children are shared through `Rc`, so
/// a transformation that changes nothing hands back the very same pointer,
/// which callers compare with `Rc::ptr_eq`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expr {
    Variable { name: String },
    Lambda { param: String, body: Rc<Expr> },
    Call { function: Rc<Expr>, argument: Rc<Expr> },
}

/// Maps names to unevaluated expressions. Used both for the top-level scope
/// of a script run and for substitution bindings.
pub type Scope = HashMap<String, Rc<Expr>>;

/// Represents an assignment, an expression statement, or a sequence of
/// statements.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    Assignment { name: String, initializer: Rc<Expr> },
    ExpressionStatement { expression: Rc<Expr> },
    StatementList { statements: Vec<Statement> },
}

/// How a single evaluation step changed an expression.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EvaluationKind {
    Substituted,
    Reduced,
    Unchanged,
}

/// Marker printed in front of the first line of a step trace.
pub const INITIAL_STEP_MARKER: &str = "    ";

impl EvaluationKind {
    /// The prefix written before the expression produced by a step of this
    /// kind.
    pub fn step_marker(&self) -> &'static str {
        match self {
            Self::Reduced => "--> ",
            Self::Substituted => " =  ",
            Self::Unchanged => INITIAL_STEP_MARKER,
        }
    }
}

/// The outcome of one evaluation step.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub kind: EvaluationKind,
    pub expr: Rc<Expr>,
}

/// Builds a variable node.
pub fn var(name: &str) -> Rc<Expr> {
    return Rc::new(Expr::Variable {
        name: String::from(name),
    });
}

/// Builds a lambda node.
pub fn lambda(param: &str, body: Rc<Expr>) -> Rc<Expr> {
    return Rc::new(Expr::Lambda {
        param: String::from(param),
        body,
    });
}

/// Builds a call node.
pub fn call(function: Rc<Expr>, argument: Rc<Expr>) -> Rc<Expr> {
    return Rc::new(Expr::Call { function, argument });
}

// Helper function to produce a string representation of an Expr.
//
// `has_right` is set when something follows this expression in the enclosing
// application chain. A lambda in that position would swallow what follows, so
// it gets parentheses. A call used as an argument always gets parentheses,
// which keeps application left-associative.
fn expr_to_string_helper(expr: &Expr, has_right: bool, string_so_far: &mut String) {
    match expr {
        Expr::Variable { name } => {
            string_so_far.push_str(name.as_str());
        }

        Expr::Lambda { param, body } => {
            if has_right {
                string_so_far.push('(');
            }

            string_so_far.push('λ');
            string_so_far.push_str(param.as_str());
            string_so_far.push_str(". ");
            expr_to_string_helper(body, false, string_so_far);

            if has_right {
                string_so_far.push(')');
            }
        }

        Expr::Call { function, argument } => {
            expr_to_string_helper(function, true, string_so_far);
            string_so_far.push(' ');

            if let Expr::Call { .. } = &**argument {
                string_so_far.push('(');
                expr_to_string_helper(argument, false, string_so_far);
                string_so_far.push(')');
            } else {
                expr_to_string_helper(argument, has_right, string_so_far);
            }
        }
    };
}

/// Converts an expression to a string with minimal parentheses.
pub fn expr_to_string(expr: &Expr) -> String {
    let mut out_string = String::new();
    expr_to_string_helper(expr, false, &mut out_string);
    return out_string;
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_to_string(self).as_str());
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Assignment { name, initializer } => {
                return write!(f, "{} = {};", name, initializer);
            }

            Statement::ExpressionStatement { expression } => {
                return write!(f, "{};", expression);
            }

            Statement::StatementList { statements } => {
                let lines: Vec<String> = statements
                    .iter()
                    .map(|statement| statement.to_string())
                    .collect();
                return write!(f, "{}", lines.join("\n"));
            }
        }
    }
}

/// Computes the free variables in the given lambda calculus expression.
pub fn get_all_free_variables(expr: &Expr) -> HashSet<&str> {
    match expr {
        Expr::Variable { name } => {
            return HashSet::from([name.as_str()]);
        }

        Expr::Call { function, argument } => {
            let function_free_vars = get_all_free_variables(function);
            let argument_free_vars = get_all_free_variables(argument);

            return function_free_vars
                .union(&argument_free_vars)
                .copied()
                .collect();
        }

        Expr::Lambda { param, body } => {
            let mut body_free_vars = get_all_free_variables(body);
            body_free_vars.remove(param.as_str());
            return body_free_vars;
        }
    };
}
