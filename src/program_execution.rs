//! Evaluates lambda-calculus expressions by substitution and beta reduction,
//! and executes statements against a mutable scope.
//!
//! Reduction is not guaranteed to terminate. Nothing here bounds the number
//! of steps; callers that need a guarantee must impose their own limit.

use std::io::Write;
use std::rc::Rc;

use crate::program_representation::{
    get_all_free_variables, Evaluation, EvaluationKind, Expr, Scope, Statement,
    INITIAL_STEP_MARKER,
};

/// Sink for the lines a script produces.
pub trait Output {
    /// Receives one produced line, without a line terminator.
    fn output(&mut self, text: &str);
}

/// Writes each line to standard output.
#[derive(Debug, Default)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn output(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();

        if let Err(io_err) = writeln!(stdout, "{}", text) {
            tracing::warn!(error = %io_err, "failed to write output line");
        }
    }
}

/// Collects lines in memory.
impl Output for Vec<String> {
    fn output(&mut self, text: &str) {
        self.push(String::from(text));
    }
}

/// Replaces each free occurrence of a bound name with its mapped expression.
///
/// Returns the same `Rc` when nothing was replaced. A lambda hides its own
/// parameter from the bindings before descending into its body. Bound
/// variables are not renamed, so a free name in a substituted value can be
/// captured by a binder of the same name.
pub fn substitute(expr: &Rc<Expr>, bindings: &Scope) -> Rc<Expr> {
    if bindings.is_empty() {
        return Rc::clone(expr);
    }

    match &**expr {
        Expr::Variable { name } => match bindings.get(name) {
            Some(value) => return Rc::clone(value),
            None => return Rc::clone(expr),
        },

        Expr::Lambda { param, body } => {
            let new_body = if bindings.contains_key(param) {
                let mut narrowed = bindings.clone();
                narrowed.remove(param);
                substitute(body, &narrowed)
            } else {
                substitute(body, bindings)
            };

            if Rc::ptr_eq(&new_body, body) {
                return Rc::clone(expr);
            }

            return Rc::new(Expr::Lambda {
                param: param.clone(),
                body: new_body,
            });
        }

        Expr::Call { function, argument } => {
            let new_function = substitute(function, bindings);
            let new_argument = substitute(argument, bindings);

            if Rc::ptr_eq(&new_function, function) && Rc::ptr_eq(&new_argument, argument) {
                return Rc::clone(expr);
            }

            return Rc::new(Expr::Call {
                function: new_function,
                argument: new_argument,
            });
        }
    };
}

/// Beta reduction: substitutes `value` for `param` in `body`.
pub fn apply(param: &str, body: &Rc<Expr>, value: &Rc<Expr>) -> Rc<Expr> {
    let bindings = Scope::from([(String::from(param), Rc::clone(value))]);
    return substitute(body, &bindings);
}

/// Performs exactly one observable step and reports what kind of step it
/// was.
///
/// For a call, a nested call in argument position steps first, then a nested
/// call in function position. Failing both, a lambda in function position is
/// applied, or a variable in function position is looked up in `scope`.
/// Variables and lambdas on their own never step.
pub fn evaluate_once(expr: &Rc<Expr>, scope: &Scope) -> Evaluation {
    let unchanged = Evaluation {
        kind: EvaluationKind::Unchanged,
        expr: Rc::clone(expr),
    };

    let Expr::Call { function, argument } = &**expr else {
        return unchanged;
    };

    if let Expr::Call { .. } = &**argument {
        let step = evaluate_once(argument, scope);

        if step.kind != EvaluationKind::Unchanged {
            return Evaluation {
                kind: step.kind,
                expr: Rc::new(Expr::Call {
                    function: Rc::clone(function),
                    argument: step.expr,
                }),
            };
        }
    }

    match &**function {
        Expr::Call { .. } => {
            let step = evaluate_once(function, scope);

            if step.kind == EvaluationKind::Unchanged {
                return unchanged;
            }

            return Evaluation {
                kind: step.kind,
                expr: Rc::new(Expr::Call {
                    function: step.expr,
                    argument: Rc::clone(argument),
                }),
            };
        }

        Expr::Lambda { param, body } => {
            return Evaluation {
                kind: EvaluationKind::Reduced,
                expr: apply(param, body, argument),
            };
        }

        Expr::Variable { .. } => {
            let new_function = substitute(function, scope);

            if Rc::ptr_eq(&new_function, function) {
                return unchanged;
            }

            return Evaluation {
                kind: EvaluationKind::Substituted,
                expr: Rc::new(Expr::Call {
                    function: new_function,
                    argument: Rc::clone(argument),
                }),
            };
        }
    };
}

/// Evaluates `expr` by one opaque round.
///
/// The argument is normalized if it is a call. The function position is then
/// driven until it is a lambda or stuck, looking variables up in `scope` and
/// normalizing calls along the way. A resulting lambda is applied once.
/// Otherwise a new call is built only if a child changed, and `expr` itself
/// is returned when nothing did.
pub fn evaluate(expr: &Rc<Expr>, scope: &Scope) -> Rc<Expr> {
    let Expr::Call { function, argument } = &**expr else {
        return Rc::clone(expr);
    };

    let new_argument = match &**argument {
        Expr::Call { .. } => normalize(argument, scope),
        _ => Rc::clone(argument),
    };

    let mut new_function = Rc::clone(function);

    loop {
        let (next_function, is_stuck) = match &*new_function {
            Expr::Lambda { .. } => break,

            Expr::Variable { .. } => {
                let looked_up = substitute(&new_function, scope);

                if Rc::ptr_eq(&looked_up, &new_function) {
                    break;
                }

                (looked_up, false)
            }

            Expr::Call { .. } => {
                let normalized = normalize(&new_function, scope);

                // A call that survives normalization is stuck.
                let is_stuck = matches!(&*normalized, Expr::Call { .. });
                (normalized, is_stuck)
            }
        };

        new_function = next_function;

        if is_stuck {
            break;
        }
    }

    if let Expr::Lambda { param, body } = &*new_function {
        return apply(param, body, &new_argument);
    }

    if Rc::ptr_eq(&new_function, function) && Rc::ptr_eq(&new_argument, argument) {
        return Rc::clone(expr);
    }

    return Rc::new(Expr::Call {
        function: new_function,
        argument: new_argument,
    });
}

/// Runs `evaluate` until it hands back the expression it was given.
pub fn normalize(expr: &Rc<Expr>, scope: &Scope) -> Rc<Expr> {
    let mut current = Rc::clone(expr);

    loop {
        let next = evaluate(&current, scope);

        if Rc::ptr_eq(&next, &current) {
            return current;
        }

        current = next;
    }
}

// Emits every intermediate expression of a step-by-step evaluation.
fn trace_expression(expression: &Rc<Expr>, scope: &Scope, output: &mut dyn Output) -> Rc<Expr> {
    output.output(format!("{}{}", INITIAL_STEP_MARKER, expression).as_str());

    let mut current = Rc::clone(expression);
    let mut step_count: usize = 0;

    loop {
        let step = evaluate_once(&current, scope);

        if step.kind == EvaluationKind::Unchanged {
            break;
        }

        step_count += 1;
        tracing::trace!(kind = ?step.kind, step_count, "evaluation step");

        output.output(format!("{}{}", step.kind.step_marker(), step.expr).as_str());
        current = step.expr;
    }

    tracing::debug!(step_count, "trace complete");
    return current;
}

/// Executes a statement against `scope`, writing produced lines to `output`.
///
/// Assignments store their initializer unevaluated. Expression statements
/// print either the full step trace (`show_steps`) or only the final value.
#[tracing::instrument(level = "debug", skip_all)]
pub fn execute_statement(
    statement: &Statement,
    scope: &mut Scope,
    output: &mut dyn Output,
    show_steps: bool,
) {
    match statement {
        Statement::Assignment { name, initializer } => {
            tracing::debug!(name = name.as_str(), "assignment");
            scope.insert(name.clone(), Rc::clone(initializer));
        }

        Statement::ExpressionStatement { expression } => {
            let result = if show_steps {
                trace_expression(expression, scope, output)
            } else {
                let result = normalize(expression, scope);
                output.output(result.to_string().as_str());
                result
            };

            if tracing::enabled!(tracing::Level::DEBUG) {
                let unresolved: Vec<&str> = get_all_free_variables(&result)
                    .into_iter()
                    .filter(|name| !scope.contains_key(*name))
                    .collect();

                tracing::debug!(?unresolved, "expression statement evaluated");
            }
        }

        Statement::StatementList { statements } => {
            for item in statements {
                execute_statement(item, scope, output, show_steps);
            }
        }
    };
}
