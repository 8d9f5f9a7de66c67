//! Property-based tests for the evaluation engine.
//!
//! Terms are generated from a byte sequence so that they are always affine
//! (each bound variable is used at most once) and every binder has a fresh
//! name. Scope entries are affine too and only refer to each other without
//! cycles. Under those conditions every reduction shrinks the term and only
//! finitely many lookups can happen, so both evaluation paths terminate.
//!
//! Binder names are letters only, so formatted terms lex back into the same
//! identifiers.

use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use rust_lambda_script::lexical_analysis::run_lexical_analysis;
use rust_lambda_script::program_execution::{evaluate_once, normalize, substitute};
use rust_lambda_script::program_representation::{
    call, get_all_free_variables, lambda, var, EvaluationKind, Expr, Scope,
};
use rust_lambda_script::recursive_descent_parsing::parse_expression;

/// Names bound in the scope, plus names that are never bound anywhere.
const LEAF_NAMES: [&str; 8] = ["i", "k", "z", "pair", "fst", "snd", "u", "w"];

fn test_scope() -> Scope {
    let entries = [
        ("i", lambda("x", var("x"))),
        ("k", lambda("x", lambda("y", var("x")))),
        ("z", lambda("x", lambda("y", var("y")))),
        (
            "pair",
            lambda(
                "f",
                lambda("s", lambda("b", call(call(var("b"), var("f")), var("s")))),
            ),
        ),
        ("fst", lambda("p", call(var("p"), var("k")))),
        ("snd", lambda("p", call(var("p"), var("z")))),
    ];

    return entries
        .into_iter()
        .map(|(name, value)| (String::from(name), value))
        .collect();
}

struct TermBuilder<'a> {
    choices: std::slice::Iter<'a, u8>,
    next_binder: usize,
}

impl<'a> TermBuilder<'a> {
    fn new(choices: &'a [u8]) -> Self {
        return Self {
            choices: choices.iter(),
            next_binder: 0,
        };
    }

    fn next_choice(&mut self) -> usize {
        return usize::from(self.choices.next().copied().unwrap_or(0));
    }

    fn leaf(&mut self, bound: &mut Vec<String>) -> Rc<Expr> {
        if !bound.is_empty() && self.next_choice() % 2 == 0 {
            let idx = self.next_choice() % bound.len();
            let name = bound.remove(idx);
            return var(name.as_str());
        }

        return var(LEAF_NAMES[self.next_choice() % LEAF_NAMES.len()]);
    }

    fn build(&mut self, depth: u32, bound: &mut Vec<String>) -> Rc<Expr> {
        if depth == 0 {
            return self.leaf(bound);
        }

        match self.next_choice() % 5 {
            0 | 1 => return self.leaf(bound),
            2 | 3 => {
                let function = self.build(depth - 1, bound);
                let argument = self.build(depth - 1, bound);
                return call(function, argument);
            }
            _ => {
                let param = binder_name(self.next_binder);
                self.next_binder += 1;

                bound.push(param.clone());
                let body = self.build(depth - 1, bound);
                bound.retain(|name| *name != param);

                return lambda(param.as_str(), body);
            }
        }
    }
}

// `va`, `vb`, ..., `vz`, `vba`, ... never collide with leaf or scope names.
fn binder_name(mut idx: usize) -> String {
    let mut letters = Vec::new();

    loop {
        letters.push(char::from(b'a' + (idx % 26) as u8));
        idx /= 26;

        if idx == 0 {
            break;
        }
    }

    letters.reverse();
    return format!("v{}", letters.into_iter().collect::<String>());
}

fn affine_term(choices: &[u8]) -> Rc<Expr> {
    return TermBuilder::new(choices).build(6, &mut Vec::new());
}

fn step_fixpoint(expr: &Rc<Expr>, scope: &Scope) -> Rc<Expr> {
    let mut current = Rc::clone(expr);

    loop {
        let step = evaluate_once(&current, scope);

        if step.kind == EvaluationKind::Unchanged {
            return current;
        }

        current = step.expr;
    }
}

proptest! {
    #[test]
    fn evaluation_paths_agree(choices in prop::collection::vec(any::<u8>(), 0..96)) {
        let scope = test_scope();
        let term = affine_term(&choices);

        let by_evaluate = normalize(&term, &scope);
        let by_steps = step_fixpoint(&term, &scope);

        prop_assert_eq!(by_evaluate.to_string(), by_steps.to_string());
    }

    #[test]
    fn disjoint_substitution_keeps_reference(choices in prop::collection::vec(any::<u8>(), 0..96)) {
        let term = affine_term(&choices);
        let free_vars: HashSet<String> = get_all_free_variables(&term)
            .into_iter()
            .map(String::from)
            .collect();

        let bindings: Scope = ["a", "b", "c", "u", "w", "i"]
            .into_iter()
            .filter(|name| !free_vars.contains(*name))
            .map(|name| (String::from(name), var("replacement")))
            .collect();

        prop_assert!(Rc::ptr_eq(&substitute(&term, &bindings), &term));
    }

    #[test]
    fn formatting_reparses_to_the_same_term(choices in prop::collection::vec(any::<u8>(), 0..96)) {
        let term = affine_term(&choices);
        let formatted = term.to_string();

        let tokens = run_lexical_analysis(&formatted, false).expect("formatted term should lex");
        let reparsed = parse_expression(tokens)
            .expect("formatted term should parse")
            .expect("formatted term should not be empty");

        prop_assert_eq!(reparsed, term, "formatted as {}", formatted);
    }

    #[test]
    fn normalize_is_idempotent(choices in prop::collection::vec(any::<u8>(), 0..96)) {
        let scope = test_scope();
        let normal = normalize(&affine_term(&choices), &scope);

        prop_assert!(Rc::ptr_eq(&normalize(&normal, &scope), &normal));
    }
}

#[test]
fn shadowing_law() {
    let expr = lambda("x", call(var("x"), var("y")));
    let bindings: Scope = [
        (String::from("x"), var("a")),
        (String::from("y"), var("b")),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        substitute(&expr, &bindings),
        lambda("x", call(var("x"), var("b")))
    );
}
