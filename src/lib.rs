//! This crate contains code for a small lambda calculus scripting language:
//! named assignments and expression statements evaluated by substitution and
//! beta reduction.

pub mod end_to_end;
pub mod lexical_analysis;
pub mod program_execution;
pub mod program_representation;
pub mod recursive_descent_parsing;
