//! Code to configure and run the interpreter on a script.

use std::fs;

use clap::Parser;
use thiserror::Error;

use crate::lexical_analysis::{run_lexical_analysis, LexError};
use crate::program_execution::{execute_statement, Output};
use crate::program_representation::Scope;
use crate::recursive_descent_parsing::{parse_recursive_descent, ParseError};

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// The script file to run.
    pub src_filepath: String,

    /// Print every substitution and reduction step instead of only the final
    /// value of each expression statement.
    #[arg(short, long)]
    pub show_steps: bool,
}

/// Errors that may be thrown when running the interpreter.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Input file error: {0}")]
    InputFileError(#[from] std::io::Error),

    #[error("Lex error: {0}")]
    LexError(#[from] LexError),

    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

/// Lexes, parses, and executes a script against a fresh scope. Produced
/// lines go to `output`.
pub fn run_script(
    program_str: &str,
    show_steps: bool,
    output: &mut dyn Output,
) -> Result<(), RunError> {
    // Run lexer. The first lex error aborts the run.
    let tokens = run_lexical_analysis(program_str, true)?;

    // Run parser.
    let program = parse_recursive_descent(tokens)?;

    // Execute the program. The scope lives exactly as long as this run.
    let mut scope = Scope::new();
    execute_statement(&program, &mut scope, output, show_steps);

    return Ok(());
}

/// Run the interpreter (i.e. the lexer, parser, and code execution) on the
/// file named in the config.
pub fn run_interpreter(config: &InterpreterConfig, output: &mut dyn Output) -> Result<(), RunError> {
    // Read the input file into a string.
    let program_string = fs::read_to_string(&config.src_filepath)?;

    tracing::debug!(
        src_filepath = config.src_filepath.as_str(),
        show_steps = config.show_steps,
        "running script"
    );

    return run_script(program_string.as_str(), config.show_steps, output);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run_to_lines(program_str: &str, show_steps: bool) -> Vec<String> {
        let mut output: Vec<String> = Vec::new();
        run_script(program_str, show_steps, &mut output).expect("Unexpected run error.");
        return output;
    }

    #[test]
    fn test_run_script_simple() {
        let program_str = "tru = λt. λf. t;
            fls = λt. λf. f;
            test = λl. λm. λn. l m n;

            tru pass fail;
            fls fail pass;

            λy.y x;
            tru;
            test;

            test tru v w;
        ";

        assert_eq!(
            run_to_lines(program_str, false),
            vec!["pass", "pass", "λy. y x", "tru", "test", "v"]
        );
    }

    #[test]
    fn test_run_script_pairs() {
        let program_str = "
            pair = λf. λs. λb. b f s;
            fst = λp. p tru;
            snd = λp. p fls;
            tru = λt. λf. t;
            fls = λt. λf. f;

            fst (pair v w);
            snd (pair v w);
        ";

        assert_eq!(run_to_lines(program_str, false), vec!["v", "w"]);
    }

    #[test]
    fn test_run_script_with_steps() {
        let program_str = "id = x -> x; id a;";

        assert_eq!(
            run_to_lines(program_str, true),
            vec!["    id a", " =  (λx. x) a", "--> a"]
        );
    }

    #[test]
    fn test_run_script_errors() {
        let mut output: Vec<String> = Vec::new();

        let lex_result = run_script("a = b; ?", false, &mut output);
        assert!(matches!(lex_result, Err(RunError::LexError(_))));

        let parse_result = run_script("a = b; )", false, &mut output);
        assert!(matches!(parse_result, Err(RunError::ParseError(_))));

        // Nothing runs before the whole script parses.
        assert!(output.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let config = InterpreterConfig {
            src_filepath: String::from("test_programs/does_not_exist.lc"),
            show_steps: false,
        };
        let mut output: Vec<String> = Vec::new();

        let result = run_interpreter(&config, &mut output);
        assert!(matches!(result, Err(RunError::InputFileError(_))));
    }
}
