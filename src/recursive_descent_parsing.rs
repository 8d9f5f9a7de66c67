//! Recursive descent parser that builds statements and expressions from a
//! sequence of tokens.
//!
//! Grammar, after whitespace is dropped:
//!
//! ```text
//! StatementList := Statement* EOF
//! Statement     := (ID '=' Call | Call) ';'
//! Call          := Primary Primary*
//! Primary       := ID | ID '->' Call | 'λ' ID '.' Call | '(' Call ')'
//! ```

use std::rc::Rc;

use thiserror::Error;

use crate::lexical_analysis::{Token, TokenClass};
use crate::program_representation::{Expr, Statement};

/// Represents a parsing error.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error(
        "Unexpected token type {found_token_class}.  Expected {}. @ {offset}",
        describe_expected(.expected_token_classes)
    )]
    UnexpectedToken {
        expected_token_classes: Vec<TokenClass>,
        found_token_class: TokenClass,
        offset: usize,
    },

    #[error("Unexpected end of input.")]
    UnexpectedEndOfInput,
}

// Renders `['(', 'λ', ID]` as `'(', 'λ', or ID`.
fn describe_expected(token_classes: &[TokenClass]) -> String {
    let names: Vec<String> = token_classes
        .iter()
        .map(|token_class| token_class.to_string())
        .collect();

    match names.split_last() {
        None => return String::new(),
        Some((only, [])) => return only.clone(),
        Some((last, [first])) => return format!("{} or {}", first, last),
        Some((last, rest)) => return format!("{}, or {}", rest.join(", "), last),
    }
}

/// Primary expressions can start with these token classes.
const PRIMARY_START: [TokenClass; 3] = [
    TokenClass::LeftParen,
    TokenClass::Lambda,
    TokenClass::Identifier,
];

// Gets the token at tokens[start_idx], failing if the tokens ran out.
fn peek_token(tokens: &[Token], start_idx: usize) -> Result<&Token, ParseError> {
    return tokens
        .get(start_idx)
        .ok_or(ParseError::UnexpectedEndOfInput);
}

// Builds the error for an unexpected token.
fn unexpected(token: &Token, expected_token_classes: &[TokenClass]) -> ParseError {
    return ParseError::UnexpectedToken {
        expected_token_classes: expected_token_classes.to_vec(),
        found_token_class: token.token_class,
        offset: token.start_offset,
    };
}

/// Tries to parse a token of the requested class at tokens[start_idx].
fn try_token_class(
    tokens: &[Token],
    start_idx: usize,
    token_class: TokenClass,
) -> Result<(&Token, usize), ParseError> {
    let token = peek_token(tokens, start_idx)?;

    if token.token_class == token_class {
        return Ok((token, start_idx + 1));
    }

    return Err(unexpected(token, &[token_class]));
}

// Whether the token at tokens[start_idx] has the given class.
fn is_token_class(tokens: &[Token], start_idx: usize, token_class: TokenClass) -> bool {
    return tokens
        .get(start_idx)
        .is_some_and(|token| token.token_class == token_class);
}

/// Tries to parse an expression that looks like `λ[IDENTIFIER].[CALL]`.
fn try_lambda_rule(tokens: &[Token], start_idx: usize) -> Result<(Rc<Expr>, usize), ParseError> {
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Lambda)?;
    let (param_token, start_idx) = try_token_class(tokens, start_idx, TokenClass::Identifier)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Period)?;
    let (body, start_idx) = try_call_rule(tokens, start_idx)?;

    return Ok((
        Rc::new(Expr::Lambda {
            param: param_token.token_text.clone(),
            body,
        }),
        start_idx,
    ));
}

/// Tries to parse an expression that looks like `[IDENTIFIER] -> [CALL]`.
fn try_arrow_lambda_rule(
    tokens: &[Token],
    start_idx: usize,
) -> Result<(Rc<Expr>, usize), ParseError> {
    let (param_token, start_idx) = try_token_class(tokens, start_idx, TokenClass::Identifier)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Arrow)?;
    let (body, start_idx) = try_call_rule(tokens, start_idx)?;

    return Ok((
        Rc::new(Expr::Lambda {
            param: param_token.token_text.clone(),
            body,
        }),
        start_idx,
    ));
}

/// Tries to parse an expression that looks like `([CALL])`.
fn try_parenthesis_expr_rule(
    tokens: &[Token],
    start_idx: usize,
) -> Result<(Rc<Expr>, usize), ParseError> {
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::LeftParen)?;
    let (expr, start_idx) = try_call_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::RightParen)?;

    return Ok((expr, start_idx));
}

/// Tries to parse an expression that looks like `[IDENTIFIER]`.
fn try_var_expr_rule(tokens: &[Token], start_idx: usize) -> Result<(Rc<Expr>, usize), ParseError> {
    let (var_token, start_idx) = try_token_class(tokens, start_idx, TokenClass::Identifier)?;

    return Ok((
        Rc::new(Expr::Variable {
            name: var_token.token_text.clone(),
        }),
        start_idx,
    ));
}

/// Tries to parse a primary expression, picking the rule from the next one
/// or two tokens.
fn try_primary_rule(tokens: &[Token], start_idx: usize) -> Result<(Rc<Expr>, usize), ParseError> {
    let token = peek_token(tokens, start_idx)?;

    match token.token_class {
        TokenClass::LeftParen => return try_parenthesis_expr_rule(tokens, start_idx),
        TokenClass::Lambda => return try_lambda_rule(tokens, start_idx),
        TokenClass::Identifier if is_token_class(tokens, start_idx + 1, TokenClass::Arrow) => {
            return try_arrow_lambda_rule(tokens, start_idx);
        }
        TokenClass::Identifier => return try_var_expr_rule(tokens, start_idx),
        _ => return Err(unexpected(token, &PRIMARY_START)),
    }
}

// A call ends at a closing parenthesis, a semicolon, or the end of input.
fn is_call_terminator(tokens: &[Token], start_idx: usize) -> bool {
    return is_token_class(tokens, start_idx, TokenClass::RightParen)
        || is_token_class(tokens, start_idx, TokenClass::Semicolon)
        || is_token_class(tokens, start_idx, TokenClass::EndOfInput);
}

/// Parses a chain of primaries as left-associative function application.
fn try_call_rule(tokens: &[Token], start_idx: usize) -> Result<(Rc<Expr>, usize), ParseError> {
    // Try to parse at least one primary.
    let (mut out_expr, mut start_idx) = try_primary_rule(tokens, start_idx)?;

    while !is_call_terminator(tokens, start_idx) {
        let (argument, new_start_idx) = try_primary_rule(tokens, start_idx)?;

        out_expr = Rc::new(Expr::Call {
            function: out_expr,
            argument,
        });
        start_idx = new_start_idx;
    }

    return Ok((out_expr, start_idx));
}

/// Tries to parse an assignment statement, without its semicolon.
fn try_assignment_rule(tokens: &[Token], start_idx: usize) -> Result<(Statement, usize), ParseError> {
    let (name_token, start_idx) = try_token_class(tokens, start_idx, TokenClass::Identifier)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Equals)?;
    let (initializer, start_idx) = try_call_rule(tokens, start_idx)?;

    return Ok((
        Statement::Assignment {
            name: name_token.token_text.clone(),
            initializer,
        },
        start_idx,
    ));
}

/// Tries to parse a statement, including its terminating semicolon.
fn try_statement_rule(tokens: &[Token], start_idx: usize) -> Result<(Statement, usize), ParseError> {
    let is_assignment = is_token_class(tokens, start_idx, TokenClass::Identifier)
        && is_token_class(tokens, start_idx + 1, TokenClass::Equals);

    let (statement, start_idx) = if is_assignment {
        try_assignment_rule(tokens, start_idx)?
    } else {
        let (expression, start_idx) = try_call_rule(tokens, start_idx)?;
        (Statement::ExpressionStatement { expression }, start_idx)
    };

    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Semicolon)?;

    return Ok((statement, start_idx));
}

// Drops whitespace, which the grammar never looks at.
fn significant_tokens(tokens: impl IntoIterator<Item = Token>) -> Vec<Token> {
    return tokens
        .into_iter()
        .filter(|token| token.token_class != TokenClass::Whitespace)
        .collect();
}

/// Uses recursive descent to parse the given tokens into a
/// `Statement::StatementList`. The tokens must end with an end-of-input
/// token. The first grammar violation aborts the parse.
pub fn parse_recursive_descent(
    tokens: impl IntoIterator<Item = Token>,
) -> Result<Statement, ParseError> {
    let tokens = significant_tokens(tokens);

    let mut statements = Vec::new();
    let mut start_idx = 0;

    while !is_token_class(&tokens, start_idx, TokenClass::EndOfInput) {
        let (statement, new_start_idx) = try_statement_rule(&tokens, start_idx)?;
        statements.push(statement);
        start_idx = new_start_idx;
    }

    tracing::debug!(statement_count = statements.len(), "parsed statement list");

    return Ok(Statement::StatementList { statements });
}

/// Parses a single expression that must span the whole input. Returns
/// `None` when the input holds nothing but the end-of-input token.
pub fn parse_expression(
    tokens: impl IntoIterator<Item = Token>,
) -> Result<Option<Rc<Expr>>, ParseError> {
    let tokens = significant_tokens(tokens);

    if is_token_class(&tokens, 0, TokenClass::EndOfInput) {
        return Ok(None);
    }

    let (expr, start_idx) = try_call_rule(&tokens, 0)?;
    try_token_class(&tokens, start_idx, TokenClass::EndOfInput)?;

    return Ok(Some(expr));
}
