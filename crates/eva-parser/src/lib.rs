/*! Parse Eva source text into expression trees.
 *
 * Eva programs are S-expressions: integers, double-quoted strings, symbols and parenthesized
 * lists. String literals keep their escape sequences raw; the lowering engine decides what they
 * mean. A whole program is parsed as the body of an implicit `(begin ...)`.
 */

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct EvaParser;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error:\n{0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    #[error("Invalid number literal `{0}`")]
    InvalidNumber(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// One node of a parsed program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Number(i64),
    /// Literal text between the quotes, escapes untouched.
    String(String),
    Symbol(String),
    List(Vec<Expr>),
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol(name.into())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::String(s) => write!(f, "\"{}\"", s),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Parses exactly one expression; trailing input is a syntax error.
pub fn parse_expr(input: &str) -> ParseResult<Expr> {
    let mut pairs = EvaParser::parse(Rule::single, input)
        .map_err(Box::new)?
        .flat_map(|single| single.into_inner());
    match pairs.next() {
        Some(pair) if pair.as_rule() != Rule::EOI => build_expr(pair),
        _ => Err(empty_input_error(input)),
    }
}

/// Parses a whole program as the body of `(begin ...)`.
pub fn parse_program(source: &str) -> ParseResult<Expr> {
    // The newline keeps a trailing line comment from swallowing the closing paren.
    parse_expr(&format!("(begin {}\n)", source))
}

pub fn check(input: &str) -> bool {
    parse_expr(input).is_ok()
}

fn build_expr(pair: Pair<'_, Rule>) -> ParseResult<Expr> {
    match pair.as_rule() {
        Rule::number => pair
            .as_str()
            .parse::<i64>()
            .map(Expr::Number)
            .map_err(|_| ParseError::InvalidNumber(pair.as_str().to_string())),
        Rule::string => Ok(Expr::String(
            pair.into_inner()
                .next()
                .map(|raw| raw.as_str().to_string())
                .unwrap_or_default(),
        )),
        Rule::symbol => Ok(Expr::Symbol(pair.as_str().to_string())),
        Rule::list => pair
            .into_inner()
            .map(build_expr)
            .collect::<ParseResult<Vec<_>>>()
            .map(Expr::List),
        other => unreachable!("grammar produced unexpected rule {:?}", other),
    }
}

fn empty_input_error(input: &str) -> ParseError {
    ParseError::Syntax(Box::new(pest::error::Error::new_from_pos(
        pest::error::ErrorVariant::CustomError {
            message: "expected an expression".to_string(),
        },
        pest::Position::from_start(input),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    #[test]
    fn test_atoms() {
        assert_eq!(parse_expr("42").unwrap(), Expr::Number(42));
        assert_eq!(parse_expr("-7").unwrap(), Expr::Number(-7));
        assert_eq!(parse_expr("x").unwrap(), sym("x"));
        assert_eq!(parse_expr("-").unwrap(), sym("-"));
        assert_eq!(parse_expr("!=").unwrap(), sym("!="));
    }

    #[test]
    fn test_digits_followed_by_letters_are_a_symbol() {
        assert_eq!(parse_expr("12ab").unwrap(), sym("12ab"));
    }

    #[test]
    fn test_nested_lists() {
        let expr = parse_expr("(if (> x 1) (+ x 1) 0)").unwrap();
        assert_eq!(
            expr,
            Expr::List(vec![
                sym("if"),
                Expr::List(vec![sym(">"), sym("x"), Expr::Number(1)]),
                Expr::List(vec![sym("+"), sym("x"), Expr::Number(1)]),
                Expr::Number(0),
            ])
        );
    }

    #[test]
    fn test_string_escapes_stay_raw() {
        let expr = parse_expr(r#"(printf "a\nb \"q\"")"#).unwrap();
        assert_eq!(
            expr,
            Expr::List(vec![sym("printf"), Expr::String(r#"a\nb \"q\""#.to_string())])
        );
    }

    #[test]
    fn test_empty_string_and_list() {
        assert_eq!(parse_expr("\"\"").unwrap(), Expr::String(String::new()));
        assert_eq!(parse_expr("()").unwrap(), Expr::List(vec![]));
    }

    #[test]
    fn test_comments_are_skipped() {
        let expr = parse_expr("(var x // the counter\n 10)").unwrap();
        assert_eq!(expr, Expr::List(vec![sym("var"), sym("x"), Expr::Number(10)]));
    }

    #[test]
    fn test_program_is_wrapped_in_begin() {
        let expr = parse_program("(var x 1) x // trailing comment").unwrap();
        assert_eq!(
            expr,
            Expr::List(vec![
                sym("begin"),
                Expr::List(vec![sym("var"), sym("x"), Expr::Number(1)]),
                sym("x"),
            ])
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(parse_expr("(+ 1 2"), Err(ParseError::Syntax(_))));
        assert!(matches!(parse_expr("1 2"), Err(ParseError::Syntax(_))));
        assert!(matches!(parse_expr(""), Err(ParseError::Syntax(_))));
        assert!(matches!(parse_expr("\"open"), Err(ParseError::Syntax(_))));
        assert!(!check(")"));
    }

    #[test]
    fn test_huge_number_is_rejected() {
        assert!(matches!(
            parse_expr("99999999999999999999"),
            Err(ParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let source = r#"(begin (var (s string) "hi\n") (printf s) (- 1 -2))"#;
        let expr = parse_expr(source).unwrap();
        assert_eq!(expr.to_string(), source);
        assert_eq!(parse_expr(&expr.to_string()).unwrap(), expr);
    }
}
