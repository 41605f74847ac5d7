use std::fmt::{self, Display};

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadNumber,
    UnboundSymbol,
    NotAFunction,
    UnknownFunction,
    TypeMismatch,
    ArityError,
    EmptyList,
    DivisionByZero,
    Overflow,
    BadFormals,
    Syntax,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BadNumber => write!(f, "bad number"),
            Self::UnboundSymbol => write!(f, "unbound symbol"),
            Self::NotAFunction => write!(f, "not a function"),
            Self::UnknownFunction => write!(f, "unknown function"),
            Self::TypeMismatch => write!(f, "type mismatch"),
            Self::ArityError => write!(f, "arity error"),
            Self::EmptyList => write!(f, "empty list"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::Overflow => write!(f, "numeric overflow"),
            Self::BadFormals => write!(f, "bad formals"),
            Self::Syntax => write!(f, "syntax error"),
        }
    }
}

/// A runtime error. Errors are ordinary values: they are stored in
/// `Value::Error` and rendered as `Error: <detail>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct LispError {
    kind: ErrorKind,
    detail: String,
}

impl LispError {
    pub fn new<D: Into<String>>(kind: ErrorKind, detail: D) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("<stdin>:{0}: expected {1}, got end of input")]
    UnexpectedEnd(usize, &'static str),
    #[error("<stdin>:{0}: unexpected '{1}', expected {2}")]
    Unexpected(usize, char, &'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown overflow policy '{0}', expected wrapping, checked or saturating")]
    UnknownOverflow(String),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

impl From<ParseError> for LispError {
    fn from(source: ParseError) -> Self {
        syntax(source)
    }
}

pub fn bad_number<D: Display>(literal: D) -> LispError {
    LispError::new(ErrorKind::BadNumber, format!("invalid number '{}'", literal))
}

pub fn symbol_not_found<D: Display>(name: D) -> LispError {
    LispError::new(
        ErrorKind::UnboundSymbol,
        format!("unbound symbol '{}'", name),
    )
}

pub fn unknown_function<D: Display>(name: D) -> LispError {
    LispError::new(
        ErrorKind::UnknownFunction,
        format!("unknown function '{}'", name),
    )
}

pub fn not_function(value: &Value) -> LispError {
    LispError::new(
        ErrorKind::NotAFunction,
        format!(
            "s-expression starts with '{}', a {} and not a function",
            value,
            value.type_name()
        ),
    )
}

pub fn arg_type<D: Display>(name: D, expected: &str, got: &Value, pos: usize) -> LispError {
    LispError::new(
        ErrorKind::TypeMismatch,
        format!(
            "function '{}' passed incorrect type for argument {}. Got {}, expected {}",
            name,
            pos,
            got.type_name(),
            expected
        ),
    )
}

pub fn arg_count<D: Display, S: Display>(name: D, required: S, provided: usize) -> LispError {
    LispError::new(
        ErrorKind::ArityError,
        format!(
            "function '{}' passed incorrect number of arguments. Got {}, expected {}",
            name, provided, required
        ),
    )
}

pub fn empty_list<D: Display>(name: D) -> LispError {
    LispError::new(ErrorKind::EmptyList, format!("function '{}' passed {{}}", name))
}

pub fn division_by_zero() -> LispError {
    LispError::new(ErrorKind::DivisionByZero, "division by zero")
}

pub fn numeric_overflow<D: Display>(name: D, first: i64, second: i64) -> LispError {
    LispError::new(
        ErrorKind::Overflow,
        format!("numeric overflow in '{}' with {} and {}", name, first, second),
    )
}

pub fn bad_formals<D: Display>(detail: D) -> LispError {
    LispError::new(ErrorKind::BadFormals, detail.to_string())
}

pub fn syntax<D: Display>(detail: D) -> LispError {
    LispError::new(ErrorKind::Syntax, detail.to_string())
}
