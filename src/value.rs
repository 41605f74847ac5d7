use im_rc::Vector;

use std::{
    fmt::{self, Debug, Display},
    rc::Rc,
};

use crate::{
    builtins::Builtin,
    env::Env,
    error::{self as e, LispError},
};

pub type EvalResult = Result<Value, LispError>;

#[derive(Clone, Debug)]
pub enum Value {
    Number(i64),
    Error(LispError),
    Symbol(Rc<String>),
    Builtin(Builtin),
    Lambda(Lambda),
    SExpr(Vector<Value>),
    QExpr(Vector<Value>),
}

/// A user defined function. `body` holds the contents of the q-expression
/// given to `\`; it is evaluated as an s-expression on every call.
#[derive(Clone)]
pub struct Lambda {
    params: Vector<Rc<String>>,
    rest: Option<Rc<String>>,
    body: Vector<Value>,
    env: Env,
}

impl Lambda {
    pub fn new(
        params: Vector<Rc<String>>,
        rest: Option<Rc<String>>,
        body: Vector<Value>,
        env: Env,
    ) -> Self {
        Self {
            params,
            rest,
            body,
            env,
        }
    }

    #[inline]
    pub fn params(&self) -> &Vector<Rc<String>> {
        &self.params
    }

    #[inline]
    pub fn rest(&self) -> Option<&Rc<String>> {
        self.rest.as_ref()
    }

    #[inline]
    pub fn body(&self) -> &Vector<Value> {
        &self.body
    }

    #[inline]
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The parameter list as written, e.g. `\ {x & xs}`.
    pub fn signature(&self) -> String {
        let mut names: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        if let Some(rest) = &self.rest {
            names.push("&".into());
            names.push(rest.to_string());
        }
        format!("\\ {{{}}}", names.join(" "))
    }
}

impl Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Lambda({} {})", self.signature(), Value::QExpr(self.body.clone()))
    }
}

impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.rest == other.rest && self.body == other.body
    }
}

impl Value {
    #[inline]
    pub fn make_symbol<I: Into<String>>(s: I) -> Self {
        Value::Symbol(Rc::new(s.into()))
    }

    #[inline]
    pub fn make_sexpr(v: Vector<Value>) -> Self {
        Value::SExpr(v)
    }

    #[inline]
    pub fn make_qexpr(v: Vector<Value>) -> Self {
        Value::QExpr(v)
    }

    #[inline]
    pub fn make_error(e: LispError) -> Self {
        Value::Error(e)
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Number(if b { 1 } else { 0 })
    }

    /// Collapses an evaluation result into a single value, turning the
    /// error side into `Value::Error`.
    pub fn from_result(result: EvalResult) -> Self {
        result.unwrap_or_else(Value::Error)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "Number",
            Self::Error(_) => "Error",
            Self::Symbol(_) => "Symbol",
            Self::Builtin(_) | Self::Lambda(_) => "Function",
            Self::SExpr(_) => "S-Expression",
            Self::QExpr(_) => "Q-Expression",
        }
    }

    #[inline]
    pub fn symbol(&self) -> Option<&Rc<String>> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The number inside, or a type error blaming argument `pos` of `name`.
    pub fn number<D: Display>(&self, name: D, pos: usize) -> Result<i64, LispError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(e::arg_type(name, "Number", other, pos)),
        }
    }

    /// The q-expression contents, or a type error blaming argument `pos` of `name`.
    pub fn owned_qexpr<D: Display>(self, name: D, pos: usize) -> Result<Vector<Value>, LispError> {
        match self {
            Value::QExpr(v) => Ok(v),
            other => Err(e::arg_type(name, "Q-Expression", &other, pos)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Lambda(a), Self::Lambda(b)) => a == b,
            (Self::SExpr(a), Self::SExpr(b)) | (Self::QExpr(a), Self::QExpr(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Error(e) => write!(f, "Error: {}", e),
            Self::Symbol(s) => write!(f, "{}", s),
            Self::Builtin(_) | Self::Lambda(_) => write!(f, "<function>"),
            Self::SExpr(l) => {
                write!(f, "(")?;
                display_seq(l.iter(), f)?;
                write!(f, ")")
            }
            Self::QExpr(l) => {
                write!(f, "{{")?;
                display_seq(l.iter(), f)?;
                write!(f, "}}")
            }
        }
    }
}

fn display_seq<P: Display, I: Iterator<Item = P>>(mut i: I, f: &mut fmt::Formatter) -> fmt::Result {
    if let Some(e) = i.next() {
        write!(f, "{}", e)?;
    }

    for e in i {
        write!(f, " {}", e)?;
    }

    Ok(())
}
