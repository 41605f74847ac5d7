use im_rc::Vector;

use std::convert::TryInto;

use crate::{
    config::Overflow,
    env::Env,
    error::{self as e, LispError},
    eval::eval,
    value::{EvalResult, Lambda, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    List,
    Head,
    Tail,
    Join,
    Eval,
    Cons,
    Len,
    Init,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Def,
    Put,
    Lambda,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    If,
}

impl Builtin {
    pub const ALL: [Builtin; 23] = [
        Builtin::List,
        Builtin::Head,
        Builtin::Tail,
        Builtin::Join,
        Builtin::Eval,
        Builtin::Cons,
        Builtin::Len,
        Builtin::Init,
        Builtin::Add,
        Builtin::Subtract,
        Builtin::Multiply,
        Builtin::Divide,
        Builtin::Modulo,
        Builtin::Def,
        Builtin::Put,
        Builtin::Lambda,
        Builtin::Equal,
        Builtin::NotEqual,
        Builtin::Less,
        Builtin::Greater,
        Builtin::LessEqual,
        Builtin::GreaterEqual,
        Builtin::If,
    ];

    /// The symbol the builtin is bound to in a root environment.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::List => "list",
            Builtin::Head => "head",
            Builtin::Tail => "tail",
            Builtin::Join => "join",
            Builtin::Eval => "eval",
            Builtin::Cons => "cons",
            Builtin::Len => "len",
            Builtin::Init => "init",
            Builtin::Add => "+",
            Builtin::Subtract => "-",
            Builtin::Multiply => "*",
            Builtin::Divide => "/",
            Builtin::Modulo => "%",
            Builtin::Def => "def",
            Builtin::Put => "=",
            Builtin::Lambda => "\\",
            Builtin::Equal => "==",
            Builtin::NotEqual => "!=",
            Builtin::Less => "<",
            Builtin::Greater => ">",
            Builtin::LessEqual => "<=",
            Builtin::GreaterEqual => ">=",
            Builtin::If => "if",
        }
    }

    #[tracing::instrument(level = "debug", skip(env, args), fields(argc = args.len()))]
    pub fn call(self, env: &Env, args: Vector<Value>) -> EvalResult {
        match self {
            Builtin::List => list(args),
            Builtin::Head => head(args),
            Builtin::Tail => tail(args),
            Builtin::Join => join(args),
            Builtin::Eval => eval_qexpr(env, args),
            Builtin::Cons => cons(args),
            Builtin::Len => len(args),
            Builtin::Init => init(args),
            Builtin::Add => arithmetic(env, args, Arith::Add),
            Builtin::Subtract => arithmetic(env, args, Arith::Subtract),
            Builtin::Multiply => arithmetic(env, args, Arith::Multiply),
            Builtin::Divide => arithmetic(env, args, Arith::Divide),
            Builtin::Modulo => arithmetic(env, args, Arith::Modulo),
            Builtin::Def => var(env, args, Scope::Root),
            Builtin::Put => var(env, args, Scope::Local),
            Builtin::Lambda => lambda(env, args),
            Builtin::Equal => equality(args, true, self.name()),
            Builtin::NotEqual => equality(args, false, self.name()),
            Builtin::Less => compare(args, i64::lt, self.name()),
            Builtin::Greater => compare(args, i64::gt, self.name()),
            Builtin::LessEqual => compare(args, i64::le, self.name()),
            Builtin::GreaterEqual => compare(args, i64::ge, self.name()),
            Builtin::If => if_(env, args),
        }
    }
}

fn list(args: Vector<Value>) -> EvalResult {
    Ok(Value::make_qexpr(args))
}

fn head(args: Vector<Value>) -> EvalResult {
    let list = non_empty(args, "head")?;
    Ok(Value::make_qexpr(list.take(1)))
}

fn tail(args: Vector<Value>) -> EvalResult {
    let list = non_empty(args, "tail")?;
    Ok(Value::make_qexpr(list.skip(1)))
}

fn init(args: Vector<Value>) -> EvalResult {
    let list = non_empty(args, "init")?;
    Ok(Value::make_qexpr(list.take(list.len() - 1)))
}

fn join(args: Vector<Value>) -> EvalResult {
    let mut result = Vector::new();
    for (i, arg) in args.into_iter().enumerate() {
        result.append(arg.owned_qexpr("join", i)?);
    }
    Ok(Value::make_qexpr(result))
}

fn eval_qexpr(env: &Env, args: Vector<Value>) -> EvalResult {
    let [list] = exactly::<1>(args, "eval")?;
    eval(Value::make_sexpr(list.owned_qexpr("eval", 0)?), env)
}

fn cons(args: Vector<Value>) -> EvalResult {
    let [elm, list] = exactly::<2>(args, "cons")?;
    let mut list = list.owned_qexpr("cons", 1)?;
    list.push_front(elm);
    Ok(Value::make_qexpr(list))
}

fn len(args: Vector<Value>) -> EvalResult {
    let [list] = exactly::<1>(args, "len")?;
    Ok(Value::Number(list.owned_qexpr("len", 0)?.len() as i64))
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Root,
    Local,
}

fn var(env: &Env, args: Vector<Value>, scope: Scope) -> EvalResult {
    let name = match scope {
        Scope::Root => Builtin::Def.name(),
        Scope::Local => Builtin::Put.name(),
    };
    let mut values = args;
    let syms = values
        .pop_front()
        .ok_or_else(|| e::arg_count(name, "1 or more", 0))?
        .owned_qexpr(name, 0)?;

    let mut names = Vec::with_capacity(syms.len());
    for sym in syms {
        match sym {
            Value::Symbol(s) => names.push(s),
            other => return Err(e::arg_type(name, "Symbol", &other, 0)),
        }
    }

    if names.len() != values.len() {
        return Err(e::arg_count(name, names.len() + 1, values.len() + 1));
    }

    for (sym, value) in names.into_iter().zip(values) {
        tracing::debug!(symbol = %sym, ?scope, "bind");
        match scope {
            Scope::Root => env.def(sym.as_str(), value),
            Scope::Local => env.put(sym.as_str(), value),
        }
    }

    Ok(Value::make_sexpr(Vector::new()))
}

fn lambda(env: &Env, args: Vector<Value>) -> EvalResult {
    let [formals, body] = exactly::<2>(args, "\\")?;
    let formals = formals.owned_qexpr("\\", 0)?;
    let body = body.owned_qexpr("\\", 1)?;

    let mut syms: Vector<_> = Vector::new();
    for formal in formals {
        match formal {
            Value::Symbol(s) => syms.push_back(s),
            other => return Err(e::arg_type("\\", "Symbol", &other, 0)),
        }
    }

    let (params, rest) = match syms.iter().position(|s| s.as_str() == "&") {
        None => (syms, None),
        Some(pos) if pos + 2 == syms.len() && syms[pos + 1].as_str() != "&" => {
            let rest = syms[pos + 1].clone();
            (syms.take(pos), Some(rest))
        }
        Some(_) => {
            return Err(e::bad_formals(
                "function '\\' passed '&' not followed by exactly one symbol",
            ))
        }
    };

    Ok(Value::Lambda(Lambda::new(params, rest, body, env.clone())))
}

fn equality(args: Vector<Value>, equal: bool, name: &str) -> EvalResult {
    let [a, b] = exactly::<2>(args, name)?;
    Ok(Value::bool((a == b) == equal))
}

fn compare(args: Vector<Value>, operation: fn(&i64, &i64) -> bool, name: &str) -> EvalResult {
    let [a, b] = exactly::<2>(args, name)?;
    Ok(Value::bool(operation(&a.number(name, 0)?, &b.number(name, 1)?)))
}

fn if_(env: &Env, args: Vector<Value>) -> EvalResult {
    let [cond, then, otherwise] = exactly::<3>(args, "if")?;
    let cond = cond.number("if", 0)?;
    let then = then.owned_qexpr("if", 1)?;
    let otherwise = otherwise.owned_qexpr("if", 2)?;

    eval(
        Value::make_sexpr(if cond != 0 { then } else { otherwise }),
        env,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Arith {
    fn name(self) -> &'static str {
        match self {
            Arith::Add => "+",
            Arith::Subtract => "-",
            Arith::Multiply => "*",
            Arith::Divide => "/",
            Arith::Modulo => "%",
        }
    }

    fn apply(self, overflow: Overflow, x: i64, y: i64) -> Result<i64, LispError> {
        if y == 0 && (self == Arith::Divide || self == Arith::Modulo) {
            return Err(e::division_by_zero());
        }

        let result = match overflow {
            Overflow::Wrapping => Some(match self {
                Arith::Add => x.wrapping_add(y),
                Arith::Subtract => x.wrapping_sub(y),
                Arith::Multiply => x.wrapping_mul(y),
                Arith::Divide => x.wrapping_div(y),
                Arith::Modulo => x.wrapping_rem(y),
            }),
            Overflow::Saturating => Some(match self {
                Arith::Add => x.saturating_add(y),
                Arith::Subtract => x.saturating_sub(y),
                Arith::Multiply => x.saturating_mul(y),
                Arith::Divide => x.saturating_div(y),
                // i64::MIN % -1 is 0, the only overflowing case
                Arith::Modulo => x.wrapping_rem(y),
            }),
            Overflow::Checked => match self {
                Arith::Add => x.checked_add(y),
                Arith::Subtract => x.checked_sub(y),
                Arith::Multiply => x.checked_mul(y),
                Arith::Divide => x.checked_div(y),
                Arith::Modulo => x.checked_rem(y),
            },
        };

        result.ok_or_else(|| e::numeric_overflow(self.name(), x, y))
    }

    fn negate(self, overflow: Overflow, x: i64) -> Result<i64, LispError> {
        match overflow {
            Overflow::Wrapping => Ok(x.wrapping_neg()),
            Overflow::Saturating => Ok(x.saturating_neg()),
            Overflow::Checked => x
                .checked_neg()
                .ok_or_else(|| e::numeric_overflow(self.name(), 0, x)),
        }
    }
}

/// Folds the arguments left to right, seeded with the first one. Every
/// argument is type checked before any arithmetic happens.
fn arithmetic(env: &Env, args: Vector<Value>, op: Arith) -> EvalResult {
    let name = op.name();
    let numbers = args
        .iter()
        .enumerate()
        .map(|(i, arg)| arg.number(name, i))
        .collect::<Result<Vec<i64>, _>>()?;

    let overflow = env.overflow();
    match numbers.split_first() {
        Some((&x, [])) if op == Arith::Subtract => op.negate(overflow, x).map(Value::Number),
        Some((&x, rest)) => rest
            .iter()
            .try_fold(x, |acc, &y| op.apply(overflow, acc, y))
            .map(Value::Number),
        None => Err(e::arg_count(name, "1 or more", 0)),
    }
}

/// The single q-expression argument of `head`/`tail`/`init`, which must not
/// be empty.
fn non_empty(args: Vector<Value>, name: &str) -> Result<Vector<Value>, LispError> {
    let [list] = exactly::<1>(args, name)?;
    let list = list.owned_qexpr(name, 0)?;
    if list.is_empty() {
        Err(e::empty_list(name))
    } else {
        Ok(list)
    }
}

fn exactly<const N: usize>(args: Vector<Value>, name: &str) -> Result<[Value; N], LispError> {
    let args: Vec<Value> = args.into_iter().collect();
    args.try_into()
        .map_err(|args: Vec<Value>| e::arg_count(name, N, args.len()))
}
