use im_rc::Vector;

use crate::{
    env::Env,
    error::{self as e, ErrorKind},
    value::{EvalResult, Lambda, Value},
};

/// Reduces `ast` in `env`. Error values are terminal: evaluating one
/// yields it as the error side of the result.
pub fn eval(ast: Value, env: &Env) -> EvalResult {
    tracing::trace!(%ast, "eval");

    match ast {
        Value::Symbol(s) => env.get(&s),
        Value::Error(err) => Err(err),
        Value::SExpr(children) => eval_sexpr(children, env),
        other => Ok(other),
    }
}

fn eval_sexpr(children: Vector<Value>, env: &Env) -> EvalResult {
    let applied = children.len() > 1;
    let mut evaluated = Vector::new();

    for (i, child) in children.into_iter().enumerate() {
        let callee = if i == 0 && applied {
            child.symbol().cloned()
        } else {
            None
        };

        let value = eval(child, env).map_err(|err| {
            tracing::trace!(kind = %err.kind(), position = i, "short-circuit");
            match callee {
                Some(name) if err.kind() == ErrorKind::UnboundSymbol => e::unknown_function(name),
                _ => err,
            }
        })?;
        evaluated.push_back(value);
    }

    match evaluated.pop_front() {
        None => Ok(Value::make_sexpr(evaluated)),
        Some(only) if evaluated.is_empty() => Ok(only),
        Some(func) => apply(func, evaluated, env),
    }
}

/// Calls `func` with already evaluated `args`.
pub fn apply(func: Value, args: Vector<Value>, env: &Env) -> EvalResult {
    match func {
        Value::Builtin(builtin) => builtin.call(env, args),
        Value::Lambda(lambda) => call_lambda(&lambda, args),
        Value::Symbol(name) => Err(e::unknown_function(name)),
        other => Err(e::not_function(&other)),
    }
}

#[tracing::instrument(
    level = "debug",
    skip(lambda, args),
    fields(lambda = %lambda.signature(), argc = args.len())
)]
fn call_lambda(lambda: &Lambda, args: Vector<Value>) -> EvalResult {
    let params = lambda.params();
    let mut args = args;

    match lambda.rest() {
        None if args.len() != params.len() => {
            return Err(e::arg_count(lambda.signature(), params.len(), args.len()))
        }
        Some(_) if args.len() < params.len() => {
            return Err(e::arg_count(
                lambda.signature(),
                format!("{} or more", params.len()),
                args.len(),
            ))
        }
        _ => (),
    }

    let surplus = args.split_off(params.len());
    let scope = lambda.env().child();
    for (param, arg) in params.iter().zip(args) {
        scope.put(param.as_str(), arg);
    }
    if let Some(rest) = lambda.rest() {
        scope.put(rest.as_str(), Value::make_qexpr(surplus));
    }

    eval(Value::make_sexpr(lambda.body().clone()), &scope)
}

#[cfg(test)]
mod eval_tests {
    use super::*;
    use crate::{config::Overflow, reader::read_str};
    use pretty_assertions::assert_eq;

    fn run(env: &Env, s: &str) -> Value {
        Value::from_result(eval(read_str(s).unwrap(), env))
    }

    fn rep(s: &str) -> String {
        run(&Env::with_builtins(Overflow::Wrapping), s).to_string()
    }

    fn error_kind(s: &str) -> ErrorKind {
        match run(&Env::with_builtins(Overflow::Wrapping), s) {
            Value::Error(err) => err.kind(),
            other => panic!("expected an error from {:?}, got {}", s, other),
        }
    }

    #[test]
    fn numbers_evaluate_to_themselves() {
        assert_eq!(rep("42"), "42");
        assert_eq!(rep("-9223372036854775808"), "-9223372036854775808");
    }

    #[test]
    fn arithmetic() {
        assert_eq!(rep("+ 1 2 3"), "6");
        assert_eq!(rep("(- 10)"), "-10");
        assert_eq!(rep("(/ 7 2)"), "3");
        assert_eq!(rep("* (+ 1 2) (- 5 1)"), "12");
    }

    #[test]
    fn collapsing() {
        assert_eq!(rep("()"), "()");
        assert_eq!(rep("(5)"), "5");
        assert_eq!(rep("((((5))))"), "5");
        assert_eq!(rep(""), "()");
    }

    #[test]
    fn qexpr_is_self_evaluating() {
        assert_eq!(rep("{+ 1 (x)}"), "{+ 1 (x)}");
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(error_kind("+ 1 (/ 1 0) y"), ErrorKind::DivisionByZero);
        assert_eq!(error_kind("+ y (/ 1 0)"), ErrorKind::UnboundSymbol);
    }

    #[test]
    fn children_after_an_error_are_not_evaluated() {
        let env = Env::with_builtins(Overflow::Wrapping);
        run(&env, "def {q} 0");

        match run(&env, "+ (/ 1 0) (def {q} 1)") {
            Value::Error(err) => assert_eq!(err.kind(), ErrorKind::DivisionByZero),
            other => panic!("expected division error, got {}", other),
        }
        assert_eq!(run(&env, "q"), Value::Number(0));
    }

    #[test]
    fn error_values_are_terminal() {
        assert_eq!(error_kind("eval {+ 1 99999999999999999999}"), ErrorKind::BadNumber);
    }

    #[test]
    fn quoted_errors_stay_quoted() {
        assert_eq!(
            rep("{99999999999999999999}"),
            "{Error: invalid number '99999999999999999999'}"
        );
    }

    #[test]
    fn function_position() {
        assert_eq!(error_kind("1 2 3"), ErrorKind::NotAFunction);
        assert_eq!(error_kind("frobnicate 1"), ErrorKind::UnknownFunction);
        assert_eq!(error_kind("frobnicate"), ErrorKind::UnboundSymbol);

        let err = eval(read_str("{1} 2").unwrap(), &Env::with_builtins(Overflow::Wrapping))
            .unwrap_err();
        assert!(err.detail().contains("'{1}'"), "{}", err.detail());
    }

    #[test]
    fn leftover_symbol_in_function_position() {
        let env = Env::with_builtins(Overflow::Wrapping);
        let result = apply(Value::make_symbol("foo"), Vector::new(), &env);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnknownFunction);
    }

    #[test]
    fn list_and_eval_round_trip() {
        assert_eq!(rep("list 1 2 3"), "{1 2 3}");
        assert_eq!(rep("eval {+ 1 2}"), "3");
        assert_eq!(rep("eval (list + 1 2)"), rep("(+ 1 2)"));
        assert_eq!(rep("eval (head {(+ 1 2) (+ 10 20)})"), "3");
    }

    #[test]
    fn lambdas() {
        let env = Env::with_builtins(Overflow::Wrapping);
        run(&env, "def {add} (\\ {x y} {+ x y})");

        assert_eq!(run(&env, "add 1 2").to_string(), "3");
        assert_eq!(run(&env, "(\\ {x} {* x x}) 5").to_string(), "25");
        assert_eq!(run(&env, "add").to_string(), "<function>");

        match run(&env, "add 1 2 3") {
            Value::Error(err) => {
                assert_eq!(err.kind(), ErrorKind::ArityError);
                assert_eq!(
                    err.detail(),
                    "function '\\ {x y}' passed incorrect number of arguments. Got 3, expected 2"
                );
            }
            other => panic!("expected arity error, got {}", other),
        }
    }

    #[test]
    fn variadic_lambdas() {
        let env = Env::with_builtins(Overflow::Wrapping);
        run(&env, "def {f} (\\ {x & xs} {xs})");

        assert_eq!(run(&env, "f 1 2 3").to_string(), "{2 3}");
        assert_eq!(run(&env, "f 1").to_string(), "{}");
        assert_eq!(run(&env, "(f)").to_string(), "<function>");
    }

    #[test]
    fn closures_see_their_defining_scope() {
        let env = Env::with_builtins(Overflow::Wrapping);
        run(&env, "def {adder} (\\ {n} {\\ {x} {+ x n}})");
        run(&env, "def {add5} (adder 5)");

        assert_eq!(run(&env, "add5 10").to_string(), "15");
        assert!(run(&env, "n").is_error());
    }

    #[test]
    fn local_bindings_do_not_leak() {
        let env = Env::with_builtins(Overflow::Wrapping);
        run(&env, "def {f} (\\ {x} {= {y} x})");
        run(&env, "f 1");

        assert!(run(&env, "y").is_error());
    }

    #[test]
    fn recursion_through_if() {
        let env = Env::with_builtins(Overflow::Wrapping);
        run(
            &env,
            "def {fact} (\\ {n} {if (<= n 1) {1} {* n (fact (- n 1))}})",
        );

        assert_eq!(run(&env, "fact 10").to_string(), "3628800");
    }
}
