use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Debug},
    rc::Rc,
};

use crate::{
    builtins::Builtin,
    config::Overflow,
    error::{self as e, LispError},
    value::Value,
};

/// A scope of bindings. Cloning an `Env` shares the scope; lambdas keep
/// their defining scope alive this way.
pub struct Env(Rc<LispEnv>);

struct LispEnv {
    data: RefCell<HashMap<String, Value>>,
    outer: Option<Env>,
    overflow: Overflow,
}

impl Env {
    pub fn new() -> EnvBuilder {
        EnvBuilder {
            data: HashMap::new(),
            outer: None,
            overflow: None,
        }
    }

    /// A fresh root scope holding every builtin.
    pub fn with_builtins(overflow: Overflow) -> Self {
        Env::new().with_core().overflow(overflow).make()
    }

    /// A child scope whose free variables resolve through `self`.
    pub fn child(&self) -> Self {
        Env::new().env(self.clone()).make()
    }

    pub fn get(&self, k: &str) -> Result<Value, LispError> {
        self.find(k)
            .and_then(|env| env.0.data.borrow().get(k).cloned())
            .ok_or_else(|| {
                tracing::trace!(symbol = k, "lookup failed");
                e::symbol_not_found(k)
            })
    }

    fn find(&self, k: &str) -> Option<Self> {
        if self.0.data.borrow().contains_key(k) {
            Some(self.clone())
        } else {
            self.0.outer.as_ref().and_then(|e| e.find(k))
        }
    }

    /// Binds `key` in this scope, replacing any previous binding here.
    pub fn put<K: Into<String>>(&self, key: K, value: Value) {
        self.0.data.borrow_mut().insert(key.into(), value);
    }

    /// Drops every binding in this scope. A lambda bound in the scope it
    /// captured keeps that scope alive until this runs.
    pub fn clear(&self) {
        let bindings = std::mem::take(&mut *self.0.data.borrow_mut());
        drop(bindings);
    }

    /// Binds `key` in the outermost scope.
    pub fn def<K: Into<String>>(&self, key: K, value: Value) {
        self.most_outer().put(key, value)
    }

    pub fn most_outer(&self) -> Self {
        match &self.0.outer {
            Some(outer) => outer.most_outer(),
            None => self.clone(),
        }
    }

    #[inline]
    pub fn overflow(&self) -> Overflow {
        self.0.overflow
    }
}

impl Clone for Env {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut keys: Vec<String> = self.0.data.borrow().keys().cloned().collect();
        keys.sort();
        f.debug_struct("Env")
            .field("keys", &keys)
            .field("outer", &self.0.outer)
            .finish()
    }
}

pub struct EnvBuilder {
    data: HashMap<String, Value>,
    outer: Option<Env>,
    overflow: Option<Overflow>,
}

impl EnvBuilder {
    pub fn env(mut self, env: Env) -> Self {
        self.outer = Some(env);
        self
    }

    pub fn with_core(mut self) -> Self {
        for builtin in Builtin::ALL.iter() {
            self.data
                .insert(builtin.name().into(), Value::Builtin(*builtin));
        }
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = Some(overflow);
        self
    }

    pub fn make(mut self) -> Env {
        let outer = self.outer.take();
        let overflow = self
            .overflow
            .or_else(|| outer.as_ref().map(Env::overflow))
            .unwrap_or_default();

        Env(Rc::new(LispEnv {
            data: RefCell::new(self.data),
            outer,
            overflow,
        }))
    }
}

#[cfg(test)]
mod env_tests {
    use super::*;
    use crate::{error::ErrorKind, value::Lambda, Interpreter};
    use im_rc::{vector, Vector};
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_bound() {
        let env = Env::with_builtins(Overflow::Wrapping);

        assert_eq!(env.get("+"), Ok(Value::Builtin(Builtin::Add)));
        assert_eq!(env.get("head"), Ok(Value::Builtin(Builtin::Head)));
    }

    #[test]
    fn unbound_symbol_names_the_symbol() {
        let env = Env::new().make();
        let err = env.get("nope").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnboundSymbol);
        assert_eq!(err.detail(), "unbound symbol 'nope'");
    }

    #[test]
    fn child_shadows_and_falls_through() {
        let root = Env::new().make();
        root.put("x", Value::Number(1));
        root.put("y", Value::Number(2));

        let child = root.child();
        child.put("x", Value::Number(10));

        assert_eq!(child.get("x"), Ok(Value::Number(10)));
        assert_eq!(child.get("y"), Ok(Value::Number(2)));
        assert_eq!(root.get("x"), Ok(Value::Number(1)));
    }

    #[test]
    fn def_writes_to_root() {
        let root = Env::new().make();
        let grandchild = root.child().child();
        grandchild.def("z", Value::Number(3));

        assert_eq!(root.get("z"), Ok(Value::Number(3)));
    }

    #[test]
    fn put_overwrites() {
        let env = Env::new().make();
        env.put("x", Value::Number(1));
        env.put("x", Value::make_qexpr(vector![Value::Number(2)]));

        assert_eq!(env.get("x").unwrap().to_string(), "{2}");
    }

    #[test]
    fn fetched_values_do_not_alias_bindings() {
        let env = Env::new().make();
        env.put("x", Value::make_qexpr(vector![Value::Number(1), Value::Number(2)]));

        if let Value::QExpr(mut v) = env.get("x").unwrap() {
            v.push_back(Value::Number(3));
        }

        assert_eq!(env.get("x").unwrap().to_string(), "{1 2}");
    }

    #[test]
    fn clearing_breaks_closure_cycles() {
        let root = Env::new().make();
        let lambda = Lambda::new(Vector::new(), None, Vector::new(), root.clone());
        root.put("f", Value::Lambda(lambda));

        let weak = Rc::downgrade(&root.0);
        root.clear();
        drop(root);

        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn dropping_a_session_frees_its_root_scope() {
        let lispy = Interpreter::new();
        lispy.evaluate_line("def {f} (\\ {x} {x})").unwrap();
        lispy.evaluate_line("def {adder} (\\ {n} {\\ {x} {+ x n}})").unwrap();
        lispy.evaluate_line("def {add5} (adder 5)").unwrap();

        let weak = Rc::downgrade(&lispy.env().0);
        drop(lispy);

        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn overflow_policy_is_inherited() {
        let root = Env::new().overflow(Overflow::Checked).make();
        assert_eq!(root.child().child().overflow(), Overflow::Checked);
    }
}
