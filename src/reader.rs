use im_rc::Vector;

use crate::{
    error as e,
    grammar::{self, Tree, ROOT_TAG},
    value::Value,
};

/// Builds a value tree from a parse tree. Bad literals become error values
/// in place, so `{1 99999999999999999999}` reads as a q-expression holding
/// an error.
pub fn read<T: Tree>(node: &T) -> Value {
    let tag = node.tag();

    if tag.contains("number") {
        read_number(node.contents())
    } else if tag.contains("symbol") {
        Value::make_symbol(node.contents())
    } else if tag == ROOT_TAG || tag.contains("sexpr") {
        Value::make_sexpr(read_children(node))
    } else if tag.contains("qexpr") {
        Value::make_qexpr(read_children(node))
    } else {
        tracing::error!(tag, contents = node.contents(), "unreadable parse node");
        Value::make_error(e::syntax(format!("unreadable parse node '{}'", tag)))
    }
}

/// Parses `s` with the bundled grammar and reads the whole input as one
/// s-expression.
pub fn read_str(s: &str) -> Result<Value, crate::error::ParseError> {
    grammar::parse(s).map(|root| read(&root))
}

fn read_number(literal: &str) -> Value {
    literal
        .parse()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::make_error(e::bad_number(literal)))
}

fn read_children<T: Tree>(node: &T) -> Vector<Value> {
    node.children()
        .iter()
        .filter(|child| !is_punctuation(*child))
        .map(read::<T>)
        .collect()
}

fn is_punctuation<T: Tree>(node: &T) -> bool {
    match node.contents() {
        "(" | ")" | "{" | "}" => true,
        _ => node.tag() == "regex",
    }
}
