//! Turns source text into a generic tagged tree.
//!
//! ```text
//! number : /-?[0-9]+/ ;
//! symbol : /[a-zA-Z0-9_+\-*\/\\=<>!&%]+/ ;
//! sexpr  : '(' <expr>* ')' ;
//! qexpr  : '{' <expr>* '}' ;
//! expr   : <number> | <symbol> | <sexpr> | <qexpr> ;
//! lispy  : /^/ <expr>* /$/ ;
//! ```
//!
//! Nodes carry the rule path that produced them as their tag, e.g.
//! `expr|number|regex` for a number inside an expression, `>` for the root,
//! `char` for punctuation and `regex` for the start and end anchors.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ParseError;

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"^-?[0-9]+").unwrap();
    static ref SYMBOL_RE: Regex = Regex::new(r"^[a-zA-Z0-9_+\-*/\\=<>!&%]+").unwrap();
}

pub const ROOT_TAG: &str = ">";
const NUMBER_TAG: &str = "expr|number|regex";
const SYMBOL_TAG: &str = "expr|symbol|regex";
const SEXPR_TAG: &str = "expr|sexpr|>";
const QEXPR_TAG: &str = "expr|qexpr|>";
const CHAR_TAG: &str = "char";
const ANCHOR_TAG: &str = "regex";

/// The view of a parse tree the reader works against.
pub trait Tree: Sized {
    fn tag(&self) -> &str;
    /// Literal text of a leaf; empty for interior nodes.
    fn contents(&self) -> &str;
    fn children(&self) -> &[Self];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    tag: String,
    contents: String,
    children: Vec<Node>,
}

impl Node {
    pub fn leaf<T: Into<String>, C: Into<String>>(tag: T, contents: C) -> Self {
        Self {
            tag: tag.into(),
            contents: contents.into(),
            children: Vec::new(),
        }
    }

    pub fn branch<T: Into<String>>(tag: T, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            contents: String::new(),
            children,
        }
    }
}

impl Tree for Node {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn contents(&self) -> &str {
        &self.contents
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

pub fn parse(s: &str) -> Result<Node, ParseError> {
    Parser { src: s, pos: 0 }.parse()
}

struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn parse(&mut self) -> Result<Node, ParseError> {
        let mut children = vec![Node::leaf(ANCHOR_TAG, "")];

        while let Some(c) = self.peek() {
            if c == ')' || c == '}' {
                return Err(ParseError::Unexpected(self.pos, c, "expression or end of input"));
            }
            children.push(self.expr()?);
        }

        children.push(Node::leaf(ANCHOR_TAG, ""));
        Ok(Node::branch(ROOT_TAG, children))
    }

    /// Next non-whitespace character, without consuming it.
    fn peek(&mut self) -> Option<char> {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        trimmed.chars().next()
    }

    fn expr(&mut self) -> Result<Node, ParseError> {
        let c = self
            .peek()
            .ok_or_else(|| ParseError::UnexpectedEnd(self.pos, "expression"))?;

        match c {
            '(' => self.list('(', ')', SEXPR_TAG),
            '{' => self.list('{', '}', QEXPR_TAG),
            _ => self
                .token(&NUMBER_RE, NUMBER_TAG)
                .or_else(|| self.token(&SYMBOL_RE, SYMBOL_TAG))
                .ok_or(ParseError::Unexpected(
                    self.pos,
                    c,
                    "number, symbol, '(' or '{'",
                )),
        }
    }

    fn token(&mut self, re: &Regex, tag: &str) -> Option<Node> {
        let m = re.find(&self.src[self.pos..])?;
        self.pos += m.end();
        Some(Node::leaf(tag, m.as_str()))
    }

    fn list(&mut self, open: char, close: char, tag: &str) -> Result<Node, ParseError> {
        self.pos += open.len_utf8();
        let mut children = vec![Node::leaf(CHAR_TAG, open.to_string())];

        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::UnexpectedEnd(
                        self.pos,
                        if close == ')' { "')'" } else { "'}'" },
                    ))
                }
                Some(c) if c == close => {
                    self.pos += close.len_utf8();
                    children.push(Node::leaf(CHAR_TAG, close.to_string()));
                    return Ok(Node::branch(tag, children));
                }
                Some(_) => children.push(self.expr()?),
            }
        }
    }
}
